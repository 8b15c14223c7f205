use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// A pair of rewrite functions applied symmetrically at the write/read
/// boundary of the codec (§4.6): `to_stored` runs while building the wire
/// representation, `from_stored` runs while rebuilding the in-memory one.
/// This is what lets an `Analysis` move between machines with different
/// directory layouts — the caller supplies mappers that translate absolute
/// roots, the codec itself stays oblivious to *why* a path changed.
pub struct Mapper<T> {
    to_stored: Arc<dyn Fn(&T) -> T + Send + Sync>,
    from_stored: Arc<dyn Fn(&T) -> T + Send + Sync>,
}

impl<T: Clone + 'static> Mapper<T> {
    pub fn identity() -> Self {
        Self {
            to_stored: Arc::new(|value: &T| value.clone()),
            from_stored: Arc::new(|value: &T| value.clone()),
        }
    }

    pub fn new(
        to_stored: impl Fn(&T) -> T + Send + Sync + 'static,
        from_stored: impl Fn(&T) -> T + Send + Sync + 'static,
    ) -> Self {
        Self {
            to_stored: Arc::new(to_stored),
            from_stored: Arc::new(from_stored),
        }
    }

    pub fn to_stored(&self, value: &T) -> T {
        (self.to_stored)(value)
    }

    pub fn from_stored(&self, value: &T) -> T {
        (self.from_stored)(value)
    }
}

impl<T> Clone for Mapper<T> {
    fn clone(&self) -> Self {
        Self {
            to_stored: self.to_stored.clone(),
            from_stored: self.from_stored.clone(),
        }
    }
}

impl<T> fmt::Debug for Mapper<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Mapper(..)")
    }
}

/// The 11 named rewrite points the codec consults on every path/option
/// touched while serializing or deserializing (§4.6).
#[derive(Clone, Debug)]
pub struct ReadWriteMappers {
    pub source_file: Mapper<PathBuf>,
    pub binary_file: Mapper<PathBuf>,
    pub product_file: Mapper<PathBuf>,
    pub source_dir: Mapper<PathBuf>,
    pub output_dir: Mapper<PathBuf>,
    pub classpath_entry: Mapper<PathBuf>,
    pub source_stamp: Mapper<incra_core::Stamp>,
    pub binary_stamp: Mapper<incra_core::Stamp>,
    pub product_stamp: Mapper<incra_core::Stamp>,
    pub javac_option: Mapper<String>,
    pub scalac_option: Mapper<String>,
}

impl Default for ReadWriteMappers {
    /// No rewriting: every path/option round-trips unchanged. The common
    /// case when an `Analysis` is read back on the same machine it was
    /// written on.
    fn default() -> Self {
        Self {
            source_file: Mapper::identity(),
            binary_file: Mapper::identity(),
            product_file: Mapper::identity(),
            source_dir: Mapper::identity(),
            output_dir: Mapper::identity(),
            classpath_entry: Mapper::identity(),
            source_stamp: Mapper::identity(),
            binary_stamp: Mapper::identity(),
            product_stamp: Mapper::identity(),
            javac_option: Mapper::identity(),
            scalac_option: Mapper::identity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_mapper_round_trips() {
        let mapper: Mapper<PathBuf> = Mapper::identity();
        let path = PathBuf::from("/a/b.java");
        assert_eq!(mapper.to_stored(&path), path);
        assert_eq!(mapper.from_stored(&path), path);
    }

    #[test]
    fn custom_mapper_rewrites_each_direction() {
        let mapper: Mapper<PathBuf> = Mapper::new(
            |p: &PathBuf| PathBuf::from("/stored").join(p.strip_prefix("/real").unwrap_or(p)),
            |p: &PathBuf| PathBuf::from("/real").join(p.strip_prefix("/stored").unwrap_or(p)),
        );
        let real = PathBuf::from("/real/a/b.java");
        let stored = mapper.to_stored(&real);
        assert_eq!(stored, PathBuf::from("/stored/a/b.java"));
        assert_eq!(mapper.from_stored(&stored), real);
    }
}
