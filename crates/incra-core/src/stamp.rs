use crate::error::CoreError;
use crate::file::File;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// A fingerprint of a single file at a point in time.
///
/// Equality is structural: two `Stamp`s are equal iff they carry the same
/// variant and payload. `Stamp::Empty` stands for "file does not exist".
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Stamp {
    Empty,
    Hash(#[serde(with = "hex_bytes")] Vec<u8>),
    LastModified(i64),
}

impl Stamp {
    /// `modified(old, new) := old != new`, per §4.1. Exposed as an associated
    /// function (rather than leaning on `PartialEq`) so call sites read the
    /// invalidation rule by name.
    pub fn modified(old: &Stamp, new: &Stamp) -> bool {
        old != new
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(d)?;
        hex::decode(text).map_err(serde::de::Error::custom)
    }
}

/// Hash-stamp a source file (or return `Stamp::Empty` if it no longer
/// exists). Sources are stamped by content hash so that touching a file
/// without changing its bytes (e.g. `touch`) never triggers a recompile.
pub fn stamp_source(path: &Path) -> Result<Stamp, CoreError> {
    hash_stamp(path)
}

/// Hash-stamp a classpath/jar entry. Same policy as sources: binaries are
/// stamped by content hash because mtimes on extracted jars are unreliable
/// across checkouts and CI caches.
pub fn stamp_binary(path: &Path) -> Result<Stamp, CoreError> {
    hash_stamp(path)
}

/// Stamp an emitted product (class file) by last-modified time.
///
/// Products are written by the compiler on every recompile, so their mtime
/// is a reliable cheap proxy for "was this regenerated"; hashing every
/// product on every run would be wasted work for files whose tracked source
/// didn't change.
pub fn stamp_product(path: &Path) -> Result<Stamp, CoreError> {
    match std::fs::metadata(path) {
        Ok(meta) => {
            let modified = meta.modified().map_err(|source| CoreError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let millis = modified
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as i64)
                .unwrap_or(0);
            Ok(Stamp::LastModified(millis))
        }
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(Stamp::Empty),
        Err(source) => Err(CoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn hash_stamp(path: &Path) -> Result<Stamp, CoreError> {
    match std::fs::read(path) {
        Ok(bytes) => {
            let mut hasher = Sha256::new();
            hasher.update(&bytes);
            Ok(Stamp::Hash(hasher.finalize().to_vec()))
        }
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(Stamp::Empty),
        Err(source) => Err(CoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// The three disjoint stamp maps that make up component C1.
///
/// Invariant (§3): the key sets of `sources`, `products`, and `binaries` are
/// pairwise disjoint — a given `File` plays exactly one role in an Analysis.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stamps {
    pub sources: BTreeMap<File, Stamp>,
    pub products: BTreeMap<File, Stamp>,
    pub binaries: BTreeMap<File, Stamp>,
}

impl Stamps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh the stamp for a single source file in place, recomputing it
    /// from disk (`Stamp::Empty` if the file is gone).
    pub fn refresh_source(&mut self, file: File) -> Result<(), CoreError> {
        let stamp = stamp_source(file.as_path())?;
        self.sources.insert(file, stamp);
        Ok(())
    }

    pub fn refresh_product(&mut self, file: File) -> Result<(), CoreError> {
        let stamp = stamp_product(file.as_path())?;
        self.products.insert(file, stamp);
        Ok(())
    }

    pub fn refresh_binary(&mut self, file: File) -> Result<(), CoreError> {
        let stamp = stamp_binary(file.as_path())?;
        self.binaries.insert(file, stamp);
        Ok(())
    }

    /// Remove every trace of `file` from all three maps. Used when a source
    /// is deleted and its products must be forgotten too (§4.5 edge cases).
    pub fn remove(&mut self, file: &File) {
        self.sources.remove(file);
        self.products.remove(file);
        self.binaries.remove(file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_stamps_empty() {
        let stamp = stamp_source(Path::new("/does/not/exist/Foo.java")).unwrap();
        assert_eq!(stamp, Stamp::Empty);
    }

    #[test]
    fn hash_stamp_is_stable_for_same_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Foo.java");
        std::fs::write(&path, b"class Foo {}").unwrap();
        let a = stamp_source(&path).unwrap();
        let b = stamp_source(&path).unwrap();
        assert_eq!(a, b);
        assert!(!Stamp::modified(&a, &b));
    }

    #[test]
    fn hash_stamp_changes_with_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Foo.java");
        std::fs::write(&path, b"class Foo {}").unwrap();
        let a = stamp_source(&path).unwrap();
        std::fs::write(&path, b"class Foo { int x; }").unwrap();
        let b = stamp_source(&path).unwrap();
        assert!(Stamp::modified(&a, &b));
    }

    #[test]
    fn stamps_maps_stay_disjoint_after_remove() {
        let mut stamps = Stamps::new();
        let file = File::from_canonical("/a/Foo.java").unwrap();
        stamps.sources.insert(file.clone(), Stamp::Empty);
        stamps.products.insert(file.clone(), Stamp::LastModified(0));
        stamps.remove(&file);
        assert!(!stamps.sources.contains_key(&file));
        assert!(!stamps.products.contains_key(&file));
    }
}
