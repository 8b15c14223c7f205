use crate::error::CoreError;
use std::path::{Path, PathBuf};

/// An opaque path token.
///
/// Equality and ordering are defined over the canonicalized absolute path, so
/// two `File`s built from `./a/../a/Foo.java` and `/abs/a/Foo.java` compare
/// equal. Nothing outside the stamp store should open the underlying path
/// directly; everything else treats `File` as an opaque key into `Stamps` and
/// `Relations`.
#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct File(PathBuf);

impl File {
    /// Build a `File` from an already-canonical absolute path, without
    /// touching the filesystem. Used by the codec when rehydrating a
    /// previously-persisted analysis, and by tests.
    pub fn from_canonical(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        if !path.is_absolute() {
            return Err(CoreError::NotAbsolute(path));
        }
        Ok(Self(path))
    }

    /// Canonicalize `path` on disk and wrap it as a `File` token.
    ///
    /// Uses `dunce::canonicalize` rather than `std::fs::canonicalize` so that
    /// Windows paths don't pick up a `\\?\` verbatim prefix that would make
    /// two otherwise-identical files compare unequal.
    pub fn canonicalize(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let canonical = dunce::canonicalize(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self(canonical))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl std::fmt::Debug for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("File").field(&self.0).finish()
    }
}

impl std::fmt::Display for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}
