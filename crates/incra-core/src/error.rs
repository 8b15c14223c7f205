use std::path::PathBuf;

/// Errors shared by the stamp store and anything else low-level enough to
/// live in `incra-core`. Component-specific errors (codec, driver, ...) are
/// defined in their own crates per §7 of the design.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("path {0} is not absolute and cannot be canonicalized into a File token")]
    NotAbsolute(PathBuf),
}
