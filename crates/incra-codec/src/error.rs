use std::path::PathBuf;

/// Errors produced by reading or writing an `AnalysisFile`/`APIsFile`.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("unsupported schema version {found}, expected {expected}")]
    UnsupportedVersion { expected: u32, found: u32 },

    #[error("name table index {index} out of range (table has {len} entries)")]
    NameIndexOutOfRange { index: u32, len: usize },

    #[error("invalid path produced by a path mapper: {0}")]
    InvalidMappedPath(#[from] incra_core::CoreError),
}
