use incra_core::File;

/// Error taxonomy for one driver run (§7).
///
/// `MissingExternal` is recoverable and handled locally — it never reaches a
/// caller as an `Err`, only as a `tracing::warn!` from `resolve_missing_externals`.
/// It stays in this enum anyway because callers that want to know *why*
/// `apis.external` came up short need a typed reason, not just a log line.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("analysis codec error: {0}")]
    Codec(#[from] incra_codec::CodecError),

    #[error("io error stamping a tracked file: {0}")]
    Io(#[from] incra_core::CoreError),

    #[error("compiler emitted an event for unregistered source {source}")]
    CallbackViolation { source: File },

    #[error("compiler produced {class_file} outside the declared output")]
    OutputViolation { class_file: File },

    #[error("external class {class_name} referenced from {from_class_name} could not be resolved on classpath")]
    MissingExternal { class_name: String, from_class_name: String },

    #[error("compile failed: {message}")]
    CompileFailure { message: String },

    #[error("driver run was cancelled")]
    Cancelled,
}
