//! Shared primitives for the incremental analysis engine.
//!
//! This crate is intentionally small: it holds the `File` token and the
//! `Stamp`/`Stamps` fingerprinting layer (component C1 of the design), plus
//! the handful of error types every other `incra-*` crate needs to report
//! against. Nothing here parses or type-checks sources.

mod error;
mod file;
mod stamp;

pub use error::CoreError;
pub use file::File;
pub use stamp::{stamp_binary, stamp_product, stamp_source, Stamp, Stamps};
