//! The `Analysis` aggregate (§3) and the caller-supplied configuration
//! records (`IncOptions`, §6) that parameterize the invalidation engine and
//! driver.
//!
//! This crate sits a layer above `incra-core`/`incra-relation`/`incra-api`
//! purely to hold the struct that ties all three together; it has no
//! algorithms of its own.

mod analysis;
mod options;
mod problem;
mod setup;
mod source_info;

pub use analysis::Analysis;
pub use options::{CompileOrder, IncOptions, IncOptionsError};
pub use problem::{Position, Problem, Severity};
pub use setup::{Compilation, FileHash, MiniOptions, MiniSetup, Output, OutputGroup};
pub use source_info::SourceInfo;
