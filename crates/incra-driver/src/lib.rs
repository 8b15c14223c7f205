//! Component C7: the compile driver (§4.7, §5, §6).
//!
//! Ties the rest of the workspace together: `incra-invalidate` decides what
//! needs recompiling, `incra-diff` turns a compiler's output into a closure
//! seed, `incra-codec` persists the result, and this crate owns the loop
//! that drives a `Compiler` through however many rounds that takes plus the
//! callback contract the compiler reports through.

mod callback;
mod driver;
mod error;
mod lookup;
mod store;

pub use callback::{AnalysisCallback, CallbackRecorder, CompiledBatch, DependencyContext};
pub use driver::{run, run_once, Compiler, RunConfig, RunOutcome};
pub use error::DriverError;
pub use lookup::{ClasspathLookup, NoUpstreamAnalyses};
pub use store::AnalysisStore;
