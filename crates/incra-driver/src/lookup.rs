//! Resolving dependencies that live outside the current module (§6 "lookup
//! interface").
//!
//! A `Compiler` reports a `binary_dependency` for every classpath hit, but it
//! has no idea whether that classpath entry is itself the product of another
//! incrementally-compiled module (and if so, which source produced which
//! class). That mapping is the caller's responsibility — it owns the build
//! graph, the driver only owns one module.

use incra_analysis::Analysis;
use incra_core::File;
use std::sync::Arc;

/// Caller-supplied view onto the rest of the classpath (§6).
pub trait ClasspathLookup {
    /// Whether `binary_file` is present among this module's classpath
    /// entries at all. Used to tell a genuinely external reference apart
    /// from a dangling one (§4.5 edge case "MissingExternal").
    fn on_classpath(&self, binary_file: &File) -> bool;

    /// The upstream `Analysis` that owns `binary_file`, if it is itself the
    /// product directory or packaged jar of another module the driver also
    /// tracks incrementally. Returns `None` for classpath entries that are
    /// not analysis-backed (vendored jars, JDK rt.jar, ...).
    fn analysis_for_classpath_entry(&self, binary_file: &File) -> Option<Arc<Analysis>>;

    /// Resolve `class_name` to the upstream `Analysis` that declares it,
    /// searching every analysis-backed classpath entry. Used to recover an
    /// external `AnalyzedClass` when the current module's own `apis.external`
    /// is missing an entry a callback just referenced.
    fn analysis_declaring(&self, class_name: &str) -> Option<Arc<Analysis>>;
}

/// A `ClasspathLookup` with no upstream analyses — every classpath entry is
/// opaque. Useful for a module with no analysis-backed dependencies, and in
/// tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoUpstreamAnalyses;

impl ClasspathLookup for NoUpstreamAnalyses {
    fn on_classpath(&self, _binary_file: &File) -> bool {
        false
    }

    fn analysis_for_classpath_entry(&self, _binary_file: &File) -> Option<Arc<Analysis>> {
        None
    }

    fn analysis_declaring(&self, _class_name: &str) -> Option<Arc<Analysis>> {
        None
    }
}
