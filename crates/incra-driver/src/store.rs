//! Process-wide weak cache of decoded `Analysis` values (SPEC_FULL.md §2
//! ambient supplement): two driver runs against the same on-disk analysis
//! file in one process shouldn't each pay the decode cost, but the cache
//! also must not be the thing keeping a stale `Analysis` alive after the
//! file it backs has been overwritten.

use crate::error::DriverError;
use incra_analysis::{Analysis, MiniSetup};
use incra_codec::ReadWriteMappers;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, Weak};

type Entry = Weak<(Analysis, MiniSetup)>;

fn registry() -> &'static Mutex<HashMap<PathBuf, Entry>> {
    static REGISTRY: OnceLock<Mutex<HashMap<PathBuf, Entry>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Load-or-reuse access to a backing analysis file, keyed by its path.
///
/// Holding the returned `Arc` keeps the decoded value alive; once every
/// holder drops it, the next `load` call decodes from disk again rather than
/// serving a value nothing asked to keep (§6 "process-wide weak cache").
pub struct AnalysisStore;

impl AnalysisStore {
    /// Load the `(Analysis, MiniSetup)` backing `path`, reusing an
    /// already-decoded copy if one is still alive in this process.
    pub fn load(path: &Path, mappers: &ReadWriteMappers) -> Result<Arc<(Analysis, MiniSetup)>, DriverError> {
        let mut guard = registry().lock().expect("analysis store mutex poisoned");
        if let Some(existing) = guard.get(path).and_then(Weak::upgrade) {
            return Ok(existing);
        }

        let (analysis, mini_setup) = incra_codec::read_analysis_file(path, mappers)?;
        let arc = Arc::new((analysis, mini_setup));
        guard.insert(path.to_path_buf(), Arc::downgrade(&arc));
        Ok(arc)
    }

    /// Drop any cached entry for `path`. Callers invoke this right after
    /// writing a fresh analysis file so a concurrent `load` in this process
    /// never observes the pre-write value through a dangling weak reference.
    pub fn invalidate(path: &Path) {
        registry().lock().expect("analysis store mutex poisoned").remove(path);
    }
}
