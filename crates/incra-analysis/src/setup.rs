use crate::options::CompileOrder;
use std::path::PathBuf;

/// A SHA-256 (or equivalent) content hash of one classpath entry, used to
/// detect classpath changes between runs (§3 MiniOptions).
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FileHash {
    pub file: PathBuf,
    pub hash: String,
}

/// Where class files for one source root land.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OutputGroup {
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
}

/// The compiler's output layout (§3 `Compilation.Output`).
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Output {
    SingleOutput(PathBuf),
    MultipleOutput(Vec<OutputGroup>),
}

/// Options recorded alongside one compile so a later run can tell whether
/// they changed (§3, §6 "Any change to compiler version, options, classpath
/// hash set, or compile order between runs forces treating previous
/// Analysis as empty").
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MiniOptions {
    pub classpath_hash: Vec<FileHash>,
    pub scalac_options: Vec<String>,
    pub javac_options: Vec<String>,
}

/// Persisted alongside `Analysis` (§3). Comparing a freshly-built
/// `MiniSetup` against the previous one is how the driver decides whether to
/// bail to a full rebuild (§6, §8 scenario 6 "Cross-version bail").
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MiniSetup {
    pub output: Output,
    pub options: MiniOptions,
    pub compiler_version: String,
    pub compile_order: CompileOrder,
    pub store_apis: bool,
    pub extra: Vec<(String, String)>,
}

impl MiniSetup {
    /// Whether `self` (the previous run's setup) is still compatible with
    /// `current`. Any mismatch here forces treating the previous `Analysis`
    /// as empty (§6).
    pub fn compatible_with(&self, current: &MiniSetup) -> bool {
        self == current
    }
}

/// A single compiler invocation's bookkeeping (§3).
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Compilation {
    pub start_time_millis: i64,
    pub output: Output,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CompileOrder;

    fn setup(compiler_version: &str) -> MiniSetup {
        MiniSetup {
            output: Output::SingleOutput(PathBuf::from("/out")),
            options: MiniOptions {
                classpath_hash: Vec::new(),
                scalac_options: Vec::new(),
                javac_options: Vec::new(),
            },
            compiler_version: compiler_version.to_string(),
            compile_order: CompileOrder::Mixed,
            store_apis: true,
            extra: Vec::new(),
        }
    }

    #[test]
    fn compiler_version_change_is_incompatible() {
        let old = setup("2.11.7");
        let new = setup("2.12.0");
        assert!(!old.compatible_with(&new));
    }

    #[test]
    fn identical_setup_is_compatible() {
        let a = setup("2.12.0");
        let b = setup("2.12.0");
        assert!(a.compatible_with(&b));
    }
}
