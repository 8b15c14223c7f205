use crate::problem::Problem;

/// Per-source-file bookkeeping (§3).
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SourceInfo {
    pub reported_problems: Vec<Problem>,
    pub unreported_problems: Vec<Problem>,
    pub main_classes: Vec<String>,
}
