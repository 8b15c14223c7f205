/// The qualifier on a `protected`/`private` member (§3).
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, serde::Serialize, serde::Deserialize)]
pub enum Qualifier {
    This,
    Id(String),
    Unqualified,
}

/// Member/class visibility, as a tagged sum type rather than an inheritance
/// hierarchy (§9 "Sum types").
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, serde::Serialize, serde::Deserialize)]
pub enum Access {
    Public,
    Protected(Qualifier),
    Private(Qualifier),
}
