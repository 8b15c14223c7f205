/// Position of a problem within a source file.
///
/// On the wire (§4.6, §9 "Missing-field sentinels") an absent `line`/`offset`
/// is encoded as `i32::MIN` and an absent `path`/`pointer_space` as `""`; in
/// memory we use `Option` instead and let the codec translate at the
/// boundary, matching §9's "the spec treats that as DecodeError"-adjacent
/// philosophy of keeping sentinel encoding out of core logic.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub line: Option<u32>,
    pub offset: Option<u32>,
    pub pointer: Option<u32>,
}

impl Position {
    pub const NONE: Position = Position { line: None, offset: None, pointer: None };
}

/// Severity of a reported problem. Not named explicitly in the distilled
/// spec's `Problem` mention, but every compiler diagnostic in practice
/// carries one (§2 SPEC_FULL supplement).
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

/// A single diagnostic emitted by the external compiler via the `problem`
/// callback event (§4.7).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Problem {
    pub category: String,
    pub message: String,
    pub severity: Severity,
    pub position: Option<Position>,
}
