use crate::error::CodecError;

/// Wire schema version (§4.6). `AnalysisFile`/`APIsFile` both lead with this
/// (as a raw `u32`, not a typed enum) so a reader built against an older copy
/// of this crate can still recognize and reject a file written by a newer,
/// incompatible schema rather than failing to decode the enum at all.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Version(u32);

impl Version {
    pub const CURRENT: Version = Version(1);

    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub fn from_u32(raw: u32) -> Version {
        Version(raw)
    }

    pub fn check_current(self) -> Result<(), CodecError> {
        if self != Self::CURRENT {
            return Err(CodecError::UnsupportedVersion {
                expected: Self::CURRENT.as_u32(),
                found: self.as_u32(),
            });
        }
        Ok(())
    }
}
