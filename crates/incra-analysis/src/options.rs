/// Order in which Java and Scala (L_J/L_S) sources are compiled within one
/// step (§3, §6).
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum CompileOrder {
    Mixed,
    JavaThenScala,
    ScalaThenJava,
}

/// Construction-time validation error for [`IncOptions`].
///
/// The distilled spec leaves `recompileAllFraction: f64 in [0,1]` as a bare
/// field (§6); SPEC_FULL.md resolves the implied "what if it's out of
/// range?" open question by rejecting construction rather than silently
/// clamping or panicking deep inside the fraction-gate check.
#[derive(Debug, thiserror::Error)]
pub enum IncOptionsError {
    #[error("recompile_all_fraction must be within [0, 1], got {0}")]
    FractionOutOfRange(f64),
}

/// Caller-supplied configuration (§6).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IncOptions {
    pub recompile_all_fraction: f64,
    pub transitive_step: u32,
    pub name_hashing: bool,
    pub store_apis: bool,
    pub compile_order: CompileOrder,
    pub extra: Vec<(String, String)>,
}

impl IncOptions {
    pub fn new(recompile_all_fraction: f64) -> Result<Self, IncOptionsError> {
        if !(0.0..=1.0).contains(&recompile_all_fraction) {
            return Err(IncOptionsError::FractionOutOfRange(recompile_all_fraction));
        }
        Ok(Self {
            recompile_all_fraction,
            transitive_step: 3,
            name_hashing: true,
            store_apis: true,
            compile_order: CompileOrder::Mixed,
            extra: Vec::new(),
        })
    }
}

impl Default for IncOptions {
    fn default() -> Self {
        Self::new(0.5).expect("0.5 is within [0, 1]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_spec_default_fraction() {
        assert_eq!(IncOptions::default().recompile_all_fraction, 0.5);
    }

    #[test]
    fn out_of_range_fraction_is_rejected() {
        assert!(IncOptions::new(1.5).is_err());
        assert!(IncOptions::new(-0.1).is_err());
    }

    #[test]
    fn boundary_fractions_are_accepted() {
        assert!(IncOptions::new(0.0).is_ok());
        assert!(IncOptions::new(1.0).is_ok());
    }
}
