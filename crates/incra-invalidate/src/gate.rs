use incra_core::File;
use incra_relation::Relations;
use std::collections::BTreeSet;

/// What the invalidation engine decided to hand the driver's `CompileStep`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Invalidation {
    /// The fraction gate tripped: recompile every known source.
    AllSources(BTreeSet<File>),
    /// Recompile exactly the sources that declare an invalid class.
    Sources(BTreeSet<File>),
}

impl Invalidation {
    pub fn sources(&self) -> &BTreeSet<File> {
        match self {
            Invalidation::AllSources(sources) | Invalidation::Sources(sources) => sources,
        }
    }

    pub fn is_all_sources(&self) -> bool {
        matches!(self, Invalidation::AllSources(_))
    }
}

/// Fraction gate (§4.5): `|I| / |totalClasses| >= recompileAllFraction`.
///
/// A module with no known classes never trips the gate — there is nothing to
/// declare dirty.
pub fn fraction_gate(invalid_classes: &BTreeSet<String>, total_classes: usize, recompile_all_fraction: f64) -> bool {
    if total_classes == 0 {
        return false;
    }
    (invalid_classes.len() as f64) / (total_classes as f64) >= recompile_all_fraction
}

/// Map a set of invalid class names back to the sources that declare them,
/// via the `classes` relation.
pub fn invalid_sources(relations: &Relations, invalid_classes: &BTreeSet<String>) -> BTreeSet<File> {
    relations
        .classes
        .forward()
        .iter()
        .filter(|(_, names)| names.iter().any(|name| invalid_classes.contains(name)))
        .map(|(source, _)| source.clone())
        .collect()
}

/// Apply the fraction gate and resolve the final invalidation decision.
pub fn resolve_invalidation(
    relations: &Relations,
    invalid_classes: &BTreeSet<String>,
    all_sources: &BTreeSet<File>,
    recompile_all_fraction: f64,
) -> Invalidation {
    let total_classes = relations.classes.reverse().len();
    if fraction_gate(invalid_classes, total_classes, recompile_all_fraction) {
        tracing::info!(
            target: "incra::invalidate",
            invalid = invalid_classes.len(),
            total = total_classes,
            "fraction gate tripped, declaring module dirty"
        );
        Invalidation::AllSources(all_sources.clone())
    } else {
        Invalidation::Sources(invalid_sources(relations, invalid_classes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(p: &str) -> File {
        File::from_canonical(p).unwrap()
    }

    #[test]
    fn empty_module_never_trips_the_gate() {
        assert!(!fraction_gate(&BTreeSet::new(), 0, 0.0));
    }

    #[test]
    fn gate_trips_at_the_threshold() {
        let invalid = BTreeSet::from(["A".to_string(), "B".to_string()]);
        assert!(fraction_gate(&invalid, 4, 0.5));
        assert!(!fraction_gate(&invalid, 5, 0.5));
    }

    #[test]
    fn invalid_sources_maps_class_names_back_to_declaring_files() {
        let mut relations = Relations::new();
        relations.classes.add(file("/a/Foo.java"), "Foo".to_string());
        relations.classes.add(file("/a/Bar.java"), "Bar".to_string());

        let invalid = BTreeSet::from(["Foo".to_string()]);
        let sources = invalid_sources(&relations, &invalid);
        assert_eq!(sources, BTreeSet::from([file("/a/Foo.java")]));
    }

    #[test]
    fn resolve_invalidation_falls_back_to_all_sources_past_the_fraction() {
        let mut relations = Relations::new();
        relations.classes.add(file("/a/Foo.java"), "Foo".to_string());
        relations.classes.add(file("/a/Bar.java"), "Bar".to_string());
        let all_sources = BTreeSet::from([file("/a/Foo.java"), file("/a/Bar.java")]);
        let invalid = BTreeSet::from(["Foo".to_string(), "Bar".to_string()]);

        let decision = resolve_invalidation(&relations, &invalid, &all_sources, 0.5);
        assert!(decision.is_all_sources());
        assert_eq!(decision.sources(), &all_sources);
    }

    #[test]
    fn resolve_invalidation_stays_targeted_below_the_fraction() {
        let mut relations = Relations::new();
        relations.classes.add(file("/a/Foo.java"), "Foo".to_string());
        relations.classes.add(file("/a/Bar.java"), "Bar".to_string());
        relations.classes.add(file("/a/Baz.java"), "Baz".to_string());
        let all_sources = BTreeSet::from([file("/a/Foo.java"), file("/a/Bar.java"), file("/a/Baz.java")]);
        let invalid = BTreeSet::from(["Foo".to_string()]);

        let decision = resolve_invalidation(&relations, &invalid, &all_sources, 0.5);
        assert!(!decision.is_all_sources());
        assert_eq!(decision.sources(), &BTreeSet::from([file("/a/Foo.java")]));
    }
}
