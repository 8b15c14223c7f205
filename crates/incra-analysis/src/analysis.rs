use crate::source_info::SourceInfo;
use incra_api::Apis;
use incra_core::File;
use incra_relation::Relations;
use std::collections::BTreeMap;

/// The persisted record tying sources, products, class names, APIs, and
/// inter-class dependencies for one compile unit (§3).
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Analysis {
    pub stamps: incra_core::Stamps,
    pub relations: Relations,
    pub apis: Apis,
    pub source_infos: BTreeMap<File, SourceInfo>,
    pub compilations: Vec<crate::setup::Compilation>,
}

impl Analysis {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Coverage invariant (§8): every key of `classes.forward` is a key of
    /// `apis.internal`; every value of
    /// `memberRef.external ∪ inheritance.external ∪ localInheritance.external`
    /// is a key of `apis.external`.
    pub fn check_coverage_invariant(&self) -> bool {
        for name in self.relations.classes.forward().values().flatten() {
            if !self.apis.internal.contains_key(name) {
                return false;
            }
        }

        let external_refs = self
            .relations
            .member_ref_external
            .forward()
            .values()
            .flatten()
            .chain(self.relations.inheritance_external.forward().values().flatten())
            .chain(self.relations.local_inheritance_external.forward().values().flatten());

        for name in external_refs {
            if !self.apis.external.contains_key(name) {
                return false;
            }
        }

        true
    }

    /// Remove every trace of a deleted/recompiled source from the analysis
    /// before new callback data for it is merged in (§3 "Lifecycle", §4.5
    /// "Deleting a source").
    pub fn forget_source(&mut self, source: &File) {
        let class_names: Vec<String> = self.relations.classes_in(source).cloned().collect();
        self.relations.remove_source(source);
        self.stamps.remove(source);
        self.source_infos.remove(source);
        for name in class_names {
            self.apis.internal.remove(&name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_analysis_satisfies_coverage_invariant() {
        assert!(Analysis::empty().check_coverage_invariant());
    }

    #[test]
    fn forget_source_drops_stamps_and_apis() {
        use incra_api::{AnalyzedClass, Companions};

        let mut analysis = Analysis::empty();
        let file = File::from_canonical("/a/Foo.java").unwrap();
        analysis.stamps.sources.insert(file.clone(), incra_core::Stamp::Empty);
        analysis.relations.classes.add(file.clone(), "Foo".to_string());
        analysis.apis.internal.insert(
            "Foo".to_string(),
            AnalyzedClass::from_companions(0, "Foo", Companions { class_api: None, object_api: None }, false),
        );

        analysis.forget_source(&file);

        assert!(!analysis.stamps.sources.contains_key(&file));
        assert!(!analysis.apis.internal.contains_key("Foo"));
        assert!(analysis.check_coverage_invariant());
    }
}
