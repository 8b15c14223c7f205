//! The callback contract a `Compiler` implementation streams events through
//! during `CompileStep` (§4.7), and [`CallbackRecorder`], the driver's own
//! implementation that turns those events into a merge-ready batch.

use crate::error::DriverError;
use incra_analysis::{Output, Problem, SourceInfo};
use incra_api::{AnalyzedClass, ClassLike, Companions, DefinitionType};
use incra_core::File;
use incra_relation::{Relations, UsedName, UseScope};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

fn output_roots(output: &Output) -> Vec<PathBuf> {
    match output {
        Output::SingleOutput(root) => vec![root.clone()],
        Output::MultipleOutput(groups) => groups.iter().map(|g| g.target_dir.clone()).collect(),
    }
}

/// The graph edge a `classDependency`/`binaryDependency` event reports (§4.7).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DependencyContext {
    MemberRef,
    Inheritance,
    LocalInheritance,
}

/// Callback interface consumed from an external compiler (§4.7, §6).
///
/// Implementations must be re-entrant across different sources but not
/// across threads for one source (§6) — the driver never calls these
/// concurrently, so a `&mut self` receiver is enough.
pub trait AnalysisCallback {
    fn start_source(&mut self, source: File);

    fn class_dependency(&mut self, on_class_name: &str, from_class_name: &str, context: DependencyContext);

    fn binary_dependency(
        &mut self,
        binary_file: File,
        binary_class_name: &str,
        from_class_name: &str,
        context: DependencyContext,
    );

    fn generated_local_class(&mut self, source: File, class_file: File);

    fn generated_non_local_class(&mut self, source: File, class_file: File, class_name: &str);

    fn api(&mut self, source: File, class: ClassLike);

    fn used_name(&mut self, class_name: &str, name: &str, scopes: Vec<UseScope>);

    fn problem(&mut self, source: File, problem: Problem, reported: bool);
}

/// The result of one `CompileStep`, ready to be merged into a working
/// `Analysis` (§4.7 "Merge").
#[derive(Clone, Debug, Default)]
pub struct CompiledBatch {
    pub relations: Relations,
    pub classes: BTreeMap<String, AnalyzedClass>,
    pub source_infos: BTreeMap<File, SourceInfo>,
    pub products: BTreeSet<File>,
}

/// The driver's own `AnalysisCallback`, accumulating one `CompileStep`'s
/// events into a [`CompiledBatch`] (§4.7).
///
/// `internal_class_names` classifies a `classDependency`/`binaryDependency`
/// event as internal vs. external (§4.7: "internal or external inferred by
/// whether `onClassName` is present in the current module") — the driver
/// passes in the union of the previous analysis's known classes and
/// everything merged from earlier rounds of this same run.
pub struct CallbackRecorder<'a> {
    registered_sources: BTreeSet<File>,
    internal_class_names: &'a BTreeSet<String>,
    /// Classes declared via `api()` earlier in this same round. A
    /// `classDependency` between two classes compiled together for the first
    /// time (neither known to `internal_class_names`, which only covers
    /// classes the module already knew about before this round) is still
    /// "present in the current module" per the callback contract — it just
    /// hasn't been merged into the working analysis yet.
    declared_this_round: BTreeSet<String>,
    output_roots: Vec<PathBuf>,
    source_of_class: BTreeMap<String, File>,
    companions: BTreeMap<String, Companions>,
    timestamp: i64,
    batch: CompiledBatch,
    violation: Option<DriverError>,
}

impl<'a> CallbackRecorder<'a> {
    pub fn new(timestamp: i64, internal_class_names: &'a BTreeSet<String>, output: &Output) -> Self {
        Self {
            registered_sources: BTreeSet::new(),
            internal_class_names,
            declared_this_round: BTreeSet::new(),
            output_roots: output_roots(output),
            source_of_class: BTreeMap::new(),
            companions: BTreeMap::new(),
            timestamp,
            batch: CompiledBatch::default(),
            violation: None,
        }
    }

    fn is_internal(&self, class_name: &str) -> bool {
        self.internal_class_names.contains(class_name) || self.declared_this_round.contains(class_name)
    }

    fn require_registered(&mut self, source: &File) {
        if self.violation.is_none() && !self.registered_sources.contains(source) {
            self.violation = Some(DriverError::CallbackViolation { source: source.clone() });
        }
    }

    fn require_in_output(&mut self, class_file: &File) {
        if self.violation.is_some() {
            return;
        }
        let in_output = self.output_roots.iter().any(|root| class_file.as_path().starts_with(root));
        if !in_output {
            self.violation = Some(DriverError::OutputViolation { class_file: class_file.clone() });
        }
    }

    /// Consume the recorder, finalizing every accumulated `Companions` into
    /// an `AnalyzedClass` (§3 "Lazy" wraps the freshly-built companions as
    /// already-forced, since they were just computed).
    pub fn finish(mut self) -> Result<CompiledBatch, DriverError> {
        if let Some(violation) = self.violation.take() {
            return Err(violation);
        }
        for (name, companions) in self.companions {
            let has_macro = companions
                .class_api
                .as_ref()
                .map(|c| c.modifiers.contains(incra_api::Modifiers::MACRO))
                .unwrap_or(false);
            let class = AnalyzedClass::from_companions(self.timestamp, name.clone(), companions, has_macro);
            self.batch.classes.insert(name, class);
        }
        Ok(self.batch)
    }
}

impl<'a> AnalysisCallback for CallbackRecorder<'a> {
    fn start_source(&mut self, source: File) {
        self.registered_sources.insert(source.clone());
        self.batch.source_infos.entry(source).or_insert_with(SourceInfo::default);
    }

    fn class_dependency(&mut self, on_class_name: &str, from_class_name: &str, context: DependencyContext) {
        let relation = if self.is_internal(on_class_name) {
            match context {
                DependencyContext::MemberRef => &mut self.batch.relations.member_ref_internal,
                DependencyContext::Inheritance => &mut self.batch.relations.inheritance_internal,
                DependencyContext::LocalInheritance => &mut self.batch.relations.local_inheritance_internal,
            }
        } else {
            match context {
                DependencyContext::MemberRef => &mut self.batch.relations.member_ref_external,
                DependencyContext::Inheritance => &mut self.batch.relations.inheritance_external,
                DependencyContext::LocalInheritance => &mut self.batch.relations.local_inheritance_external,
            }
        };
        relation.add(from_class_name.to_string(), on_class_name.to_string());
    }

    fn binary_dependency(
        &mut self,
        binary_file: File,
        binary_class_name: &str,
        from_class_name: &str,
        context: DependencyContext,
    ) {
        if let Some(source) = self.source_of_class.get(from_class_name) {
            self.batch.relations.library_dep.add(source.clone(), binary_file.clone());
        }
        self.batch.relations.library_class_name.add(binary_file, binary_class_name.to_string());
        let relation = match context {
            DependencyContext::MemberRef => &mut self.batch.relations.member_ref_external,
            DependencyContext::Inheritance => &mut self.batch.relations.inheritance_external,
            DependencyContext::LocalInheritance => &mut self.batch.relations.local_inheritance_external,
        };
        relation.add(from_class_name.to_string(), binary_class_name.to_string());
    }

    fn generated_local_class(&mut self, source: File, class_file: File) {
        self.require_registered(&source);
        self.require_in_output(&class_file);
        self.batch.relations.src_prod.add(source, class_file.clone());
        self.batch.products.insert(class_file);
    }

    fn generated_non_local_class(&mut self, source: File, class_file: File, class_name: &str) {
        self.require_registered(&source);
        self.require_in_output(&class_file);
        self.batch.relations.src_prod.add(source.clone(), class_file.clone());
        self.batch.relations.classes.add(source, class_name.to_string());
        self.batch.relations.product_class_name.add(class_name.to_string(), class_name.to_string());
        self.batch.products.insert(class_file);
    }

    fn api(&mut self, source: File, class: ClassLike) {
        self.require_registered(&source);
        self.source_of_class.insert(class.name.clone(), source.clone());
        self.declared_this_round.insert(class.name.clone());
        self.batch.relations.classes.add(source, class.name.clone());
        let entry = self.companions.entry(class.name.clone()).or_insert_with(|| Companions {
            class_api: None,
            object_api: None,
        });
        match class.definition_type {
            DefinitionType::Module => entry.object_api = Some(class),
            DefinitionType::ClassDef | DefinitionType::Trait | DefinitionType::PackageModule => {
                entry.class_api = Some(class)
            }
        }
    }

    fn used_name(&mut self, class_name: &str, name: &str, scopes: Vec<UseScope>) {
        self.batch.relations.add_used_name(class_name, UsedName::new(name, scopes));
    }

    fn problem(&mut self, source: File, problem: Problem, reported: bool) {
        let info = self.batch.source_infos.entry(source).or_insert_with(SourceInfo::default);
        if reported {
            info.reported_problems.push(problem);
        } else {
            info.unreported_problems.push(problem);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use incra_api::{Access, Modifiers, Structure, Type};
    use std::path::PathBuf;

    fn output() -> Output {
        Output::SingleOutput(PathBuf::from("/out"))
    }

    fn class(name: &str) -> ClassLike {
        ClassLike {
            name: name.to_string(),
            access: Access::Public,
            modifiers: Modifiers::NONE,
            annotations: Vec::new(),
            definition_type: DefinitionType::ClassDef,
            self_type: Type::Singleton(name.to_string()),
            structure: Structure::forced(Vec::new(), Vec::new(), Vec::new()),
            type_parameters: Vec::new(),
            children_of_sealed: Vec::new(),
            top_level: true,
        }
    }

    #[test]
    fn api_event_for_unregistered_source_is_a_violation() {
        let internal = BTreeSet::new();
        let mut recorder = CallbackRecorder::new(0, &internal, &output());
        let source = File::from_canonical("/a/Foo.java").unwrap();
        recorder.api(source, class("Foo"));
        let err = recorder.finish().unwrap_err();
        assert!(matches!(err, DriverError::CallbackViolation { .. }));
    }

    #[test]
    fn registered_source_produces_an_analyzed_class() {
        let internal = BTreeSet::new();
        let mut recorder = CallbackRecorder::new(0, &internal, &output());
        let source = File::from_canonical("/a/Foo.java").unwrap();
        recorder.start_source(source.clone());
        recorder.api(source, class("Foo"));
        let batch = recorder.finish().unwrap();
        assert!(batch.classes.contains_key("Foo"));
    }

    #[test]
    fn class_dependency_is_classified_by_internal_set() {
        let internal = BTreeSet::from(["Base".to_string()]);
        let mut recorder = CallbackRecorder::new(0, &internal, &output());
        let source = File::from_canonical("/a/Dep.java").unwrap();
        recorder.start_source(source.clone());
        recorder.api(source, class("Dep"));
        recorder.class_dependency("Base", "Dep", DependencyContext::MemberRef);
        recorder.class_dependency("lib.External", "Dep", DependencyContext::MemberRef);
        let batch = recorder.finish().unwrap();
        assert!(batch.relations.member_ref_internal.forward_for(&"Dep".to_string()).any(|n| n == "Base"));
        assert!(batch
            .relations
            .member_ref_external
            .forward_for(&"Dep".to_string())
            .any(|n| n == "lib.External"));
    }
}
