use crate::definition::{Annotation, ClassDefinition};
use crate::lazy::Lazy;
use crate::ty::{ClassLike, Type};
use incra_relation::UseScope;
use std::collections::BTreeMap;

/// A class plus its companion object's API, if any (the Scala-flavored
/// "companions" pairing named by §3's `api: Lazy<Companions>`).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Companions {
    pub class_api: Option<ClassLike>,
    pub object_api: Option<ClassLike>,
}

impl Companions {
    pub fn class_only(class_api: ClassLike) -> Self {
        Self {
            class_api: Some(class_api),
            object_api: None,
        }
    }
}

/// A hashed name reference, the unit of pruning in §4.5 stage 3 step 1.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct NameHash {
    pub name: String,
    pub scope: UseScope,
    pub hash: i32,
}

/// The summarized API of one class (§3).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnalyzedClass {
    pub compilation_timestamp: i64,
    pub name: String,
    pub api: Lazy<Companions>,
    pub api_hash: i64,
    pub name_hashes: Vec<NameHash>,
    pub has_macro: bool,
}

impl AnalyzedClass {
    /// Build an `AnalyzedClass` from a freshly-produced `Companions`,
    /// computing `api_hash` and `name_hashes` eagerly (the common case: a
    /// class callback just arrived from the compiler and both summaries are
    /// about to be compared).
    pub fn from_companions(
        compilation_timestamp: i64,
        name: impl Into<String>,
        companions: Companions,
        has_macro: bool,
    ) -> Self {
        let api_hash = compute_api_hash(&companions);
        let name_hashes = compute_name_hashes(&companions);
        Self {
            compilation_timestamp,
            name: name.into(),
            api: Lazy::forced(companions),
            api_hash,
            name_hashes,
            has_macro,
        }
    }
}

/// `internal`/`external` API maps (§3). External entries describe classes
/// compiled outside this module but depended upon.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Apis {
    pub internal: BTreeMap<String, AnalyzedClass>,
    pub external: BTreeMap<String, AnalyzedClass>,
}

/// Deterministic 64-bit hash of a canonical `ClassLike` serialization (§4.3).
///
/// "Canonical" here means annotations (which compare unordered, §4.3) are
/// sorted before hashing, so two `Companions` that are `PartialEq`-equal
/// always hash the same way regardless of annotation emission order.
pub fn compute_api_hash(companions: &Companions) -> i64 {
    let canonical = Companions {
        class_api: companions.class_api.as_ref().map(canonical_class),
        object_api: companions.object_api.as_ref().map(canonical_class),
    };
    let bytes = bincode::serialize(&canonical).expect("Companions is always serializable");
    xxhash(&bytes) as i64
}

/// Enumerate one [`NameHash`] per simple name referenced or defined at the
/// class surface, per `UseScope` (§4.3).
///
/// Declared and inherited member names are reported in `UseScope::Default`,
/// hashed together with their (canonicalized) type so a signature change
/// changes the hash without touching the name. Annotation names are
/// reported in `UseScope::Implicit`, hashed together with their arguments.
/// `UseScope::PatternMatchTarget` is left to callers that can observe
/// pattern-match sites directly (out of scope here: no parser/typer, §1).
pub fn compute_name_hashes(companions: &Companions) -> Vec<NameHash> {
    let mut out = Vec::new();
    for class in [&companions.class_api, &companions.object_api]
        .into_iter()
        .flatten()
    {
        collect_name_hashes(class, &mut out);
    }
    out.sort_by(|a, b| (a.name.as_str(), a.scope).cmp(&(b.name.as_str(), b.scope)));
    out.dedup();
    out
}

fn collect_name_hashes(class: &ClassLike, out: &mut Vec<NameHash>) {
    let declared = class.structure.declared.force();
    let inherited = class.structure.inherited.force();
    for def in declared.iter().chain(inherited.iter()) {
        out.push(name_hash_for_def(def));
    }
    for annotation in &class.annotations {
        out.push(name_hash_for_annotation(annotation));
    }
}

fn name_hash_for_def(def: &ClassDefinition) -> NameHash {
    let bytes = bincode::serialize(&canonical_type(&def.tpe)).unwrap_or_default();
    NameHash {
        name: def.name.clone(),
        scope: UseScope::Default,
        hash: xxhash(&bytes) as i32,
    }
}

fn name_hash_for_annotation(annotation: &Annotation) -> NameHash {
    let bytes = bincode::serialize(annotation).unwrap_or_default();
    NameHash {
        name: annotation.name.clone(),
        scope: UseScope::Implicit,
        hash: xxhash(&bytes) as i32,
    }
}

fn xxhash(bytes: &[u8]) -> u64 {
    use twox_hash::XxHash64;
    use std::hash::Hasher;
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(bytes);
    hasher.finish()
}

fn canonical_class(class: &ClassLike) -> ClassLike {
    let mut annotations = class.annotations.clone();
    annotations.sort();
    let mut children_of_sealed = class.children_of_sealed.clone();
    children_of_sealed.sort();
    ClassLike {
        name: class.name.clone(),
        access: class.access.clone(),
        modifiers: class.modifiers,
        annotations,
        definition_type: class.definition_type,
        self_type: canonical_type(&class.self_type),
        structure: canonical_structure(&class.structure),
        type_parameters: class.type_parameters.clone(),
        children_of_sealed,
        top_level: class.top_level,
    }
}

fn canonical_structure(structure: &crate::ty::Structure) -> crate::ty::Structure {
    let parents = structure.parents.force().iter().map(canonical_type).collect();
    let mut declared: Vec<ClassDefinition> = structure.declared.force().iter().map(canonical_def).collect();
    declared.sort_by(|a, b| a.name.cmp(&b.name));
    let mut inherited: Vec<ClassDefinition> = structure.inherited.force().iter().map(canonical_def).collect();
    inherited.sort_by(|a, b| a.name.cmp(&b.name));
    crate::ty::Structure::forced(parents, declared, inherited)
}

fn canonical_def(def: &ClassDefinition) -> ClassDefinition {
    let mut annotations = def.annotations.clone();
    annotations.sort();
    ClassDefinition {
        name: def.name.clone(),
        kind: def.kind.clone(),
        tpe: canonical_type(&def.tpe),
        modifiers: def.modifiers,
        access: def.access.clone(),
        annotations,
    }
}

fn canonical_type(ty: &Type) -> Type {
    match ty {
        Type::Annotated(annotations, inner) => {
            let mut annotations = annotations.clone();
            annotations.sort();
            Type::Annotated(annotations, Box::new(canonical_type(inner)))
        }
        Type::Parameterized(base, args) => Type::Parameterized(
            Box::new(canonical_type(base)),
            args.iter().map(canonical_type).collect(),
        ),
        Type::Polymorphic(params, inner) => {
            Type::Polymorphic(params.clone(), Box::new(canonical_type(inner)))
        }
        Type::Existential(params, inner) => {
            Type::Existential(params.clone(), Box::new(canonical_type(inner)))
        }
        Type::Projection(inner, name) => {
            Type::Projection(Box::new(canonical_type(inner)), name.clone())
        }
        Type::Constant(inner, literal) => {
            Type::Constant(Box::new(canonical_type(inner)), literal.clone())
        }
        Type::Structure(structure) => Type::Structure(canonical_structure(structure)),
        Type::ParameterRef(_) | Type::Singleton(_) | Type::Empty => ty.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Access;
    use crate::definition::ClassDefinitionKind;
    use crate::modifiers::Modifiers;
    use crate::ty::{DefinitionType, Structure};

    fn class_with_method(name: &str, return_type: Type) -> ClassLike {
        ClassLike {
            name: name.to_string(),
            access: Access::Public,
            modifiers: Modifiers::NONE,
            annotations: Vec::new(),
            definition_type: DefinitionType::ClassDef,
            self_type: Type::Singleton(name.to_string()),
            structure: Structure::forced(
                Vec::new(),
                vec![ClassDefinition {
                    name: "foo".to_string(),
                    kind: ClassDefinitionKind::Def,
                    tpe: return_type,
                    modifiers: Modifiers::NONE,
                    access: Access::Public,
                    annotations: Vec::new(),
                }],
                Vec::new(),
            ),
            type_parameters: Vec::new(),
            children_of_sealed: Vec::new(),
            top_level: true,
        }
    }

    #[test]
    fn api_hash_matches_for_equal_companions() {
        let a = Companions::class_only(class_with_method("P", Type::Singleton("Int".into())));
        let b = Companions::class_only(class_with_method("P", Type::Singleton("Int".into())));
        assert_eq!(compute_api_hash(&a), compute_api_hash(&b));
    }

    #[test]
    fn api_hash_changes_with_signature() {
        let a = Companions::class_only(class_with_method("P", Type::Singleton("Int".into())));
        let b = Companions::class_only(class_with_method("P", Type::Singleton("Long".into())));
        assert_ne!(compute_api_hash(&a), compute_api_hash(&b));
    }

    #[test]
    fn name_hash_changes_with_signature_but_not_name() {
        let a = Companions::class_only(class_with_method("P", Type::Singleton("Int".into())));
        let b = Companions::class_only(class_with_method("P", Type::Singleton("Long".into())));
        let hashes_a = compute_name_hashes(&a);
        let hashes_b = compute_name_hashes(&b);
        assert_eq!(hashes_a.len(), 1);
        assert_eq!(hashes_a[0].name, "foo");
        assert_ne!(hashes_a[0].hash, hashes_b[0].hash);
    }

    #[test]
    fn annotation_order_does_not_change_api_hash() {
        let mut class_a = class_with_method("P", Type::Singleton("Int".into()));
        class_a.annotations = vec![
            Annotation { name: "A".into(), arguments: vec![] },
            Annotation { name: "B".into(), arguments: vec![] },
        ];
        let mut class_b = class_with_method("P", Type::Singleton("Int".into()));
        class_b.annotations = vec![
            Annotation { name: "B".into(), arguments: vec![] },
            Annotation { name: "A".into(), arguments: vec![] },
        ];
        assert_eq!(
            compute_api_hash(&Companions::class_only(class_a)),
            compute_api_hash(&Companions::class_only(class_b))
        );
    }
}
