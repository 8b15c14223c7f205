use crate::access::Access;
use crate::definition::{annotations_eq, Annotation, ClassDefinition, Variance};
use crate::lazy::Lazy;
use crate::modifiers::Modifiers;

/// A type parameter binder, e.g. `<T extends Comparable<T>>`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TypeParameter {
    pub name: String,
    pub variance: Variance,
    pub bounds: Vec<Type>,
}

/// `parents`/`declared`/`inherited` are lazy (§5, §4.6): most stored APIs are
/// never fully walked, so forcing is deferred to the first differ/consumer
/// that actually needs the member lists.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Structure {
    pub parents: Lazy<Vec<Type>>,
    pub declared: Lazy<Vec<ClassDefinition>>,
    pub inherited: Lazy<Vec<ClassDefinition>>,
}

impl Structure {
    pub fn forced(parents: Vec<Type>, declared: Vec<ClassDefinition>, inherited: Vec<ClassDefinition>) -> Self {
        Self {
            parents: Lazy::forced(parents),
            declared: Lazy::forced(declared),
            inherited: Lazy::forced(inherited),
        }
    }
}

/// What kind of top-level definition a [`ClassLike`] is.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, serde::Serialize, serde::Deserialize)]
pub enum DefinitionType {
    ClassDef,
    Module,
    Trait,
    PackageModule,
}

/// A type, as a tagged sum rather than an inheritance hierarchy (§9).
///
/// Class references inside a `Type` are always by name (`Singleton`,
/// `ParameterRef`), never by pointer into another `ClassLike` — the graph is
/// navigated only through the `Apis` mapping, which is what keeps the
/// in-memory model acyclic (§9 "Cyclic class graphs").
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Type {
    ParameterRef(String),
    Parameterized(Box<Type>, Vec<Type>),
    Structure(Structure),
    Polymorphic(Vec<TypeParameter>, Box<Type>),
    Constant(Box<Type>, String),
    Existential(Vec<TypeParameter>, Box<Type>),
    Singleton(String),
    Projection(Box<Type>, String),
    Annotated(Vec<Annotation>, Box<Type>),
    Empty,
}

/// Structural description of one class/module (§3).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ClassLike {
    pub name: String,
    pub access: Access,
    pub modifiers: Modifiers,
    pub annotations: Vec<Annotation>,
    pub definition_type: DefinitionType,
    pub self_type: Type,
    pub structure: Structure,
    pub type_parameters: Vec<TypeParameter>,
    pub children_of_sealed: Vec<String>,
    pub top_level: bool,
}

impl PartialEq for ClassLike {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.access == other.access
            && self.modifiers == other.modifiers
            && annotations_eq(&self.annotations, &other.annotations)
            && self.definition_type == other.definition_type
            && self.self_type == other.self_type
            && self.structure == other.structure
            && self.type_parameters == other.type_parameters
            && self.children_of_sealed == other.children_of_sealed
            && self.top_level == other.top_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Qualifier;

    fn empty_structure() -> Structure {
        Structure::forced(Vec::new(), Vec::new(), Vec::new())
    }

    fn base_class(name: &str) -> ClassLike {
        ClassLike {
            name: name.to_string(),
            access: Access::Public,
            modifiers: Modifiers::NONE,
            annotations: Vec::new(),
            definition_type: DefinitionType::ClassDef,
            self_type: Type::Singleton(name.to_string()),
            structure: empty_structure(),
            type_parameters: Vec::new(),
            children_of_sealed: Vec::new(),
            top_level: true,
        }
    }

    #[test]
    fn annotation_order_does_not_affect_equality() {
        let mut a = base_class("P");
        a.annotations = vec![
            Annotation { name: "A".into(), arguments: vec![] },
            Annotation { name: "B".into(), arguments: vec![] },
        ];
        let mut b = base_class("P");
        b.annotations = vec![
            Annotation { name: "B".into(), arguments: vec![] },
            Annotation { name: "A".into(), arguments: vec![] },
        ];
        assert_eq!(a, b);
    }

    #[test]
    fn access_qualifier_is_structural() {
        let a = Access::Protected(Qualifier::Id("pkg".into()));
        let b = Access::Protected(Qualifier::Id("pkg".into()));
        assert_eq!(a, b);
        assert_ne!(a, Access::Protected(Qualifier::This));
    }
}
