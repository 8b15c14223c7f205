use crate::access::Access;
use crate::modifiers::Modifiers;
use crate::ty::Type;

/// Declaration-site variance of a type parameter.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, serde::Serialize, serde::Deserialize)]
pub enum Variance {
    Invariant,
    Covariant,
    Contravariant,
}

/// What kind of member a [`ClassDefinition`] describes.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, serde::Serialize, serde::Deserialize)]
pub enum ClassDefinitionKind {
    Val,
    Var,
    Def,
    TypeAlias,
    TypeParameterMember,
}

/// One member declared or inherited by a class (§3 "Structure's ...
/// declared-defs, inherited-defs"; §9 names `ClassDefinition` as one of the
/// sum types implementers should model idiomatically).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ClassDefinition {
    pub name: String,
    pub kind: ClassDefinitionKind,
    pub tpe: Type,
    pub modifiers: Modifiers,
    pub access: Access,
    pub annotations: Vec<Annotation>,
}

impl PartialEq for ClassDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && self.tpe == other.tpe
            && self.modifiers == other.modifiers
            && self.access == other.access
            && annotations_eq(&self.annotations, &other.annotations)
    }
}

/// A class/member-level annotation. Argument values are kept as their
/// rendered source text rather than a full constant-expression AST, since
/// the upstream parser/typer (out of scope here, §1) is the only thing that
/// could meaningfully type-check annotation arguments.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, serde::Serialize, serde::Deserialize)]
pub struct Annotation {
    pub name: String,
    pub arguments: Vec<(String, String)>,
}

/// Compare two annotation lists ignoring order (§4.3: "Equality on ClassLike
/// is structural up to ordering of annotations (unordered)").
pub fn annotations_eq(a: &[Annotation], b: &[Annotation]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a_sorted = a.to_vec();
    let mut b_sorted = b.to_vec();
    a_sorted.sort();
    b_sorted.sort();
    a_sorted == b_sorted
}
