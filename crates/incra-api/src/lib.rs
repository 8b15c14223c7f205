//! Component C3: the structural API model.
//!
//! This is pure data — a recursive algebraic description of a class/module
//! surface (§3) — plus the two operations that turn it into the compact
//! summary the invalidation engine actually works with: [`compute_api_hash`]
//! and [`compute_name_hashes`].

mod access;
mod analyzed_class;
mod definition;
mod lazy;
mod modifiers;
mod ty;

pub use access::{Access, Qualifier};
pub use analyzed_class::{compute_api_hash, compute_name_hashes, AnalyzedClass, Apis, Companions, NameHash};
pub use definition::{Annotation, ClassDefinition, ClassDefinitionKind, Variance};
pub use lazy::Lazy;
pub use modifiers::Modifiers;
pub use ty::{ClassLike, DefinitionType, Structure, Type, TypeParameter};

pub use incra_relation::UseScope;
