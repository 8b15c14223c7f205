//! The on-wire mirror of `incra_api`'s `Apis` tree.
//!
//! Two things make this distinct from just `bincode::serialize(&Apis)`:
//!
//! - Class names are interned into a shared table (§4.6): `WireAnalyzedClass`
//!   and `WireClassLike` carry a `u32` index instead of a `String`.
//! - `Structure.{parents,declared,inherited}` are stored as their own
//!   bincode-encoded byte blobs rather than inline, so [`from_wire_apis`] can
//!   wrap each as a [`incra_api::Lazy::pending`] thunk instead of eagerly
//!   decoding every member list up front (§4.6, §9 "Lazy evaluation").
//!
//! Everything else in `ClassLike` (annotations, self type, type parameters)
//! is small and flat enough that interning it too would add bookkeeping
//! without a meaningful memory win, so it round-trips through `serde`/
//! `bincode` unchanged.

use crate::error::CodecError;
use crate::intern::NameInterner;
use incra_api::{
    Access, AnalyzedClass, Annotation, Apis, ClassLike, Companions, DefinitionType, Lazy, Modifiers,
    NameHash, Structure, Type, TypeParameter,
};
use incra_relation::UseScope;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct WireStructure {
    parents_bytes: Vec<u8>,
    declared_bytes: Vec<u8>,
    inherited_bytes: Vec<u8>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct WireClassLike {
    name_idx: u32,
    access: Access,
    modifiers: Modifiers,
    annotations: Vec<Annotation>,
    definition_type: DefinitionType,
    self_type: Type,
    structure: WireStructure,
    type_parameters: Vec<TypeParameter>,
    children_of_sealed: Vec<String>,
    top_level: bool,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct WireCompanions {
    class_api: Option<WireClassLike>,
    object_api: Option<WireClassLike>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct WireNameHash {
    name_idx: u32,
    scope: UseScope,
    hash: i32,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct WireAnalyzedClass {
    compilation_timestamp: i64,
    name_idx: u32,
    api: WireCompanions,
    api_hash: i64,
    name_hashes: Vec<WireNameHash>,
    has_macro: bool,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct WireApis {
    names: Vec<String>,
    internal: BTreeMap<u32, WireAnalyzedClass>,
    external: BTreeMap<u32, WireAnalyzedClass>,
}

fn to_wire_structure(structure: &Structure) -> Result<WireStructure, CodecError> {
    Ok(WireStructure {
        parents_bytes: bincode::serialize(structure.parents.force())?,
        declared_bytes: bincode::serialize(structure.declared.force())?,
        inherited_bytes: bincode::serialize(structure.inherited.force())?,
    })
}

fn from_wire_structure(wire: &WireStructure) -> Structure {
    let parents: Arc<[u8]> = Arc::from(wire.parents_bytes.clone().into_boxed_slice());
    let declared: Arc<[u8]> = Arc::from(wire.declared_bytes.clone().into_boxed_slice());
    let inherited: Arc<[u8]> = Arc::from(wire.inherited_bytes.clone().into_boxed_slice());
    Structure {
        parents: Lazy::pending(parents, |bytes| bincode::deserialize(bytes).unwrap_or_default()),
        declared: Lazy::pending(declared, |bytes| bincode::deserialize(bytes).unwrap_or_default()),
        inherited: Lazy::pending(inherited, |bytes| bincode::deserialize(bytes).unwrap_or_default()),
    }
}

fn to_wire_class_like(class: &ClassLike, interner: &mut NameInterner) -> Result<WireClassLike, CodecError> {
    Ok(WireClassLike {
        name_idx: interner.intern(&class.name),
        access: class.access.clone(),
        modifiers: class.modifiers,
        annotations: class.annotations.clone(),
        definition_type: class.definition_type,
        self_type: class.self_type.clone(),
        structure: to_wire_structure(&class.structure)?,
        type_parameters: class.type_parameters.clone(),
        children_of_sealed: class.children_of_sealed.clone(),
        top_level: class.top_level,
    })
}

fn from_wire_class_like(wire: &WireClassLike, names: &[String]) -> Result<ClassLike, CodecError> {
    Ok(ClassLike {
        name: resolve(names, wire.name_idx)?,
        access: wire.access.clone(),
        modifiers: wire.modifiers,
        annotations: wire.annotations.clone(),
        definition_type: wire.definition_type,
        self_type: wire.self_type.clone(),
        structure: from_wire_structure(&wire.structure),
        type_parameters: wire.type_parameters.clone(),
        children_of_sealed: wire.children_of_sealed.clone(),
        top_level: wire.top_level,
    })
}

fn to_wire_companions(companions: &Companions, interner: &mut NameInterner) -> Result<WireCompanions, CodecError> {
    Ok(WireCompanions {
        class_api: companions
            .class_api
            .as_ref()
            .map(|c| to_wire_class_like(c, interner))
            .transpose()?,
        object_api: companions
            .object_api
            .as_ref()
            .map(|c| to_wire_class_like(c, interner))
            .transpose()?,
    })
}

fn from_wire_companions(wire: &WireCompanions, names: &[String]) -> Result<Companions, CodecError> {
    Ok(Companions {
        class_api: wire.class_api.as_ref().map(|c| from_wire_class_like(c, names)).transpose()?,
        object_api: wire.object_api.as_ref().map(|c| from_wire_class_like(c, names)).transpose()?,
    })
}

fn to_wire_name_hash(name_hash: &NameHash, interner: &mut NameInterner) -> WireNameHash {
    WireNameHash {
        name_idx: interner.intern(&name_hash.name),
        scope: name_hash.scope,
        hash: name_hash.hash,
    }
}

fn from_wire_name_hash(wire: &WireNameHash, names: &[String]) -> Result<NameHash, CodecError> {
    Ok(NameHash {
        name: resolve(names, wire.name_idx)?,
        scope: wire.scope,
        hash: wire.hash,
    })
}

fn to_wire_analyzed_class(class: &AnalyzedClass, interner: &mut NameInterner) -> Result<WireAnalyzedClass, CodecError> {
    Ok(WireAnalyzedClass {
        compilation_timestamp: class.compilation_timestamp,
        name_idx: interner.intern(&class.name),
        api: to_wire_companions(class.api.force(), interner)?,
        api_hash: class.api_hash,
        name_hashes: class
            .name_hashes
            .iter()
            .map(|nh| to_wire_name_hash(nh, interner))
            .collect(),
        has_macro: class.has_macro,
    })
}

fn from_wire_analyzed_class(wire: &WireAnalyzedClass, names: &[String]) -> Result<AnalyzedClass, CodecError> {
    Ok(AnalyzedClass {
        compilation_timestamp: wire.compilation_timestamp,
        name: resolve(names, wire.name_idx)?,
        api: Lazy::forced(from_wire_companions(&wire.api, names)?),
        api_hash: wire.api_hash,
        name_hashes: wire
            .name_hashes
            .iter()
            .map(|nh| from_wire_name_hash(nh, names))
            .collect::<Result<Vec<_>, _>>()?,
        has_macro: wire.has_macro,
    })
}

fn resolve(names: &[String], idx: u32) -> Result<String, CodecError> {
    names
        .get(idx as usize)
        .cloned()
        .ok_or(CodecError::NameIndexOutOfRange { index: idx, len: names.len() })
}

pub fn to_wire_apis(apis: &Apis) -> Result<WireApis, CodecError> {
    let mut interner = NameInterner::new();
    let mut internal = BTreeMap::new();
    for (name, class) in &apis.internal {
        let idx = interner.intern(name);
        internal.insert(idx, to_wire_analyzed_class(class, &mut interner)?);
    }
    let mut external = BTreeMap::new();
    for (name, class) in &apis.external {
        let idx = interner.intern(name);
        external.insert(idx, to_wire_analyzed_class(class, &mut interner)?);
    }
    Ok(WireApis {
        names: interner.into_table(),
        internal,
        external,
    })
}

pub fn from_wire_apis(wire: &WireApis) -> Result<Apis, CodecError> {
    let mut internal = BTreeMap::new();
    for class in wire.internal.values() {
        let class = from_wire_analyzed_class(class, &wire.names)?;
        internal.insert(class.name.clone(), class);
    }
    let mut external = BTreeMap::new();
    for class in wire.external.values() {
        let class = from_wire_analyzed_class(class, &wire.names)?;
        external.insert(class.name.clone(), class);
    }
    Ok(Apis { internal, external })
}
