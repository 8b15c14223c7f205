use crate::relation::Relation;
use crate::used_name::UsedName;
use incra_core::File;
use std::collections::{BTreeMap, BTreeSet};

/// The fixed aggregate of named relations tracked for one module (§3).
///
/// Every field is a `Relation` (or, for `names`, a plain map of sets) rather
/// than a bespoke struct, so the bidirectional invariant and the generic
/// mutators (`add`/`remove`/`union`/`reconstruct_from_forward`) are shared
/// across all of them.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Relations {
    pub src_prod: Relation<File, File>,
    pub library_dep: Relation<File, File>,
    pub library_class_name: Relation<File, String>,
    pub classes: Relation<File, String>,
    pub product_class_name: Relation<String, String>,
    pub member_ref_internal: Relation<String, String>,
    pub member_ref_external: Relation<String, String>,
    pub inheritance_internal: Relation<String, String>,
    pub inheritance_external: Relation<String, String>,
    pub local_inheritance_internal: Relation<String, String>,
    pub local_inheritance_external: Relation<String, String>,
    pub names: BTreeMap<String, BTreeSet<UsedName>>,
}

impl Relations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn used_names(&self, class_name: &str) -> impl Iterator<Item = &UsedName> {
        self.names.get(class_name).into_iter().flatten()
    }

    pub fn add_used_name(&mut self, class_name: impl Into<String>, name: UsedName) {
        self.names.entry(class_name.into()).or_default().insert(name);
    }

    /// Every class name declared in `source`, via the `classes` relation.
    pub fn classes_in(&self, source: &File) -> impl Iterator<Item = &String> {
        self.classes.forward_for(source)
    }

    /// Remove every trace of `source` and the classes it declared: its
    /// `srcProd` products, its `classes` entries, the matching
    /// `productClassName` entries, its `names`, and every outgoing
    /// member-ref/inheritance/local-inheritance edge declared *by* one of its
    /// classes. Used when a source is deleted, or before merging fresh
    /// callback data for a recompiled source (§3 "Lifecycle", §4.5 "Deleting
    /// a source", §4.7 "Merge" — a recompile replaces a class's edges, it
    /// doesn't union with whatever was there before).
    ///
    /// Edges where a removed class is the *target* (something else depends
    /// on it) are left alone: the dependent didn't change, so its recorded
    /// dependency is still accurate until the dependent itself recompiles.
    pub fn remove_source(&mut self, source: &File) {
        let class_names: Vec<String> = self.classes_in(source).cloned().collect();
        self.src_prod.remove_all_by_key(source);
        self.library_dep.remove_all_by_key(source);
        self.classes.remove_all_by_key(source);
        for name in &class_names {
            self.product_class_name.remove_all_by_key(name);
            self.names.remove(name);
            self.member_ref_internal.remove_all_by_key(name);
            self.member_ref_external.remove_all_by_key(name);
            self.inheritance_internal.remove_all_by_key(name);
            self.inheritance_external.remove_all_by_key(name);
            self.local_inheritance_internal.remove_all_by_key(name);
            self.local_inheritance_external.remove_all_by_key(name);
        }
    }

    /// Merge another module-local snapshot of relations into `self`,
    /// keywise, across every named relation (§4.2 "union").
    pub fn union(&mut self, other: &Relations) {
        self.src_prod.union(&other.src_prod);
        self.library_dep.union(&other.library_dep);
        self.library_class_name.union(&other.library_class_name);
        self.classes.union(&other.classes);
        self.product_class_name.union(&other.product_class_name);
        self.member_ref_internal.union(&other.member_ref_internal);
        self.member_ref_external.union(&other.member_ref_external);
        self.inheritance_internal.union(&other.inheritance_internal);
        self.inheritance_external.union(&other.inheritance_external);
        self.local_inheritance_internal
            .union(&other.local_inheritance_internal);
        self.local_inheritance_external
            .union(&other.local_inheritance_external);
        for (name, scopes) in &other.names {
            self.names.entry(name.clone()).or_default().extend(scopes.iter().cloned());
        }
    }

    /// Product uniqueness invariant (§8): every product file has exactly one
    /// source owner.
    pub fn products_have_unique_owners(&self) -> bool {
        self.src_prod.reverse().values().all(|owners| owners.len() <= 1)
    }
}
