//! Component C4: the API differ.
//!
//! Turns an old/new pair of `AnalyzedClass` summaries into the modified-name
//! set that seeds invalidation closure (§4.4), and rolls per-class diffs up
//! into a whole-module [`ApisDiff`].

mod structure;

use incra_api::{AnalyzedClass, Apis};
use incra_relation::UseScope;
use std::collections::{BTreeMap, BTreeSet};

pub use structure::structure_changed;

/// `(name, scope)` pairs whose hash changed, or that exist on exactly one
/// side, between an old and new `AnalyzedClass` (§4.4).
pub type ModifiedNames = BTreeSet<(String, UseScope)>;

/// Result of diffing one class name's old/new `AnalyzedClass`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ApisDiff {
    /// Names changed per still-present class.
    pub modified: BTreeMap<String, ModifiedNames>,
    /// Classes present in `old` but absent from `new`: every one of their
    /// former names is treated as modified (§4.4 "If a whole class
    /// disappeared...").
    pub removed: BTreeSet<String>,
    /// Classes present in `new` but absent from `old`.
    pub added: BTreeSet<String>,
}

/// Diff a single class present on both sides.
///
/// Short-circuits to the empty set when `apiHash` matches (§4.4): this is
/// the fast path for "body-only change, signature and apiHash unchanged"
/// (§8 scenario 2).
pub fn diff_class(old: &AnalyzedClass, new: &AnalyzedClass) -> ModifiedNames {
    if old.api_hash == new.api_hash {
        return ModifiedNames::new();
    }

    let old_hashes: BTreeMap<(String, UseScope), i32> = old
        .name_hashes
        .iter()
        .map(|nh| ((nh.name.clone(), nh.scope), nh.hash))
        .collect();
    let new_hashes: BTreeMap<(String, UseScope), i32> = new
        .name_hashes
        .iter()
        .map(|nh| ((nh.name.clone(), nh.scope), nh.hash))
        .collect();

    let mut modified = ModifiedNames::new();
    for key in old_hashes.keys().chain(new_hashes.keys()) {
        if old_hashes.get(key) != new_hashes.get(key) {
            modified.insert(key.clone());
        }
    }
    modified
}

/// Diff every class named in `old.internal`/`new.internal` (external APIs
/// are diffed the same way by callers that need it — typically the
/// invalidation engine when deciding `MissingExternal` fallout).
pub fn diff_apis(old: &Apis, new: &Apis) -> ApisDiff {
    diff_class_maps(&old.internal, &new.internal)
}

pub fn diff_external_apis(old: &Apis, new: &Apis) -> ApisDiff {
    diff_class_maps(&old.external, &new.external)
}

fn diff_class_maps(
    old: &BTreeMap<String, AnalyzedClass>,
    new: &BTreeMap<String, AnalyzedClass>,
) -> ApisDiff {
    let mut diff = ApisDiff::default();

    for (name, old_class) in old {
        match new.get(name) {
            Some(new_class) => {
                let modified = diff_class(old_class, new_class);
                if !modified.is_empty() {
                    diff.modified.insert(name.clone(), modified);
                }
            }
            None => {
                diff.removed.insert(name.clone());
                let all_names: ModifiedNames = old_class
                    .name_hashes
                    .iter()
                    .map(|nh| (nh.name.clone(), nh.scope))
                    .collect();
                diff.modified.insert(name.clone(), all_names);
            }
        }
    }

    for name in new.keys() {
        if !old.contains_key(name) {
            diff.added.insert(name.clone());
        }
    }

    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use incra_api::{Companions, NameHash};

    fn class(name: &str, hashes: Vec<(&str, UseScope, i32)>, api_hash: i64) -> AnalyzedClass {
        AnalyzedClass {
            compilation_timestamp: 0,
            name: name.to_string(),
            api: incra_api::Lazy::forced(Companions { class_api: None, object_api: None }),
            api_hash,
            name_hashes: hashes
                .into_iter()
                .map(|(n, s, h)| NameHash { name: n.to_string(), scope: s, hash: h })
                .collect(),
            has_macro: false,
        }
    }

    #[test]
    fn identical_classes_diff_to_empty() {
        let a = class("P", vec![("foo", UseScope::Default, 1)], 42);
        let b = class("P", vec![("foo", UseScope::Default, 1)], 42);
        assert!(diff_class(&a, &b).is_empty());
    }

    #[test]
    fn diff_self_is_always_empty_even_without_matching_hash() {
        // diff(api, api) == ∅ (§8 round-trip law), checked via the
        // short-circuit as well as the general path.
        let a = class("P", vec![("foo", UseScope::Default, 1), ("bar", UseScope::Implicit, 2)], 7);
        assert!(diff_class(&a, &a.clone()).is_empty());
    }

    #[test]
    fn signature_change_reports_only_the_changed_name() {
        let old = class(
            "P",
            vec![("foo", UseScope::Default, 1), ("bar", UseScope::Default, 2)],
            10,
        );
        let new = class(
            "P",
            vec![("foo", UseScope::Default, 99), ("bar", UseScope::Default, 2)],
            11,
        );
        let modified = diff_class(&old, &new);
        assert_eq!(modified, ModifiedNames::from([("foo".to_string(), UseScope::Default)]));
    }

    #[test]
    fn removed_class_marks_all_names_modified() {
        let mut old = Apis::default();
        old.internal.insert(
            "A".to_string(),
            class("A", vec![("x", UseScope::Default, 1), ("y", UseScope::Default, 2)], 5),
        );
        let new = Apis::default();

        let diff = diff_apis(&old, &new);
        assert!(diff.removed.contains("A"));
        assert_eq!(
            diff.modified.get("A").unwrap(),
            &ModifiedNames::from([
                ("x".to_string(), UseScope::Default),
                ("y".to_string(), UseScope::Default),
            ])
        );
    }

    #[test]
    fn added_class_is_tracked_without_modified_entry() {
        let old = Apis::default();
        let mut new = Apis::default();
        new.internal.insert("A".to_string(), class("A", vec![], 1));
        let diff = diff_apis(&old, &new);
        assert!(diff.added.contains("A"));
        assert!(diff.modified.is_empty());
    }
}
