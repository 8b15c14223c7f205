use incra_diff::ModifiedNames;
use incra_relation::Relations;
use std::collections::{BTreeMap, BTreeSet};

/// How stage 3 ended. Bailing is a distinct terminal action from the
/// fraction gate declaring the whole module dirty: both end up treating the
/// module as fully dirty, but they are triggered by different conditions and
/// worth logging differently (an iteration cap vs. a coverage ratio).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClosureOutcome {
    Converged,
    BailedToAllSources,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClosureResult {
    pub invalid_classes: BTreeSet<String>,
    pub outcome: ClosureOutcome,
}

/// Stage 3 — transitive closure (§4.5).
///
/// `seed` is the per-class `ModifiedNames` produced by diffing the classes
/// compiled in stage 1/2 (§4.4); classes pulled in purely by the inheritance
/// or local-inheritance steps have no entry in `seed` because they have not
/// been recompiled yet in this round, so their own member-ref/local-
/// inheritance fanout is treated unscoped (conservative over-approximation —
/// "never omit a class a correct implementation would recompile").
///
/// `macro_gained` are classes whose `hasMacro` flipped false→true this round
/// (§4.5 edge case): their member-ref dependents are invalidated regardless
/// of name-hash pruning.
///
/// `structure_changed` are classes (among those with a `seed` entry) whose
/// declared structure, not just a member's name, changed — gates the
/// local-inheritance step (§4.5 step 3).
pub fn closure(
    seed: &BTreeMap<String, ModifiedNames>,
    relations: &Relations,
    name_hashing: bool,
    transitive_step: u32,
    macro_gained: &BTreeSet<String>,
    structure_changed: &BTreeSet<String>,
) -> ClosureResult {
    let mut invalid: BTreeSet<String> = seed.keys().cloned().collect();
    let mut frontier: Vec<String> = invalid.iter().cloned().collect();
    let mut rounds: u32 = 0;

    while !frontier.is_empty() {
        if rounds >= transitive_step {
            tracing::warn!(
                target: "incra::invalidate",
                rounds,
                invalid = invalid.len(),
                "stage 3 closure did not converge within transitive_step rounds, bailing to all sources"
            );
            return ClosureResult {
                invalid_classes: invalid,
                outcome: ClosureOutcome::BailedToAllSources,
            };
        }
        rounds += 1;

        let mut next_frontier = Vec::new();
        for c in &frontier {
            let unscoped = !name_hashing || macro_gained.contains(c) || !seed.contains_key(c);

            for d in relations.member_ref_internal.reverse_for(c) {
                let should_add = unscoped || {
                    let m_c = &seed[c];
                    relations
                        .used_names(d)
                        .any(|used| m_c.iter().any(|(name, scope)| &used.name == name && used.has_scope(*scope)))
                };
                if should_add && invalid.insert(d.clone()) {
                    next_frontier.push(d.clone());
                }
            }

            for d in relations.inheritance_internal.reverse_for(c) {
                if invalid.insert(d.clone()) {
                    next_frontier.push(d.clone());
                }
            }

            let structural = structure_changed.contains(c) || !seed.contains_key(c);
            if structural {
                for d in relations.local_inheritance_internal.reverse_for(c) {
                    if invalid.insert(d.clone()) {
                        next_frontier.push(d.clone());
                    }
                }
            }
        }
        frontier = next_frontier;
    }

    tracing::debug!(target: "incra::invalidate", rounds, invalid = invalid.len(), "stage 3 closure converged");
    ClosureResult {
        invalid_classes: invalid,
        outcome: ClosureOutcome::Converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use incra_relation::UseScope;

    fn names(pairs: &[(&str, UseScope)]) -> ModifiedNames {
        pairs.iter().map(|(n, s)| (n.to_string(), *s)).collect()
    }

    #[test]
    fn no_seed_converges_immediately() {
        let result = closure(
            &BTreeMap::new(),
            &Relations::new(),
            true,
            3,
            &BTreeSet::new(),
            &BTreeSet::new(),
        );
        assert!(result.invalid_classes.is_empty());
        assert_eq!(result.outcome, ClosureOutcome::Converged);
    }

    #[test]
    fn member_ref_step_prunes_by_matching_name_and_scope() {
        let mut relations = Relations::new();
        relations.member_ref_internal.add("Dep".to_string(), "Base".to_string());
        relations.add_used_name("Dep", incra_relation::UsedName::new("foo", [UseScope::Default]));

        let seed = BTreeMap::from([("Base".to_string(), names(&[("foo", UseScope::Default)]))]);
        let result = closure(&seed, &relations, true, 3, &BTreeSet::new(), &BTreeSet::new());
        assert!(result.invalid_classes.contains("Dep"));
        assert_eq!(result.outcome, ClosureOutcome::Converged);
    }

    #[test]
    fn member_ref_step_skips_unrelated_names() {
        let mut relations = Relations::new();
        relations.member_ref_internal.add("Dep".to_string(), "Base".to_string());
        relations.add_used_name("Dep", incra_relation::UsedName::new("bar", [UseScope::Default]));

        let seed = BTreeMap::from([("Base".to_string(), names(&[("foo", UseScope::Default)]))]);
        let result = closure(&seed, &relations, true, 3, &BTreeSet::new(), &BTreeSet::new());
        assert!(!result.invalid_classes.contains("Dep"));
    }

    #[test]
    fn disabling_name_hashing_adds_member_ref_dependents_unconditionally() {
        let mut relations = Relations::new();
        relations.member_ref_internal.add("Dep".to_string(), "Base".to_string());
        relations.add_used_name("Dep", incra_relation::UsedName::new("bar", [UseScope::Default]));

        let seed = BTreeMap::from([("Base".to_string(), names(&[("foo", UseScope::Default)]))]);
        let result = closure(&seed, &relations, false, 3, &BTreeSet::new(), &BTreeSet::new());
        assert!(result.invalid_classes.contains("Dep"));
    }

    #[test]
    fn inheritance_step_is_unscoped() {
        let mut relations = Relations::new();
        relations.inheritance_internal.add("Sub".to_string(), "Base".to_string());
        relations.add_used_name("Sub", incra_relation::UsedName::new("unrelated", [UseScope::Default]));

        let seed = BTreeMap::from([("Base".to_string(), names(&[("foo", UseScope::Default)]))]);
        let result = closure(&seed, &relations, true, 3, &BTreeSet::new(), &BTreeSet::new());
        assert!(result.invalid_classes.contains("Sub"));
    }

    #[test]
    fn local_inheritance_step_requires_structure_change() {
        let mut relations = Relations::new();
        relations.local_inheritance_internal.add("LocalSub".to_string(), "Base".to_string());

        let seed = BTreeMap::from([("Base".to_string(), names(&[("foo", UseScope::Default)]))]);
        let no_structure_change = closure(&seed, &relations, true, 3, &BTreeSet::new(), &BTreeSet::new());
        assert!(!no_structure_change.invalid_classes.contains("LocalSub"));

        let structure_changed = BTreeSet::from(["Base".to_string()]);
        let with_structure_change = closure(&seed, &relations, true, 3, &BTreeSet::new(), &structure_changed);
        assert!(with_structure_change.invalid_classes.contains("LocalSub"));
    }

    #[test]
    fn macro_gain_forces_unscoped_member_ref_propagation() {
        let mut relations = Relations::new();
        relations.member_ref_internal.add("Dep".to_string(), "Base".to_string());
        relations.add_used_name("Dep", incra_relation::UsedName::new("unrelated", [UseScope::Default]));

        let seed = BTreeMap::from([("Base".to_string(), names(&[("foo", UseScope::Default)]))]);
        let macro_gained = BTreeSet::from(["Base".to_string()]);
        let result = closure(&seed, &relations, true, 3, &macro_gained, &BTreeSet::new());
        assert!(result.invalid_classes.contains("Dep"));
    }

    #[test]
    fn bails_to_all_sources_when_transitive_step_exceeded() {
        let mut relations = Relations::new();
        relations.member_ref_internal.add("B".to_string(), "A".to_string());
        relations.member_ref_internal.add("C".to_string(), "B".to_string());
        relations.member_ref_internal.add("D".to_string(), "C".to_string());

        let seed = BTreeMap::from([("A".to_string(), names(&[("foo", UseScope::Default)]))]);
        let result = closure(&seed, &relations, false, 1, &BTreeSet::new(), &BTreeSet::new());
        assert_eq!(result.outcome, ClosureOutcome::BailedToAllSources);
    }

    #[test]
    fn each_class_is_added_at_most_once_even_with_a_cycle() {
        let mut relations = Relations::new();
        relations.member_ref_internal.add("A".to_string(), "B".to_string());
        relations.member_ref_internal.add("B".to_string(), "A".to_string());

        let seed = BTreeMap::from([("A".to_string(), names(&[("foo", UseScope::Default)]))]);
        let result = closure(&seed, &relations, false, 10, &BTreeSet::new(), &BTreeSet::new());
        assert_eq!(result.outcome, ClosureOutcome::Converged);
        assert_eq!(result.invalid_classes, BTreeSet::from(["A".to_string(), "B".to_string()]));
    }
}
