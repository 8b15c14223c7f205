use std::collections::{BTreeMap, BTreeSet};

/// A bidirectional many-to-many relation between `A` and `B`.
///
/// `forward` and `reverse` are maintained in lockstep by every mutator here;
/// callers must never reach into the maps directly, which is why both fields
/// are private. Invariant (§3): `b in forward(a) <=> a in reverse(b)`.
///
/// Iteration over `forward`/`reverse` is deterministic by key (`BTreeMap`)
/// and value (`BTreeSet`), per §4.2's serialization determinism requirement.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(bound(
    serialize = "A: Ord + serde::Serialize, B: Ord + serde::Serialize",
    deserialize = "A: Ord + serde::Deserialize<'de>, B: Ord + serde::Deserialize<'de>"
))]
pub struct Relation<A, B> {
    forward: BTreeMap<A, BTreeSet<B>>,
    reverse: BTreeMap<B, BTreeSet<A>>,
}

impl<A, B> Default for Relation<A, B> {
    fn default() -> Self {
        Self {
            forward: BTreeMap::new(),
            reverse: BTreeMap::new(),
        }
    }
}

impl<A, B> Relation<A, B>
where
    A: Ord + Clone,
    B: Ord + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty() && self.reverse.is_empty()
    }

    pub fn forward(&self) -> &BTreeMap<A, BTreeSet<B>> {
        &self.forward
    }

    pub fn reverse(&self) -> &BTreeMap<B, BTreeSet<A>> {
        &self.reverse
    }

    /// All `b` related to `a`, or an empty iterator if `a` is unknown.
    pub fn forward_for<'a>(&'a self, a: &A) -> impl Iterator<Item = &'a B> {
        self.forward.get(a).into_iter().flatten()
    }

    /// All `a` related to `b`, or an empty iterator if `b` is unknown.
    pub fn reverse_for<'a>(&'a self, b: &B) -> impl Iterator<Item = &'a A> {
        self.reverse.get(b).into_iter().flatten()
    }

    pub fn add(&mut self, a: A, b: B) {
        self.forward.entry(a.clone()).or_default().insert(b.clone());
        self.reverse.entry(b).or_default().insert(a);
    }

    pub fn remove(&mut self, a: &A, b: &B) {
        if let Some(set) = self.forward.get_mut(a) {
            set.remove(b);
            if set.is_empty() {
                self.forward.remove(a);
            }
        }
        if let Some(set) = self.reverse.get_mut(b) {
            set.remove(a);
            if set.is_empty() {
                self.reverse.remove(b);
            }
        }
    }

    /// Remove every pair keyed by `a` in the forward direction (and the
    /// matching entries from `reverse`). Used when a source is recompiled or
    /// deleted and all of its old edges must be dropped before new ones are
    /// added (§3 "Lifecycle").
    pub fn remove_all_by_key(&mut self, a: &A) {
        let Some(targets) = self.forward.remove(a) else {
            return;
        };
        for b in targets {
            if let Some(set) = self.reverse.get_mut(&b) {
                set.remove(a);
                if set.is_empty() {
                    self.reverse.remove(&b);
                }
            }
        }
    }

    /// Merge `other` into `self`, keywise. Both relations must already
    /// satisfy the bidirectional invariant; the merge preserves it.
    pub fn union(&mut self, other: &Relation<A, B>) {
        for (a, bs) in &other.forward {
            for b in bs {
                self.add(a.clone(), b.clone());
            }
        }
    }

    /// Rebuild `reverse` from `forward` from scratch. O(n). Used after bulk
    /// mutation of `forward` alone (e.g. deserializing only the forward map
    /// to save space on disk, §4.6).
    pub fn reconstruct_from_forward(forward: BTreeMap<A, BTreeSet<B>>) -> Self {
        let mut reverse: BTreeMap<B, BTreeSet<A>> = BTreeMap::new();
        for (a, bs) in &forward {
            for b in bs {
                reverse.entry(b.clone()).or_default().insert(a.clone());
            }
        }
        Self { forward, reverse }
    }

    /// Check the bidirectional invariant. Intended for tests and assertions
    /// after driver steps (§8 "Universal invariants"), not for hot paths.
    pub fn check_bidirectional(&self) -> bool {
        for (a, bs) in &self.forward {
            for b in bs {
                if !self.reverse.get(b).is_some_and(|set| set.contains(a)) {
                    return false;
                }
            }
        }
        for (b, as_) in &self.reverse {
            for a in as_ {
                if !self.forward.get(a).is_some_and(|set| set.contains(b)) {
                    return false;
                }
            }
        }
        true
    }
}
