/// The syntactic context in which a name was referenced.
///
/// Used to scope member-reference invalidation (§4.5 stage 3, step 1): a
/// dependent is only invalidated for a name change if it used that name in a
/// matching scope.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, serde::Serialize, serde::Deserialize)]
pub enum UseScope {
    Default,
    Implicit,
    PatternMatchTarget,
}

/// One simple name referenced by a class, tagged with every scope it was
/// seen in at that class's surface.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct UsedName {
    pub name: String,
    pub scopes: Vec<UseScope>,
}

impl UsedName {
    pub fn new(name: impl Into<String>, scopes: impl IntoIterator<Item = UseScope>) -> Self {
        let mut scopes: Vec<UseScope> = scopes.into_iter().collect();
        scopes.sort();
        scopes.dedup();
        Self {
            name: name.into(),
            scopes,
        }
    }

    pub fn has_scope(&self, scope: UseScope) -> bool {
        self.scopes.contains(&scope)
    }
}
