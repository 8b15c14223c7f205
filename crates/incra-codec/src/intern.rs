use lasso::{Key, Rodeo};

/// Per-object string interner used while building a wire `Apis`/`AnalyzedClass`
/// tree (§4.6 "String interning happens at the reader level, per top-level
/// object"). Every class name that would otherwise be duplicated once per
/// `AnalyzedClass`, once per `NameHash`, and once per `ClassLike.name` collapses
/// to a single `u32` index into the table produced by [`NameInterner::into_table`].
pub struct NameInterner {
    rodeo: Rodeo,
}

impl NameInterner {
    pub fn new() -> Self {
        Self { rodeo: Rodeo::default() }
    }

    pub fn intern(&mut self, name: &str) -> u32 {
        Key::into_usize(self.rodeo.get_or_intern(name)) as u32
    }

    /// Consume the interner, producing the name table in index order.
    pub fn into_table(self) -> Vec<String> {
        let mut entries: Vec<(usize, String)> = self
            .rodeo
            .into_iter()
            .map(|(key, name)| (Key::into_usize(key), name.to_string()))
            .collect();
        entries.sort_by_key(|(index, _)| *index);
        entries.into_iter().map(|(_, name)| name).collect()
    }
}

impl Default for NameInterner {
    fn default() -> Self {
        Self::new()
    }
}
