use incra_api::AnalyzedClass;

/// Whether `old` and `new`'s declared structure (parents/declared/inherited
/// members, not just the rename-level name hashes) differs.
///
/// Used to gate the local-inheritance closure step (§4.5 stage 3 step 3),
/// which — unlike the unscoped inheritance step — only propagates when the
/// superclass's *structure* changed, not on a mere member rename.
pub fn structure_changed(old: &AnalyzedClass, new: &AnalyzedClass) -> bool {
    if old.api_hash == new.api_hash {
        return false;
    }
    let old_companions = old.api.force();
    let new_companions = new.api.force();
    let old_structures = (
        old_companions.class_api.as_ref().map(|c| c.structure.clone()),
        old_companions.object_api.as_ref().map(|c| c.structure.clone()),
    );
    let new_structures = (
        new_companions.class_api.as_ref().map(|c| c.structure.clone()),
        new_companions.object_api.as_ref().map(|c| c.structure.clone()),
    );
    old_structures != new_structures
}

#[cfg(test)]
mod tests {
    use super::*;
    use incra_api::{
        Access, ClassDefinition, ClassDefinitionKind, Companions, DefinitionType, Modifiers,
        Structure, Type,
    };

    fn class_with_field(name: &str, field_ty: Type) -> incra_api::ClassLike {
        incra_api::ClassLike {
            name: name.to_string(),
            access: Access::Public,
            modifiers: Modifiers::NONE,
            annotations: Vec::new(),
            definition_type: DefinitionType::ClassDef,
            self_type: Type::Singleton(name.to_string()),
            structure: Structure::forced(
                Vec::new(),
                vec![ClassDefinition {
                    name: "bar".to_string(),
                    kind: ClassDefinitionKind::Val,
                    tpe: field_ty,
                    modifiers: Modifiers::NONE,
                    access: Access::Public,
                    annotations: Vec::new(),
                }],
                Vec::new(),
            ),
            type_parameters: Vec::new(),
            children_of_sealed: Vec::new(),
            top_level: true,
        }
    }

    fn analyzed(class: incra_api::ClassLike) -> AnalyzedClass {
        AnalyzedClass::from_companions(0, class.name.clone(), Companions::class_only(class), false)
    }

    #[test]
    fn gaining_a_field_is_a_structure_change() {
        let mut no_field = class_with_field("P", Type::Singleton("Int".into()));
        no_field.structure = Structure::forced(Vec::new(), Vec::new(), Vec::new());
        let old = analyzed(no_field);
        let new = analyzed(class_with_field("P", Type::Singleton("Int".into())));
        assert!(structure_changed(&old, &new));
    }

    #[test]
    fn identical_structure_is_not_a_change() {
        let old = analyzed(class_with_field("P", Type::Singleton("Int".into())));
        let new = analyzed(class_with_field("P", Type::Singleton("Int".into())));
        assert!(!structure_changed(&old, &new));
    }
}
