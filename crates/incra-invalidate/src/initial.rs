use incra_analysis::Analysis;
use incra_core::{File, Stamp};
use std::collections::{BTreeMap, BTreeSet};

/// Result of stage 1 (§4.5): the raw set of things that changed on disk
/// since `previous`, plus the class names that follow directly from them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct InitialInvalidation {
    pub modified_sources: BTreeSet<File>,
    pub removed_sources: BTreeSet<File>,
    pub modified_binaries: BTreeSet<File>,
    pub invalid_classes: BTreeSet<String>,
}

/// Stage 1 — initial invalid classes (§4.5).
///
/// `current_product_stamps` only needs entries for products `previous`
/// already knew about; a missing entry is treated as "product gone",
/// matching the edge-case policy "a product file missing on disk with an
/// otherwise-unchanged source is treated as source-modified".
///
/// `changed_external_class_names` seeds the "external dependency changed"
/// half of stage 1 directly; any class named by `library_class_name` for a
/// binary in `modified_binaries` is folded in automatically, so callers only
/// need to supply names that changed for reasons other than "the binary that
/// provides them changed" (e.g. a result fed back from another module's own
/// diff).
pub fn compute_initial_invalidation(
    previous: &Analysis,
    current_sources: &BTreeSet<File>,
    current_source_stamps: &BTreeMap<File, Stamp>,
    current_product_stamps: &BTreeMap<File, Stamp>,
    current_binary_stamps: &BTreeMap<File, Stamp>,
    changed_external_class_names: &BTreeSet<String>,
) -> InitialInvalidation {
    let mut modified_sources = BTreeSet::new();
    for (source, new_stamp) in current_source_stamps {
        let old_stamp = previous.stamps.sources.get(source).unwrap_or(&Stamp::Empty);
        if Stamp::modified(old_stamp, new_stamp) {
            modified_sources.insert(source.clone());
        }
    }

    for (source, products) in previous.relations.src_prod.forward() {
        if modified_sources.contains(source) || !current_sources.contains(source) {
            continue;
        }
        for product in products {
            let current = current_product_stamps.get(product).unwrap_or(&Stamp::Empty);
            let previously_recorded = previous.stamps.products.get(product).unwrap_or(&Stamp::Empty);
            if matches!(current, Stamp::Empty) || Stamp::modified(previously_recorded, current) {
                modified_sources.insert(source.clone());
                break;
            }
        }
    }

    let removed_sources: BTreeSet<File> = previous
        .stamps
        .sources
        .keys()
        .filter(|source| !current_sources.contains(*source))
        .cloned()
        .collect();

    let mut modified_binaries = BTreeSet::new();
    for (binary, new_stamp) in current_binary_stamps {
        let old_stamp = previous.stamps.binaries.get(binary).unwrap_or(&Stamp::Empty);
        if Stamp::modified(old_stamp, new_stamp) {
            modified_binaries.insert(binary.clone());
        }
    }

    let mut invalid_classes = BTreeSet::new();
    for source in modified_sources.iter().chain(removed_sources.iter()) {
        for name in previous.relations.classes_in(source) {
            invalid_classes.insert(name.clone());
        }
    }

    let mut external_changed = changed_external_class_names.clone();
    for binary in &modified_binaries {
        for name in previous.relations.library_class_name.forward_for(binary) {
            external_changed.insert(name.clone());
        }
    }
    for name in &external_changed {
        for dependent in previous.relations.member_ref_external.reverse_for(name) {
            invalid_classes.insert(dependent.clone());
        }
        for dependent in previous.relations.inheritance_external.reverse_for(name) {
            invalid_classes.insert(dependent.clone());
        }
    }

    InitialInvalidation {
        modified_sources,
        removed_sources,
        modified_binaries,
        invalid_classes,
    }
}
