//! Component C7: the compile driver state machine (§4.7, §5).
//!
//! [`run_once`] is the pure computation — detect changes, invalidate, drive
//! the `Compiler` through however many `CompileStep`/`Merge`/`Diff`/`Closure`
//! rounds converge the fixpoint, and hand back the resulting `Analysis`. It
//! never touches disk. [`run`] wraps it with the on-disk Persist step and the
//! process-wide analysis cache, matching the full state diagram.

use crate::callback::{CallbackRecorder, CompiledBatch};
use crate::error::DriverError;
use crate::lookup::ClasspathLookup;
use crate::store::AnalysisStore;
use incra_analysis::{Analysis, IncOptions, MiniSetup};
use incra_api::AnalyzedClass;
use incra_codec::ReadWriteMappers;
use incra_core::{stamp_binary, stamp_product, stamp_source, File};
use incra_diff::{diff_class, structure_changed};
use incra_invalidate::{closure, compute_initial_invalidation, resolve_invalidation, ClosureOutcome};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio_util::sync::CancellationToken;

/// The external compiler the driver calls into for each `CompileStep`
/// (§4.7). One call covers exactly the sources the driver hands it; the
/// compiler reports everything it observed through `callback` before
/// returning.
pub trait Compiler {
    fn compile(&self, sources: &BTreeSet<File>, callback: &mut dyn crate::callback::AnalysisCallback) -> Result<(), DriverError>;
}

/// Inputs to one driver run (§5, §6).
pub struct RunConfig<'a> {
    pub previous: Analysis,
    pub previous_setup: MiniSetup,
    pub current_setup: MiniSetup,
    pub all_sources: BTreeSet<File>,
    pub options: &'a IncOptions,
    pub lookup: &'a dyn ClasspathLookup,
    pub cancel: CancellationToken,
}

/// Outcome of one driver run.
#[derive(Debug)]
pub struct RunOutcome {
    pub analysis: Analysis,
    pub mini_setup: MiniSetup,
    pub recompiled_sources: BTreeSet<File>,
    pub outcome: ClosureOutcome,
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Run the state machine against `compiler`, without persisting anything
/// (§4.7 `Start → ... → Done`, Persist omitted — see [`run`]).
pub fn run_once(compiler: &dyn Compiler, config: RunConfig<'_>) -> Result<RunOutcome, DriverError> {
    let RunConfig {
        mut previous,
        previous_setup,
        current_setup,
        all_sources,
        options,
        lookup,
        cancel,
    } = config;

    if !previous_setup.compatible_with(&current_setup) {
        tracing::info!(
            target: "incra::driver",
            "setup changed since the previous run, treating previous analysis as empty"
        );
        previous = Analysis::empty();
    }

    let current_source_stamps = stamp_all(all_sources.iter(), stamp_source)?;
    let current_product_stamps = stamp_all(previous.stamps.products.keys(), stamp_product)?;
    let current_binary_stamps = stamp_all(previous.stamps.binaries.keys(), stamp_binary)?;

    let initial = compute_initial_invalidation(
        &previous,
        &all_sources,
        &current_source_stamps,
        &current_product_stamps,
        &current_binary_stamps,
        &BTreeSet::new(),
    );

    if initial.modified_sources.is_empty()
        && initial.removed_sources.is_empty()
        && initial.modified_binaries.is_empty()
        && initial.invalid_classes.is_empty()
    {
        tracing::debug!(target: "incra::driver", "no changes detected, skipping compilation");
        return Ok(RunOutcome {
            analysis: previous,
            mini_setup: current_setup,
            recompiled_sources: BTreeSet::new(),
            outcome: ClosureOutcome::Converged,
        });
    }

    let mut working = previous;
    for removed in &initial.removed_sources {
        working.forget_source(removed);
    }

    let mut recompiled_sources: BTreeSet<File> = BTreeSet::new();
    // Sources whose own content/stamp changed (§4.1) must be recompiled
    // regardless of whether `working.relations` already knows any class that
    // maps back to them — a brand-new source has no `classes` entry yet, so
    // `invalid_sources` below can never find it by class name alone. This
    // only needs folding in once; after round 1 every one of them is either
    // compiled or excluded via `recompiled_sources`.
    let mut pending_modified_sources = initial.modified_sources.clone();
    let mut invalid_classes = initial.invalid_classes;
    let mut force_all_sources = false;
    let mut outcome = ClosureOutcome::Converged;

    loop {
        if cancel.is_cancelled() {
            return Err(DriverError::Cancelled);
        }

        let mut sources_to_compile = if force_all_sources {
            all_sources.clone()
        } else {
            let invalidation = resolve_invalidation(&working.relations, &invalid_classes, &all_sources, options.recompile_all_fraction);
            if invalidation.is_all_sources() {
                force_all_sources = true;
            }
            let mut sources = invalidation.sources().clone();
            sources.append(&mut pending_modified_sources);
            sources
        };
        sources_to_compile.retain(|source| !recompiled_sources.contains(source));

        if sources_to_compile.is_empty() {
            break;
        }

        // Snapshot everything `diff_round`/`compile_step` need to see as it
        // stood *before* this round's sources are forgotten — `forget_source`
        // below evicts exactly the `apis.internal` entries a post-forget read
        // would need, and the whole module's existing classes are what define
        // "internal" for the callback's classification of this round's events.
        let internal_class_names: BTreeSet<String> = working.apis.internal.keys().cloned().collect();
        let mut old_classes: BTreeMap<String, AnalyzedClass> = BTreeMap::new();
        for source in &sources_to_compile {
            for name in working.relations.classes_in(source) {
                if let Some(class) = working.apis.internal.get(name) {
                    old_classes.insert(name.clone(), class.clone());
                }
            }
        }

        for source in &sources_to_compile {
            working.forget_source(source);
        }

        let batch = compile_step(compiler, &internal_class_names, &sources_to_compile, &current_setup.output)?;

        for source in &sources_to_compile {
            working.stamps.refresh_source(source.clone())?;
        }
        for product in &batch.products {
            working.stamps.refresh_product(product.clone())?;
        }

        let (seed, macro_gained, structure_changed_set) = diff_round(&old_classes, &batch.classes);

        working.relations.union(&batch.relations);
        for (name, class) in batch.classes {
            working.apis.internal.insert(name, class);
        }
        for (file, info) in batch.source_infos {
            working.source_infos.insert(file, info);
        }
        recompiled_sources.extend(sources_to_compile);

        resolve_missing_externals(&mut working, lookup);

        let closure_result = closure(
            &seed,
            &working.relations,
            options.name_hashing,
            options.transitive_step,
            &macro_gained,
            &structure_changed_set,
        );
        if closure_result.outcome == ClosureOutcome::BailedToAllSources {
            force_all_sources = true;
            outcome = ClosureOutcome::BailedToAllSources;
        }
        invalid_classes = closure_result.invalid_classes;
    }

    Ok(RunOutcome {
        analysis: working,
        mini_setup: current_setup,
        recompiled_sources,
        outcome,
    })
}

fn stamp_all<'a, I>(
    files: I,
    stamp_fn: fn(&Path) -> Result<incra_core::Stamp, incra_core::CoreError>,
) -> Result<BTreeMap<File, incra_core::Stamp>, DriverError>
where
    I: Iterator<Item = &'a File>,
{
    let mut out = BTreeMap::new();
    for file in files {
        out.insert(file.clone(), stamp_fn(file.as_path())?);
    }
    Ok(out)
}

fn compile_step(
    compiler: &dyn Compiler,
    internal_class_names: &BTreeSet<String>,
    sources: &BTreeSet<File>,
    output: &incra_analysis::Output,
) -> Result<CompiledBatch, DriverError> {
    let mut recorder = CallbackRecorder::new(now_millis(), internal_class_names, output);
    for source in sources {
        recorder.start_source(source.clone());
    }
    compiler.compile(sources, &mut recorder)?;
    recorder.finish()
}

/// Build the closure seed (§4.4) plus the macro-gain and structure-change
/// sets, by diffing every recompiled class against its previous entry.
/// Brand-new classes (no previous entry) contribute no seed: nothing could
/// already depend on a class that didn't exist before this round.
fn diff_round(
    old_classes: &BTreeMap<String, AnalyzedClass>,
    compiled: &BTreeMap<String, AnalyzedClass>,
) -> (BTreeMap<String, incra_diff::ModifiedNames>, BTreeSet<String>, BTreeSet<String>) {
    let mut seed = BTreeMap::new();
    let mut macro_gained = BTreeSet::new();
    let mut changed_structure = BTreeSet::new();

    for (name, new_class) in compiled {
        let Some(old_class) = old_classes.get(name) else {
            continue;
        };
        if !old_class.has_macro && new_class.has_macro {
            macro_gained.insert(name.clone());
        }
        if structure_changed(old_class, new_class) {
            changed_structure.insert(name.clone());
        }
        let modified = diff_class(old_class, new_class);
        if !modified.is_empty() {
            seed.insert(name.clone(), modified);
        }
    }

    (seed, macro_gained, changed_structure)
}

/// Recover external APIs a callback referenced but that weren't already
/// known (§4.5 edge case "MissingExternal"). Resolution failures are logged
/// and otherwise ignored — the class simply stays out of `apis.external`,
/// and a later run's coverage check is what would surface it as a real
/// problem rather than this one (§7: recoverable, handled locally).
fn resolve_missing_externals(working: &mut Analysis, lookup: &dyn ClasspathLookup) {
    let referenced: BTreeSet<String> = working
        .relations
        .member_ref_external
        .forward()
        .values()
        .flatten()
        .chain(working.relations.inheritance_external.forward().values().flatten())
        .chain(working.relations.local_inheritance_external.forward().values().flatten())
        .cloned()
        .collect();

    for class_name in referenced {
        if working.apis.external.contains_key(&class_name) {
            continue;
        }
        match lookup.analysis_declaring(&class_name) {
            Some(upstream) => {
                if let Some(class) = upstream.apis.internal.get(&class_name) {
                    working.apis.external.insert(class_name, class.clone());
                } else {
                    tracing::warn!(target: "incra::driver", %class_name, "lookup named an upstream analysis that does not declare the class");
                }
            }
            None => {
                tracing::warn!(target: "incra::driver", %class_name, "external class could not be resolved on the classpath");
            }
        }
    }
}

/// Run the state machine and persist the result (§4.6 on-disk format, §4.7
/// Persist step). Skipped entirely if `run_once` returns `Cancelled`.
pub fn run(
    compiler: &dyn Compiler,
    config: RunConfig<'_>,
    backing_file: &Path,
    apis_file: &Path,
    mappers: &ReadWriteMappers,
) -> Result<RunOutcome, DriverError> {
    let store_apis = config.current_setup.store_apis;
    let outcome = run_once(compiler, config)?;

    incra_codec::write_analysis_file(backing_file, mappers, &outcome.analysis, &outcome.mini_setup)?;
    if store_apis {
        incra_codec::write_apis_file(apis_file, &outcome.analysis.apis)?;
    }
    AnalysisStore::invalidate(backing_file);

    Ok(outcome)
}
