//! Top-level on-disk file formats (§4.6).
//!
//! `Analysis` and `Apis` are stored as two separate files, mirroring how the
//! rest of the model keeps `Apis` lazily-decoded member lists apart from the
//! relations/stamps that are cheap to read in full on every run: a driver
//! that only needs to check stamps and relations never pays to decode class
//! structures it isn't going to diff.

use crate::error::CodecError;
use crate::mappers::ReadWriteMappers;
use crate::remap::{self, Direction};
use crate::version::Version;
use crate::wire::{from_wire_apis, to_wire_apis, WireApis};
use incra_analysis::{Analysis, Compilation, MiniSetup, SourceInfo};
use incra_api::Apis;
use incra_core::{File, Stamps};
use incra_relation::Relations;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
struct StoredAnalysis {
    stamps: Stamps,
    relations: Relations,
    source_infos: BTreeMap<File, SourceInfo>,
    compilations: Vec<Compilation>,
    mini_setup: MiniSetup,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
struct AnalysisFile {
    version: Version,
    body: StoredAnalysis,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
struct APIsFile {
    version: Version,
    body: WireApis,
}

fn stored_analysis(
    mappers: &ReadWriteMappers,
    direction: Direction,
    analysis: &Analysis,
    mini_setup: &MiniSetup,
) -> Result<StoredAnalysis, CodecError> {
    let stamps = remap::remap_stamps(mappers, direction, &analysis.stamps)?;

    let mut relations = Relations::new();
    relations.src_prod = remap::remap_relation_file_file(
        &mappers.source_file,
        &mappers.product_file,
        direction,
        &analysis.relations.src_prod,
    )?;
    relations.library_dep = remap::remap_relation_file_file(
        &mappers.source_file,
        &mappers.binary_file,
        direction,
        &analysis.relations.library_dep,
    )?;
    relations.library_class_name =
        remap::remap_relation_file_name(&mappers.binary_file, direction, &analysis.relations.library_class_name)?;
    relations.classes = remap::remap_relation_file_name(&mappers.source_file, direction, &analysis.relations.classes)?;
    relations.product_class_name = analysis.relations.product_class_name.clone();
    relations.member_ref_internal = analysis.relations.member_ref_internal.clone();
    relations.member_ref_external = analysis.relations.member_ref_external.clone();
    relations.inheritance_internal = analysis.relations.inheritance_internal.clone();
    relations.inheritance_external = analysis.relations.inheritance_external.clone();
    relations.local_inheritance_internal = analysis.relations.local_inheritance_internal.clone();
    relations.local_inheritance_external = analysis.relations.local_inheritance_external.clone();
    relations.names = analysis.relations.names.clone();

    let mut source_infos = BTreeMap::new();
    for (file, info) in &analysis.source_infos {
        let mapped = match direction {
            Direction::ToStored => mappers.source_file.to_stored(&file.as_path().to_path_buf()),
            Direction::FromStored => mappers.source_file.from_stored(&file.as_path().to_path_buf()),
        };
        source_infos.insert(File::from_canonical(mapped)?, info.clone());
    }

    let compilations = analysis
        .compilations
        .iter()
        .map(|c| remap::remap_compilation(mappers, direction, c))
        .collect();

    Ok(StoredAnalysis {
        stamps,
        relations,
        source_infos,
        compilations,
        mini_setup: remap::remap_mini_setup(mappers, direction, mini_setup),
    })
}

fn analysis_from_stored(stored: StoredAnalysis) -> (Analysis, MiniSetup) {
    let analysis = Analysis {
        stamps: stored.stamps,
        relations: stored.relations,
        apis: Apis::default(),
        source_infos: stored.source_infos,
        compilations: stored.compilations,
    };
    (analysis, stored.mini_setup)
}

/// Write `analysis` (minus `apis`, which lives in the companion `Apis` file)
/// and its `MiniSetup` to `path`.
pub fn write_analysis_file(
    path: &Path,
    mappers: &ReadWriteMappers,
    analysis: &Analysis,
    mini_setup: &MiniSetup,
) -> Result<(), CodecError> {
    let body = stored_analysis(mappers, Direction::ToStored, analysis, mini_setup)?;
    let file = AnalysisFile { version: Version::CURRENT, body };
    let bytes = bincode::serialize(&file)?;
    std::fs::write(path, bytes).map_err(|source| CodecError::Io { path: path.to_path_buf(), source })
}

/// Read back an `Analysis`/`MiniSetup` pair written by [`write_analysis_file`].
///
/// `analysis.apis` is always empty on return — callers load it separately
/// via [`read_apis_file`] and merge it in if `mini_setup.store_apis` is set.
pub fn read_analysis_file(path: &Path, mappers: &ReadWriteMappers) -> Result<(Analysis, MiniSetup), CodecError> {
    let bytes = std::fs::read(path).map_err(|source| CodecError::Io { path: path.to_path_buf(), source })?;
    let file: AnalysisFile = bincode::deserialize(&bytes)?;
    file.version.check_current()?;
    let stored = stored_analysis_from_disk(mappers, file.body)?;
    Ok(analysis_from_stored(stored))
}

fn stored_analysis_from_disk(mappers: &ReadWriteMappers, on_disk: StoredAnalysis) -> Result<StoredAnalysis, CodecError> {
    let (analysis, mini_setup) = analysis_from_stored(on_disk);
    stored_analysis(mappers, Direction::FromStored, &analysis, &mini_setup)
}

pub fn write_apis_file(path: &Path, apis: &Apis) -> Result<(), CodecError> {
    let body = to_wire_apis(apis)?;
    let file = APIsFile { version: Version::CURRENT, body };
    let bytes = bincode::serialize(&file)?;
    std::fs::write(path, bytes).map_err(|source| CodecError::Io { path: path.to_path_buf(), source })
}

pub fn read_apis_file(path: &Path) -> Result<Apis, CodecError> {
    let bytes = std::fs::read(path).map_err(|source| CodecError::Io { path: path.to_path_buf(), source })?;
    let file: APIsFile = bincode::deserialize(&bytes)?;
    file.version.check_current()?;
    from_wire_apis(&file.body)
}
