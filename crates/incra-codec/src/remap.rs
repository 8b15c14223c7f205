//! Applies a [`ReadWriteMappers`] across every `File`/path/option-bearing
//! part of an `Analysis`/`MiniSetup` (§4.6).
//!
//! Everything in `incra_relation`/`incra_core` already derives `Serialize`/
//! `Deserialize`, so the codec doesn't need a parallel "wire" struct here the
//! way `wire.rs` does for `Apis` — the only reason this module exists is to
//! rewrite paths (and stamps, and compiler options) on the way in and out.

use crate::error::CodecError;
use crate::mappers::{Mapper, ReadWriteMappers};
use incra_analysis::{Compilation, FileHash, MiniOptions, MiniSetup, Output, OutputGroup};
use incra_core::{File, Stamp, Stamps};
use incra_relation::Relation;
use std::path::PathBuf;

#[derive(Clone, Copy)]
pub enum Direction {
    ToStored,
    FromStored,
}

fn map_path(mapper: &Mapper<PathBuf>, direction: Direction, path: &PathBuf) -> PathBuf {
    match direction {
        Direction::ToStored => mapper.to_stored(path),
        Direction::FromStored => mapper.from_stored(path),
    }
}

fn map_stamp(mapper: &Mapper<Stamp>, direction: Direction, stamp: &Stamp) -> Stamp {
    match direction {
        Direction::ToStored => mapper.to_stored(stamp),
        Direction::FromStored => mapper.from_stored(stamp),
    }
}

fn map_string(mapper: &Mapper<String>, direction: Direction, value: &str) -> String {
    let value = value.to_string();
    match direction {
        Direction::ToStored => mapper.to_stored(&value),
        Direction::FromStored => mapper.from_stored(&value),
    }
}

fn remap_file(mapper: &Mapper<PathBuf>, direction: Direction, file: &File) -> Result<File, CodecError> {
    let mapped = map_path(mapper, direction, &file.as_path().to_path_buf());
    File::from_canonical(mapped).map_err(CodecError::from)
}

pub fn remap_stamps(mappers: &ReadWriteMappers, direction: Direction, stamps: &Stamps) -> Result<Stamps, CodecError> {
    let mut out = Stamps::new();
    for (file, stamp) in &stamps.sources {
        out.sources.insert(
            remap_file(&mappers.source_file, direction, file)?,
            map_stamp(&mappers.source_stamp, direction, stamp),
        );
    }
    for (file, stamp) in &stamps.products {
        out.products.insert(
            remap_file(&mappers.product_file, direction, file)?,
            map_stamp(&mappers.product_stamp, direction, stamp),
        );
    }
    for (file, stamp) in &stamps.binaries {
        out.binaries.insert(
            remap_file(&mappers.binary_file, direction, file)?,
            map_stamp(&mappers.binary_stamp, direction, stamp),
        );
    }
    Ok(out)
}

/// Remap both sides of a `File -> File` relation (e.g. `src_prod`).
pub fn remap_relation_file_file(
    left: &Mapper<PathBuf>,
    right: &Mapper<PathBuf>,
    direction: Direction,
    relation: &Relation<File, File>,
) -> Result<Relation<File, File>, CodecError> {
    let mut forward = std::collections::BTreeMap::new();
    for (a, bs) in relation.forward() {
        let mapped_a = remap_file(left, direction, a)?;
        let mut mapped_bs = std::collections::BTreeSet::new();
        for b in bs {
            mapped_bs.insert(remap_file(right, direction, b)?);
        }
        forward.insert(mapped_a, mapped_bs);
    }
    Ok(Relation::reconstruct_from_forward(forward))
}

/// Remap the `File` side of a `File -> String` relation (e.g. `classes`,
/// `library_class_name`). Class names are never path-like, so they pass
/// through unchanged.
pub fn remap_relation_file_name(
    mapper: &Mapper<PathBuf>,
    direction: Direction,
    relation: &Relation<File, String>,
) -> Result<Relation<File, String>, CodecError> {
    let mut forward = std::collections::BTreeMap::new();
    for (a, bs) in relation.forward() {
        forward.insert(remap_file(mapper, direction, a)?, bs.clone());
    }
    Ok(Relation::reconstruct_from_forward(forward))
}

pub fn remap_output(mappers: &ReadWriteMappers, direction: Direction, output: &Output) -> Output {
    match output {
        Output::SingleOutput(path) => Output::SingleOutput(map_path(&mappers.output_dir, direction, path)),
        Output::MultipleOutput(groups) => Output::MultipleOutput(
            groups
                .iter()
                .map(|group| OutputGroup {
                    source_dir: map_path(&mappers.source_dir, direction, &group.source_dir),
                    target_dir: map_path(&mappers.output_dir, direction, &group.target_dir),
                })
                .collect(),
        ),
    }
}

fn remap_file_hash(mappers: &ReadWriteMappers, direction: Direction, hash: &FileHash) -> FileHash {
    FileHash {
        file: map_path(&mappers.classpath_entry, direction, &hash.file),
        hash: hash.hash.clone(),
    }
}

fn remap_mini_options(mappers: &ReadWriteMappers, direction: Direction, options: &MiniOptions) -> MiniOptions {
    MiniOptions {
        classpath_hash: options
            .classpath_hash
            .iter()
            .map(|hash| remap_file_hash(mappers, direction, hash))
            .collect(),
        scalac_options: options
            .scalac_options
            .iter()
            .map(|opt| map_string(&mappers.scalac_option, direction, opt))
            .collect(),
        javac_options: options
            .javac_options
            .iter()
            .map(|opt| map_string(&mappers.javac_option, direction, opt))
            .collect(),
    }
}

pub fn remap_compilation(mappers: &ReadWriteMappers, direction: Direction, compilation: &Compilation) -> Compilation {
    Compilation {
        start_time_millis: compilation.start_time_millis,
        output: remap_output(mappers, direction, &compilation.output),
    }
}

pub fn remap_mini_setup(mappers: &ReadWriteMappers, direction: Direction, setup: &MiniSetup) -> MiniSetup {
    MiniSetup {
        output: remap_output(mappers, direction, &setup.output),
        options: remap_mini_options(mappers, direction, &setup.options),
        compiler_version: setup.compiler_version.clone(),
        compile_order: setup.compile_order,
        store_apis: setup.store_apis,
        extra: setup.extra.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewriting_mappers() -> ReadWriteMappers {
        let mut mappers = ReadWriteMappers::default();
        mappers.source_file = Mapper::new(
            |p: &PathBuf| PathBuf::from("/stored").join(p.strip_prefix("/real").unwrap_or(p)),
            |p: &PathBuf| PathBuf::from("/real").join(p.strip_prefix("/stored").unwrap_or(p)),
        );
        mappers
    }

    #[test]
    fn stamps_round_trip_through_to_stored_and_back() {
        let mappers = rewriting_mappers();
        let mut stamps = Stamps::new();
        let file = File::from_canonical("/real/a/Foo.java").unwrap();
        stamps.sources.insert(file.clone(), Stamp::Empty);

        let stored = remap_stamps(&mappers, Direction::ToStored, &stamps).unwrap();
        assert!(stored.sources.contains_key(&File::from_canonical("/stored/a/Foo.java").unwrap()));

        let restored = remap_stamps(&mappers, Direction::FromStored, &stored).unwrap();
        assert_eq!(restored, stamps);
    }

    #[test]
    fn file_file_relation_remaps_both_sides() {
        let mappers = rewriting_mappers();
        let mut rel: Relation<File, File> = Relation::new();
        let src = File::from_canonical("/real/a/Foo.java").unwrap();
        let prod = File::from_canonical("/real/out/Foo.class").unwrap();
        rel.add(src, prod);

        let stored = remap_relation_file_file(&mappers.source_file, &mappers.source_file, Direction::ToStored, &rel).unwrap();
        assert!(stored.check_bidirectional());
        assert!(stored
            .forward_for(&File::from_canonical("/stored/a/Foo.java").unwrap())
            .any(|p| *p == File::from_canonical("/stored/out/Foo.class").unwrap()));
    }
}
