//! Component C6: the binary serialization layer (§4.6).
//!
//! `Analysis` and `Apis` are each persisted as their own schema-versioned
//! file. Paths, stamps, and compiler options are rewritten at the boundary
//! by a caller-supplied [`ReadWriteMappers`], and class names referenced
//! from an `Apis` tree are interned once per file rather than once per
//! occurrence.

mod error;
mod file;
mod intern;
mod mappers;
mod remap;
mod version;
mod wire;

pub use error::CodecError;
pub use file::{read_analysis_file, read_apis_file, write_analysis_file, write_apis_file};
pub use intern::NameInterner;
pub use mappers::{Mapper, ReadWriteMappers};
pub use version::Version;
pub use wire::{from_wire_apis, to_wire_apis, WireApis};
