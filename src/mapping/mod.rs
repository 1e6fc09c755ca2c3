//! Position mapping between original and synthetic documents.
//!
//! - [`SourceMap`] - ordered Offset/Gate mappings with forward and backward queries
//! - [`Capabilities`] - which IDE features a mapping takes part in
//! - [`TeleportMap`] - mirrored positions inside one synthetic document

mod capability;
mod source_map;
mod teleport;

pub use capability::Capabilities;
pub use source_map::{Direction, MappedRange, Mapping, MappingData, MappingMode, SourceMap};
pub use teleport::{Teleport, TeleportDirection, TeleportMap};
