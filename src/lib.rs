//! # vellum-base
//!
//! Embedded-language projection and bidirectional source mapping for
//! component files: one document holding `<script>`, `<script setup>`,
//! `<template>` and `<style>` regions.
//!
//! Each region is projected into synthetic documents an external checking
//! engine understands; every token written carries a mapping back to the
//! original text, so editor requests can be translated in and answers
//! translated out.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → Analysis façade, engine seam, diagnostics/references/rename/...
//!   ↓
//! project   → Workspace: documents, memoized generation, atomic swap
//!   ↓
//! codegen   → Region generators (script, script setup, template, style)
//!   ↓
//! snapshot  → Incremental snapshots and merged change ranges
//!   ↓
//! mapping   → SourceMap (Offset/Gate), Capabilities, TeleportMap
//!   ↓
//! base      → Primitives (DocumentId, TextRange, LineIndex)
//! ```
//!
//! ## Example
//!
//! ```
//! use vellum::base::{DocumentPath, range_at};
//! use vellum::codegen::RegionKind;
//! use vellum::mapping::Capabilities;
//! use vellum::project::{RegionDescriptor, Workspace};
//! use vellum::Options;
//!
//! let text = "<template>{{ x }}</template>";
//! let workspace = Workspace::new(Options::default());
//! let doc = workspace.open(
//!     &DocumentPath::new("/app/Comp.vue"),
//!     text,
//!     1,
//!     vec![RegionDescriptor::new(RegionKind::Template, range_at(10, 7))],
//! );
//!
//! let analysis = workspace.analysis();
//! let hits = analysis.map_to_synthetic(doc, range_at(13, 1), Capabilities::REFERENCES);
//! assert_eq!(hits.len(), 1);
//! ```

/// Foundation types: DocumentId, DocumentPath, TextRange, LineIndex
pub mod base;

/// Position mapping: SourceMap, Capabilities, TeleportMap
pub mod mapping;

/// Region generators
pub mod codegen;

/// Incremental snapshot manager
pub mod snapshot;

/// Workspace: open documents and their projections
pub mod project;

/// IDE features built on the Analysis façade
pub mod ide;

/// Configuration
pub mod options;

// Re-export commonly needed items
pub use base::{DocumentId, DocumentPath, LineCol, LineIndex, TextRange, TextSize};
pub use ide::{Analysis, CheckingEngine};
pub use mapping::{Capabilities, Mapping, MappingMode, SourceMap, TeleportMap};
pub use options::{CodegenOptions, Options, SnapshotOptions};
pub use project::Workspace;
