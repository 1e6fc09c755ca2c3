//! IDE features: high-level APIs for editor request handlers.
//!
//! This module is the interface between the projections built by
//! [`project`](crate::project) and a language-server layer. Each function
//! corresponds to an editor request and works in original-document
//! coordinates; the checking engine behind [`CheckingEngine`] only ever sees
//! synthetic documents.
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: take an [`Analysis`] and an engine, return data
//! 2. **No LSP types**: our own types, converted at the protocol boundary
//! 3. **Capability gated**: every funnel maps through mappings allowing its
//!    feature, and drops what does not map
//!
//! ## Usage
//!
//! ```ignore
//! use vellum::ide::{self, Analysis};
//!
//! let analysis = workspace.analysis();
//! let refs = ide::find_references(&analysis, &engine, doc, offset);
//! ```

mod analysis;
mod completion;
mod diagnostics;
mod engine;
mod export;
mod folding;
mod hover;
mod references;
mod rename;
mod semantic_tokens;

pub use analysis::{Analysis, OriginalLocation, SyntheticLocation};
pub use completion::{CompletionItem, completions};
pub use diagnostics::{
    Diagnostic, DiagnosticCollector, Severity, document_diagnostics, workspace_diagnostics,
};
pub use engine::{
    CheckingEngine, EngineCompletion, EngineDiagnostic, EngineHover, EngineLocation, EngineToken,
};
pub use export::{ExportError, dump_synthetic_documents};
pub use folding::{FoldingRange, folding_ranges};
pub use hover::{HoverResult, hover};
pub use references::{Reference, find_references};
pub use rename::{RenameEdit, rename};
pub use semantic_tokens::{SemanticToken, TokenType, semantic_tokens};
