//! The checking engine seam.
//!
//! The engine (a script type checker, a markup or style language service)
//! lives outside this crate. It sees synthetic documents only and answers in
//! synthetic coordinates; the funnels in this module's siblings translate in
//! both directions.

use std::sync::Arc;

use smol_str::SmolStr;

use crate::base::{TextRange, TextSize};
use crate::project::{SyntheticDocument, SyntheticId};

use super::diagnostics::Severity;
use super::semantic_tokens::TokenType;

/// A location the engine reports, possibly in another synthetic document.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EngineLocation {
    pub file: SyntheticId,
    pub range: TextRange,
}

impl EngineLocation {
    pub fn new(file: SyntheticId, range: TextRange) -> Self {
        Self { file, range }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineDiagnostic {
    pub range: TextRange,
    pub severity: Severity,
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
}

impl EngineDiagnostic {
    pub fn new(range: TextRange, severity: Severity, message: impl Into<Arc<str>>) -> Self {
        Self {
            range,
            severity,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineHover {
    /// Range the hover applies to.
    pub range: TextRange,
    pub contents: Arc<str>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineCompletion {
    pub label: SmolStr,
    pub detail: Option<Arc<str>>,
    /// Range the completion replaces, if not just the insertion point.
    pub replace: Option<TextRange>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineToken {
    pub range: TextRange,
    pub token_type: TokenType,
}

/// Language service over synthetic documents.
///
/// Every method has an empty default so an engine implements only what it
/// supports.
pub trait CheckingEngine {
    fn diagnostics(&self, _file: &SyntheticDocument) -> Vec<EngineDiagnostic> {
        Vec::new()
    }

    fn references(&self, _file: &SyntheticDocument, _offset: TextSize) -> Vec<EngineLocation> {
        Vec::new()
    }

    /// Locations a rename at `offset` edits. Defaults to the references.
    fn rename_locations(&self, file: &SyntheticDocument, offset: TextSize) -> Vec<EngineLocation> {
        self.references(file, offset)
    }

    fn hover(&self, _file: &SyntheticDocument, _offset: TextSize) -> Option<EngineHover> {
        None
    }

    fn completions(&self, _file: &SyntheticDocument, _offset: TextSize) -> Vec<EngineCompletion> {
        Vec::new()
    }

    fn folding_ranges(&self, _file: &SyntheticDocument) -> Vec<TextRange> {
        Vec::new()
    }

    fn semantic_tokens(&self, _file: &SyntheticDocument) -> Vec<EngineToken> {
        Vec::new()
    }
}

impl<E: CheckingEngine + ?Sized> CheckingEngine for &E {
    fn diagnostics(&self, file: &SyntheticDocument) -> Vec<EngineDiagnostic> {
        (**self).diagnostics(file)
    }

    fn references(&self, file: &SyntheticDocument, offset: TextSize) -> Vec<EngineLocation> {
        (**self).references(file, offset)
    }

    fn rename_locations(&self, file: &SyntheticDocument, offset: TextSize) -> Vec<EngineLocation> {
        (**self).rename_locations(file, offset)
    }

    fn hover(&self, file: &SyntheticDocument, offset: TextSize) -> Option<EngineHover> {
        (**self).hover(file, offset)
    }

    fn completions(&self, file: &SyntheticDocument, offset: TextSize) -> Vec<EngineCompletion> {
        (**self).completions(file, offset)
    }

    fn folding_ranges(&self, file: &SyntheticDocument) -> Vec<TextRange> {
        (**self).folding_ranges(file)
    }

    fn semantic_tokens(&self, file: &SyntheticDocument) -> Vec<EngineToken> {
        (**self).semantic_tokens(file)
    }
}
