//! Diagnostics: engine findings shown at original-document positions.
//!
//! The engine reports against synthetic text. Each finding is mapped back
//! through mappings that carry [`Capabilities::DIAGNOSTICS`]; a finding with
//! no such mapping sits on generated glue and is dropped rather than shown
//! somewhere wrong.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::base::{DocumentId, LineColRange, TextRange};
use crate::mapping::Capabilities;
use crate::project::{CancellationToken, Cancelled};

use super::analysis::Analysis;
use super::engine::CheckingEngine;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

/// A diagnostic at an original-document range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub document: DocumentId,
    pub range: TextRange,
    /// `range` as lines and columns of the snapshot it was computed on.
    pub position: LineColRange,
    pub severity: Severity,
    /// Engine code, e.g. "2304".
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
    /// Version of the original document the position refers to.
    pub version: u32,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(document: DocumentId, range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self::new(document, range, Severity::Error, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(document: DocumentId, range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self::new(document, range, Severity::Warning, message)
    }

    fn new(
        document: DocumentId,
        range: TextRange,
        severity: Severity,
        message: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            document,
            range,
            position: LineColRange::default(),
            severity,
            code: None,
            message: message.into(),
            version: 0,
        }
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    fn with_position(mut self, position: LineColRange, version: u32) -> Self {
        self.position = position;
        self.version = version;
        self
    }
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects mapped diagnostics, dropping duplicates.
///
/// Dual-spelled names map two synthetic ranges onto one source range, so the
/// same finding can arrive twice.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    seen: FxHashSet<(DocumentId, TextRange, Arc<str>)>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic. Returns `false` when an identical one was already
    /// collected.
    pub fn add(&mut self, diagnostic: Diagnostic) -> bool {
        let key = (
            diagnostic.document,
            diagnostic.range,
            Arc::clone(&diagnostic.message),
        );
        if !self.seen.insert(key) {
            return false;
        }
        self.diagnostics.push(diagnostic);
        true
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Finish, sorted by position.
    pub fn finish(mut self) -> Vec<Diagnostic> {
        self.diagnostics
            .sort_by_key(|d| (d.document, d.range.start(), d.range.end()));
        self.diagnostics
    }
}

// ============================================================================
// FUNNELS
// ============================================================================

/// Ask the engine for every synthetic document of `document` and map the
/// findings back.
pub fn document_diagnostics(
    analysis: &Analysis,
    engine: &dyn CheckingEngine,
    document: DocumentId,
) -> Vec<Diagnostic> {
    let mut collector = DiagnosticCollector::new();
    collect_document(analysis, engine, document, &mut collector);
    collector.finish()
}

/// Diagnostics for every document, checking `token` between documents.
pub fn workspace_diagnostics(
    analysis: &Analysis,
    engine: &dyn CheckingEngine,
    token: &CancellationToken,
) -> Result<Vec<Diagnostic>, Cancelled> {
    let mut collector = DiagnosticCollector::new();
    for document in analysis.documents() {
        if let Err(cancelled) = token.check() {
            tracing::debug!(%document, collected = collector.len(), "workspace diagnostics cancelled");
            return Err(cancelled);
        }
        collect_document(analysis, engine, document, &mut collector);
    }
    Ok(collector.finish())
}

fn collect_document(
    analysis: &Analysis,
    engine: &dyn CheckingEngine,
    document: DocumentId,
    collector: &mut DiagnosticCollector,
) {
    let Some(generation) = analysis.generation(document) else {
        return;
    };
    let line_index = generation.snapshot.line_index();
    let version = generation.source_version();

    for synthetic in generation.synthetic_documents() {
        for found in engine.diagnostics(synthetic) {
            let mapped = analysis
                .map_to_original_with(synthetic.id, found.range, Capabilities::DIAGNOSTICS)
                .into_iter()
                .next();
            let Some(location) = mapped else {
                tracing::trace!(
                    synthetic = %synthetic.id,
                    start = u32::from(found.range.start()),
                    end = u32::from(found.range.end()),
                    message = %found.message,
                    "unmapped diagnostic dropped"
                );
                continue;
            };
            let mut diagnostic = Diagnostic::new(document, location.range, found.severity, found.message)
                .with_position(line_index.line_col_range(location.range), version);
            diagnostic.code = found.code;
            collector.add(diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::range_at;

    #[test]
    fn test_severity_to_lsp() {
        assert_eq!(Severity::Error.to_lsp(), 1);
        assert_eq!(Severity::Hint.to_lsp(), 4);
    }

    #[test]
    fn test_collector_drops_duplicates() {
        let doc = DocumentId::new(0);
        let mut collector = DiagnosticCollector::new();
        assert!(collector.add(Diagnostic::error(doc, range_at(3, 2), "bad")));
        assert!(!collector.add(Diagnostic::error(doc, range_at(3, 2), "bad")));
        assert!(collector.add(Diagnostic::warning(doc, range_at(0, 1), "meh").with_code("W1")));
        assert_eq!(collector.error_count(), 1);

        let all = collector.finish();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].range, range_at(0, 1));
        assert_eq!(all[0].code.as_deref(), Some("W1"));
    }
}
