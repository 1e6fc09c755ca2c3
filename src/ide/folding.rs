//! Folding ranges: collapsible regions reported by the engine.
//!
//! Each end of an engine range is mapped back on its own, so a fold that
//! spans several mapped runs (script text split around generated inserts)
//! still lands in the source.

use crate::base::{DocumentId, LineIndex, TextRange};
use crate::mapping::Capabilities;

use super::analysis::Analysis;
use super::engine::CheckingEngine;

/// A folding range with position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldingRange {
    pub range: TextRange,
    /// Start line (0-indexed)
    pub start_line: u32,
    /// Start column (0-indexed)
    pub start_col: u32,
    /// End line (0-indexed)
    pub end_line: u32,
    /// End column (0-indexed)
    pub end_col: u32,
}

/// Get folding ranges for a document.
///
/// Only multi-line ranges are returned, sorted by start line.
pub fn folding_ranges(
    analysis: &Analysis,
    engine: &dyn CheckingEngine,
    document: DocumentId,
) -> Vec<FoldingRange> {
    let Some(generation) = analysis.generation(document) else {
        return Vec::new();
    };
    let line_index = LineIndex::new(generation.snapshot.text());

    let mut ranges: Vec<FoldingRange> = Vec::new();
    for synthetic in generation.synthetic_documents() {
        for found in engine.folding_ranges(synthetic) {
            let point = |at| {
                analysis
                    .map_to_original_with(synthetic.id, TextRange::empty(at), Capabilities::FOLDING)
                    .into_iter()
                    .next()
                    .map(|location| location.range.start())
            };
            let (Some(start), Some(end)) = (point(found.start()), point(found.end())) else {
                continue;
            };
            if end <= start {
                continue;
            }
            let position = line_index.line_col_range(TextRange::new(start, end));
            if position.end.line <= position.start.line {
                continue;
            }
            ranges.push(FoldingRange {
                range: TextRange::new(start, end),
                start_line: position.start.line,
                start_col: position.start.col,
                end_line: position.end.line,
                end_col: position.end.col,
            });
        }
    }

    ranges.sort_by_key(|r| (r.start_line, r.end_line, r.range.start(), r.range.end()));
    ranges.dedup_by_key(|r| r.range);
    ranges
}
