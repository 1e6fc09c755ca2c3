//! Hover.

use std::sync::Arc;

use crate::base::{DocumentId, TextRange, TextSize};
use crate::mapping::Capabilities;

use super::analysis::Analysis;
use super::engine::CheckingEngine;

/// Hover contents at an original-document range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoverResult {
    pub document: DocumentId,
    pub range: TextRange,
    pub contents: Arc<str>,
}

/// The first hover the engine gives at any synthetic position of `offset`.
///
/// When the engine's hover range does not map back, the result is anchored
/// at `offset` itself.
pub fn hover(
    analysis: &Analysis,
    engine: &dyn CheckingEngine,
    document: DocumentId,
    offset: TextSize,
) -> Option<HoverResult> {
    analysis
        .map_to_synthetic(document, TextRange::empty(offset), Capabilities::HOVER)
        .into_iter()
        .find_map(|hit| {
            let file = analysis.synthetic(hit.id)?;
            let found = engine.hover(file, hit.range.start())?;
            let range = analysis
                .map_to_original_with(hit.id, found.range, Capabilities::HOVER)
                .into_iter()
                .find(|location| location.document == document)
                .map_or(TextRange::empty(offset), |location| location.range);
            Some(HoverResult {
                document,
                range,
                contents: found.contents,
            })
        })
}
