//! Completion.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::base::{DocumentId, TextRange, TextSize};
use crate::mapping::Capabilities;

use super::analysis::Analysis;
use super::engine::CheckingEngine;

/// A completion item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: SmolStr,
    pub detail: Option<Arc<str>>,
    /// Original range the item replaces; `None` inserts at the cursor.
    pub replace: Option<TextRange>,
}

/// Completions from every synthetic position of `offset` that allows
/// completion, unique by label in engine order.
///
/// An item whose replace range does not map back is kept as a plain insert.
pub fn completions(
    analysis: &Analysis,
    engine: &dyn CheckingEngine,
    document: DocumentId,
    offset: TextSize,
) -> Vec<CompletionItem> {
    let mut labels = FxHashSet::default();
    let mut items = Vec::new();
    for hit in analysis.map_to_synthetic(document, TextRange::empty(offset), Capabilities::COMPLETION) {
        let Some(file) = analysis.synthetic(hit.id) else {
            continue;
        };
        for found in engine.completions(file, hit.range.start()) {
            if !labels.insert(found.label.clone()) {
                continue;
            }
            let replace = found.replace.and_then(|range| {
                analysis
                    .map_to_original_with(hit.id, range, Capabilities::COMPLETION)
                    .into_iter()
                    .next()
                    .map(|location| location.range)
            });
            items.push(CompletionItem {
                label: found.label,
                detail: found.detail,
                replace,
            });
        }
    }
    items
}
