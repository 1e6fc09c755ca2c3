//! Find references across the projection.
//!
//! The request position maps to one or more synthetic positions (a dual
//! spelled name maps to both spellings). The engine is asked at each; every
//! answer is mapped back. An answer on generated glue with no mapping of its
//! own is followed through teleports: the mirrored range is mapped back, and
//! the engine is asked again there so the mirrored binding's own uses are
//! found too.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::base::{DocumentId, TextRange, TextSize};
use crate::mapping::{Capabilities, MappingData};
use crate::project::{SyntheticDocument, SyntheticId};

use super::analysis::{Analysis, OriginalLocation};
use super::engine::{CheckingEngine, EngineLocation};

/// One reference in an original document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    pub document: DocumentId,
    pub range: TextRange,
    /// Spelling of the synthetic text the reference was found as.
    pub data: MappingData,
}

impl From<OriginalLocation> for Reference {
    fn from(location: OriginalLocation) -> Self {
        Self {
            document: location.document,
            range: location.range,
            data: location.data,
        }
    }
}

/// All references to the symbol at `offset`, deduplicated and sorted.
pub fn find_references(
    analysis: &Analysis,
    engine: &dyn CheckingEngine,
    document: DocumentId,
    offset: TextSize,
) -> Vec<Reference> {
    let locations = walk(
        analysis,
        document,
        offset,
        Capabilities::REFERENCES,
        |file, at| engine.references(file, at),
    );
    let mut references: Vec<Reference> = locations.into_iter().map(Reference::from).collect();
    references.sort_by_key(|r| (r.document, r.range.start(), r.range.end()));
    references
}

/// Map `offset` in, query through `query`, and map every answer back with
/// `required`, expanding through teleports.
///
/// Results are unique by `(document, range)`; the first answer wins.
pub(crate) fn walk(
    analysis: &Analysis,
    document: DocumentId,
    offset: TextSize,
    required: Capabilities,
    query: impl Fn(&SyntheticDocument, TextSize) -> Vec<EngineLocation>,
) -> Vec<OriginalLocation> {
    let mut pending: VecDeque<(SyntheticId, TextSize)> = analysis
        .map_to_synthetic(document, TextRange::empty(offset), required)
        .into_iter()
        .map(|hit| (hit.id, hit.range.start()))
        .collect();
    let mut queried: FxHashSet<(SyntheticId, TextSize)> = FxHashSet::default();
    let mut seen_answers: FxHashSet<EngineLocation> = FxHashSet::default();
    let mut seen_results: FxHashSet<(DocumentId, TextRange)> = FxHashSet::default();
    let mut results = Vec::new();

    while let Some((id, at)) = pending.pop_front() {
        if !queried.insert((id, at)) {
            continue;
        }
        let Some(file) = analysis.synthetic(id) else {
            continue;
        };
        for answer in query(file, at) {
            if !seen_answers.insert(answer.clone()) {
                continue;
            }
            let (mapped, followed) = analysis.map_back_expanded(answer.file, answer.range, required);
            pending.extend(followed.into_iter().map(|mirrored| (answer.file, mirrored.start())));
            if mapped.is_empty() {
                tracing::trace!(
                    synthetic = %answer.file,
                    start = u32::from(answer.range.start()),
                    "unmapped engine location skipped"
                );
            }
            for location in mapped {
                if seen_results.insert((location.document, location.range)) {
                    results.push(location);
                }
            }
        }
    }
    results
}
