//! Analysis: a consistent, read-only view over every published projection.
//!
//! IDE handlers take an [`Analysis`] from
//! [`Workspace::analysis`](crate::project::Workspace::analysis), translate an
//! original range into synthetic ranges, ask the checking engine, and map the
//! answers back. The view is a set of `Arc<Generation>`s captured in one
//! step; later edits publish new generations without disturbing it.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::base::{DocumentId, DocumentPath, TextRange};
use crate::mapping::{Capabilities, Direction, MappingData, TeleportDirection};
use crate::project::{Generation, SyntheticDocument, SyntheticId};

/// A range inside a synthetic document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntheticLocation {
    pub id: SyntheticId,
    pub range: TextRange,
    /// Capabilities of the mapping that produced this location.
    pub capabilities: Capabilities,
    /// Spelling of the synthetic text at `range`.
    pub data: MappingData,
}

/// A range inside an original document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OriginalLocation {
    pub document: DocumentId,
    pub range: TextRange,
    pub capabilities: Capabilities,
    pub data: MappingData,
}

/// Snapshot of all projections.
#[derive(Clone, Debug, Default)]
pub struct Analysis {
    generations: Arc<FxHashMap<DocumentId, Arc<Generation>>>,
    paths: Arc<FxHashMap<DocumentId, DocumentPath>>,
}

impl Analysis {
    pub fn new(
        generations: FxHashMap<DocumentId, Arc<Generation>>,
        paths: FxHashMap<DocumentId, DocumentPath>,
    ) -> Self {
        Self {
            generations: Arc::new(generations),
            paths: Arc::new(paths),
        }
    }

    /// Documents in this view, in id order.
    pub fn documents(&self) -> Vec<DocumentId> {
        let mut ids: Vec<_> = self.generations.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn generation(&self, document: DocumentId) -> Option<&Arc<Generation>> {
        self.generations.get(&document)
    }

    pub fn path(&self, document: DocumentId) -> Option<&DocumentPath> {
        self.paths.get(&document)
    }

    /// Original text the document's generation was built from.
    pub fn source_text(&self, document: DocumentId) -> Option<&str> {
        self.generation(document).map(|g| g.snapshot.text())
    }

    pub fn synthetic(&self, id: SyntheticId) -> Option<&Arc<SyntheticDocument>> {
        self.generation(id.document)?.get(id.kind)
    }

    pub fn synthetic_text(&self, id: SyntheticId) -> Option<Arc<str>> {
        self.synthetic(id).map(|doc| Arc::clone(&doc.text))
    }

    /// Every synthetic document, grouped by original document in id order.
    pub fn synthetic_documents(&self) -> Vec<&Arc<SyntheticDocument>> {
        self.documents()
            .into_iter()
            .filter_map(|id| self.generation(id))
            .flat_map(|generation| generation.synthetic_documents())
            .collect()
    }

    /// Synthetic ranges for an original range, across every synthetic
    /// document of `document`, keeping only mappings that allow `required`.
    ///
    /// Within one synthetic document results follow mapping insertion order.
    pub fn map_to_synthetic(
        &self,
        document: DocumentId,
        range: TextRange,
        required: Capabilities,
    ) -> Vec<SyntheticLocation> {
        let Some(generation) = self.generation(document) else {
            return Vec::new();
        };
        generation
            .synthetic_documents()
            .flat_map(|doc| {
                doc.source_map
                    .query_with(range, Direction::Forward, required)
                    .map(|hit| SyntheticLocation {
                        id: doc.id,
                        range: hit.range,
                        capabilities: hit.mapping.capabilities,
                        data: hit.mapping.data.clone(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Original ranges for a synthetic range, with each mapping's
    /// capabilities so the caller can filter per feature.
    pub fn map_to_original(&self, id: SyntheticId, range: TextRange) -> Vec<OriginalLocation> {
        self.map_to_original_with(id, range, Capabilities::empty())
    }

    /// [`Analysis::map_to_original`] keeping only mappings that allow
    /// `required`.
    pub fn map_to_original_with(
        &self,
        id: SyntheticId,
        range: TextRange,
        required: Capabilities,
    ) -> Vec<OriginalLocation> {
        let Some(doc) = self.synthetic(id) else {
            return Vec::new();
        };
        doc.source_map
            .query_with(range, Direction::Backward, required)
            .map(|hit| OriginalLocation {
                document: id.document,
                range: hit.range,
                capabilities: hit.mapping.capabilities,
                data: hit.mapping.data.clone(),
            })
            .collect()
    }

    /// Mirrored ranges of `range` in either direction.
    pub fn resolve_teleports(&self, id: SyntheticId, range: TextRange) -> Vec<TextRange> {
        self.resolve_teleports_with(id, range, Capabilities::empty())
    }

    /// Mirrored ranges whose teleport allows `required`.
    pub fn resolve_teleports_with(
        &self,
        id: SyntheticId,
        range: TextRange,
        required: Capabilities,
    ) -> Vec<TextRange> {
        self.synthetic(id)
            .map(|doc| doc.teleports.resolve_all(range, required))
            .unwrap_or_default()
    }

    /// Mirrored ranges in one direction.
    pub fn resolve_teleports_toward(
        &self,
        id: SyntheticId,
        range: TextRange,
        direction: TeleportDirection,
        required: Capabilities,
    ) -> Vec<TextRange> {
        self.synthetic(id)
            .map(|doc| doc.teleports.resolve(range, direction, required))
            .unwrap_or_default()
    }

    /// Map a synthetic range back, following teleports when the range itself
    /// has no mapping with `required`.
    ///
    /// Engine answers often land on generated glue (a context key that
    /// mirrors a declaration); the mirrored side is where the source lives.
    /// Also returns the mirrored ranges that were followed.
    pub(crate) fn map_back_expanded(
        &self,
        id: SyntheticId,
        range: TextRange,
        required: Capabilities,
    ) -> (Vec<OriginalLocation>, Vec<TextRange>) {
        let direct = self.map_to_original_with(id, range, required);
        if !direct.is_empty() {
            return (direct, Vec::new());
        }
        let mirrored = self.resolve_teleports_with(id, range, required);
        let locations = mirrored
            .iter()
            .flat_map(|&mirror| self.map_to_original_with(id, mirror, required))
            .collect();
        (locations, mirrored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::range_at;
    use crate::codegen::RegionKind;
    use crate::options::Options;
    use crate::project::{RegionDescriptor, SyntheticKind, Workspace};

    fn workspace(text: &str, regions: Vec<RegionDescriptor>) -> (Workspace, DocumentId) {
        let ws = Workspace::new(Options::default());
        let id = ws.open(&DocumentPath::new("/app/Comp.vue"), text, 1, regions);
        (ws, id)
    }

    #[test]
    fn test_map_to_synthetic_and_back() {
        let text = "<template>{{ x }}</template>";
        let (ws, doc) = workspace(text, vec![RegionDescriptor::new(RegionKind::Template, range_at(10, 7))]);
        let analysis = ws.analysis();

        let x = range_at(13, 1);
        let hits = analysis.map_to_synthetic(doc, x, Capabilities::REFERENCES);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.kind, SyntheticKind::Script);
        assert_eq!(u32::from(hits[0].range.len()), 1);
        assert!(hits[0].capabilities.contains(Capabilities::REFERENCES));

        let script = analysis.synthetic_text(hits[0].id).unwrap();
        assert_eq!(&script[hits[0].range], "x");

        let back = analysis.map_to_original(hits[0].id, hits[0].range);
        assert_eq!(back[0].range, x);
        assert_eq!(back[0].document, doc);
    }

    #[test]
    fn test_unknown_document_is_a_miss() {
        let analysis = Analysis::default();
        let doc = DocumentId::new(7);
        assert!(analysis.map_to_synthetic(doc, range_at(0, 1), Capabilities::HOVER).is_empty());
        let id = SyntheticId::new(doc, SyntheticKind::Script);
        assert!(analysis.map_to_original(id, range_at(0, 1)).is_empty());
        assert!(analysis.synthetic_text(id).is_none());
        assert!(analysis.resolve_teleports(id, range_at(0, 1)).is_empty());
    }

    #[test]
    fn test_map_back_expanded_follows_teleport() {
        let text = "<script setup>const count = 1</script>";
        let (ws, doc) = workspace(
            text,
            vec![RegionDescriptor::new(RegionKind::ScriptSetup, range_at(14, 15))],
        );
        let analysis = ws.analysis();
        let id = SyntheticId::new(doc, SyntheticKind::Script);
        let script = analysis.synthetic_text(id).unwrap();

        // The context key `count` is generated; it has no mapping of its own.
        let key_start = script.find("count: ").unwrap() as u32;
        let key = range_at(key_start, 5);
        assert!(analysis.map_to_original(id, key).is_empty());

        let (back, followed) = analysis.map_back_expanded(id, key, Capabilities::RENAME);
        assert_eq!(back.len(), 1);
        assert_eq!(&text[back[0].range], "count");
        assert_eq!(followed.len(), 1);
        assert_eq!(&script[followed[0]], "count");

        // A range with its own mapping is not expanded.
        let (direct, followed) = analysis.map_back_expanded(id, followed[0], Capabilities::RENAME);
        assert!(!direct.is_empty());
        assert!(followed.is_empty());
    }
}
