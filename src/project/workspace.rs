//! Open documents and their current projections.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::base::{DocumentId, DocumentPath};
use crate::codegen::GeneratorKind;
use crate::ide::Analysis;
use crate::options::Options;
use crate::snapshot::{ChangeError, Snapshot, SnapshotManager, TextChange};

use super::cancel::{CancellationToken, RequestGeneration};
use super::document::{Region, RegionDescriptor};
use super::document_set::DocumentSet;
use super::memo::GeneratorCache;
use super::synthetic::{Generation, RegionOutputs, assemble};

/// Errors from workspace updates.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkspaceError {
    #[error("{0} is not open")]
    UnknownDocument(DocumentId),
    #[error(transparent)]
    Change(#[from] ChangeError),
}

#[derive(Debug)]
struct DocumentState {
    snapshots: SnapshotManager,
    descriptors: Vec<RegionDescriptor>,
    /// Version stamped on the next generation's synthetic documents.
    synthetic_version: u32,
    /// Edits or region changes not yet projected.
    dirty: bool,
    /// Memo entries the published generation was built from.
    memo_keys: Vec<(u64, GeneratorKind)>,
}

#[derive(Debug, Default)]
struct WorkspaceState {
    documents: FxHashMap<DocumentId, DocumentState>,
    cache: GeneratorCache,
}

/// All open composite documents.
///
/// Updates go through `&self` and are serialized by an internal lock; the
/// projection of each document is published as an `Arc<Generation>` swapped
/// in one step, so a reader sees either the old generation or the new one.
/// The state lock is always taken before the generations lock.
#[derive(Debug, Default)]
pub struct Workspace {
    options: Options,
    paths: DocumentSet,
    state: RwLock<WorkspaceState>,
    generations: RwLock<FxHashMap<DocumentId, Arc<Generation>>>,
    requests: Arc<RequestGeneration>,
}

impl Workspace {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Open (or reopen) a document and project it.
    pub fn open(
        &self,
        path: &DocumentPath,
        text: impl Into<String>,
        version: u32,
        regions: Vec<RegionDescriptor>,
    ) -> DocumentId {
        let document = self.paths.intern(path);
        let state = DocumentState {
            snapshots: SnapshotManager::new(document, text, version, self.options.snapshots.clone()),
            descriptors: regions,
            synthetic_version: 0,
            dirty: true,
            memo_keys: Vec::new(),
        };
        self.state.write().documents.insert(document, state);
        self.requests.bump();
        tracing::debug!(%document, %path, version, "document opened");
        self.regenerate(document);
        document
    }

    pub fn close(&self, document: DocumentId) {
        let mut state = self.state.write();
        state.documents.remove(&document);
        self.generations.write().remove(&document);
        drop(state);
        self.paths.remove(document);
        self.requests.bump();
        tracing::debug!(%document, "document closed");
    }

    /// Record edits. The projection is rebuilt lazily, on the next
    /// [`Workspace::regenerate`] or [`Workspace::analysis`].
    pub fn apply_changes(
        &self,
        document: DocumentId,
        changes: impl IntoIterator<Item = TextChange>,
    ) -> Result<u32, WorkspaceError> {
        let mut state = self.state.write();
        let doc = state
            .documents
            .get_mut(&document)
            .ok_or(WorkspaceError::UnknownDocument(document))?;
        let version = doc.snapshots.push_changes(changes)?;
        doc.dirty = true;
        drop(state);
        self.requests.bump();
        Ok(version)
    }

    /// Replace the region layout, e.g. after an edit moved block boundaries.
    pub fn set_regions(
        &self,
        document: DocumentId,
        regions: Vec<RegionDescriptor>,
    ) -> Result<(), WorkspaceError> {
        let mut state = self.state.write();
        let doc = state
            .documents
            .get_mut(&document)
            .ok_or(WorkspaceError::UnknownDocument(document))?;
        doc.descriptors = regions;
        doc.dirty = true;
        Ok(())
    }

    /// Apply edits and the new region layout, then reproject.
    pub fn update(
        &self,
        document: DocumentId,
        changes: impl IntoIterator<Item = TextChange>,
        regions: Vec<RegionDescriptor>,
    ) -> Result<Arc<Generation>, WorkspaceError> {
        self.apply_changes(document, changes)?;
        self.set_regions(document, regions)?;
        self.regenerate(document)
            .ok_or(WorkspaceError::UnknownDocument(document))
    }

    /// Rebuild a document's projection from its newest text and publish it.
    pub fn regenerate(&self, document: DocumentId) -> Option<Arc<Generation>> {
        let mut guard = self.state.write();
        let WorkspaceState { documents, cache } = &mut *guard;
        let doc = documents.get_mut(&document)?;

        let snapshot = doc.snapshots.latest();
        let regions: Vec<Region> = doc
            .descriptors
            .iter()
            .filter_map(|descriptor| Region::read(document, descriptor, snapshot.text()))
            .collect();

        let codegen = &self.options.codegen;
        let mut memo_keys = Vec::new();
        let outputs: Vec<RegionOutputs> = regions
            .iter()
            .map(|region| {
                region
                    .kind
                    .generators()
                    .iter()
                    .map(|&generator| {
                        let (hash, output) = cache.get_or_generate(generator, region, codegen);
                        memo_keys.push((hash, generator));
                        (generator, output)
                    })
                    .collect()
            })
            .collect();

        doc.synthetic_version += 1;
        let synthetic_version = doc.synthetic_version;
        let generation = Arc::new(Generation {
            document,
            snapshot: Arc::clone(&snapshot),
            documents: assemble(document, synthetic_version, &regions, &outputs, codegen),
            regions,
        });
        doc.dirty = false;
        doc.memo_keys = memo_keys;
        let compacted = doc.snapshots.compact();

        // Keep memo entries any open document still uses.
        let live: FxHashSet<(u64, GeneratorKind)> = documents
            .values()
            .flat_map(|state| state.memo_keys.iter().copied())
            .collect();
        cache.retain(&live);

        // Published under the state lock: publish order is version order.
        self.generations.write().insert(document, Arc::clone(&generation));
        drop(guard);
        tracing::debug!(
            %document,
            source_version = snapshot.version(),
            synthetic_version,
            compacted,
            "generation published"
        );
        Some(generation)
    }

    /// The published projection of a document.
    pub fn generation(&self, document: DocumentId) -> Option<Arc<Generation>> {
        self.generations.read().get(&document).cloned()
    }

    /// The newest snapshot of a document.
    pub fn snapshot(&self, document: DocumentId) -> Option<Arc<Snapshot>> {
        let mut state = self.state.write();
        state
            .documents
            .get_mut(&document)
            .map(|doc| doc.snapshots.latest())
    }

    /// The newest version of a document.
    pub fn document_version(&self, document: DocumentId) -> Option<u32> {
        self.state
            .read()
            .documents
            .get(&document)
            .map(|doc| doc.snapshots.version())
    }

    /// Whether `generation` still describes the document's newest text.
    pub fn is_current(&self, generation: &Generation) -> bool {
        self.document_version(generation.document) == Some(generation.source_version())
            && self
                .state
                .read()
                .documents
                .get(&generation.document)
                .is_some_and(|doc| !doc.dirty)
    }

    pub fn documents(&self) -> Vec<DocumentId> {
        let mut ids: Vec<_> = self.state.read().documents.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn path(&self, document: DocumentId) -> Option<DocumentPath> {
        self.paths.path(document)
    }

    pub fn id_for(&self, path: &DocumentPath) -> Option<DocumentId> {
        self.paths.get(path)
    }

    /// A token cancelled by the next edit.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.requests.token()
    }

    /// Bring every document up to date and take a consistent view of all
    /// projections.
    pub fn analysis(&self) -> Analysis {
        let dirty: Vec<DocumentId> = self
            .state
            .read()
            .documents
            .iter()
            .filter(|(_, doc)| doc.dirty)
            .map(|(&id, _)| id)
            .collect();
        for document in dirty {
            self.regenerate(document);
        }

        let generations = self.generations.read().clone();
        let paths = generations
            .keys()
            .filter_map(|&id| self.paths.path(id).map(|path| (id, path)))
            .collect();
        Analysis::new(generations, paths)
    }
}
