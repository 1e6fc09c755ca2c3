//! Incremental document snapshots.
//!
//! A [`SnapshotManager`] owns the live text of one original document and
//! its change log; it hands out immutable [`Snapshot`]s and computes the
//! merged [`ChangeRange`] between any two of them.

mod change;
mod manager;

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::base::{DocumentId, LineIndex, TextSize};

pub use change::{ChangeRange, TextChange};
pub use manager::{ChangeError, SnapshotManager};

/// Immutable text of a document at one version.
pub struct Snapshot {
    document: DocumentId,
    version: u32,
    text: Arc<str>,
    /// Change ranges from older versions, keyed by the older version.
    change_ranges: Mutex<FxHashMap<u32, ChangeRange>>,
}

impl Snapshot {
    pub(crate) fn new(document: DocumentId, version: u32, text: Arc<str>) -> Self {
        Self {
            document,
            version,
            text,
            change_ranges: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn document(&self) -> DocumentId {
        self.document
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Shared handle to the text.
    pub fn text_arc(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }

    pub fn len(&self) -> TextSize {
        TextSize::of(&*self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn line_index(&self) -> LineIndex {
        LineIndex::new(&self.text)
    }

    pub(crate) fn cached_change_range(&self, from_version: u32) -> Option<ChangeRange> {
        self.change_ranges.lock().get(&from_version).copied()
    }

    pub(crate) fn cache_change_range(&self, from_version: u32, range: ChangeRange) {
        self.change_ranges.lock().insert(from_version, range);
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("document", &self.document)
            .field("version", &self.version)
            .field("len", &self.text.len())
            .finish()
    }
}
