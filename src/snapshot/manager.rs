//! Per-document change log and snapshot cache.

use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::base::{DocumentId, TextRange, TextSize};
use crate::options::SnapshotOptions;

use super::Snapshot;
use super::change::{ChangeRange, TextChange};

/// A change the manager refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChangeError {
    #[error("change range {start}..{end} is outside the document (length {len})")]
    OutOfBounds { start: u32, end: u32, len: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ChangeState {
    /// Only described; the buffer does not contain it yet.
    Pending,
    /// Folded into the buffer. `start` and `removed` let it be reverted.
    Applied { start: usize, removed: String },
}

#[derive(Debug)]
struct ChangeEntry {
    /// Version the document has after this change.
    version: u32,
    change: TextChange,
    state: ChangeState,
}

/// Tracks one document's edits and hands out versioned snapshots.
///
/// Changes are recorded as pending descriptions and folded into the live
/// buffer only when a snapshot at or after them is requested. Older
/// versions are rebuilt by reverting applied changes, so any version from
/// [`SnapshotManager::base_version`] on stays reachable until
/// [`SnapshotManager::compact`] drops it.
#[derive(Debug)]
pub struct SnapshotManager {
    document: DocumentId,
    options: SnapshotOptions,
    /// Text at `applied_version`.
    buffer: String,
    applied_version: u32,
    /// Oldest version that can still be rebuilt.
    base_version: u32,
    /// Document length after every recorded change.
    latest_len: TextSize,
    changes: VecDeque<ChangeEntry>,
    handed_out: FxHashMap<u32, Weak<Snapshot>>,
    recent: VecDeque<Arc<Snapshot>>,
}

impl SnapshotManager {
    pub fn new(
        document: DocumentId,
        text: impl Into<String>,
        version: u32,
        options: SnapshotOptions,
    ) -> Self {
        let buffer = text.into();
        Self {
            document,
            options,
            latest_len: TextSize::of(buffer.as_str()),
            buffer,
            applied_version: version,
            base_version: version,
            changes: VecDeque::new(),
            handed_out: FxHashMap::default(),
            recent: VecDeque::new(),
        }
    }

    pub fn document(&self) -> DocumentId {
        self.document
    }

    /// Newest version.
    pub fn version(&self) -> u32 {
        self.changes.back().map_or(self.base_version, |entry| entry.version)
    }

    /// Oldest version a snapshot can still be built for.
    pub fn base_version(&self) -> u32 {
        self.base_version
    }

    /// Length of the newest text.
    pub fn len(&self) -> TextSize {
        self.latest_len
    }

    pub fn is_empty(&self) -> bool {
        self.latest_len == TextSize::from(0)
    }

    /// Number of changes not yet folded into the buffer.
    pub fn pending_count(&self) -> usize {
        self.changes
            .iter()
            .filter(|entry| entry.state == ChangeState::Pending)
            .count()
    }

    /// Record a change against the newest text. Returns the new version.
    pub fn push_change(&mut self, change: TextChange) -> Result<u32, ChangeError> {
        if change.range.end() > self.latest_len {
            return Err(ChangeError::OutOfBounds {
                start: change.range.start().into(),
                end: change.range.end().into(),
                len: self.latest_len.into(),
            });
        }
        let version = self.version() + 1;
        self.latest_len = change.apply_len(self.latest_len);
        self.changes.push_back(ChangeEntry {
            version,
            change,
            state: ChangeState::Pending,
        });
        tracing::trace!(document = %self.document, version, "change recorded");
        Ok(version)
    }

    /// Record several changes in order. Returns the newest version.
    pub fn push_changes(
        &mut self,
        changes: impl IntoIterator<Item = TextChange>,
    ) -> Result<u32, ChangeError> {
        let mut version = self.version();
        for change in changes {
            version = self.push_change(change)?;
        }
        Ok(version)
    }

    /// The newest text, applying every pending change.
    pub fn text(&mut self) -> &str {
        let newest = self.version();
        self.apply_through(newest);
        &self.buffer
    }

    /// Snapshot of the newest version.
    pub fn latest(&mut self) -> Arc<Snapshot> {
        let newest = self.version();
        self.build(newest)
    }

    /// Snapshot of `version`, if it is still reachable.
    pub fn snapshot(&mut self, version: u32) -> Option<Arc<Snapshot>> {
        if version < self.base_version || version > self.version() {
            return None;
        }
        Some(self.build(version))
    }

    /// Net change between two snapshots of this document, `old` first.
    ///
    /// `None` when the snapshots are from another document, out of order,
    /// or `old` is older than the compacted history.
    pub fn change_range(&self, old: &Snapshot, new: &Snapshot) -> Option<ChangeRange> {
        if old.document() != self.document || new.document() != self.document {
            return None;
        }
        if old.version() > new.version() || old.version() < self.base_version {
            return None;
        }
        if old.version() == new.version() {
            return Some(ChangeRange::UNCHANGED);
        }
        if let Some(cached) = new.cached_change_range(old.version()) {
            return Some(cached);
        }
        let merged = ChangeRange::collapse(
            self.changes
                .iter()
                .filter(|entry| entry.version > old.version() && entry.version <= new.version())
                .map(|entry| ChangeRange::from(&entry.change)),
        );
        new.cache_change_range(old.version(), merged);
        Some(merged)
    }

    /// Drop history no live snapshot needs. Returns how many changes were
    /// folded away.
    ///
    /// The newest change is always kept, as are the changes after the
    /// oldest live snapshot.
    pub fn compact(&mut self) -> usize {
        self.handed_out.retain(|_, weak| weak.strong_count() > 0);
        let newest = self.version();
        let oldest_live = self
            .handed_out
            .keys()
            .copied()
            .chain(self.recent.iter().map(|s| s.version()))
            .min()
            .unwrap_or(newest);

        let keep_from = oldest_live.min(newest.saturating_sub(1));
        if keep_from <= self.base_version {
            return 0;
        }
        self.apply_through(keep_from);

        let mut dropped = 0;
        while self
            .changes
            .front()
            .is_some_and(|entry| entry.version <= keep_from)
        {
            self.changes.pop_front();
            dropped += 1;
        }
        self.base_version = keep_from;
        if dropped > 0 {
            tracing::debug!(
                document = %self.document,
                dropped,
                base_version = self.base_version,
                "compacted change history"
            );
        }
        dropped
    }

    fn build(&mut self, version: u32) -> Arc<Snapshot> {
        if let Some(existing) = self.handed_out.get(&version).and_then(Weak::upgrade) {
            return existing;
        }
        let text = self.text_at(version);
        let snapshot = Arc::new(Snapshot::new(self.document, version, text));
        self.handed_out.insert(version, Arc::downgrade(&snapshot));

        if self.options.retain_recent > 0 {
            self.recent.retain(|s| s.version() != version);
            self.recent.push_back(Arc::clone(&snapshot));
            while self.recent.len() > self.options.retain_recent {
                self.recent.pop_front();
            }
        }
        snapshot
    }

    fn text_at(&mut self, version: u32) -> Arc<str> {
        self.apply_through(version);
        if self.applied_version == version {
            return Arc::from(self.buffer.as_str());
        }
        let mut text = self.buffer.clone();
        for entry in self.changes.iter().rev() {
            if entry.version <= version {
                break;
            }
            if let ChangeState::Applied { start, removed } = &entry.state {
                let end = start + entry.change.new_text.len();
                text.replace_range(*start..end, removed);
            }
        }
        Arc::from(text)
    }

    /// Fold pending changes up to and including `version` into the buffer.
    fn apply_through(&mut self, version: u32) {
        for entry in self.changes.iter_mut() {
            if entry.version > version {
                break;
            }
            if entry.state != ChangeState::Pending {
                continue;
            }
            let recorded = entry.change.range;
            let start = floor_char_boundary(&self.buffer, u32::from(recorded.start()) as usize);
            let end = floor_char_boundary(&self.buffer, u32::from(recorded.end()) as usize).max(start);
            let snapped = TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32));
            if snapped != recorded {
                tracing::warn!(
                    document = %self.document,
                    version = entry.version,
                    "change does not fall on character boundaries; snapped"
                );
                // Later lengths and change ranges follow the edit as applied.
                let len = u32::from(self.latest_len) + u32::from(recorded.len());
                self.latest_len = TextSize::from(len.saturating_sub(u32::from(snapped.len())));
                entry.change.range = snapped;
            }
            let removed = self.buffer[start..end].to_owned();
            self.buffer.replace_range(start..end, &entry.change.new_text);
            entry.state = ChangeState::Applied { start, removed };
            self.applied_version = entry.version;
        }
    }
}

fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
