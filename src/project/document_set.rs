//! Document identity registry.

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::base::{DocumentId, DocumentPath};

/// Assigns stable [`DocumentId`]s to canonical document paths.
///
/// Ids are never reused: removing a document and opening it again gives it
/// a fresh id, so results computed for the old one cannot be confused with
/// the new one.
#[derive(Debug, Default)]
pub struct DocumentSet {
    inner: RwLock<DocumentSetInner>,
}

#[derive(Debug, Default)]
struct DocumentSetInner {
    path_to_id: IndexMap<DocumentPath, DocumentId>,
    id_to_path: IndexMap<DocumentId, DocumentPath>,
    next_id: u32,
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or assign the id for `path`.
    pub fn intern(&self, path: &DocumentPath) -> DocumentId {
        {
            let inner = self.inner.read();
            if let Some(&id) = inner.path_to_id.get(path) {
                return id;
            }
        }

        let mut inner = self.inner.write();
        // Another writer may have won the race.
        if let Some(&id) = inner.path_to_id.get(path) {
            return id;
        }
        let id = DocumentId::new(inner.next_id);
        inner.next_id += 1;
        inner.path_to_id.insert(path.clone(), id);
        inner.id_to_path.insert(id, path.clone());
        id
    }

    /// The id for `path`, without assigning one.
    pub fn get(&self, path: &DocumentPath) -> Option<DocumentId> {
        self.inner.read().path_to_id.get(path).copied()
    }

    pub fn path(&self, document: DocumentId) -> Option<DocumentPath> {
        self.inner.read().id_to_path.get(&document).cloned()
    }

    pub fn remove(&self, document: DocumentId) -> Option<DocumentPath> {
        let mut inner = self.inner.write();
        let path = inner.id_to_path.shift_remove(&document)?;
        inner.path_to_id.shift_remove(&path);
        Some(path)
    }

    pub fn len(&self) -> usize {
        self.inner.read().path_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every registered document, in registration order.
    pub fn documents(&self) -> Vec<DocumentId> {
        self.inner.read().id_to_path.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_ids() {
        let set = DocumentSet::new();
        let a = set.intern(&DocumentPath::new("/src/App.vue"));
        let b = set.intern(&DocumentPath::new("/src/B.vue"));
        let a_again = set.intern(&DocumentPath::new("file:///src/./App.vue"));

        assert_ne!(a, b);
        assert_eq!(a, a_again);
        assert_eq!(set.documents(), vec![a, b]);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let set = DocumentSet::new();
        let path = DocumentPath::new("/a.vue");
        let first = set.intern(&path);
        assert_eq!(set.remove(first), Some(path.clone()));
        assert_eq!(set.get(&path), None);

        let second = set.intern(&path);
        assert_ne!(first, second);
        assert_eq!(set.path(second), Some(path));
    }
}
