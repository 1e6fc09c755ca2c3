//! Generator output memoization.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::codegen::{self, GeneratorKind, RegionOutput};
use crate::options::CodegenOptions;

use super::document::Region;

#[derive(Debug)]
struct Entry {
    text: Arc<str>,
    output: Arc<RegionOutput>,
}

/// Generator outputs keyed by `(content hash, generator kind)`.
///
/// Regenerating a document whose template did not change reuses the
/// template output; only changed regions are generated again.
#[derive(Debug, Default)]
pub struct GeneratorCache {
    entries: FxHashMap<(u64, GeneratorKind), Entry>,
    hits: u64,
    misses: u64,
}

impl GeneratorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Output of `generator` over `region`, generating on a miss.
    pub fn get_or_generate(
        &mut self,
        generator: GeneratorKind,
        region: &Region,
        options: &CodegenOptions,
    ) -> (u64, Arc<RegionOutput>) {
        let hash = region.content_hash(generator, options);
        let key = (hash, generator);
        if let Some(entry) = self.entries.get(&key) {
            // Guard against hash collisions.
            if entry.text == region.text {
                self.hits += 1;
                tracing::trace!(?generator, hash, "generator memo hit");
                return (hash, Arc::clone(&entry.output));
            }
        }

        self.misses += 1;
        tracing::trace!(?generator, hash, "generator memo miss");
        let output = Arc::new(codegen::generate(generator, &region.text, &region.lang, options));
        self.entries.insert(
            key,
            Entry {
                text: Arc::clone(&region.text),
                output: Arc::clone(&output),
            },
        );
        (hash, output)
    }

    /// Drop every entry whose key is not in `live`.
    pub fn retain(&mut self, live: &FxHashSet<(u64, GeneratorKind)>) {
        self.entries.retain(|key, _| live.contains(key));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
