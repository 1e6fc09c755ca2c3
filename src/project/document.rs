//! Regions of a composite document.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHasher;
use smol_str::SmolStr;

use crate::base::{DocumentId, TextRange};
use crate::codegen::{GeneratorKind, RegionKind};
use crate::options::CodegenOptions;

/// Where a region sits in the document, as reported by the host's block
/// splitter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionDescriptor {
    pub kind: RegionKind,
    /// `lang` attribute; empty for the kind's default language.
    pub lang: SmolStr,
    /// Byte range of the region content in the document.
    pub range: TextRange,
}

impl RegionDescriptor {
    pub fn new(kind: RegionKind, range: TextRange) -> Self {
        Self {
            kind,
            lang: SmolStr::default(),
            range,
        }
    }

    pub fn with_lang(mut self, lang: impl Into<SmolStr>) -> Self {
        self.lang = lang.into();
        self
    }

    /// The effective language tag.
    pub fn lang(&self) -> &str {
        if self.lang.is_empty() {
            self.kind.default_lang()
        } else {
            &self.lang
        }
    }
}

/// A region with its text read from a snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub kind: RegionKind,
    pub lang: SmolStr,
    pub range: TextRange,
    pub text: Arc<str>,
}

impl Region {
    /// Read a described region out of document text.
    ///
    /// Returns `None` (and logs) when the range does not fit the text.
    pub fn read(document: DocumentId, descriptor: &RegionDescriptor, text: &str) -> Option<Region> {
        let start = u32::from(descriptor.range.start()) as usize;
        let end = u32::from(descriptor.range.end()) as usize;
        let Some(slice) = text.get(start..end) else {
            tracing::warn!(
                %document,
                kind = %descriptor.kind,
                start,
                end,
                len = text.len(),
                "region range does not fit the document; skipped"
            );
            return None;
        };
        Some(Region {
            kind: descriptor.kind,
            lang: SmolStr::new(descriptor.lang()),
            range: descriptor.range,
            text: Arc::from(slice),
        })
    }

    /// Memo key for running `generator` over this region.
    pub fn content_hash(&self, generator: GeneratorKind, options: &CodegenOptions) -> u64 {
        let mut hasher = FxHasher::default();
        self.text.hash(&mut hasher);
        self.lang.hash(&mut hasher);
        generator.hash(&mut hasher);
        options.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::range_at;

    #[test]
    fn test_read_region() {
        let text = "<template><p/></template>";
        let descriptor = RegionDescriptor::new(RegionKind::Template, range_at(10, 4));
        let region = Region::read(DocumentId::new(0), &descriptor, text).unwrap();
        assert_eq!(&*region.text, "<p/>");
        assert_eq!(region.lang, "html");
    }

    #[test]
    fn test_out_of_bounds_region_is_skipped() {
        let descriptor = RegionDescriptor::new(RegionKind::Style, range_at(5, 10));
        assert!(Region::read(DocumentId::new(0), &descriptor, "short").is_none());
    }

    #[test]
    fn test_content_hash_tracks_text_and_lang() {
        let options = CodegenOptions::default();
        let read = |text: &str, lang: &str| {
            let descriptor = RegionDescriptor::new(RegionKind::Script, range_at(0, text.len() as u32))
                .with_lang(lang);
            Region::read(DocumentId::new(0), &descriptor, text).unwrap()
        };
        let a = read("let a", "ts").content_hash(GeneratorKind::Script, &options);
        let b = read("let a", "ts").content_hash(GeneratorKind::Script, &options);
        let c = read("let b", "ts").content_hash(GeneratorKind::Script, &options);
        let d = read("let a", "js").content_hash(GeneratorKind::Script, &options);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }
}
