//! Shared fixtures: region helpers and a word-matching checking engine.

#![allow(dead_code)]

use vellum::base::{DocumentPath, TextRange, TextSize};
use vellum::codegen::RegionKind;
use vellum::ide::{
    CheckingEngine, EngineCompletion, EngineDiagnostic, EngineHover, EngineLocation, EngineToken,
    Severity, TokenType,
};
use vellum::project::{RegionDescriptor, SyntheticDocument, Workspace};
use vellum::{DocumentId, Options};

/// Descriptor for the content between `open` and the next `close`.
pub fn region(text: &str, kind: RegionKind, open: &str, close: &str) -> RegionDescriptor {
    let start = text.find(open).expect("open tag") + open.len();
    let end = start + text[start..].find(close).expect("close tag");
    RegionDescriptor::new(kind, range(start, end))
}

/// Descriptors for a single-file component with any of the usual blocks.
pub fn sfc_regions(text: &str) -> Vec<RegionDescriptor> {
    let mut regions = Vec::new();
    if let Some(at) = text.find("<script setup") {
        let open_end = at + text[at..].find('>').expect("tag end") + 1;
        let lang = text[at..open_end].contains("lang=\"ts\"");
        let end = open_end + text[open_end..].find("</script>").expect("close tag");
        let descriptor = RegionDescriptor::new(RegionKind::ScriptSetup, range(open_end, end));
        regions.push(if lang { descriptor.with_lang("ts") } else { descriptor });
    }
    if text.contains("<template>") {
        regions.push(region(text, RegionKind::Template, "<template>", "</template>"));
    }
    if text.contains("<style>") {
        regions.push(region(text, RegionKind::Style, "<style>", "</style>"));
    }
    regions
}

pub fn range(start: usize, end: usize) -> TextRange {
    TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32))
}

/// Range of the `nth` occurrence of `needle` in `text`.
pub fn find_nth(text: &str, needle: &str, nth: usize) -> TextRange {
    let (at, _) = text.match_indices(needle).nth(nth).expect("needle");
    range(at, at + needle.len())
}

pub fn open(text: &str) -> (Workspace, DocumentId) {
    let workspace = Workspace::new(Options::default());
    let doc = workspace.open(&DocumentPath::new("/app/src/Comp.vue"), text, 1, sfc_regions(text));
    (workspace, doc)
}

/// A checking engine that treats every whole word as one symbol.
///
/// Words are runs of ASCII alphanumerics, `_`, `$` and `-`.
#[derive(Default)]
pub struct WordEngine {
    /// `(word, message)`: every occurrence of `word` gets an error.
    pub flagged: Vec<(&'static str, &'static str)>,
}

fn is_word_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'_' | b'$' | b'-')
}

fn word_at(text: &str, offset: TextSize) -> Option<TextRange> {
    let bytes = text.as_bytes();
    let at = usize::from(offset);
    let mut start = at;
    while start > 0 && is_word_char(bytes[start - 1]) {
        start -= 1;
    }
    let mut end = at;
    while end < bytes.len() && is_word_char(bytes[end]) {
        end += 1;
    }
    (end > start).then(|| range(start, end))
}

fn occurrences(text: &str, word: &str) -> Vec<TextRange> {
    let bytes = text.as_bytes();
    text.match_indices(word)
        .filter(|(at, _)| {
            let end = at + word.len();
            (*at == 0 || !is_word_char(bytes[at - 1])) && (end == bytes.len() || !is_word_char(bytes[end]))
        })
        .map(|(at, _)| range(at, at + word.len()))
        .collect()
}

impl CheckingEngine for WordEngine {
    fn diagnostics(&self, file: &SyntheticDocument) -> Vec<EngineDiagnostic> {
        self.flagged
            .iter()
            .flat_map(|(word, message)| {
                occurrences(&file.text, word)
                    .into_iter()
                    .map(move |r| EngineDiagnostic::new(r, Severity::Error, *message).with_code("W1"))
            })
            .collect()
    }

    fn references(&self, file: &SyntheticDocument, offset: TextSize) -> Vec<EngineLocation> {
        let Some(word) = word_at(&file.text, offset) else {
            return Vec::new();
        };
        occurrences(&file.text, &file.text[word])
            .into_iter()
            .map(|r| EngineLocation::new(file.id, r))
            .collect()
    }

    fn hover(&self, file: &SyntheticDocument, offset: TextSize) -> Option<EngineHover> {
        let word = word_at(&file.text, offset)?;
        Some(EngineHover {
            range: word,
            contents: format!("word `{}`", &file.text[word]).into(),
        })
    }

    fn completions(&self, file: &SyntheticDocument, offset: TextSize) -> Vec<EngineCompletion> {
        let replace = word_at(&file.text, offset);
        ["alpha", "beta"]
            .into_iter()
            .map(|label| EngineCompletion {
                label: label.into(),
                detail: None,
                replace,
            })
            .collect()
    }

    fn folding_ranges(&self, file: &SyntheticDocument) -> Vec<TextRange> {
        let mut stack = Vec::new();
        let mut ranges = Vec::new();
        for (at, c) in file.text.char_indices() {
            match c {
                '{' => stack.push(at),
                '}' => {
                    if let Some(start) = stack.pop() {
                        ranges.push(range(start, at + 1));
                    }
                }
                _ => {}
            }
        }
        ranges
    }

    fn semantic_tokens(&self, file: &SyntheticDocument) -> Vec<EngineToken> {
        let bytes = file.text.as_bytes();
        let mut tokens = Vec::new();
        let mut at = 0;
        while at < bytes.len() {
            if bytes[at].is_ascii_alphabetic() {
                let start = at;
                while at < bytes.len() && is_word_char(bytes[at]) {
                    at += 1;
                }
                tokens.push(EngineToken {
                    range: range(start, at),
                    token_type: TokenType::Variable,
                });
            } else {
                at += 1;
            }
        }
        tokens
    }
}
