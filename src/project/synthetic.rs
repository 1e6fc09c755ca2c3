//! Synthetic documents and their assembly from region outputs.
//!
//! Each original document projects into:
//!
//! - one script aggregate: `<script>`, `<script setup>`, then a
//!   `__v_template` function holding template code and style `v-bind()`
//!   expressions;
//! - one markup document (the template as-is);
//! - one document per style block.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::{DocumentId, DocumentPath, TextSize};
use crate::codegen::{GeneratorKind, RegionKind, RegionOutput, SETUP_CTX};
use crate::mapping::{SourceMap, TeleportMap};
use crate::options::CodegenOptions;
use crate::snapshot::Snapshot;

use super::document::Region;

/// Which synthetic document of an original document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SyntheticKind {
    /// Script, script setup, template code and style bindings.
    Script,
    /// Template text for the markup checker.
    Markup,
    /// The n-th style block.
    Style(u32),
}

impl fmt::Display for SyntheticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntheticKind::Script => f.write_str("script"),
            SyntheticKind::Markup => f.write_str("template"),
            SyntheticKind::Style(n) => write!(f, "style_{n}"),
        }
    }
}

/// Identity of one synthetic document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SyntheticId {
    pub document: DocumentId,
    pub kind: SyntheticKind,
}

impl SyntheticId {
    pub fn new(document: DocumentId, kind: SyntheticKind) -> Self {
        Self { document, kind }
    }
}

impl fmt::Display for SyntheticId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.document, self.kind)
    }
}

/// Generated text with its mappings back to the original document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticDocument {
    pub id: SyntheticId,
    /// Bumped on every regeneration of the owning document.
    pub version: u32,
    /// Language of the text (`ts`, `js`, `html`, `css`, ...).
    pub language: SmolStr,
    pub text: Arc<str>,
    pub source_map: SourceMap,
    pub teleports: TeleportMap,
}

impl SyntheticDocument {
    /// File name the checking engine knows this document by.
    pub fn file_name(&self, original: &DocumentPath) -> String {
        format!("{}.{}.{}", original.as_str(), self.id.kind, self.language)
    }
}

/// One consistent projection of one original document.
///
/// Built completely, then published in one step; readers holding an
/// `Arc<Generation>` keep seeing exactly these documents.
#[derive(Debug)]
pub struct Generation {
    pub document: DocumentId,
    /// Snapshot the regions were read from.
    pub snapshot: Arc<Snapshot>,
    pub regions: Vec<Region>,
    pub documents: IndexMap<SyntheticKind, Arc<SyntheticDocument>>,
}

impl Generation {
    /// Original document version this generation describes.
    pub fn source_version(&self) -> u32 {
        self.snapshot.version()
    }

    pub fn get(&self, kind: SyntheticKind) -> Option<&Arc<SyntheticDocument>> {
        self.documents.get(&kind)
    }

    pub fn synthetic_documents(&self) -> impl Iterator<Item = &Arc<SyntheticDocument>> {
        self.documents.values()
    }
}

/// Concatenates region outputs into one synthetic document.
#[derive(Debug, Default)]
struct DocumentBuilder {
    text: String,
    source_map: SourceMap,
    teleports: TeleportMap,
}

impl DocumentBuilder {
    fn write(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Append a region's output; `source_offset` is where the region starts
    /// in the original document.
    fn append(&mut self, output: &RegionOutput, source_offset: TextSize) {
        let target_offset = TextSize::of(self.text.as_str());
        self.text.push_str(&output.text);
        self.source_map.extend(
            output
                .mappings
                .iter()
                .map(|m| m.clone().shifted(source_offset, target_offset)),
        );
        for teleport in &output.teleports {
            let mut teleport = teleport.clone();
            teleport.left += target_offset;
            teleport.right += target_offset;
            self.teleports.push(teleport);
        }
    }

    fn finish(self, id: SyntheticId, version: u32, language: &str) -> SyntheticDocument {
        SyntheticDocument {
            id,
            version,
            language: SmolStr::new(language),
            text: Arc::from(self.text),
            source_map: self.source_map,
            teleports: self.teleports,
        }
    }
}

/// Outputs of every generator for every region, in region order.
pub(crate) type RegionOutputs = Vec<(GeneratorKind, Arc<RegionOutput>)>;

/// Build the synthetic documents for one document.
///
/// `outputs[i]` holds the generator outputs for `regions[i]`.
pub(crate) fn assemble(
    document: DocumentId,
    version: u32,
    regions: &[Region],
    outputs: &[RegionOutputs],
    options: &CodegenOptions,
) -> IndexMap<SyntheticKind, Arc<SyntheticDocument>> {
    let mut documents = IndexMap::new();
    let output_of = |i: usize, kind: GeneratorKind| {
        outputs
            .get(i)
            .and_then(|list| list.iter().find(|(k, _)| *k == kind))
            .map(|(_, output)| Arc::clone(output))
    };

    // Script aggregate.
    let mut script = DocumentBuilder::default();
    let mut script_lang = "js";
    let mut has_setup = false;
    for (i, region) in regions.iter().enumerate() {
        let generator = match region.kind {
            RegionKind::Script => GeneratorKind::Script,
            RegionKind::ScriptSetup => GeneratorKind::ScriptSetup,
            _ => continue,
        };
        if matches!(region.lang.as_str(), "ts" | "tsx") {
            script_lang = region.lang.as_str();
        }
        if let Some(output) = output_of(i, generator).filter(|o| !o.is_empty()) {
            has_setup |= generator == GeneratorKind::ScriptSetup;
            script.append(&output, region.range.start());
            script.write("\n");
        }
    }

    let template_parts: Vec<(usize, GeneratorKind)> = regions
        .iter()
        .enumerate()
        .filter_map(|(i, region)| match region.kind {
            RegionKind::Template => Some((i, GeneratorKind::TemplateCode)),
            RegionKind::Style => Some((i, GeneratorKind::StyleBindings)),
            _ => None,
        })
        .filter(|&(i, kind)| output_of(i, kind).is_some_and(|o| !o.is_empty()))
        .collect();
    if !template_parts.is_empty() {
        script.write("function __v_template() {\nconst ");
        script.write(&options.ctx_name);
        script.write(" = __v_componentContext(");
        if has_setup {
            script.write(SETUP_CTX);
        }
        script.write(");\n");
        for (i, kind) in template_parts {
            if let Some(output) = output_of(i, kind) {
                script.append(&output, regions[i].range.start());
            }
        }
        script.write("}\n");
    }
    let script_id = SyntheticId::new(document, SyntheticKind::Script);
    documents.insert(
        SyntheticKind::Script,
        Arc::new(script.finish(script_id, version, script_lang)),
    );

    // Markup and styles.
    let mut style_index = 0u32;
    for (i, region) in regions.iter().enumerate() {
        let (kind, generator) = match region.kind {
            RegionKind::Template => (SyntheticKind::Markup, GeneratorKind::TemplateMarkup),
            RegionKind::Style => {
                let kind = SyntheticKind::Style(style_index);
                style_index += 1;
                (kind, GeneratorKind::StyleText)
            }
            _ => continue,
        };
        if documents.contains_key(&kind) {
            tracing::warn!(%document, %kind, "duplicate region; later one ignored");
            continue;
        }
        let mut builder = DocumentBuilder::default();
        if let Some(output) = output_of(i, generator) {
            builder.append(&output, region.range.start());
        }
        let language = region.lang.as_str();
        documents.insert(
            kind,
            Arc::new(builder.finish(SyntheticId::new(document, kind), version, language)),
        );
    }

    documents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::range_at;
    use crate::codegen;
    use crate::mapping::{Capabilities, Direction};
    use crate::project::RegionDescriptor;

    fn build(text: &str, descriptors: &[RegionDescriptor]) -> IndexMap<SyntheticKind, Arc<SyntheticDocument>> {
        let options = CodegenOptions::default();
        let document = DocumentId::new(0);
        let regions: Vec<Region> = descriptors
            .iter()
            .filter_map(|d| Region::read(document, d, text))
            .collect();
        let outputs: Vec<RegionOutputs> = regions
            .iter()
            .map(|r| {
                r.kind
                    .generators()
                    .iter()
                    .map(|&g| (g, Arc::new(codegen::generate(g, &r.text, &r.lang, &options))))
                    .collect()
            })
            .collect();
        assemble(document, 1, &regions, &outputs, &options)
    }

    #[test]
    fn test_template_mappings_use_document_offsets() {
        let text = "<template>{{ x }}</template>";
        let docs = build(text, &[RegionDescriptor::new(RegionKind::Template, range_at(10, 7))]);

        let script = &docs[&SyntheticKind::Script];
        assert!(script.text.starts_with("function __v_template() {\nconst __v_ctx = __v_componentContext();\n"));
        let x = text.find('x').unwrap() as u32;
        let hit = script
            .source_map
            .query_with(range_at(x, 1), Direction::Forward, Capabilities::REFERENCES)
            .next()
            .unwrap();
        assert_eq!(&script.text[hit.range], "x");

        let markup = &docs[&SyntheticKind::Markup];
        assert_eq!(&*markup.text, "{{ x }}");
        assert_eq!(markup.source_map.first_forward(range_at(10, 7)).unwrap().range, range_at(0, 7));
    }

    #[test]
    fn test_setup_and_template_share_aggregate() {
        let text = "<script setup lang=\"ts\">const n = 1</script><template>{{ n }}</template>";
        let setup = RegionDescriptor::new(RegionKind::ScriptSetup, range_at(24, 11)).with_lang("ts");
        let template = RegionDescriptor::new(RegionKind::Template, range_at(54, 7));
        let docs = build(text, &[setup, template]);

        let script = &docs[&SyntheticKind::Script];
        assert_eq!(script.language, "ts");
        assert!(script.text.starts_with("const n = 1\n"));
        assert!(script.text.contains("__v_componentContext(__v_setupCtx)"));
        assert_eq!(script.teleports.len(), 1);
        let teleport = &script.teleports.teleports()[0];
        assert_eq!(&script.text[teleport.left], "n");
        assert_eq!(&script.text[teleport.right], "n");
        assert_eq!(script.source_map.first_backward(teleport.right).unwrap().range, range_at(30, 1));
    }

    #[test]
    fn test_styles_are_numbered() {
        let text = "<style>a{}</style><style>b{}</style>";
        let docs = build(
            text,
            &[
                RegionDescriptor::new(RegionKind::Style, range_at(7, 3)),
                RegionDescriptor::new(RegionKind::Style, range_at(25, 3)),
            ],
        );
        assert_eq!(&*docs[&SyntheticKind::Style(0)].text, "a{}");
        assert_eq!(&*docs[&SyntheticKind::Style(1)].text, "b{}");
        assert_eq!(docs[&SyntheticKind::Style(1)].language, "css");
    }
}
