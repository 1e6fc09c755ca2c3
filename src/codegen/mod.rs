//! Region generators.
//!
//! Each generator is a pure function of a region's text, its language tag
//! and the codegen options. It produces synthetic text plus the mappings
//! and teleports for it:
//!
//! | Generator | Region | Synthetic document |
//! |---|---|---|
//! | [`GeneratorKind::Script`] | `<script>` | script aggregate |
//! | [`GeneratorKind::ScriptSetup`] | `<script setup>` | script aggregate |
//! | [`GeneratorKind::TemplateCode`] | `<template>` | script aggregate |
//! | [`GeneratorKind::TemplateMarkup`] | `<template>` | markup |
//! | [`GeneratorKind::StyleText`] | `<style>` | one per style block |
//! | [`GeneratorKind::StyleBindings`] | `<style>` | script aggregate |
//!
//! Mapping sources are relative to the region text and targets relative
//! to the generator's own output; assembly into documents shifts both.
//!
//! Generated code refers to helpers (`__v_defineComponent`, `__v_unref`,
//! `__v_asComponent`, `__v_components`, `__v_intrinsics`, `__v_propsOf`,
//! `__v_slots`, `__v_directives`, `__v_vfor`, `__v_componentContext`) that
//! the engine host declares alongside the synthetic documents.
//!
//! A generator never fails: a region that cannot be parsed, or whose
//! language is not understood, produces empty output.

mod expr;
mod lexer;
pub mod names;
mod script;
mod script_setup;
mod style;
pub mod template;
mod writer;

use std::fmt;

use crate::mapping::{Mapping, Teleport};
use crate::options::CodegenOptions;

pub(crate) use script_setup::SETUP_CTX;

/// The kind of a top-level region of a composite document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegionKind {
    Script,
    ScriptSetup,
    Template,
    Style,
}

impl RegionKind {
    /// Generators that run over a region of this kind.
    pub fn generators(self) -> &'static [GeneratorKind] {
        match self {
            RegionKind::Script => &[GeneratorKind::Script],
            RegionKind::ScriptSetup => &[GeneratorKind::ScriptSetup],
            RegionKind::Template => &[GeneratorKind::TemplateCode, GeneratorKind::TemplateMarkup],
            RegionKind::Style => &[GeneratorKind::StyleText, GeneratorKind::StyleBindings],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RegionKind::Script => "script",
            RegionKind::ScriptSetup => "script setup",
            RegionKind::Template => "template",
            RegionKind::Style => "style",
        }
    }

    /// Language assumed when a region has no `lang` attribute.
    pub fn default_lang(self) -> &'static str {
        match self {
            RegionKind::Script | RegionKind::ScriptSetup => "js",
            RegionKind::Template => "html",
            RegionKind::Style => "css",
        }
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeneratorKind {
    Script,
    ScriptSetup,
    TemplateCode,
    TemplateMarkup,
    StyleText,
    StyleBindings,
}

impl GeneratorKind {
    /// Whether this generator understands the language tag.
    pub fn supports(self, lang: &str) -> bool {
        match self {
            GeneratorKind::Script | GeneratorKind::ScriptSetup => {
                matches!(lang, "" | "js" | "ts" | "jsx" | "tsx")
            }
            GeneratorKind::TemplateCode | GeneratorKind::TemplateMarkup => matches!(lang, "" | "html"),
            GeneratorKind::StyleText | GeneratorKind::StyleBindings => {
                matches!(lang, "" | "css" | "scss" | "sass" | "less" | "stylus" | "postcss")
            }
        }
    }
}

/// Text, mappings and teleports produced for one region.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegionOutput {
    pub text: String,
    pub mappings: Vec<Mapping>,
    pub teleports: Vec<Teleport>,
}

impl RegionOutput {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.mappings.is_empty()
    }
}

/// Run one generator over region text.
pub fn generate(kind: GeneratorKind, text: &str, lang: &str, options: &CodegenOptions) -> RegionOutput {
    if !kind.supports(lang) {
        tracing::debug!(?kind, lang, "unsupported region language; no synthetic output");
        return RegionOutput::default();
    }
    match kind {
        GeneratorKind::Script => script::generate_script(text),
        GeneratorKind::ScriptSetup => script_setup::generate_script_setup(text),
        GeneratorKind::TemplateCode => match template::parse_template(text) {
            Ok(ast) => template::generate_template_code(text, &ast, options),
            Err(error) => {
                tracing::debug!(%error, "template parse failed; no synthetic output");
                RegionOutput::default()
            }
        },
        GeneratorKind::TemplateMarkup => match template::parse_template(text) {
            Ok(_) => markup(text),
            Err(error) => {
                tracing::debug!(%error, "template parse failed; no markup output");
                RegionOutput::default()
            }
        },
        GeneratorKind::StyleText => style::generate_style_text(text),
        GeneratorKind::StyleBindings => style::generate_style_bindings(text, options),
    }
}

/// Template text as-is for the markup checker.
fn markup(text: &str) -> RegionOutput {
    let mut w = writer::CodeWriter::new();
    if !text.is_empty() {
        w.write_mapped(text, crate::base::TextSize::from(0), crate::mapping::Capabilities::MARKUP);
    }
    w.finish()
}
