//! Template to script code.
//!
//! Walks the template tree and writes a statement list the checking engine
//! can type-check:
//!
//! ```text
//! <MyButton :size="big" @click="go" v-if="ok" />
//!
//! if (__v_ctx.ok) {
//! const __v_1 = __v_asComponent(__v_components.MyButton);
//! __v_1({ size: __v_ctx.big, onClick: __v_ctx.go, });
//! }
//! ```
//!
//! Control directives become real blocks so bindings never leak between
//! branches; every `v-for` gets a complete `[value, key]` destructuring even
//! when the template leaves the key out.

use smol_str::SmolStr;

use crate::base::{TextRange, TextSize};
use crate::mapping::{Capabilities, MappingData};
use crate::options::CodegenOptions;

use super::super::RegionOutput;
use super::super::expr::{Locals, is_function_expression, is_member_path, pattern_bindings, write_expression};
use super::super::lexer::{Token, tokenize};
use super::super::names::{camelize, capitalize, pascalize};
use super::super::writer::CodeWriter;
use super::ast::{Attribute, Directive, Element, Interpolation, Node, StaticAttribute, TemplateAst};

/// Directives handled structurally rather than as element props.
const STRUCTURAL: &[&str] = &["if", "else-if", "else", "for", "slot"];

/// Directives whose value is checked as a standalone expression.
const EXPRESSION_ONLY: &[&str] = &["show", "html", "text", "memo"];

const TAG_CAPS: Capabilities = Capabilities::NAME;

pub(crate) fn generate_template_code(
    src: &str,
    ast: &TemplateAst,
    options: &CodegenOptions,
) -> RegionOutput {
    let mut generator = TemplateGenerator {
        src,
        options,
        w: CodeWriter::new(),
        locals: Locals::default(),
        next_id: 0,
    };
    generator.children(&ast.children);
    generator.w.finish()
}

struct TemplateGenerator<'a> {
    src: &'a str,
    options: &'a CodegenOptions,
    w: CodeWriter,
    locals: Locals,
    next_id: u32,
}

impl TemplateGenerator<'_> {
    fn fresh(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("__v_{prefix}{}", self.next_id)
    }

    fn text(&self, range: TextRange) -> &str {
        &self.src[range]
    }

    fn expression(&mut self, range: TextRange) {
        let src = self.src;
        let expr = &src[range];
        if expr.is_empty() {
            self.w.write("undefined");
            return;
        }
        write_expression(&mut self.w, expr, range.start(), &self.locals, &self.options.ctx_name);
    }

    fn children(&mut self, nodes: &[Node]) {
        let mut i = 0;
        while i < nodes.len() {
            match &nodes[i] {
                Node::Element(el) if el.has_directive("if") => {
                    let mut chain = vec![el];
                    i += 1;
                    loop {
                        let mut k = i;
                        while nodes.get(k).is_some_and(|n| n.is_insignificant(self.src)) {
                            k += 1;
                        }
                        match nodes.get(k) {
                            Some(Node::Element(next)) if next.has_directive("else-if") => {
                                chain.push(next);
                                i = k + 1;
                            }
                            Some(Node::Element(next)) if next.has_directive("else") => {
                                chain.push(next);
                                i = k + 1;
                                break;
                            }
                            _ => break,
                        }
                    }
                    self.conditional(&chain);
                }
                Node::Element(el) => {
                    // A stray `v-else` still gets its own scope.
                    let stray = el.has_directive("else-if") || el.has_directive("else");
                    if stray {
                        self.w.write("{\n");
                    }
                    self.looped(el);
                    if stray {
                        self.w.write("}\n");
                    }
                    i += 1;
                }
                Node::Interpolation(interpolation) => {
                    self.interpolation(interpolation);
                    i += 1;
                }
                Node::Text(_) | Node::Comment(_) => i += 1,
            }
        }
    }

    fn conditional(&mut self, chain: &[&Element]) {
        for (n, el) in chain.iter().enumerate() {
            if n > 0 {
                self.w.write(" else ");
            }
            let condition = el.directive("if").or_else(|| el.directive("else-if"));
            if let Some(cond) = condition {
                self.w.write("if (");
                match cond.expression {
                    Some(expr) => self.expression(expr),
                    None => self.w.write("undefined"),
                }
                self.w.write(") ");
            }
            self.w.write("{\n");
            self.looped(el);
            self.w.write("}");
        }
        self.w.write("\n");
    }

    /// Element with its `v-for`, if any.
    fn looped(&mut self, el: &Element) {
        let Some(vfor) = el.directive("for") else {
            self.element(el);
            return;
        };
        let mark = self.locals.mark();
        self.for_header(vfor);
        self.element(el);
        self.w.write("}\n");
        self.locals.truncate(mark);
    }

    fn for_header(&mut self, vfor: &Directive) {
        let Some(range) = vfor.expression else {
            self.w.write("{\n");
            return;
        };
        let expr = self.text(range).to_owned();
        let split = tokenize(&expr).into_iter().find(|t| {
            t.kind == Token::Ident && matches!(t.text(&expr), "in" | "of")
        });
        let Some(split) = split else {
            // No `in`/`of`: check the expression and open a plain scope.
            self.w.write("(");
            self.expression(range);
            self.w.write(");\n{\n");
            return;
        };

        let base = range.start();
        let at = |offset: usize| base + TextSize::from(offset as u32);

        let left_raw = &expr[..split.span.start];
        let left_lead = left_raw.len() - left_raw.trim_start().len();
        let mut left = left_raw.trim();
        let mut left_start = left_lead;
        if left.starts_with('(') && left.ends_with(')') && left.len() >= 2 {
            left = &left[1..left.len() - 1];
            left_start += 1;
        }

        let aliases = split_top_level(left);
        let source_raw = &expr[split.span.end..];
        let source_lead = source_raw.len() - source_raw.trim_start().len();
        let source = source_raw.trim();
        let source_range = TextRange::at(at(split.span.end + source_lead), TextSize::of(source));

        self.w.write("for (const [");
        let mut bound = Vec::new();
        for slot in 0..aliases.len().max(2) {
            if slot > 0 {
                self.w.write(", ");
            }
            match aliases.get(slot) {
                Some(&(offset, alias)) if !alias.is_empty() => {
                    let start = left_start + offset;
                    self.w.write_mapped(alias, at(start), Capabilities::CODE);
                    bound.extend(pattern_bindings(alias).into_iter().map(|(name, _)| name));
                }
                _ => {
                    let index = self.fresh("i");
                    self.w.write(&index);
                }
            }
        }
        self.w.write("] of __v_vfor(");
        self.expression(source_range);
        self.w.write(")) {\n");

        for name in bound {
            self.locals.push(name);
        }
    }

    fn element(&mut self, el: &Element) {
        if el.tag == "template" || el.tag == "slot" {
            self.directive_statements(el);
            self.children(&el.children);
            return;
        }
        if is_component(&el.tag) {
            self.component(el);
        } else {
            self.intrinsic(el);
        }
    }

    fn component(&mut self, el: &Element) {
        let var = self.fresh("");
        let pascal = pascalize(&el.tag);
        let raw = el.tag.as_str();
        let data = if pascal == raw { MappingData::Verbatim } else { MappingData::Camelized };

        self.w.write("const ");
        self.w.write(&var);
        self.w.write(" = __v_asComponent(__v_components");
        self.w.write_property_access(&pascal, el.tag_range, TAG_CAPS, data.clone());
        self.w.write(");\n");

        if pascal != raw {
            self.w.write("__v_components");
            self.w.write_property_access(
                raw,
                el.tag_range,
                TAG_CAPS,
                MappingData::RawAlias { canonical: SmolStr::new(&pascal) },
            );
            self.w.write(";\n");
        }
        if let Some(end) = el.end_tag_range {
            self.w.write("__v_components");
            self.w.write_property_access(
                &pascal,
                end,
                Capabilities::NAVIGATION | Capabilities::RENAME,
                data,
            );
            self.w.write(";\n");
        }

        self.props_call(&var, el, true);
        self.directive_statements(el);
        self.slots(&var, el);
    }

    fn intrinsic(&mut self, el: &Element) {
        let var = self.fresh("");
        self.w.write("const ");
        self.w.write(&var);
        self.w.write(" = __v_intrinsics");
        self.w.write_property_access(
            &el.tag,
            el.tag_range,
            Capabilities::HOVER | Capabilities::COMPLETION,
            MappingData::Verbatim,
        );
        self.w.write(";\n");
        self.props_call(&var, el, false);
        self.directive_statements(el);
        self.children(&el.children);
    }

    /// `var({ props });` followed by raw-spelling aliases for camelized props.
    fn props_call(&mut self, var: &str, el: &Element, component: bool) {
        let mut aliases: Vec<(&StaticAttribute, String)> = Vec::new();
        let mut alias_ranges: Vec<(TextRange, SmolStr, String)> = Vec::new();

        self.w.write(var);
        self.w.write("({ ");
        for attribute in &el.attributes {
            match attribute {
                Attribute::Static(attr) => {
                    if !component && !self.options.check_attributes {
                        continue;
                    }
                    let key = self.prop_key(&attr.name, attr.name_range, component);
                    if let Some(camel) = key {
                        aliases.push((attr, camel));
                    }
                    self.w.write(": ");
                    match attr.value {
                        Some(value) => self.string_literal(value),
                        None => self.w.write("true"),
                    }
                    self.w.write(", ");
                }
                Attribute::Directive(d) => match d.name.as_str() {
                    "bind" => {
                        if let Some(camel) = self.bind_prop(d, component) {
                            if let Some(arg) = &d.arg {
                                alias_ranges.push((arg.range, arg.name.clone(), camel));
                            }
                        }
                    }
                    "on" => self.event_prop(d),
                    "model" => self.model_prop(d),
                    _ => {}
                },
            }
        }
        self.w.write("});\n");

        for (attr, camel) in aliases {
            alias_ranges.push((attr.name_range, attr.name.clone(), camel));
        }
        for (range, raw, camel) in alias_ranges {
            self.w.write("__v_propsOf(");
            self.w.write(var);
            self.w.write(")");
            self.w.write_property_access(
                &raw,
                range,
                Capabilities::NAME,
                MappingData::RawAlias { canonical: SmolStr::new(camel) },
            );
            self.w.write(";\n");
        }
    }

    /// Write a prop key. Returns the camelized spelling when it differs
    /// from the raw one, so the caller can emit the raw-spelling alias.
    fn prop_key(&mut self, name: &str, range: TextRange, component: bool) -> Option<String> {
        if component && self.options.camelize_props && name.contains('-') {
            let camel = camelize(name);
            self.w.write_object_key(&camel, range, Capabilities::NAME, MappingData::Camelized);
            Some(camel)
        } else {
            self.w.write_object_key(name, range, Capabilities::NAME, MappingData::Verbatim);
            None
        }
    }

    fn string_literal(&mut self, value: TextRange) {
        let text = self.text(value).replace('\\', "\\\\").replace('\'', "\\'").replace('\n', "\\n");
        let start = self.w.offset();
        self.w.write("'");
        self.w.write(&text);
        self.w.write("'");
        self.w.gate_since(value, start, Capabilities::DIAGNOSTIC_ONLY);
    }

    fn bind_prop(&mut self, d: &Directive, component: bool) -> Option<String> {
        let mut camel = None;
        match &d.arg {
            None => {
                self.w.write("...");
                self.value_or_undefined(d);
                self.w.write(", ");
                return None;
            }
            Some(arg) if arg.dynamic => {
                self.w.write("[");
                self.expression(arg.range);
                self.w.write("]");
            }
            Some(arg) => {
                let name = arg.name.clone();
                camel = self.prop_key(&name, arg.range, component);
            }
        }
        self.w.write(": ");
        self.value_or_undefined(d);
        self.w.write(", ");
        camel
    }

    fn event_prop(&mut self, d: &Directive) {
        match &d.arg {
            None => {
                // `v-on="listeners"`
                self.w.write("...");
                self.value_or_undefined(d);
                self.w.write(", ");
                return;
            }
            Some(arg) if arg.dynamic => {
                self.w.write("[`on${");
                self.expression(arg.range);
                self.w.write("}`]");
            }
            Some(arg) => {
                let key = format!("on{}", capitalize(&camelize(&arg.name)));
                self.w.write_object_key(
                    &key,
                    arg.range,
                    Capabilities::NAVIGATION | Capabilities::COMPLETION | Capabilities::DIAGNOSTICS,
                    MappingData::Capitalized,
                );
            }
        }
        self.w.write(": ");
        match d.expression {
            None => self.w.write("() => {}"),
            Some(range) => {
                let expr = self.text(range);
                if is_member_path(expr) || is_function_expression(expr) {
                    self.expression(range);
                } else {
                    let mark = self.locals.mark();
                    self.locals.push("$event");
                    self.w.write("($event) => { ");
                    self.expression(range);
                    self.w.write(" }");
                    self.locals.truncate(mark);
                }
            }
        }
        self.w.write(", ");
    }

    fn model_prop(&mut self, d: &Directive) {
        match &d.arg {
            Some(arg) if !arg.dynamic => {
                let name = camelize(&arg.name);
                self.w.write_object_key(&name, arg.range, Capabilities::NAME, MappingData::Verbatim);
            }
            Some(arg) => {
                self.w.write("[");
                self.expression(arg.range);
                self.w.write("]");
            }
            None => {
                self.w.write_mapped_as(
                    "modelValue",
                    d.name_range,
                    Capabilities::NAVIGATION,
                    MappingData::Verbatim,
                );
            }
        }
        self.w.write(": ");
        self.value_or_undefined(d);
        self.w.write(", ");
    }

    fn value_or_undefined(&mut self, d: &Directive) {
        match d.expression {
            Some(expr) => self.expression(expr),
            None => self.w.write("undefined"),
        }
    }

    /// `v-show` style expressions and custom directives.
    fn directive_statements(&mut self, el: &Element) {
        for attribute in &el.attributes {
            let Attribute::Directive(d) = attribute else { continue };
            let name = d.name.as_str();
            if STRUCTURAL.contains(&name) || matches!(name, "bind" | "on" | "model") {
                continue;
            }
            if !EXPRESSION_ONLY.contains(&name) {
                let directive = format!("v{}", capitalize(&camelize(name)));
                self.w.write("__v_directives");
                self.w.write_property_access(
                    &directive,
                    d.name_range,
                    Capabilities::NAVIGATION | Capabilities::COMPLETION | Capabilities::DIAGNOSTICS,
                    MappingData::Camelized,
                );
                self.w.write(";\n");
            }
            if let Some(expr) = d.expression {
                self.w.write("(");
                self.expression(expr);
                self.w.write(");\n");
            }
            if let Some(arg) = d.arg.as_ref().filter(|a| a.dynamic) {
                self.w.write("(");
                self.expression(arg.range);
                self.w.write(");\n");
            }
        }
    }

    /// Component children: named `<template #name>` slots and default content.
    fn slots(&mut self, var: &str, el: &Element) {
        if let Some(own) = el.directive("slot") {
            self.slot_block(var, own, &el.children);
            return;
        }
        let mut default_content = Vec::new();
        for child in &el.children {
            match child {
                Node::Element(t) if t.tag == "template" && t.has_directive("slot") => {
                    if let Some(slot) = t.directive("slot") {
                        self.slot_block(var, slot, &t.children);
                    }
                }
                other => default_content.push(other.clone()),
            }
        }
        if default_content.iter().any(|n| !n.is_insignificant(self.src)) {
            self.w.write("{\n");
            self.children(&default_content);
            self.w.write("}\n");
        }
    }

    fn slot_block(&mut self, var: &str, slot: &Directive, children: &[Node]) {
        let mark = self.locals.mark();
        self.w.write("{\n");
        let pattern = slot.expression.filter(|r| !r.is_empty());
        if let Some(pattern) = pattern {
            self.w.write("const ");
            let text = self.text(pattern).to_owned();
            self.w.write_mapped(&text, pattern.start(), Capabilities::CODE);
            self.w.write(" = ");
            for (name, _) in pattern_bindings(&text) {
                self.locals.push(name);
            }
        }
        self.w.write("__v_slots(");
        self.w.write(var);
        self.w.write(")");
        match &slot.arg {
            Some(arg) if arg.dynamic => {
                self.w.write("[");
                self.expression(arg.range);
                self.w.write("]");
            }
            Some(arg) => {
                let name = arg.name.clone();
                self.w.write_property_access(
                    &name,
                    arg.range,
                    Capabilities::NAVIGATION | Capabilities::COMPLETION | Capabilities::DIAGNOSTICS,
                    MappingData::Verbatim,
                );
            }
            None => self.w.write(".default"),
        }
        self.w.write(";\n");
        self.children(children);
        self.w.write("}\n");
        self.locals.truncate(mark);
    }

    fn interpolation(&mut self, interpolation: &Interpolation) {
        self.w.write("(");
        self.expression(interpolation.expression);
        self.w.write(");\n");
    }
}

/// Whether a tag names a component rather than a platform element.
fn is_component(tag: &str) -> bool {
    tag.chars().next().is_some_and(char::is_uppercase) || tag.contains('-') || tag.contains('.')
}

/// Split `a, { b, c }, d` at top-level commas, keeping each part's offset.
fn split_top_level(text: &str) -> Vec<(usize, &str)> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for token in tokenize(text) {
        if token.kind.opens() {
            depth += 1;
        } else if token.kind.closes() {
            depth = depth.saturating_sub(1);
        } else if token.kind == Token::Comma && depth == 0 {
            parts.push(trim_part(text, start, token.span.start));
            start = token.span.end;
        }
    }
    if !text.trim().is_empty() {
        parts.push(trim_part(text, start, text.len()));
    }
    parts
}

fn trim_part(text: &str, start: usize, end: usize) -> (usize, &str) {
    let part = &text[start..end];
    let lead = part.len() - part.trim_start().len();
    (start + lead, part.trim())
}
