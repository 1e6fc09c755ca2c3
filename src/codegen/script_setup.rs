//! `<script setup>` block.
//!
//! The body is copied verbatim at module scope. Every top-level binding is
//! then mirrored into a `__v_setupCtx` object, which is what template
//! expressions resolve against:
//!
//! ```text
//! const count = ref(0)
//!
//! const __v_setupCtx = {
//! count: __v_unref(count),
//! };
//! ```
//!
//! The key and the declaration are two spellings of one binding, so each
//! pair is connected by a teleport.

use smol_str::SmolStr;

use crate::base::{TextRange, TextSize};
use crate::mapping::Capabilities;

use super::RegionOutput;
use super::expr::pattern_bindings;
use super::lexer::{Spanned, Token, matching_close, newline_between, tokenize};
use super::writer::CodeWriter;

/// Name of the object holding every setup binding.
pub(crate) const SETUP_CTX: &str = "__v_setupCtx";

const PROPS_VAR: &str = "__v_props";

const MIRROR_CAPS: Capabilities = Capabilities::NAVIGATION.union(Capabilities::RENAME);

/// A top-level binding: its name and byte range in the region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Binding {
    pub name: SmolStr,
    pub range: std::ops::Range<usize>,
}

#[derive(Debug, Default)]
struct SetupScan {
    bindings: Vec<Binding>,
    /// Binding the `defineProps()` result is assigned to.
    props_binding: Option<SmolStr>,
    /// Start of a bare `defineProps(...)` statement.
    bare_define_props: Option<usize>,
}

pub(crate) fn generate_script_setup(text: &str) -> RegionOutput {
    let scan = scan(text);
    let mut w = CodeWriter::new();

    let mut insertions = Vec::new();
    if let Some(at) = scan.bare_define_props {
        insertions.push((at, format!("const {PROPS_VAR} = ")));
    }
    w.write_with_insertions(text, TextSize::from(0), &insertions, Capabilities::VERBATIM);

    let shift = |offset: usize| -> TextSize {
        let inserted: usize = insertions
            .iter()
            .filter(|(at, _)| *at <= offset)
            .map(|(_, s)| s.len())
            .sum();
        TextSize::from((offset + inserted) as u32)
    };

    w.write("\nconst ");
    w.write(SETUP_CTX);
    w.write(" = {\n");
    if scan.bare_define_props.is_some() {
        w.write("...");
        w.write(PROPS_VAR);
        w.write(",\n");
    } else if let Some(props) = &scan.props_binding {
        w.write("...");
        w.write(props);
        w.write(",\n");
    }
    for binding in &scan.bindings {
        let key_start = w.offset();
        w.write(&binding.name);
        let key = TextRange::new(key_start, w.offset());
        w.write(": __v_unref(");
        w.write(&binding.name);
        w.write("),\n");

        let declaration = TextRange::new(shift(binding.range.start), shift(binding.range.end));
        w.teleport(key, declaration, MIRROR_CAPS, MIRROR_CAPS);
    }
    w.write("};\n");
    w.finish()
}

fn scan(text: &str) -> SetupScan {
    let tokens = tokenize(text);
    let mut out = SetupScan::default();
    let mut depth = 0usize;
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        if token.kind.opens() {
            depth += 1;
            i += 1;
            continue;
        }
        if token.kind.closes() {
            depth = depth.saturating_sub(1);
            i += 1;
            continue;
        }
        if depth != 0 || token.kind != Token::Ident {
            i += 1;
            continue;
        }

        let at_statement_start = statement_start(&tokens, i, text);
        match token.text(text) {
            "import" if at_statement_start => i = scan_import(&tokens, i + 1, text, &mut out.bindings),
            "const" | "let" | "var" if at_statement_start => {
                i = scan_declaration(&tokens, i + 1, text, &mut out);
            }
            "function" | "class" => {
                if let Some(name) = tokens.get(i + 1).filter(|t| t.kind == Token::Ident) {
                    out.bindings.push(Binding {
                        name: SmolStr::new(name.text(text)),
                        range: name.span.clone(),
                    });
                }
                i += 2;
            }
            "defineProps" | "withDefaults" if at_statement_start => {
                out.bare_define_props = Some(token.span.start);
                i += 1;
            }
            _ => i += 1,
        }
    }
    out
}

/// Whether token `i` begins a statement.
fn statement_start(tokens: &[Spanned], i: usize, text: &str) -> bool {
    let Some(prev) = i.checked_sub(1).map(|p| &tokens[p]) else {
        return true;
    };
    match prev.kind {
        Token::Semi | Token::RBrace => true,
        Token::Eq | Token::Comma | Token::Punct | Token::Dot | Token::OptionalDot | Token::Arrow
        | Token::Colon | Token::LParen | Token::LBracket => false,
        _ => {
            newline_between(text, prev.span.end, tokens[i].span.start)
                && !(prev.kind == Token::Ident && prev.text(text) == "export")
        }
    }
}

/// Collect import bindings from the token after `import`; returns the index
/// to resume at.
fn scan_import(tokens: &[Spanned], mut i: usize, text: &str, bindings: &mut Vec<Binding>) -> usize {
    if tokens.get(i).is_some_and(|t| t.kind == Token::Ident && t.text(text) == "type") {
        // `import type { X } from '...'`, unless `type` is itself the default import.
        let next_is_from = tokens.get(i + 1).is_some_and(|t| t.kind == Token::Ident && t.text(text) == "from");
        if !next_is_from {
            return skip_to_from(tokens, i, text);
        }
    }

    let mut in_braces = false;
    while let Some(token) = tokens.get(i) {
        match token.kind {
            Token::Str => return i + 1,
            Token::LBrace => in_braces = true,
            Token::RBrace => in_braces = false,
            Token::Ident => {
                let word = token.text(text);
                if word == "from" && !in_braces {
                    return i + 2;
                }
                let next = tokens.get(i + 1);
                let next_is_as = next.is_some_and(|t| t.kind == Token::Ident && t.text(text) == "as");
                if in_braces && word == "type" && next.is_some_and(|t| t.kind == Token::Ident) && !next_is_as {
                    // `{ type X }`: skip the type-only specifier.
                    i += 2;
                    continue;
                }
                if next_is_as {
                    // `a as b` binds `b`.
                    if let Some(alias) = tokens.get(i + 2).filter(|t| t.kind == Token::Ident) {
                        bindings.push(Binding {
                            name: SmolStr::new(alias.text(text)),
                            range: alias.span.clone(),
                        });
                    }
                    i += 3;
                    continue;
                }
                if word != "as" {
                    bindings.push(Binding {
                        name: SmolStr::new(word),
                        range: token.span.clone(),
                    });
                }
            }
            Token::Punct if token.text(text) == "*" => {}
            _ => {}
        }
        i += 1;
    }
    i
}

fn skip_to_from(tokens: &[Spanned], mut i: usize, text: &str) -> usize {
    while let Some(token) = tokens.get(i) {
        if token.kind == Token::Str {
            return i + 1;
        }
        if token.kind == Token::Ident && token.text(text) == "from" {
            return i + 2;
        }
        i += 1;
    }
    i
}

/// Collect the declarators of a `const`/`let`/`var` statement.
fn scan_declaration(tokens: &[Spanned], mut i: usize, text: &str, out: &mut SetupScan) -> usize {
    loop {
        let Some(target) = tokens.get(i) else { return i };
        match target.kind {
            Token::Ident => {
                let name = SmolStr::new(target.text(text));
                let initializer = tokens.get(i + 1).filter(|t| t.kind == Token::Eq).and(tokens.get(i + 2));
                if initializer.is_some_and(|t| {
                    t.kind == Token::Ident && matches!(t.text(text), "defineProps" | "withDefaults")
                }) {
                    out.props_binding = Some(name.clone());
                }
                out.bindings.push(Binding {
                    name,
                    range: target.span.clone(),
                });
                i += 1;
            }
            Token::LBrace | Token::LBracket => {
                let Some(close) = matching_close(tokens, i) else { return i + 1 };
                let start = target.span.start;
                let pattern = &text[start..tokens[close].span.end];
                for (name, range) in pattern_bindings(pattern) {
                    out.bindings.push(Binding {
                        name,
                        range: start + range.start..start + range.end,
                    });
                }
                i = close + 1;
            }
            _ => return i,
        }

        // Skip the type annotation and initializer up to the next declarator.
        let mut depth = 0usize;
        loop {
            let Some(token) = tokens.get(i) else { return i };
            if token.kind.opens() {
                depth += 1;
            } else if token.kind.closes() {
                if depth == 0 {
                    return i;
                }
                depth -= 1;
            } else if depth == 0 {
                match token.kind {
                    Token::Comma => {
                        i += 1;
                        break;
                    }
                    Token::Semi => return i + 1,
                    _ => {}
                }
                let prev = &tokens[i - 1];
                let continues = matches!(
                    prev.kind,
                    Token::Eq | Token::Comma | Token::Punct | Token::Dot | Token::OptionalDot
                        | Token::Arrow | Token::Colon | Token::Lt | Token::Gt
                );
                if !continues && newline_between(text, prev.span.end, token.span.start) {
                    return i;
                }
            }
            i += 1;
        }
    }
}
