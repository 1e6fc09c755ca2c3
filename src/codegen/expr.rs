//! Template expression rewriting.
//!
//! Template expressions are evaluated against the component instance, so a
//! free identifier `x` is written as `<ctx>.x`. Locals (v-for aliases, slot
//! props, arrow function parameters, `$event`) and a small set of globals
//! stay bare. Every identifier gets its own mapping; the text between
//! identifiers is mapped in runs, and a diagnostics gate covers the whole
//! rewritten expression so an error over the full expression maps back to
//! the full source expression.

use std::ops::Range;

use smol_str::SmolStr;

use crate::base::{TextRange, TextSize};
use crate::mapping::Capabilities;

use super::lexer::{Spanned, Token, matching_close, tokenize};
use super::names::{is_reserved_word, is_template_global};
use super::writer::CodeWriter;

/// Names bound by enclosing template constructs.
#[derive(Debug, Default, Clone)]
pub(crate) struct Locals {
    names: Vec<SmolStr>,
}

impl Locals {
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub(crate) fn push(&mut self, name: impl Into<SmolStr>) {
        self.names.push(name.into());
    }

    /// Current depth, to restore with [`Locals::truncate`].
    pub(crate) fn mark(&self) -> usize {
        self.names.len()
    }

    pub(crate) fn truncate(&mut self, mark: usize) {
        self.names.truncate(mark);
    }
}

/// Write `expr` (found at `source_start` in the region) with context
/// lookups for free identifiers.
pub(crate) fn write_expression(
    w: &mut CodeWriter,
    expr: &str,
    source_start: TextSize,
    locals: &Locals,
    ctx: &str,
) {
    let begin = w.offset();
    write_code(w, expr, source_start, locals, &[], ctx);
    let source = TextRange::at(source_start, TextSize::of(expr));
    w.gate_since(source, begin, Capabilities::DIAGNOSTIC_ONLY);
}

/// Rewrite one run of code. Template literal holes recurse with the
/// enclosing arrow parameters still in scope.
fn write_code(
    w: &mut CodeWriter,
    expr: &str,
    source_start: TextSize,
    locals: &Locals,
    outer_params: &[SmolStr],
    ctx: &str,
) {
    let tokens = tokenize(expr);
    let mut params = outer_params.to_vec();
    params.extend(arrow_params(&tokens, expr));
    let mut run_start = 0usize;

    let flush = |w: &mut CodeWriter, from: usize, to: usize| {
        if to > from {
            w.write_mapped(
                &expr[from..to],
                source_start + TextSize::from(from as u32),
                Capabilities::CODE,
            );
        }
    };

    let mut brace_stack: Vec<bool> = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            Token::LBrace => brace_stack.push(is_object_literal(&tokens, i)),
            Token::RBrace => {
                brace_stack.pop();
            }
            Token::Str if token.text(expr).starts_with('`') => {
                for hole in template_holes(token.text(expr)) {
                    let hole = token.span.start + hole.start..token.span.start + hole.end;
                    flush(w, run_start, hole.start);
                    write_code(
                        w,
                        &expr[hole.clone()],
                        source_start + TextSize::from(hole.start as u32),
                        locals,
                        &params,
                        ctx,
                    );
                    run_start = hole.end;
                }
                continue;
            }
            _ => {}
        }
        if token.kind != Token::Ident {
            continue;
        }
        let name = token.text(expr);
        let prev = i.checked_sub(1).map(|p| tokens[p].kind);
        let next = tokens.get(i + 1).map(|t| t.kind);

        // Identifiers get a mapping of their own.
        flush(w, run_start, token.span.start);
        run_start = token.span.start;

        if matches!(prev, Some(Token::Dot | Token::OptionalDot)) {
            flush(w, run_start, token.span.end);
            run_start = token.span.end;
            continue;
        }

        let in_object = brace_stack.last().copied().unwrap_or(false);
        let key_position = in_object && matches!(prev, Some(Token::LBrace | Token::Comma));
        if key_position && next == Some(Token::Colon) {
            // `{ key: value }`: the key is not a lookup.
            flush(w, run_start, token.span.end);
            run_start = token.span.end;
            continue;
        }

        let is_free = !is_reserved_word(name)
            && !is_template_global(name)
            && !locals.contains(name)
            && !params.iter().any(|p| p == name);

        if key_position && matches!(next, Some(Token::Comma | Token::RBrace)) && is_free {
            // Shorthand `{ key }` becomes `{ key: ctx.key }`.
            flush(w, run_start, token.span.end);
            w.write(": ");
            w.write(ctx);
            w.write(".");
            flush(w, token.span.start, token.span.end);
            run_start = token.span.end;
            continue;
        }

        if is_free {
            w.write(ctx);
            w.write(".");
        }
        flush(w, run_start, token.span.end);
        run_start = token.span.end;
    }
    flush(w, run_start, expr.len());
}

/// Byte ranges of the `${...}` bodies in a template literal, relative to
/// the literal.
fn template_holes(literal: &str) -> Vec<Range<usize>> {
    let bytes = literal.as_bytes();
    let mut holes = Vec::new();
    let mut i = 1;
    while i + 1 < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'$' if bytes[i + 1] == b'{' => {
                let start = i + 2;
                let mut depth = 0usize;
                let mut close = None;
                for token in tokenize(&literal[start..]) {
                    match token.kind {
                        Token::LBrace => depth += 1,
                        Token::RBrace if depth == 0 => {
                            close = Some(start + token.span.start);
                            break;
                        }
                        Token::RBrace => depth -= 1,
                        _ => {}
                    }
                }
                let Some(close) = close else {
                    break;
                };
                holes.push(start..close);
                i = close + 1;
            }
            _ => i += 1,
        }
    }
    holes
}

/// Whether the `{` at `index` starts an object literal rather than a block.
fn is_object_literal(tokens: &[Spanned], index: usize) -> bool {
    match index.checked_sub(1).map(|p| tokens[p].kind) {
        None => true,
        Some(Token::Arrow | Token::RParen) => false,
        Some(_) => true,
    }
}

/// Parameter names of every arrow function in the expression.
fn arrow_params(tokens: &[Spanned], src: &str) -> Vec<SmolStr> {
    let mut params = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        if token.kind != Token::Arrow || i == 0 {
            continue;
        }
        let before = &tokens[i - 1];
        match before.kind {
            Token::Ident => params.push(SmolStr::new(before.text(src))),
            Token::RParen => {
                let Some(open) = (0..i - 1)
                    .rev()
                    .find(|&o| tokens[o].kind == Token::LParen && matching_close(tokens, o) == Some(i - 1))
                else {
                    continue;
                };
                let inner = &src[tokens[open].span.end..before.span.start];
                params.extend(pattern_bindings(inner).into_iter().map(|(name, _)| name));
            }
            _ => {}
        }
    }
    params
}

/// Names bound by a destructuring pattern or parameter list, with their
/// byte ranges in `pattern`.
///
/// `{ a, b: c, d = 1 }` binds `a`, `c` and `d`; `[x, ...rest]` binds `x`
/// and `rest`. Type annotations after a top-level `:` and default values
/// are skipped.
pub(crate) fn pattern_bindings(pattern: &str) -> Vec<(SmolStr, Range<usize>)> {
    let tokens = tokenize(pattern);
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut skipping = false;
    let mut skip_depth = 0usize;

    for (i, token) in tokens.iter().enumerate() {
        if token.kind.opens() {
            depth += 1;
            continue;
        }
        if token.kind.closes() {
            depth = depth.saturating_sub(1);
            if skipping && depth < skip_depth {
                skipping = false;
            }
            continue;
        }
        if token.kind == Token::Comma && (!skipping || depth <= skip_depth) {
            skipping = false;
            continue;
        }
        if skipping {
            continue;
        }
        match token.kind {
            Token::Eq => {
                skipping = true;
                skip_depth = depth;
            }
            Token::Colon if depth == 0 => {
                // Type annotation on a bare parameter.
                skipping = true;
                skip_depth = depth;
            }
            Token::Ident => {
                let next = tokens.get(i + 1).map(|t| t.kind);
                if next == Some(Token::Colon) && depth > 0 {
                    // `key: binding` inside an object pattern.
                    continue;
                }
                let name = token.text(pattern);
                if !is_reserved_word(name) {
                    out.push((SmolStr::new(name), token.span.clone()));
                }
            }
            _ => {}
        }
    }
    out
}

/// Whether `expr` is a plain member path (`a`, `a.b`, `a?.b.c`).
pub(crate) fn is_member_path(expr: &str) -> bool {
    let tokens = tokenize(expr);
    !tokens.is_empty()
        && tokens.iter().enumerate().all(|(i, t)| {
            if i % 2 == 0 {
                t.kind == Token::Ident
            } else {
                matches!(t.kind, Token::Dot | Token::OptionalDot)
            }
        })
        && tokens.len() % 2 == 1
}

/// Whether `expr` is already a function (`x => ..`, `(a) => ..`, `function`).
pub(crate) fn is_function_expression(expr: &str) -> bool {
    let tokens = tokenize(expr);
    match tokens.first() {
        Some(first) if first.kind == Token::Ident && first.text(expr) == "function" => true,
        Some(first) if first.kind == Token::Ident && first.text(expr) == "async" => true,
        Some(first) if first.kind == Token::Ident => {
            tokens.get(1).map(|t| t.kind) == Some(Token::Arrow)
        }
        Some(first) if first.kind == Token::LParen => matching_close(&tokens, 0)
            .and_then(|close| tokens.get(close + 1))
            .is_some_and(|t| t.kind == Token::Arrow),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::range_at;
    use crate::mapping::{Direction, MappingMode, SourceMap};

    fn rewrite(expr: &str, locals: &[&str]) -> String {
        let mut scope = Locals::default();
        for l in locals {
            scope.push(*l);
        }
        let mut w = CodeWriter::new();
        write_expression(&mut w, expr, TextSize::from(0), &scope, "__v_ctx");
        w.finish().text
    }

    #[test]
    fn test_free_identifier() {
        assert_eq!(rewrite("x", &[]), "__v_ctx.x");
        assert_eq!(rewrite("a + b.c", &[]), "__v_ctx.a + __v_ctx.b.c");
    }

    #[test]
    fn test_locals_and_globals() {
        assert_eq!(rewrite("item.name + Math.max(i, 1)", &["item", "i"]), "item.name + Math.max(i, 1)");
    }

    #[test]
    fn test_arrow_params_stay_local() {
        assert_eq!(rewrite("list.map(x => x * k)", &[]), "__v_ctx.list.map(x => x * __v_ctx.k)");
        assert_eq!(rewrite("(a, b) => a + c", &[]), "(a, b) => a + __v_ctx.c");
    }

    #[test]
    fn test_object_literal_keys() {
        assert_eq!(rewrite("{ active: on, big }", &[]), "{ active: __v_ctx.on, big: __v_ctx.big }");
    }

    #[test]
    fn test_single_identifier_mapping() {
        let mut w = CodeWriter::new();
        write_expression(&mut w, "x", TextSize::from(3), &Locals::default(), "__v_ctx");
        let out = w.finish();

        let offsets: Vec<_> = out
            .mappings
            .iter()
            .filter(|m| m.mode == MappingMode::Offset)
            .collect();
        assert_eq!(offsets.len(), 1);
        assert_eq!(offsets[0].source, range_at(3, 1));
        assert_eq!(offsets[0].target, range_at(8, 1));
        let gate = out.mappings.iter().find(|m| m.mode == MappingMode::Gate).unwrap();
        assert_eq!(gate.target, range_at(0, 9));
    }

    #[test]
    fn test_template_literal_holes_are_rewritten() {
        assert_eq!(rewrite("`n-${count}`", &[]), "`n-${__v_ctx.count}`");
        assert_eq!(
            rewrite("`${a + 1}/${item.b}` + c", &["item"]),
            "`${__v_ctx.a + 1}/${item.b}` + __v_ctx.c"
        );
        assert_eq!(rewrite("xs.map(x => `${x}-${y}`)", &[]), "__v_ctx.xs.map(x => `${x}-${__v_ctx.y}`)");
        assert_eq!(rewrite("`a \\${b}`", &[]), "`a \\${b}`");
        assert_eq!(rewrite("`${ {k: v}.k }`", &[]), "`${ {k: __v_ctx.v}.k }`");
    }

    #[test]
    fn test_template_literal_hole_mapping() {
        let expr = "`n-${count}`";
        let mut w = CodeWriter::new();
        write_expression(&mut w, expr, TextSize::from(10), &Locals::default(), "__v_ctx");
        let out = w.finish();

        let at = expr.find("count").unwrap() as u32;
        let map: SourceMap = out.mappings.iter().cloned().collect();
        let hit = map
            .query_with(range_at(10 + at, 5), Direction::Forward, Capabilities::RENAME)
            .next()
            .unwrap();
        assert_eq!(&out.text[hit.range], "count");
        let first = map.first_forward(range_at(10 + at, 1)).unwrap();
        assert_eq!(&out.text[first.range], "c");
    }

    #[test]
    fn test_pattern_bindings() {
        let names = |p: &str| -> Vec<String> {
            pattern_bindings(p).into_iter().map(|(n, _)| n.to_string()).collect()
        };
        assert_eq!(names("item, index"), vec!["item", "index"]);
        assert_eq!(names("{ id, label: text, size = 1 }, i"), vec!["id", "text", "size", "i"]);
        assert_eq!(names("[first, ...rest]"), vec!["first", "rest"]);
        assert_eq!(names("value: string"), vec!["value"]);
    }

    #[test]
    fn test_expression_shapes() {
        assert!(is_member_path("onSave"));
        assert!(is_member_path("form.submit"));
        assert!(!is_member_path("count++"));
        assert!(is_function_expression("e => save(e)"));
        assert!(is_function_expression("(e) => save(e)"));
        assert!(!is_function_expression("save(e)"));
    }
}
