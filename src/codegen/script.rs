//! Primary `<script>` block.
//!
//! Copied verbatim. The `export default` object is passed through
//! `__v_defineComponent(...)` so the engine infers the component options
//! type the same way the runtime does.

use crate::base::{TextRange, TextSize};
use crate::mapping::Capabilities;

use super::RegionOutput;
use super::lexer::{Spanned, Token, matching_close, tokenize};
use super::names::is_reserved_word;
use super::writer::CodeWriter;

pub(crate) fn generate_script(text: &str) -> RegionOutput {
    let mut w = CodeWriter::new();
    match find_default_export(text) {
        Some(export) => {
            w.write_with_insertions(
                text,
                TextSize::from(0),
                &[
                    (export.expression.start, "__v_defineComponent(".to_owned()),
                    (export.expression.end, ")".to_owned()),
                ],
                Capabilities::VERBATIM,
            );
            // The keyword span is unshifted by the insertions after it.
            let keyword = TextRange::new(
                TextSize::from(export.keyword.start as u32),
                TextSize::from(export.keyword.end as u32),
            );
            w.gate(keyword, keyword, Capabilities::DIAGNOSTIC_ONLY);
        }
        None => {
            if !text.is_empty() {
                w.write_mapped(text, TextSize::from(0), Capabilities::VERBATIM);
            }
        }
    }
    w.finish()
}

struct DefaultExport {
    /// `export default`
    keyword: std::ops::Range<usize>,
    /// The exported expression.
    expression: std::ops::Range<usize>,
}

fn find_default_export(text: &str) -> Option<DefaultExport> {
    let tokens = tokenize(text);
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        if token.kind.opens() {
            depth += 1;
            continue;
        }
        if token.kind.closes() {
            depth = depth.saturating_sub(1);
            continue;
        }
        if depth != 0 || !is_word(token, text, "export") {
            continue;
        }
        let Some(default) = tokens.get(i + 1).filter(|t| is_word(t, text, "default")) else {
            continue;
        };
        let first = tokens.get(i + 2)?;
        let end = expression_end(&tokens, i + 2, text)?;
        return Some(DefaultExport {
            keyword: token.span.start..default.span.end,
            expression: first.span.start..end,
        });
    }
    None
}

/// End of the exported expression starting at token `start`.
///
/// Object, array and parenthesized literals run to their closing bracket;
/// otherwise the expression is a member path with optional calls
/// (`defineComponent({..})`, `mixins.base`). Declarations (`function`,
/// `class`, `async`) and arrow functions are not wrapped.
fn expression_end(tokens: &[Spanned], start: usize, text: &str) -> Option<usize> {
    let first = tokens.get(start)?;
    let (mut last, mut end) = if first.kind.opens() {
        let close = matching_close(tokens, start)?;
        (close, tokens[close].span.end)
    } else if first.kind == Token::Ident
        && !is_reserved_word(first.text(text))
        && first.text(text) != "async"
    {
        (start, first.span.end)
    } else {
        return None;
    };

    if first.kind == Token::Ident {
        loop {
            match tokens.get(last + 1).map(|t| t.kind) {
                Some(Token::Dot | Token::OptionalDot)
                    if tokens.get(last + 2).is_some_and(|t| t.kind == Token::Ident) =>
                {
                    last += 2;
                }
                Some(Token::LParen) => last = matching_close(tokens, last + 1)?,
                _ => break,
            }
            end = tokens[last].span.end;
        }
    }

    if tokens.get(last + 1).is_some_and(|t| t.kind == Token::Arrow) {
        return None;
    }
    Some(end)
}

fn is_word(token: &Spanned, text: &str, word: &str) -> bool {
    token.kind == Token::Ident && token.text(text) == word
}
