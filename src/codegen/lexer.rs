//! Script token scanner shared by the script and template generators.
//!
//! This is a tokenizer, not a parser: it only has to tell identifiers,
//! strings, comments and brackets apart well enough to find bindings and
//! free identifiers. Anything it does not recognise comes back as
//! [`Token::Unknown`] and is copied through untouched.

use std::ops::Range;

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub(crate) enum Token {
    #[regex(r"[A-Za-z_$\u{80}-\u{10FFFF}][A-Za-z0-9_$\u{80}-\u{10FFFF}]*")]
    Ident,

    #[regex(r"[0-9][0-9A-Za-z_]*(\.[0-9A-Za-z_]+)?")]
    Number,

    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    #[regex(r"'([^'\\\n]|\\[^\n])*'")]
    #[regex(r"`([^`\\]|\\[\s\S])*`")]
    Str,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    #[token(".")]
    Dot,

    #[token("?.")]
    OptionalDot,

    #[token("...")]
    Spread,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token(";")]
    Semi,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("=>")]
    Arrow,

    #[token("=")]
    Eq,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[regex(r"[+\-*/%!&|\^~?]")]
    Punct,

    Unknown,
}

impl Token {
    pub(crate) fn is_trivia(self) -> bool {
        matches!(self, Token::LineComment | Token::BlockComment)
    }

    pub(crate) fn opens(self) -> bool {
        matches!(self, Token::LParen | Token::LBrace | Token::LBracket)
    }

    pub(crate) fn closes(self) -> bool {
        matches!(self, Token::RParen | Token::RBrace | Token::RBracket)
    }
}

/// A token with its byte range in the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Spanned {
    pub kind: Token,
    pub span: Range<usize>,
}

impl Spanned {
    pub(crate) fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.span.clone()]
    }
}

/// Scan `src` into tokens, dropping comments.
pub(crate) fn tokenize(src: &str) -> Vec<Spanned> {
    Token::lexer(src)
        .spanned()
        .map(|(kind, span)| Spanned {
            kind: kind.unwrap_or(Token::Unknown),
            span,
        })
        .filter(|t| !t.kind.is_trivia())
        .collect()
}

/// Index of the token closing the bracket opened at `open`.
pub(crate) fn matching_close(tokens: &[Spanned], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        if token.kind.opens() {
            depth += 1;
        } else if token.kind.closes() {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Whether a line break separates the two byte offsets.
pub(crate) fn newline_between(src: &str, from: usize, to: usize) -> bool {
    src.get(from..to).is_some_and(|gap| gap.contains('\n'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Token> {
        tokenize(src).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_member_access() {
        assert_eq!(
            kinds("a.b?.c"),
            vec![Token::Ident, Token::Dot, Token::Ident, Token::OptionalDot, Token::Ident]
        );
    }

    #[test]
    fn test_strings_and_comments() {
        assert_eq!(
            kinds("'a' + \"b\" // c\n/* d */ `e`"),
            vec![Token::Str, Token::Punct, Token::Str, Token::Str]
        );
    }

    #[test]
    fn test_arrow_and_eq() {
        assert_eq!(
            kinds("x => y = 1"),
            vec![Token::Ident, Token::Arrow, Token::Ident, Token::Eq, Token::Number]
        );
    }

    #[test]
    fn test_unknown_is_kept() {
        let tokens = tokenize("a # b");
        assert_eq!(tokens[1].kind, Token::Unknown);
        assert_eq!(tokens[1].span, 2..3);
    }

    #[test]
    fn test_matching_close() {
        let tokens = tokenize("f(a, (b), [c])");
        assert_eq!(matching_close(&tokens, 1), Some(tokens.len() - 1));
    }
}
