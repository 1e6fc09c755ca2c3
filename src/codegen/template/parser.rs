//! Template markup parser.
//!
//! A small recursive-descent parser for the HTML-like template syntax:
//! elements, attributes and directives, `{{ }}` interpolations, comments and
//! text. It is strict about structure (every non-void element must close)
//! because a half-understood tree would produce mappings at wrong positions;
//! callers treat an error as "no intelligence for this region".

use smol_str::SmolStr;
use thiserror::Error;

use crate::base::{TextRange, TextSize};

use super::ast::{
    Attribute, Directive, DirectiveArg, Element, Interpolation, Node, StaticAttribute, TemplateAst,
};

/// Why a template could not be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateParseError {
    #[error("offset {offset}: element <{tag}> is never closed")]
    UnclosedElement { tag: SmolStr, offset: usize },

    #[error("offset {offset}: start tag <{tag}> is not terminated")]
    UnterminatedStartTag { tag: SmolStr, offset: usize },

    #[error("offset {offset}: expected </{expected}>, found </{found}>")]
    MismatchedEndTag {
        expected: SmolStr,
        found: SmolStr,
        offset: usize,
    },

    #[error("offset {offset}: unexpected end tag </{found}>")]
    UnexpectedEndTag { found: SmolStr, offset: usize },

    #[error("offset {offset}: unterminated interpolation")]
    UnterminatedInterpolation { offset: usize },

    #[error("offset {offset}: unterminated comment")]
    UnterminatedComment { offset: usize },

    #[error("offset {offset}: unterminated attribute value")]
    UnterminatedAttributeValue { offset: usize },
}

/// Parse template region text.
pub fn parse_template(src: &str) -> Result<TemplateAst, TemplateParseError> {
    let mut parser = Parser { src, pos: 0 };
    let (children, _) = parser.nodes(None)?;
    Ok(TemplateAst { children })
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

fn range(start: usize, end: usize) -> TextRange {
    TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32))
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> (usize, usize) {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        (start, self.pos)
    }

    /// Parse sibling nodes until the end tag of `parent` (or end of input
    /// when `parent` is `None`). Returns the end tag name range.
    fn nodes(
        &mut self,
        parent: Option<(&SmolStr, usize)>,
    ) -> Result<(Vec<Node>, Option<TextRange>), TemplateParseError> {
        let mut children = Vec::new();
        loop {
            if self.eof() {
                return match parent {
                    Some((tag, offset)) => Err(TemplateParseError::UnclosedElement {
                        tag: tag.clone(),
                        offset,
                    }),
                    None => Ok((children, None)),
                };
            }

            let rest = self.rest();
            if rest.starts_with("<!--") {
                let start = self.pos;
                let end = rest
                    .find("-->")
                    .ok_or(TemplateParseError::UnterminatedComment { offset: start })?;
                self.pos += end + 3;
                children.push(Node::Comment(range(start, self.pos)));
            } else if rest.starts_with("</") {
                let offset = self.pos;
                self.pos += 2;
                let (s, e) = self.take_while(is_tag_char);
                let found = SmolStr::new(&self.src[s..e]);
                self.skip_ws();
                if self.peek() == Some(b'>') {
                    self.pos += 1;
                }
                return match parent {
                    Some((tag, _)) if tag.eq_ignore_ascii_case(&found) => {
                        Ok((children, Some(range(s, e))))
                    }
                    Some((tag, _)) => Err(TemplateParseError::MismatchedEndTag {
                        expected: tag.clone(),
                        found,
                        offset,
                    }),
                    None => Err(TemplateParseError::UnexpectedEndTag { found, offset }),
                };
            } else if rest.starts_with('<') && rest.as_bytes().get(1).is_some_and(u8::is_ascii_alphabetic) {
                let element = self.element()?;
                children.push(Node::Element(element));
            } else if rest.starts_with("{{") {
                let start = self.pos;
                let end = rest
                    .find("}}")
                    .ok_or(TemplateParseError::UnterminatedInterpolation { offset: start })?;
                let inner_start = start + 2;
                let inner_end = start + end;
                self.pos = inner_end + 2;
                children.push(Node::Interpolation(Interpolation {
                    expression: trimmed(self.src, inner_start, inner_end),
                    range: range(start, self.pos),
                }));
            } else {
                let start = self.pos;
                self.pos += 1;
                while !self.eof() {
                    let rest = self.rest();
                    if rest.starts_with('<') || rest.starts_with("{{") {
                        break;
                    }
                    self.pos += rest.chars().next().map_or(1, char::len_utf8);
                }
                children.push(Node::Text(range(start, self.pos)));
            }
        }
    }

    fn element(&mut self) -> Result<Element, TemplateParseError> {
        let start = self.pos;
        self.pos += 1;
        let (tag_start, tag_end) = self.take_while(is_tag_char);
        let tag = SmolStr::new(&self.src[tag_start..tag_end]);

        let mut attributes = Vec::new();
        let self_closing = loop {
            self.skip_ws();
            let rest = self.rest();
            if rest.is_empty() {
                return Err(TemplateParseError::UnterminatedStartTag { tag, offset: start });
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                break true;
            }
            if rest.starts_with('>') {
                self.pos += 1;
                break false;
            }
            attributes.push(self.attribute()?);
        };

        let (children, end_tag_range) = if self_closing || is_void(&tag) {
            (Vec::new(), None)
        } else {
            self.nodes(Some((&tag, start)))?
        };

        Ok(Element {
            tag,
            tag_range: range(tag_start, tag_end),
            end_tag_range,
            attributes,
            children,
            range: range(start, self.pos),
        })
    }

    fn attribute(&mut self) -> Result<Attribute, TemplateParseError> {
        let start = self.pos;
        let (name_start, name_end) = {
            let s = self.pos;
            while let Some(b) = self.peek() {
                let ends_tag = b == b'/' && self.rest().starts_with("/>");
                if b.is_ascii_whitespace() || b == b'=' || b == b'>' || ends_tag {
                    break;
                }
                self.pos += 1;
            }
            if self.pos == s {
                // A stray character the name loop cannot consume.
                self.pos += 1;
            }
            (s, self.pos)
        };

        let save = self.pos;
        self.skip_ws();
        let value = if self.peek() == Some(b'=') {
            self.pos += 1;
            self.skip_ws();
            match self.peek() {
                Some(q @ (b'"' | b'\'')) => {
                    let value_start = self.pos + 1;
                    let close = self.src[value_start..]
                        .find(q as char)
                        .ok_or(TemplateParseError::UnterminatedAttributeValue { offset: self.pos })?;
                    self.pos = value_start + close + 1;
                    Some((value_start, value_start + close))
                }
                _ => {
                    let (s, e) = self.take_while(|b| !b.is_ascii_whitespace() && b != b'>');
                    Some((s, e))
                }
            }
        } else {
            self.pos = save;
            None
        };

        Ok(classify(self.src, name_start, name_end, value, range(start, self.pos)))
    }
}

fn is_tag_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b':')
}

fn trimmed(src: &str, start: usize, end: usize) -> TextRange {
    let inner = &src[start..end];
    let lead = inner.len() - inner.trim_start().len();
    let trail = inner.len() - inner.trim_end().len();
    if lead == inner.len() {
        return range(start, start);
    }
    range(start + lead, end - trail)
}

/// Turn a raw attribute into a static attribute or a directive.
fn classify(
    src: &str,
    name_start: usize,
    name_end: usize,
    value: Option<(usize, usize)>,
    whole: TextRange,
) -> Attribute {
    let raw = &src[name_start..name_end];

    let (directive, name_range, arg_start) = if let Some(rest) = raw.strip_prefix("v-") {
        let len = rest.find([':', '.']).unwrap_or(rest.len());
        let name = &rest[..len];
        let after = name_start + 2 + len;
        let arg_start = (src.as_bytes().get(after) == Some(&b':')).then_some(after + 1);
        let modifiers_start = if arg_start.is_none() { Some(after) } else { None };
        if let Some(m) = modifiers_start {
            let modifiers = split_modifiers(&src[m..name_end]);
            return Attribute::Directive(Directive {
                name: SmolStr::new(name),
                name_range: range(name_start, after),
                arg: None,
                modifiers,
                expression: value.map(|(s, e)| trimmed(src, s, e)),
                range: whole,
            });
        }
        (SmolStr::new(name), range(name_start, after), arg_start)
    } else {
        match raw.as_bytes().first() {
            Some(b':') | Some(b'.') => (SmolStr::new("bind"), range(name_start, name_start), Some(name_start + 1)),
            Some(b'@') => (SmolStr::new("on"), range(name_start, name_start), Some(name_start + 1)),
            Some(b'#') => (SmolStr::new("slot"), range(name_start, name_start), Some(name_start + 1)),
            _ => {
                return Attribute::Static(StaticAttribute {
                    name: SmolStr::new(raw),
                    name_range: range(name_start, name_end),
                    value: value.map(|(s, e)| range(s, e)),
                    range: whole,
                });
            }
        }
    };

    let mut modifiers = Vec::new();
    let arg = arg_start.map(|s| {
        let tail = &src[s..name_end];
        if let Some(inner) = tail.strip_prefix('[') {
            let close = inner.find(']').unwrap_or(inner.len());
            let dyn_start = s + 1;
            let dyn_end = dyn_start + close;
            let after = (dyn_end + 1).min(name_end);
            modifiers = split_modifiers(&src[after..name_end]);
            DirectiveArg {
                name: SmolStr::new(&src[dyn_start..dyn_end]),
                range: trimmed(src, dyn_start, dyn_end),
                dynamic: true,
            }
        } else {
            let len = tail.find('.').unwrap_or(tail.len());
            modifiers = split_modifiers(&tail[len..]);
            DirectiveArg {
                name: SmolStr::new(&tail[..len]),
                range: range(s, s + len),
                dynamic: false,
            }
        }
    });
    if raw.starts_with('.') {
        modifiers.push(SmolStr::new("prop"));
    }

    Attribute::Directive(Directive {
        name: directive,
        name_range,
        arg,
        modifiers,
        expression: value.map(|(s, e)| trimmed(src, s, e)),
        range: whole,
    })
}

fn split_modifiers(tail: &str) -> Vec<SmolStr> {
    tail.split('.').filter(|m| !m.is_empty()).map(SmolStr::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::range_at;

    fn first_element(ast: &TemplateAst) -> &Element {
        ast.children
            .iter()
            .find_map(|n| match n {
                Node::Element(e) => Some(e),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_interpolation_is_trimmed() {
        let ast = parse_template("{{ x }}").unwrap();
        assert_eq!(
            ast.children,
            vec![Node::Interpolation(Interpolation {
                expression: range_at(3, 1),
                range: range_at(0, 7),
            })]
        );
    }

    #[test]
    fn test_element_with_attributes() {
        let src = r#"<my-comp foo-bar="1" :baz="qux" @click.stop="go" v-if="ok" disabled></my-comp>"#;
        let ast = parse_template(src).unwrap();
        let el = first_element(&ast);

        assert_eq!(el.tag, "my-comp");
        assert_eq!(el.tag_range, range_at(1, 7));
        assert_eq!(el.end_tag_range, Some(range_at(src.len() as u32 - 8, 7)));
        assert_eq!(el.attributes.len(), 5);

        let Attribute::Static(foo) = &el.attributes[0] else { panic!("static expected") };
        assert_eq!(foo.name, "foo-bar");
        assert_eq!(&src[foo.value.unwrap()], "1");

        let Attribute::Directive(bind) = &el.attributes[1] else { panic!("directive expected") };
        assert_eq!(bind.name, "bind");
        assert_eq!(bind.arg.as_ref().unwrap().name, "baz");
        assert_eq!(&src[bind.expression.unwrap()], "qux");

        let on = el.directive("on").unwrap();
        assert_eq!(on.arg.as_ref().unwrap().name, "click");
        assert_eq!(on.modifiers, vec![SmolStr::new("stop")]);

        let cond = el.directive("if").unwrap();
        assert_eq!(&src[cond.name_range], "v-if");
        assert_eq!(&src[cond.expression.unwrap()], "ok");

        let Attribute::Static(flag) = &el.attributes[4] else { panic!("static expected") };
        assert_eq!(flag.value, None);
    }

    #[test]
    fn test_directive_with_argument_and_modifiers() {
        let src = r#"<input v-model.trim="name" v-on:update:value="set"/>"#;
        let ast = parse_template(src).unwrap();
        let el = first_element(&ast);

        let model = el.directive("model").unwrap();
        assert!(model.arg.is_none());
        assert_eq!(model.modifiers, vec![SmolStr::new("trim")]);

        let on = el.directive("on").unwrap();
        assert_eq!(on.arg.as_ref().unwrap().name, "update:value");
    }

    #[test]
    fn test_void_and_self_closing() {
        let ast = parse_template("<div><br><img src=\"a.png\"><Comp /></div>").unwrap();
        let div = first_element(&ast);
        assert_eq!(div.children.len(), 3);
    }

    #[test]
    fn test_slot_shorthand() {
        let src = r#"<template #item="{ row }"></template>"#;
        let ast = parse_template(src).unwrap();
        let slot = first_element(&ast).directive("slot").unwrap();
        assert_eq!(slot.arg.as_ref().unwrap().name, "item");
        assert_eq!(&src[slot.expression.unwrap()], "{ row }");
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse_template("<div><span></div>"),
            Err(TemplateParseError::MismatchedEndTag { .. })
        ));
        assert!(matches!(
            parse_template("<div>"),
            Err(TemplateParseError::UnclosedElement { .. })
        ));
        assert!(matches!(
            parse_template("{{ x "),
            Err(TemplateParseError::UnterminatedInterpolation { .. })
        ));
        assert!(matches!(
            parse_template("<div title=\"x></div>"),
            Err(TemplateParseError::UnterminatedAttributeValue { .. })
        ));
    }

    #[test]
    fn test_unicode_text() {
        let ast = parse_template("héllo {{ n }} wörld").unwrap();
        assert_eq!(ast.children.len(), 3);
    }
}
