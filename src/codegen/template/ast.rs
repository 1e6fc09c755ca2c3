//! Template syntax tree.
//!
//! All ranges are byte ranges into the template region text.

use smol_str::SmolStr;

use crate::base::TextRange;

/// A parsed template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateAst {
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Interpolation(Interpolation),
    Text(TextRange),
    Comment(TextRange),
}

impl Node {
    /// Text and comments between siblings do not break a `v-if` chain.
    pub fn is_insignificant(&self, src: &str) -> bool {
        match self {
            Node::Comment(_) => true,
            Node::Text(range) => src[*range].trim().is_empty(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: SmolStr,
    /// Range of the tag name in the start tag.
    pub tag_range: TextRange,
    /// Range of the tag name in the end tag, if there is one.
    pub end_tag_range: Option<TextRange>,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
    /// Whole element, start tag through end tag.
    pub range: TextRange,
}

impl Element {
    /// The first directive with the given name.
    pub fn directive(&self, name: &str) -> Option<&Directive> {
        self.attributes.iter().find_map(|attr| match attr {
            Attribute::Directive(d) if d.name == name => Some(d),
            _ => None,
        })
    }

    pub fn has_directive(&self, name: &str) -> bool {
        self.directive(name).is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpolation {
    /// The expression inside the braces, whitespace trimmed.
    pub expression: TextRange,
    /// The whole `{{ ... }}`.
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    Static(StaticAttribute),
    Directive(Directive),
}

/// `name` or `name="value"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticAttribute {
    pub name: SmolStr,
    pub name_range: TextRange,
    /// Value without quotes.
    pub value: Option<TextRange>,
    pub range: TextRange,
}

/// `v-name:arg.mod="expr"` and the `:`, `@`, `#` shorthands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Directive name without the `v-` prefix (`bind`, `on`, `if`, ...).
    pub name: SmolStr,
    /// Range of the directive name as written (`v-focus`), empty for shorthands.
    pub name_range: TextRange,
    pub arg: Option<DirectiveArg>,
    pub modifiers: Vec<SmolStr>,
    /// Value without quotes, whitespace trimmed.
    pub expression: Option<TextRange>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveArg {
    pub name: SmolStr,
    pub range: TextRange,
    /// `:[key]` dynamic argument; `range` covers the expression inside.
    pub dynamic: bool,
}
