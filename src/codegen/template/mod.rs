//! Template regions: markup parser and code generation.

pub mod ast;
mod generate;
mod parser;

pub use parser::{TemplateParseError, parse_template};

pub(crate) use generate::generate_template_code;
