//! Style blocks.
//!
//! The stylesheet itself goes to the style checker verbatim. Its
//! `v-bind(expr)` values are script expressions evaluated against the
//! component, so they are also written into the script aggregate.

use crate::base::TextSize;
use crate::mapping::Capabilities;
use crate::options::CodegenOptions;

use super::RegionOutput;
use super::expr::{Locals, write_expression};
use super::writer::CodeWriter;

pub(crate) fn generate_style_text(text: &str) -> RegionOutput {
    let mut w = CodeWriter::new();
    if !text.is_empty() {
        w.write_mapped(text, TextSize::from(0), Capabilities::STYLE);
    }
    w.finish()
}

pub(crate) fn generate_style_bindings(text: &str, options: &CodegenOptions) -> RegionOutput {
    let mut w = CodeWriter::new();
    let locals = Locals::default();
    for (start, expr) in css_v_binds(text) {
        w.write("(");
        write_expression(&mut w, expr, TextSize::from(start as u32), &locals, &options.ctx_name);
        w.write(");\n");
    }
    w.finish()
}

/// Every `v-bind(...)` argument outside comments, unquoted and trimmed,
/// with its byte offset.
fn css_v_binds(text: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i..].starts_with(b"/*") {
            i = text[i + 2..].find("*/").map_or(bytes.len(), |end| i + 2 + end + 2);
            continue;
        }
        if !bytes[i..].starts_with(b"v-bind(") {
            i += 1;
            continue;
        }
        let open = i + "v-bind(".len();
        let Some(close) = text[open..].find(')') else { break };
        let inner = &text[open..open + close];
        let lead = inner.len() - inner.trim_start().len();
        let mut start = open + lead;
        let mut arg = inner.trim();
        let quoted = arg.len() >= 2
            && ((arg.starts_with('"') && arg.ends_with('"'))
                || (arg.starts_with('\'') && arg.ends_with('\'')));
        if quoted {
            arg = &arg[1..arg.len() - 1];
            start += 1;
        }
        if !arg.is_empty() {
            out.push((start, arg));
        }
        i = open + close + 1;
    }
    out
}
