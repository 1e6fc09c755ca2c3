//! Rename across spellings.
//!
//! A name can reach the engine under another spelling than the one written
//! in the source: `foo-bar` as `fooBar`, `my-button` as `MyButton`, `@change`
//! as `onChange`. The new name is typed against the source spelling at the
//! request position; it is first converted to the engine's spelling there,
//! and every edit is converted back to the spelling its own source uses.

use crate::base::{DocumentId, TextRange, TextSize};
use crate::codegen::names::{camelize, capitalize, hyphenate, pascalize, uncapitalize};
use crate::mapping::{Capabilities, MappingData};

use super::analysis::Analysis;
use super::engine::CheckingEngine;
use super::references::walk;

/// A text replacement in an original document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenameEdit {
    pub document: DocumentId,
    pub range: TextRange,
    pub new_text: String,
}

/// Edits renaming the symbol at `offset` to `new_name`.
///
/// Empty when the position carries no renameable mapping.
pub fn rename(
    analysis: &Analysis,
    engine: &dyn CheckingEngine,
    document: DocumentId,
    offset: TextSize,
    new_name: &str,
) -> Vec<RenameEdit> {
    let origin = analysis
        .map_to_synthetic(document, TextRange::empty(offset), Capabilities::RENAME)
        .into_iter()
        .next();
    let Some(origin) = origin else {
        return Vec::new();
    };
    let target_upper = analysis
        .synthetic_text(origin.id)
        .and_then(|text| text.get(usize::from(origin.range.start())..).and_then(|t| t.chars().next()))
        .is_some_and(char::is_uppercase);
    let engine_name = to_engine_spelling(new_name, &origin.data, target_upper);

    let mut edits: Vec<RenameEdit> = walk(
        analysis,
        document,
        offset,
        Capabilities::RENAME,
        |file, at| engine.rename_locations(file, at),
    )
    .into_iter()
    .map(|location| {
        let source = analysis
            .source_text(location.document)
            .and_then(|text| text.get(usize::from(location.range.start())..usize::from(location.range.end())))
            .unwrap_or_default();
        RenameEdit {
            document: location.document,
            range: location.range,
            new_text: to_source_spelling(&engine_name, &location.data, source),
        }
    })
    .collect();
    edits.sort_by_key(|e| (e.document, e.range.start()));
    tracing::debug!(%document, edits = edits.len(), new_name, "rename resolved");
    edits
}

/// The new name as the engine spells it at a mapping with `data`.
fn to_engine_spelling(new_name: &str, data: &MappingData, target_upper: bool) -> String {
    match data {
        MappingData::Verbatim => new_name.to_string(),
        MappingData::Camelized | MappingData::RawAlias { .. } if target_upper => pascalize(new_name),
        MappingData::Camelized | MappingData::RawAlias { .. } => camelize(new_name),
        MappingData::Capitalized => format!("on{}", capitalize(&camelize(new_name))),
    }
}

/// The engine spelling converted to how `source` writes it.
fn to_source_spelling(engine_name: &str, data: &MappingData, source: &str) -> String {
    let hyphenated = source.contains('-');
    match data {
        MappingData::Verbatim => engine_name.to_string(),
        MappingData::Camelized | MappingData::RawAlias { .. } if hyphenated => hyphenate(engine_name),
        MappingData::Camelized | MappingData::RawAlias { .. } => engine_name.to_string(),
        MappingData::Capitalized => {
            let bare = engine_name
                .strip_prefix("on")
                .filter(|rest| rest.starts_with(char::is_uppercase))
                .unwrap_or(engine_name);
            let name = uncapitalize(bare);
            if hyphenated { hyphenate(&name) } else { name }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smol_str::SmolStr;

    #[test]
    fn test_engine_spelling() {
        assert_eq!(to_engine_spelling("baz-qux", &MappingData::Camelized, false), "bazQux");
        assert_eq!(to_engine_spelling("your-button", &MappingData::Camelized, true), "YourButton");
        assert_eq!(to_engine_spelling("blur", &MappingData::Capitalized, false), "onBlur");
        assert_eq!(to_engine_spelling("x", &MappingData::Verbatim, false), "x");
    }

    #[test]
    fn test_source_spelling() {
        assert_eq!(to_source_spelling("bazQux", &MappingData::Camelized, "foo-bar"), "baz-qux");
        assert_eq!(to_source_spelling("bazQux", &MappingData::Camelized, "fooBar"), "bazQux");
        assert_eq!(to_source_spelling("YourButton", &MappingData::Camelized, "my-button"), "your-button");
        let alias = MappingData::RawAlias { canonical: SmolStr::new("fooBar") };
        assert_eq!(to_source_spelling("bazQux", &alias, "foo-bar"), "baz-qux");
        assert_eq!(to_source_spelling("onBlur", &MappingData::Capitalized, "change"), "blur");
        assert_eq!(to_source_spelling("onItemPicked", &MappingData::Capitalized, "item-chosen"), "item-picked");
        assert_eq!(to_source_spelling("bazQux", &MappingData::Verbatim, "fooBar"), "bazQux");
    }
}
