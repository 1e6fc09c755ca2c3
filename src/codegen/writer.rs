//! Synthetic text builder that records mappings as it writes.

use crate::base::{TextRange, TextSize};
use crate::mapping::{Capabilities, Mapping, MappingData, Teleport};

use super::RegionOutput;
use super::names::is_identifier;

/// Appends synthetic text and the mappings for it.
///
/// Source ranges are relative to the region text being generated; target
/// ranges are relative to the text this writer produces.
#[derive(Debug, Default)]
pub(crate) struct CodeWriter {
    text: String,
    mappings: Vec<Mapping>,
    teleports: Vec<Teleport>,
}

impl CodeWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Current end of the written text.
    #[inline]
    pub(crate) fn offset(&self) -> TextSize {
        TextSize::of(self.text.as_str())
    }

    /// Write text with no mapping.
    pub(crate) fn write(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Write `text` copied from the source at `source_start`.
    pub(crate) fn write_mapped(
        &mut self,
        text: &str,
        source_start: TextSize,
        capabilities: Capabilities,
    ) -> TextRange {
        let source = TextRange::at(source_start, TextSize::of(text));
        self.write_mapped_as(text, source, capabilities, MappingData::Verbatim)
    }

    /// Write `text` standing for `source`, which may be spelled differently.
    pub(crate) fn write_mapped_as(
        &mut self,
        text: &str,
        source: TextRange,
        capabilities: Capabilities,
        data: MappingData,
    ) -> TextRange {
        let start = self.offset();
        self.text.push_str(text);
        let target = TextRange::new(start, self.offset());
        self.mappings
            .push(Mapping::offset(source, target, capabilities).with_data(data));
        target
    }

    /// Record a gate mapping for text already written.
    pub(crate) fn gate(&mut self, source: TextRange, target: TextRange, capabilities: Capabilities) {
        self.mappings.push(Mapping::gate(source, target, capabilities));
    }

    /// Record a gate over everything written since `start`.
    pub(crate) fn gate_since(&mut self, source: TextRange, start: TextSize, capabilities: Capabilities) {
        let target = TextRange::new(start, self.offset());
        self.gate(source, target, capabilities);
    }

    /// Record that two written ranges are one binding.
    pub(crate) fn teleport(
        &mut self,
        left: TextRange,
        right: TextRange,
        left_to_right: Capabilities,
        right_to_left: Capabilities,
    ) {
        self.teleports.push(Teleport {
            left,
            right,
            left_to_right,
            right_to_left,
        });
    }

    /// Write `.name`, or `['name']` when `name` is not a bare identifier.
    ///
    /// The quoted form gets an extra diagnostics-only gate over the quotes.
    pub(crate) fn write_property_access(
        &mut self,
        name: &str,
        source: TextRange,
        capabilities: Capabilities,
        data: MappingData,
    ) -> TextRange {
        if is_identifier(name) {
            self.write(".");
            self.write_mapped_as(name, source, capabilities, data)
        } else {
            self.write("[");
            let target = self.write_quoted(name, source, capabilities, data);
            self.write("]");
            target
        }
    }

    /// Write `name` as an object literal key, quoting it when needed.
    pub(crate) fn write_object_key(
        &mut self,
        name: &str,
        source: TextRange,
        capabilities: Capabilities,
        data: MappingData,
    ) -> TextRange {
        if is_identifier(name) {
            self.write_mapped_as(name, source, capabilities, data)
        } else {
            self.write_quoted(name, source, capabilities, data)
        }
    }

    fn write_quoted(
        &mut self,
        name: &str,
        source: TextRange,
        capabilities: Capabilities,
        data: MappingData,
    ) -> TextRange {
        let quote_start = self.offset();
        self.write("'");
        let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
        let target = if escaped == name {
            self.write_mapped_as(name, source, capabilities, data)
        } else {
            // Escapes shift the text, so only the whole name maps.
            let start = self.offset();
            self.write(&escaped);
            let target = TextRange::new(start, self.offset());
            self.mappings
                .push(Mapping::gate(source, target, capabilities).with_data(data));
            target
        };
        self.write("'");
        self.gate_since(source, quote_start, Capabilities::DIAGNOSTIC_ONLY);
        target
    }

    /// Copy `text` from `source_start` in runs split by `insertions`.
    ///
    /// Each insertion is `(offset into text, inserted text)`, sorted by
    /// offset. Inserted text is unmapped; every non-empty run between
    /// insertions gets its own offset mapping.
    pub(crate) fn write_with_insertions(
        &mut self,
        text: &str,
        source_start: TextSize,
        insertions: &[(usize, String)],
        capabilities: Capabilities,
    ) {
        let mut cursor = 0;
        for (at, inserted) in insertions {
            let at = (*at).min(text.len());
            if at > cursor {
                self.write_mapped(
                    &text[cursor..at],
                    source_start + TextSize::from(cursor as u32),
                    capabilities,
                );
                cursor = at;
            }
            self.write(inserted);
        }
        if cursor < text.len() {
            self.write_mapped(
                &text[cursor..],
                source_start + TextSize::from(cursor as u32),
                capabilities,
            );
        }
    }

    pub(crate) fn finish(self) -> RegionOutput {
        RegionOutput {
            text: self.text,
            mappings: self.mappings,
            teleports: self.teleports,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::range_at;
    use crate::mapping::MappingMode;

    #[test]
    fn test_dotted_access() {
        let mut w = CodeWriter::new();
        w.write("obj");
        let target = w.write_property_access("foo", range_at(3, 3), Capabilities::NAME, MappingData::Verbatim);
        let out = w.finish();

        assert_eq!(out.text, "obj.foo");
        assert_eq!(target, range_at(4, 3));
        assert_eq!(out.mappings.len(), 1);
    }

    #[test]
    fn test_quoted_access_has_gate() {
        let mut w = CodeWriter::new();
        w.write("obj");
        w.write_property_access("foo-bar", range_at(0, 7), Capabilities::NAME, MappingData::Verbatim);
        let out = w.finish();

        assert_eq!(out.text, "obj['foo-bar']");
        assert_eq!(out.mappings.len(), 2);
        assert_eq!(out.mappings[0].mode, MappingMode::Offset);
        assert_eq!(out.mappings[0].target, range_at(5, 7));
        assert_eq!(out.mappings[1].mode, MappingMode::Gate);
        assert_eq!(out.mappings[1].target, range_at(4, 9));
        assert_eq!(out.mappings[1].capabilities, Capabilities::DIAGNOSTIC_ONLY);
    }

    #[test]
    fn test_escaped_key_maps_only_whole() {
        let mut w = CodeWriter::new();
        w.write("obj");
        let target = w.write_property_access("it's", range_at(0, 4), Capabilities::NAME, MappingData::Verbatim);
        let out = w.finish();

        assert_eq!(out.text, "obj['it\\'s']");
        assert_eq!(target, range_at(5, 5));
        assert_eq!(out.mappings[0].mode, MappingMode::Gate);
        assert_eq!(out.mappings[0].capabilities, Capabilities::NAME);

        let map: crate::mapping::SourceMap = out.mappings.iter().cloned().collect();
        assert_eq!(map.first_forward(range_at(0, 4)).unwrap().range, range_at(5, 5));
        assert!(map.first_forward(range_at(3, 1)).is_none());
    }

    #[test]
    fn test_insertions_split_runs() {
        let mut w = CodeWriter::new();
        w.write_with_insertions(
            "export default {}",
            TextSize::from(10),
            &[(15, "wrap(".to_string()), (17, ")".to_string())],
            Capabilities::VERBATIM,
        );
        let out = w.finish();

        assert_eq!(out.text, "export default wrap({})");
        assert_eq!(out.mappings.len(), 2);
        assert_eq!(out.mappings[0].source, range_at(10, 15));
        assert_eq!(out.mappings[1].source, range_at(25, 2));
        assert_eq!(out.mappings[1].target, range_at(20, 2));
    }
}
