//! Source maps: range correspondence between an original document and a
//! synthetic document.
//!
//! A [`SourceMap`] is an ordered list of [`Mapping`]s. Queries walk every
//! mapping in insertion order and translate the query range through each one
//! that accepts it:
//!
//! - [`MappingMode::Offset`] accepts any query contained in the "from" range
//!   and moves both endpoints by the same delta they have from the "from"
//!   endpoints. Partial queries (hovering over half an identifier) stay
//!   partial on the other side.
//! - [`MappingMode::Gate`] accepts only a query exactly equal to the "from"
//!   range. Used where an approximate answer would be wrong, e.g. "the whole
//!   quoted property access" versus "the name inside the quotes".
//!
//! Several mappings may accept the same query. Results are never re-sorted:
//! insertion order is priority, so generators emit the preferred spelling
//! first.

use smol_str::SmolStr;

use crate::base::{TextRange, TextSize};

use super::capability::Capabilities;

/// How a mapping accepts queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MappingMode {
    /// Containment with linear offset translation.
    Offset,
    /// Exact range equality only.
    Gate,
}

/// Which spelling of a name a mapping's target text uses.
///
/// Rename consults this to turn a new name typed against the synthetic
/// spelling back into the spelling the source uses.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MappingData {
    /// Target text is the source text.
    #[default]
    Verbatim,
    /// Target is the camelized form of a hyphenated source name.
    Camelized,
    /// Target is the raw source spelling of a name that also has a
    /// canonical spelling elsewhere in the same document.
    RawAlias { canonical: SmolStr },
    /// Target is the source name with its first letter capitalized
    /// (`click` -> `onClick`).
    Capitalized,
}

/// A single source/target range correspondence.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Mapping {
    /// Range in original-document coordinates.
    pub source: TextRange,
    /// Range in synthetic-document coordinates.
    pub target: TextRange,
    pub mode: MappingMode,
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_caps"))]
    pub capabilities: Capabilities,
    pub data: MappingData,
}

#[cfg(feature = "serde")]
fn serialize_caps<S: serde::Serializer>(caps: &Capabilities, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u16(caps.bits())
}

impl Mapping {
    /// An offset-mode mapping.
    pub fn offset(source: TextRange, target: TextRange, capabilities: Capabilities) -> Self {
        Self {
            source,
            target,
            mode: MappingMode::Offset,
            capabilities,
            data: MappingData::Verbatim,
        }
    }

    /// A gate-mode mapping.
    pub fn gate(source: TextRange, target: TextRange, capabilities: Capabilities) -> Self {
        Self {
            source,
            target,
            mode: MappingMode::Gate,
            capabilities,
            data: MappingData::Verbatim,
        }
    }

    /// Attach auxiliary data.
    pub fn with_data(mut self, data: MappingData) -> Self {
        self.data = data;
        self
    }

    /// Move the source side by `source_by` and the target side by `target_by`.
    pub fn shifted(mut self, source_by: TextSize, target_by: TextSize) -> Self {
        self.source += source_by;
        self.target += target_by;
        self
    }

    /// The range queries start from in the given direction.
    #[inline]
    pub fn from_range(&self, direction: Direction) -> TextRange {
        match direction {
            Direction::Forward => self.source,
            Direction::Backward => self.target,
        }
    }

    /// The range query results land in for the given direction.
    #[inline]
    pub fn to_range(&self, direction: Direction) -> TextRange {
        match direction {
            Direction::Forward => self.target,
            Direction::Backward => self.source,
        }
    }

    /// Translate `query` through this mapping, if it is accepted.
    pub fn translate(&self, query: TextRange, direction: Direction) -> Option<TextRange> {
        let from = self.from_range(direction);
        let to = self.to_range(direction);
        match self.mode {
            MappingMode::Gate => (query == from).then_some(to),
            MappingMode::Offset => translate_offset(from, to, query),
        }
    }
}

/// Linear translation of `query` from `from` into `to`.
///
/// Accepts only queries contained in `from`. The start moves by
/// `query.start - from.start`, the end by `query.end - from.end`; nothing is
/// clamped. When `from` and `to` differ in length the translated range can
/// come out inverted or negative, which is reported as no match.
pub(crate) fn translate_offset(
    from: TextRange,
    to: TextRange,
    query: TextRange,
) -> Option<TextRange> {
    if !(from.start() <= query.start() && query.end() <= from.end()) {
        return None;
    }
    let start = i64::from(u32::from(to.start())) + i64::from(u32::from(query.start()))
        - i64::from(u32::from(from.start()));
    let end = i64::from(u32::from(to.end())) + i64::from(u32::from(query.end()))
        - i64::from(u32::from(from.end()));
    if start < 0 || end < start {
        return None;
    }
    let start = u32::try_from(start).ok()?;
    let end = u32::try_from(end).ok()?;
    Some(TextRange::new(TextSize::from(start), TextSize::from(end)))
}

/// Query direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Original document to synthetic document.
    Forward,
    /// Synthetic document to original document.
    Backward,
}

/// One query hit: the mapping that accepted the query and the translated range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MappedRange<'a> {
    pub mapping: &'a Mapping,
    pub range: TextRange,
}

/// An ordered collection of mappings for one synthetic document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceMap {
    mappings: Vec<Mapping>,
}

impl SourceMap {
    /// Create a new empty source map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mapping. Later mappings have lower priority.
    pub fn add(&mut self, mapping: Mapping) {
        self.mappings.push(mapping);
    }

    /// All mappings in insertion order.
    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    /// Get the number of mappings.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Every hit for `range` in `direction`, in insertion order.
    pub fn query(
        &self,
        range: TextRange,
        direction: Direction,
    ) -> impl Iterator<Item = MappedRange<'_>> + '_ {
        self.query_with(range, direction, Capabilities::empty())
    }

    /// Every hit whose mapping allows `required`, in insertion order.
    pub fn query_with(
        &self,
        range: TextRange,
        direction: Direction,
        required: Capabilities,
    ) -> impl Iterator<Item = MappedRange<'_>> + '_ {
        self.mappings.iter().filter_map(move |mapping| {
            if !mapping.capabilities.allows(required) {
                return None;
            }
            mapping
                .translate(range, direction)
                .map(|range| MappedRange { mapping, range })
        })
    }

    /// Source to target: all hits.
    pub fn query_forward(&self, range: TextRange) -> Vec<MappedRange<'_>> {
        self.query(range, Direction::Forward).collect()
    }

    /// Target to source: all hits.
    pub fn query_backward(&self, range: TextRange) -> Vec<MappedRange<'_>> {
        self.query(range, Direction::Backward).collect()
    }

    /// Source to target: the first hit.
    pub fn first_forward(&self, range: TextRange) -> Option<MappedRange<'_>> {
        self.query(range, Direction::Forward).next()
    }

    /// Target to source: the first hit.
    pub fn first_backward(&self, range: TextRange) -> Option<MappedRange<'_>> {
        self.query(range, Direction::Backward).next()
    }
}

impl Extend<Mapping> for SourceMap {
    fn extend<T: IntoIterator<Item = Mapping>>(&mut self, iter: T) {
        self.mappings.extend(iter);
    }
}

impl FromIterator<Mapping> for SourceMap {
    fn from_iter<T: IntoIterator<Item = Mapping>>(iter: T) -> Self {
        Self {
            mappings: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::range_at;

    #[test]
    fn test_offset_partial_query() {
        let mut map = SourceMap::new();
        map.add(Mapping::offset(range_at(10, 6), range_at(100, 6), Capabilities::CODE));

        let hit = map.first_forward(range_at(12, 2)).unwrap();
        assert_eq!(hit.range, range_at(102, 2));

        let back = map.first_backward(range_at(105, 1)).unwrap();
        assert_eq!(back.range, range_at(15, 1));
    }

    #[test]
    fn test_offset_rejects_overhang() {
        let mut map = SourceMap::new();
        map.add(Mapping::offset(range_at(10, 6), range_at(100, 6), Capabilities::CODE));

        assert!(map.first_forward(range_at(9, 2)).is_none());
        assert!(map.first_forward(range_at(15, 2)).is_none());
    }

    #[test]
    fn test_offset_empty_query_at_edges() {
        let mut map = SourceMap::new();
        map.add(Mapping::offset(range_at(10, 6), range_at(100, 6), Capabilities::CODE));

        assert_eq!(map.first_forward(range_at(10, 0)).unwrap().range, range_at(100, 0));
        assert_eq!(map.first_forward(range_at(16, 0)).unwrap().range, range_at(106, 0));
    }

    #[test]
    fn test_offset_unequal_lengths() {
        // `click` in the source, `onClick` in the target with the whole
        // name mapped.
        let mapping = Mapping::offset(range_at(0, 5), range_at(20, 7), Capabilities::NAVIGATION);
        assert_eq!(mapping.translate(range_at(0, 5), Direction::Forward), Some(range_at(20, 7)));
        assert_eq!(mapping.translate(range_at(1, 4), Direction::Forward), Some(range_at(21, 6)));
        // Target wider than source: a one-byte query at the start of the
        // target would end before it begins in the source.
        assert_eq!(mapping.translate(range_at(20, 1), Direction::Backward), None);
    }

    #[test]
    fn test_gate_exact_only() {
        let mut map = SourceMap::new();
        map.add(Mapping::gate(range_at(4, 7), range_at(40, 9), Capabilities::DIAGNOSTICS));

        assert_eq!(map.first_forward(range_at(4, 7)).unwrap().range, range_at(40, 9));
        assert!(map.first_forward(range_at(4, 6)).is_none());
        assert!(map.first_forward(range_at(5, 6)).is_none());
        assert_eq!(map.first_backward(range_at(40, 9)).unwrap().range, range_at(4, 7));
        assert!(map.first_backward(range_at(41, 7)).is_none());
    }

    #[test]
    fn test_insertion_order_is_priority() {
        let mut map = SourceMap::new();
        map.add(Mapping::offset(range_at(0, 7), range_at(50, 6), Capabilities::NAME)
            .with_data(MappingData::Camelized));
        map.add(Mapping::offset(range_at(0, 7), range_at(80, 7), Capabilities::NAME)
            .with_data(MappingData::RawAlias { canonical: "fooBar".into() }));

        let all = map.query_forward(range_at(0, 7));
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].range, range_at(50, 6));
        assert_eq!(all[1].range, range_at(80, 7));
        assert_eq!(map.first_forward(range_at(0, 7)).unwrap().range, range_at(50, 6));
    }

    #[test]
    fn test_capability_filter_skips() {
        let mut map = SourceMap::new();
        map.add(Mapping::gate(range_at(0, 3), range_at(10, 5), Capabilities::DIAGNOSTICS));
        map.add(Mapping::offset(range_at(0, 3), range_at(11, 3), Capabilities::NAME));

        let hits: Vec<_> = map
            .query_with(range_at(0, 3), Direction::Forward, Capabilities::RENAME)
            .collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].range, range_at(11, 3));
    }

    #[test]
    fn test_shifted() {
        let mapping = Mapping::offset(range_at(1, 2), range_at(3, 2), Capabilities::CODE)
            .shifted(TextSize::from(10), TextSize::from(100));
        assert_eq!(mapping.source, range_at(11, 2));
        assert_eq!(mapping.target, range_at(103, 2));
    }
}
