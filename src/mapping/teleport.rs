//! Teleports: mirrored positions inside one synthetic document.
//!
//! When a generator writes one logical binding twice in the same synthetic
//! document (a declaration and the context key that re-exports it to the
//! template), the checking engine sees two unrelated positions. A teleport
//! records that they are the same binding so reference and rename results
//! landing on one side can be expanded to the other.

use crate::base::TextRange;

use super::capability::Capabilities;
use super::source_map::translate_offset;

/// Which way a teleport is followed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TeleportDirection {
    LeftToRight,
    RightToLeft,
}

/// A pair of synthetic ranges for one binding.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Teleport {
    pub left: TextRange,
    pub right: TextRange,
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_caps"))]
    pub left_to_right: Capabilities,
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_caps"))]
    pub right_to_left: Capabilities,
}

#[cfg(feature = "serde")]
fn serialize_caps<S: serde::Serializer>(caps: &Capabilities, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u16(caps.bits())
}

impl Teleport {
    fn follow(
        &self,
        range: TextRange,
        direction: TeleportDirection,
        required: Capabilities,
    ) -> Option<TextRange> {
        let (from, to, caps) = match direction {
            TeleportDirection::LeftToRight => (self.left, self.right, self.left_to_right),
            TeleportDirection::RightToLeft => (self.right, self.left, self.right_to_left),
        };
        if !caps.allows(required) {
            return None;
        }
        translate_offset(from, to, range)
    }
}

/// All teleports of one synthetic document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TeleportMap {
    teleports: Vec<Teleport>,
}

impl TeleportMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `left` and `right` are the same binding.
    pub fn add_teleport(
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

    pub(crate) fn push(&mut self, teleport: Teleport) {
        self.teleports.push(teleport);
    }

    pub fn teleports(&self) -> &[Teleport] {
        &self.teleports
    }

    pub fn len(&self) -> usize {
        self.teleports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teleports.is_empty()
    }

    /// Ranges reachable from `range` in one direction.
    pub fn resolve(
        &self,
        range: TextRange,
        direction: TeleportDirection,
        required: Capabilities,
    ) -> Vec<TextRange> {
        self.teleports
            .iter()
            .filter_map(|teleport| teleport.follow(range, direction, required))
            .collect()
    }

    /// Ranges reachable from `range` in either direction, without duplicates.
    pub fn resolve_all(&self, range: TextRange, required: Capabilities) -> Vec<TextRange> {
        let mut out = self.resolve(range, TeleportDirection::LeftToRight, required);
        for found in self.resolve(range, TeleportDirection::RightToLeft, required) {
            if !out.contains(&found) {
                out.push(found);
            }
        }
        out
    }
}

impl Extend<Teleport> for TeleportMap {
    fn extend<T: IntoIterator<Item = Teleport>>(&mut self, iter: T) {
        self.teleports.extend(iter);
    }
}

impl FromIterator<Teleport> for TeleportMap {
    fn from_iter<T: IntoIterator<Item = Teleport>>(iter: T) -> Self {
        Self {
            teleports: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::range_at;

    #[test]
    fn test_resolve_both_directions() {
        let mut map = TeleportMap::new();
        map.add_teleport(
            range_at(6, 5),
            range_at(90, 5),
            Capabilities::REFERENCES | Capabilities::RENAME,
            Capabilities::REFERENCES,
        );

        assert_eq!(
            map.resolve(range_at(6, 5), TeleportDirection::LeftToRight, Capabilities::RENAME),
            vec![range_at(90, 5)]
        );
        assert!(map
            .resolve(range_at(90, 5), TeleportDirection::RightToLeft, Capabilities::RENAME)
            .is_empty());
        assert_eq!(
            map.resolve_all(range_at(90, 5), Capabilities::REFERENCES),
            vec![range_at(6, 5)]
        );
    }

    #[test]
    fn test_partial_range_moves_linearly() {
        let mut map = TeleportMap::new();
        map.add_teleport(range_at(0, 4), range_at(20, 4), Capabilities::REFERENCES, Capabilities::REFERENCES);
        assert_eq!(
            map.resolve_all(range_at(1, 2), Capabilities::REFERENCES),
            vec![range_at(21, 2)]
        );
    }

    #[test]
    fn test_unrelated_range() {
        let mut map = TeleportMap::new();
        map.add_teleport(range_at(0, 4), range_at(20, 4), Capabilities::REFERENCES, Capabilities::REFERENCES);
        assert!(map.resolve_all(range_at(10, 2), Capabilities::REFERENCES).is_empty());
    }
}
