//! Edit descriptors.

use std::fmt;

use crate::base::{TextRange, TextSize};

/// One text replacement: `range` in the old text becomes `new_text`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextChange {
    pub range: TextRange,
    pub new_text: String,
}

impl TextChange {
    pub fn new(range: TextRange, new_text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: new_text.into(),
        }
    }

    pub fn insert(offset: TextSize, text: impl Into<String>) -> Self {
        Self::new(TextRange::empty(offset), text)
    }

    pub fn delete(range: TextRange) -> Self {
        Self::new(range, String::new())
    }

    /// Length of the text after the change, given the length before it.
    pub fn apply_len(&self, old_len: TextSize) -> TextSize {
        old_len - self.range.len() + TextSize::of(self.new_text.as_str())
    }
}

/// The net effect of one or more edits: `length` bytes at `start` were
/// replaced by `new_length` bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChangeRange {
    pub start: TextSize,
    pub length: TextSize,
    pub new_length: TextSize,
}

impl ChangeRange {
    /// No change at all.
    pub const UNCHANGED: ChangeRange = ChangeRange {
        start: TextSize::new(0),
        length: TextSize::new(0),
        new_length: TextSize::new(0),
    };

    pub fn new(start: TextSize, length: TextSize, new_length: TextSize) -> Self {
        Self {
            start,
            length,
            new_length,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        *self == Self::UNCHANGED
    }

    /// Replaced span in the old text.
    pub fn old_range(&self) -> TextRange {
        TextRange::at(self.start, self.length)
    }

    /// Replacement span in the new text.
    pub fn new_range(&self) -> TextRange {
        TextRange::at(self.start, self.new_length)
    }

    /// The change that applies `self` and then `next`.
    ///
    /// `next` is expressed in the coordinates produced by `self`, so its
    /// end is first rolled back through `self`'s length delta before the
    /// two spans are combined.
    pub fn compose(self, next: ChangeRange) -> ChangeRange {
        if self.is_unchanged() {
            return next;
        }
        if next.is_unchanged() {
            return self;
        }
        let n = |size: TextSize| i64::from(u32::from(size));

        let old_start_1 = n(self.start);
        let old_end_1 = old_start_1 + n(self.length);
        let new_end_1 = old_start_1 + n(self.new_length);

        let old_start_2 = n(next.start);
        let old_end_2 = old_start_2 + n(next.length);
        let new_end_2 = old_start_2 + n(next.new_length);

        let start = old_start_1.min(old_start_2);
        let old_end = old_end_1.max(old_end_1 + (old_end_2 - new_end_1));
        let new_end = new_end_2.max(new_end_2 + (new_end_1 - old_end_2));

        let size = |value: i64| TextSize::from(u32::try_from(value.max(0)).unwrap_or(u32::MAX));
        ChangeRange {
            start: size(start),
            length: size(old_end - start),
            new_length: size(new_end - start),
        }
    }

    /// Fold a sequence of changes, oldest first.
    pub fn collapse(changes: impl IntoIterator<Item = ChangeRange>) -> ChangeRange {
        changes
            .into_iter()
            .fold(ChangeRange::UNCHANGED, ChangeRange::compose)
    }
}

impl From<&TextChange> for ChangeRange {
    fn from(change: &TextChange) -> Self {
        ChangeRange {
            start: change.range.start(),
            length: change.range.len(),
            new_length: TextSize::of(change.new_text.as_str()),
        }
    }
}

impl fmt::Debug for ChangeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ChangeRange {{ start: {}, length: {}, new_length: {} }}",
            u32::from(self.start),
            u32::from(self.length),
            u32::from(self.new_length)
        )
    }
}
