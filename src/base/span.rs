//! Byte ranges and the line/column positions shown for them.

use std::fmt;

pub use text_size::TextRange;
pub use text_size::TextSize;

/// Position of a byte offset in a document, counted from zero.
///
/// `Display` prints it one-based, the way editors show it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
pub struct LineCol {
    pub line: u32,
    /// UTF-8 bytes from the line start.
    pub col: u32,
}

impl LineCol {
    #[inline]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    #[inline]
    pub const fn line_one_indexed(self) -> u32 {
        self.line + 1
    }

    #[inline]
    pub const fn col_one_indexed(self) -> u32 {
        self.col + 1
    }
}

impl fmt::Debug for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line_one_indexed(), self.col_one_indexed())
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line_one_indexed(), self.col_one_indexed())
    }
}

/// A start/end pair of line/column positions.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct LineColRange {
    pub start: LineCol,
    pub end: LineCol,
}

/// Newline table for one text, used to report positions of mapped results.
#[derive(Clone, Debug)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
    /// Total length of the indexed text
    len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];

        for (offset, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(TextSize::from((offset + 1) as u32));
            }
        }

        Self {
            line_starts,
            len: TextSize::of(text),
        }
    }

    /// Offsets past the end clamp to the end of the text.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(self.len);
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);

        let col = offset - self.line_starts[line];

        LineCol {
            line: line as u32,
            col: col.into(),
        }
    }

    pub fn line_col_range(&self, range: TextRange) -> LineColRange {
        LineColRange {
            start: self.line_col(range.start()),
            end: self.line_col(range.end()),
        }
    }

    /// Byte offset of `line_col`, or `None` when the line does not exist or
    /// the column runs past the end of the line.
    pub fn offset(&self, line_col: LineCol) -> Option<TextSize> {
        let line_start = *self.line_starts.get(line_col.line as usize)?;
        let line_end = self
            .line_starts
            .get(line_col.line as usize + 1)
            .copied()
            .unwrap_or(self.len);
        let offset = line_start + TextSize::from(line_col.col);
        (offset <= line_end).then_some(offset)
    }

    /// Number of lines, at least one.
    pub fn len(&self) -> usize {
        self.line_starts.len()
    }

    /// Check if there are no lines (never true, an empty text has one line).
    pub fn is_empty(&self) -> bool {
        self.line_starts.is_empty()
    }
}

/// Move a range forward by `by`.
///
/// Used when region-relative output is placed into a document.
#[inline]
pub fn shift_range(range: TextRange, by: TextSize) -> TextRange {
    range + by
}

/// The range `start..start + len`.
#[inline]
pub fn range_at(start: u32, len: u32) -> TextRange {
    TextRange::at(TextSize::from(start), TextSize::from(len))
}
