//! Buffer-space and screen-space coordinates.
//!
//! All coordinates are **0-indexed**. A [`Position`] addresses a character
//! in the buffer by (line, column); a [`ScreenPos`] addresses a terminal
//! cell by (row, column). The viewport is the only place that converts
//! one into the other.

use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A position in the line buffer: (line, column), both 0-indexed.
///
/// `col` may equal the line's length: that is the insertion point after
/// the last character.
///
/// Positions order lexicographically, line first:
/// `Position { line: 0, col: 5 }` < `Position { line: 1, col: 0 }`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    /// The origin — line 0, column 0.
    pub const ZERO: Self = Self { line: 0, col: 0 };

    #[inline]
    #[must_use]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.line, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-indexed for human display.
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

// ---------------------------------------------------------------------------
// ScreenPos
// ---------------------------------------------------------------------------

/// A terminal cell: (row, column), both 0-indexed. Row 0 is the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScreenPos {
    pub row: u16,
    pub col: u16,
}

impl ScreenPos {
    #[inline]
    #[must_use]
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }
}
