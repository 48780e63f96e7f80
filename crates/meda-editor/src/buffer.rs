//! Line buffer — the text being edited, as an ordered sequence of lines.
//!
//! `LineBuffer` wraps a [`ropey::Rope`] and exposes it line by line. The
//! rope is built with LF-only line breaks, so a line is exactly the text
//! between two `\n` characters. That makes "split the file on `\n`" and
//! "the buffer's lines" the same thing, and joining [`to_lines`] with `\n`
//! gives back the original text byte for byte.
//!
//! # Invariants
//!
//! - There is always at least one line. An empty buffer is one empty line.
//! - Columns are char offsets. A column equal to the line length is the
//!   insertion point after the last character.
//!
//! # Dirty tracking
//!
//! Dirtiness is derived, not stored: the buffer keeps a snapshot of the
//! text at the last [`load`] or [`mark_saved`] and compares against it.
//! Typing a character and deleting it again leaves the buffer clean.
//! Cloning a rope shares its nodes, so the snapshot costs almost nothing.
//!
//! The buffer holds no cursor. Callers translate their own positions across
//! a [`split_at`] or [`join_with_previous`] in the same step that calls it.
//!
//! [`to_lines`]: LineBuffer::to_lines
//! [`load`]: LineBuffer::load
//! [`mark_saved`]: LineBuffer::mark_saved
//! [`split_at`]: LineBuffer::split_at
//! [`join_with_previous`]: LineBuffer::join_with_previous

use std::borrow::Cow;
use std::fmt;

use ropey::{Rope, RopeSlice};

use crate::error::{BufferError, BufferResult};

// ---------------------------------------------------------------------------
// LineBuffer
// ---------------------------------------------------------------------------

/// An ordered, never-empty sequence of text lines.
#[derive(Clone)]
pub struct LineBuffer {
    rope: Rope,
    baseline: Rope,
}

impl LineBuffer {
    // -- Construction -------------------------------------------------------

    /// A buffer holding a single empty line.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            baseline: Rope::new(),
        }
    }

    /// A clean buffer holding `text`, split on `\n`.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let rope = Rope::from_str(text);
        Self {
            baseline: rope.clone(),
            rope,
        }
    }

    /// A clean buffer holding `lines`. An empty slice gives one empty line.
    #[must_use]
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut buffer = Self::new();
        buffer.load(lines);
        buffer
    }

    /// Replace the whole contents and reset the dirty baseline.
    pub fn load<S: AsRef<str>>(&mut self, lines: &[S]) {
        let mut text = String::new();
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                text.push('\n');
            }
            text.push_str(line.as_ref());
        }
        self.rope = Rope::from_str(&text);
        self.baseline = self.rope.clone();
    }

    // -- Access -------------------------------------------------------------

    /// Number of lines. Never zero.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// A line's text without its trailing `\n`.
    #[must_use]
    pub fn line_slice(&self, line: usize) -> Option<RopeSlice<'_>> {
        if line >= self.line_count() {
            return None;
        }
        let slice = self.rope.line(line);
        let len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            Some(slice.slice(..len - 1))
        } else {
            Some(slice)
        }
    }

    /// A line's text. Borrowed when the rope stores it contiguously.
    #[must_use]
    pub fn line(&self, line: usize) -> Option<Cow<'_, str>> {
        self.line_slice(line).map(Cow::from)
    }

    /// Number of chars on a line, excluding the line break.
    #[must_use]
    pub fn line_len(&self, line: usize) -> Option<usize> {
        self.line_slice(line).map(|s| s.len_chars())
    }

    /// Every line as an owned `String`, in order.
    #[must_use]
    pub fn to_lines(&self) -> Vec<String> {
        (0..self.line_count())
            .filter_map(|i| self.line(i).map(Cow::into_owned))
            .collect()
    }

    /// The full text, lines joined with `\n`.
    #[must_use]
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Whether the text differs from the last load or save.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.rope != self.baseline
    }

    /// Take the current text as the new clean baseline.
    pub fn mark_saved(&mut self) {
        self.baseline = self.rope.clone();
    }

    // -- Editing ------------------------------------------------------------

    /// Insert `ch` before column `col` of `line`. A `'\n'` splits the line
    /// instead, exactly as [`split_at`](Self::split_at).
    ///
    /// # Errors
    ///
    /// [`BufferError`] if `line` does not exist or `col` is past its end.
    pub fn insert_char(&mut self, line: usize, col: usize, ch: char) -> BufferResult<()> {
        if ch == '\n' {
            return self.split_at(line, col);
        }
        let idx = self.char_index(line, col)?;
        self.rope.insert_char(idx, ch);
        Ok(())
    }

    /// Delete columns `start..end` of `line`. An empty range is a no-op.
    ///
    /// # Errors
    ///
    /// [`BufferError`] if `line` does not exist, `start > end`, or `end` is
    /// past the end of the line.
    pub fn delete_range(&mut self, line: usize, start: usize, end: usize) -> BufferResult<()> {
        let len = self.checked_len(line)?;
        if end > len || start > end {
            return Err(BufferError::ColumnOutOfRange {
                line,
                col: end.max(start),
                len,
            });
        }
        if start == end {
            return Ok(());
        }
        let line_start = self.rope.line_to_char(line);
        self.rope.remove(line_start + start..line_start + end);
        Ok(())
    }

    /// Divide `line` in two at `col`. The text from `col` on becomes a new
    /// line at `line + 1`; every later line moves down by one.
    ///
    /// # Errors
    ///
    /// [`BufferError`] if `line` does not exist or `col` is past its end.
    pub fn split_at(&mut self, line: usize, col: usize) -> BufferResult<()> {
        let idx = self.char_index(line, col)?;
        self.rope.insert_char(idx, '\n');
        Ok(())
    }

    /// Append `line` to the end of `line - 1` and remove it; every later
    /// line moves up by one. Returns the column in the merged line where the
    /// joined text starts (the previous line's old length).
    ///
    /// # Errors
    ///
    /// [`BufferError::NoPreviousLine`] for line 0, or
    /// [`BufferError::LineOutOfRange`] if `line` does not exist.
    pub fn join_with_previous(&mut self, line: usize) -> BufferResult<usize> {
        if line == 0 {
            return Err(BufferError::NoPreviousLine);
        }
        self.checked_len(line)?;
        let prev_len = self.checked_len(line - 1)?;
        // The break ending the previous line is the char just before `line`.
        let break_idx = self.rope.line_to_char(line) - 1;
        self.rope.remove(break_idx..=break_idx);
        Ok(prev_len)
    }

    // -- Internal -----------------------------------------------------------

    fn checked_len(&self, line: usize) -> BufferResult<usize> {
        self.line_len(line).ok_or(BufferError::LineOutOfRange {
            line,
            len: self.line_count(),
        })
    }

    fn char_index(&self, line: usize, col: usize) -> BufferResult<usize> {
        let len = self.checked_len(line)?;
        if col > len {
            return Err(BufferError::ColumnOutOfRange { line, col, len });
        }
        Ok(self.rope.line_to_char(line) + col)
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LineBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineBuffer")
            .field("lines", &self.line_count())
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn sample() -> LineBuffer {
        LineBuffer::from_lines(&["hello", "world", "!"])
    }

    // -- Construction -------------------------------------------------------

    #[test]
    fn new_buffer_has_one_empty_line() {
        let b = LineBuffer::new();
        assert_eq!(b.line_count(), 1);
        assert_eq!(b.line(0).as_deref(), Some(""));
        assert!(!b.is_dirty());
    }

    #[test]
    fn from_empty_lines_is_one_empty_line() {
        let b = LineBuffer::from_lines::<&str>(&[]);
        assert_eq!(b.to_lines(), vec![String::new()]);
    }

    #[test]
    fn from_text_splits_on_lf_only() {
        let b = LineBuffer::from_text("a\r\nb\rc\n");
        assert_eq!(b.to_lines(), vec!["a\r", "b\rc", ""]);
    }

    #[test]
    fn load_replaces_contents_and_cleans() {
        let mut b = sample();
        b.insert_char(0, 0, 'x').unwrap();
        assert!(b.is_dirty());
        b.load(&["new"]);
        assert_eq!(b.to_lines(), vec!["new"]);
        assert!(!b.is_dirty());
    }

    // -- Access -------------------------------------------------------------

    #[test]
    fn line_access_strips_break() {
        let b = sample();
        assert_eq!(b.line(0).as_deref(), Some("hello"));
        assert_eq!(b.line_len(1), Some(5));
        assert_eq!(b.line(2).as_deref(), Some("!"));
        assert_eq!(b.line(3), None);
        assert_eq!(b.line_len(3), None);
    }

    // -- Insert -------------------------------------------------------------

    #[test]
    fn insert_char_in_middle_and_end() {
        let mut b = sample();
        b.insert_char(0, 2, 'X').unwrap();
        b.insert_char(1, 5, '?').unwrap();
        assert_eq!(b.to_lines(), vec!["heXllo", "world?", "!"]);
    }

    #[test]
    fn insert_char_past_end_fails() {
        let mut b = sample();
        assert_eq!(
            b.insert_char(2, 2, 'x'),
            Err(BufferError::ColumnOutOfRange { line: 2, col: 2, len: 1 })
        );
        assert_eq!(
            b.insert_char(5, 0, 'x'),
            Err(BufferError::LineOutOfRange { line: 5, len: 3 })
        );
        assert!(!b.is_dirty());
    }

    #[test]
    fn insert_newline_splits() {
        let mut b = sample();
        b.insert_char(0, 2, '\n').unwrap();
        assert_eq!(b.to_lines(), vec!["he", "llo", "world", "!"]);
    }

    // -- Delete -------------------------------------------------------------

    #[test]
    fn delete_range_within_line() {
        let mut b = sample();
        b.delete_range(1, 1, 4).unwrap();
        assert_eq!(b.line(1).as_deref(), Some("wd"));
        assert_eq!(b.line_count(), 3);
    }

    #[test]
    fn delete_never_crosses_line_break() {
        let mut b = sample();
        assert!(b.delete_range(0, 0, 6).is_err());
        assert!(b.delete_range(0, 3, 2).is_err());
        b.delete_range(0, 0, 5).unwrap();
        assert_eq!(b.to_lines(), vec!["", "world", "!"]);
    }

    #[test]
    fn delete_empty_range_is_noop() {
        let mut b = sample();
        b.delete_range(0, 2, 2).unwrap();
        assert!(!b.is_dirty());
    }

    // -- Split / join -------------------------------------------------------

    #[test]
    fn split_shifts_following_lines() {
        let mut b = sample();
        b.split_at(1, 3).unwrap();
        assert_eq!(b.to_lines(), vec!["hello", "wor", "ld", "!"]);
    }

    #[test]
    fn split_at_ends() {
        let mut b = LineBuffer::from_lines(&["ab"]);
        b.split_at(0, 2).unwrap();
        b.split_at(0, 0).unwrap();
        assert_eq!(b.to_lines(), vec!["", "ab", ""]);
    }

    #[test]
    fn join_merges_and_reports_seam() {
        let mut b = sample();
        assert_eq!(b.join_with_previous(1), Ok(5));
        assert_eq!(b.to_lines(), vec!["helloworld", "!"]);
    }

    #[test]
    fn join_last_line() {
        let mut b = sample();
        assert_eq!(b.join_with_previous(2), Ok(5));
        assert_eq!(b.to_lines(), vec!["hello", "world!"]);
    }

    #[test]
    fn join_first_line_fails() {
        let mut b = sample();
        assert_eq!(b.join_with_previous(0), Err(BufferError::NoPreviousLine));
        assert_eq!(
            b.join_with_previous(3),
            Err(BufferError::LineOutOfRange { line: 3, len: 3 })
        );
    }

    // -- Dirty tracking -----------------------------------------------------

    #[test]
    fn dirty_is_derived_from_content() {
        let mut b = sample();
        b.insert_char(0, 0, 'x').unwrap();
        assert!(b.is_dirty());
        b.delete_range(0, 0, 1).unwrap();
        assert!(!b.is_dirty());
    }

    #[test]
    fn mark_saved_resets_baseline() {
        let mut b = sample();
        b.split_at(0, 1).unwrap();
        b.mark_saved();
        assert!(!b.is_dirty());
        b.join_with_previous(1).unwrap();
        assert!(b.is_dirty());
    }

    // -- Round trip ---------------------------------------------------------

    #[test]
    fn lines_roundtrip_through_newline_join() {
        let text = "a\nb\nc";
        let lines: Vec<&str> = text.split('\n').collect();
        let b = LineBuffer::from_lines(&lines);
        assert_eq!(b.to_lines(), vec!["a", "b", "c"]);
        assert_eq!(b.to_lines().join("\n"), text);
        assert_eq!(b.text(), text);
    }

    // -- Properties ---------------------------------------------------------

    #[derive(Debug, Clone)]
    enum Op {
        Insert(usize, usize, char),
        Delete(usize, usize, usize),
        Split(usize, usize),
        Join(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..8usize, 0..12usize, prop::char::range('a', 'z'))
                .prop_map(|(l, c, ch)| Op::Insert(l, c, ch)),
            (0..8usize, 0..12usize, 0..12usize).prop_map(|(l, s, e)| Op::Delete(l, s, e)),
            (0..8usize, 0..12usize).prop_map(|(l, c)| Op::Split(l, c)),
            (0..8usize).prop_map(Op::Join),
        ]
    }

    proptest! {
        #[test]
        fn never_empty_and_failed_ops_change_nothing(
            text in "[a-z\n]{0,40}",
            ops in prop::collection::vec(op(), 0..60),
        ) {
            let mut b = LineBuffer::from_text(&text);
            for op in ops {
                let before = b.text();
                let result = match op {
                    Op::Insert(l, c, ch) => b.insert_char(l, c, ch),
                    Op::Delete(l, s, e) => b.delete_range(l, s, e),
                    Op::Split(l, c) => b.split_at(l, c),
                    Op::Join(l) => b.join_with_previous(l).map(|_| ()),
                };
                prop_assert!(b.line_count() >= 1);
                if result.is_err() {
                    prop_assert_eq!(b.text(), before);
                }
            }
        }

        #[test]
        fn split_then_join_is_identity(
            lines in prop::collection::vec("[a-z]{0,10}", 1..6),
            line_seed in 0..100usize,
            col_seed in 0..100usize,
        ) {
            let mut b = LineBuffer::from_lines(&lines);
            let line = line_seed % b.line_count();
            let col = col_seed % (b.line_len(line).unwrap_or(0) + 1);
            b.split_at(line, col).unwrap();
            prop_assert_eq!(b.line_count(), lines.len() + 1);
            prop_assert_eq!(b.join_with_previous(line + 1), Ok(col));
            prop_assert_eq!(b.to_lines(), lines);
            prop_assert!(!b.is_dirty());
        }

        #[test]
        fn to_lines_matches_split_on_newline(text in "[a-z\n]{0,40}") {
            let b = LineBuffer::from_text(&text);
            let expected: Vec<String> = text.split('\n').map(str::to_string).collect();
            prop_assert_eq!(b.to_lines().join("\n"), text.clone());
            prop_assert_eq!(b.to_lines(), expected);
        }
    }
}
