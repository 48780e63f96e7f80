//! Viewport cursor — buffer-space cursor plus the window onto the screen.
//!
//! `ViewportCursor` owns the cursor position, the sticky column, and the
//! vertical and horizontal scroll offsets. It maps the cursor from
//! buffer-space `(line, col)` to a screen cell, and decides when moving the
//! cursor needs the text area repainted.
//!
//! # Screen layout
//!
//! ```text
//! row 0            ┌──────── header ─────────┐
//! row 1            │ buffer line top_line    │
//!  ...             │ ...                     │
//! row text_rows    │ buffer line top+rows-1  │
//! last row         └──────── status ─────────┘
//!                  |<---- text_cols ---->|<margin>
//! ```
//!
//! # Sticky column
//!
//! Vertical moves land on `min(desired_col, line length)`. The desired
//! column is only rewritten by horizontal moves and edits, so passing
//! through a short line and reaching a long one restores the old column.
//!
//! # Horizontal windowing
//!
//! Every line is drawn through the same window `left_col..left_col +
//! text_cols`. When the cursor leaves it, the window jumps by a whole
//! stride rather than one column, and a `<` / `>` marker is drawn at the
//! edge that has hidden text beyond it. The cursor stays on screen because
//! the stride never exceeds the window width.
//!
//! # Vertical windowing
//!
//! The cursor leaving the text rows shifts `top_line` just enough to show
//! it again. Movement inside the rows only moves the screen cursor.

use std::ops::Range;

use meda_term::input::{KeyCode, KeyEvent};

use crate::buffer::LineBuffer;
use crate::position::{Position, ScreenPos};

/// Rows taken by the header (top) and status line (bottom).
const CHROME_ROWS: u16 = 2;

// ---------------------------------------------------------------------------
// Movement result
// ---------------------------------------------------------------------------

/// What a movement request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    /// Not a movement key; the caller should try editing next.
    Ignored,
    /// An arrow key; the screen cursor moved (or was already at the edge).
    Cursor,
    /// An arrow key that moved the window; the text area must be redrawn.
    Scrolled,
}

impl Movement {
    /// Whether the key was consumed as a movement.
    #[inline]
    #[must_use]
    pub const fn is_consumed(self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// Which part of a line is visible through the horizontal window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineWindow {
    /// Visible char range of the line.
    pub range: Range<usize>,
    /// Text is hidden to the left of the window.
    pub clipped_left: bool,
    /// Text is hidden to the right of the window.
    pub clipped_right: bool,
}

// ---------------------------------------------------------------------------
// ViewportCursor
// ---------------------------------------------------------------------------

/// Cursor position, sticky column and scroll state for one buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewportCursor {
    pos: Position,
    desired_col: usize,
    top_line: usize,
    left_col: usize,
    text_rows: usize,
    text_cols: usize,
    margin: usize,
    stride: usize,
}

impl ViewportCursor {
    /// A cursor at the origin for a `rows` x `cols` screen.
    ///
    /// `margin` columns at the right edge are kept free for the truncation
    /// marker (at least one is always reserved). `stride` is how far the
    /// window jumps horizontally.
    #[must_use]
    pub fn new(rows: u16, cols: u16, margin: usize, stride: usize) -> Self {
        let mut vc = Self {
            pos: Position::ZERO,
            desired_col: 0,
            top_line: 0,
            left_col: 0,
            text_rows: 1,
            text_cols: 1,
            margin: margin.max(1),
            stride: stride.max(1),
        };
        vc.set_screen_size(rows, cols);
        vc
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    #[must_use]
    pub const fn desired_col(&self) -> usize {
        self.desired_col
    }

    /// First buffer line drawn, on screen row 1.
    #[inline]
    #[must_use]
    pub const fn top_line(&self) -> usize {
        self.top_line
    }

    /// Horizontal offset: the first line column inside the window.
    #[inline]
    #[must_use]
    pub const fn left_col(&self) -> usize {
        self.left_col
    }

    /// Number of screen rows showing buffer text.
    #[inline]
    #[must_use]
    pub const fn text_rows(&self) -> usize {
        self.text_rows
    }

    /// Width of the horizontal window.
    #[inline]
    #[must_use]
    pub const fn text_cols(&self) -> usize {
        self.text_cols
    }

    /// The stride actually applied: never wider than the window.
    #[inline]
    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride.min(self.text_cols)
    }

    /// Buffer lines currently on screen.
    #[must_use]
    pub fn visible_lines(&self, buffer: &LineBuffer) -> Range<usize> {
        let end = (self.top_line + self.text_rows).min(buffer.line_count());
        self.top_line.min(end)..end
    }

    /// The screen cell the cursor belongs on.
    #[must_use]
    pub fn screen_cursor(&self) -> ScreenPos {
        let row = self.pos.line.saturating_sub(self.top_line) + 1;
        let col = self.pos.col.saturating_sub(self.left_col);
        ScreenPos::new(to_u16(row), to_u16(col))
    }

    /// Which part of a line of `len` chars shows through the window.
    #[must_use]
    pub fn window(&self, len: usize) -> LineWindow {
        let start = self.left_col.min(len);
        let end = (self.left_col + self.text_cols).min(len);
        LineWindow {
            range: start..end,
            clipped_left: self.left_col > 0 && len > 0,
            clipped_right: len > self.left_col + self.text_cols,
        }
    }

    // -- Layout -------------------------------------------------------------

    /// Adapt to a new screen size. Returns `true` if the window moved.
    pub fn set_screen_size(&mut self, rows: u16, cols: u16) -> bool {
        self.text_rows = usize::from(rows.saturating_sub(CHROME_ROWS)).max(1);
        self.text_cols = usize::from(cols).saturating_sub(self.margin).max(1);
        self.scroll_to_cursor()
    }

    // -- Movement -----------------------------------------------------------

    /// Apply an arrow key. Any other key is [`Movement::Ignored`].
    pub fn handle_key(&mut self, key: &KeyEvent, buffer: &LineBuffer) -> Movement {
        if !key.modifiers.is_empty() {
            return Movement::Ignored;
        }
        match key.code {
            KeyCode::Up => self.move_up(buffer),
            KeyCode::Down => self.move_down(buffer),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(buffer),
            _ => Movement::Ignored,
        }
    }

    /// Move up one line, keeping the sticky column.
    pub fn move_up(&mut self, buffer: &LineBuffer) -> Movement {
        if self.pos.line > 0 {
            self.pos.line -= 1;
            self.pos.col = self.desired_col.min(line_len(buffer, self.pos.line));
        }
        self.settle()
    }

    /// Move down one line, keeping the sticky column.
    pub fn move_down(&mut self, buffer: &LineBuffer) -> Movement {
        if self.pos.line + 1 < buffer.line_count() {
            self.pos.line += 1;
            self.pos.col = self.desired_col.min(line_len(buffer, self.pos.line));
        }
        self.settle()
    }

    /// Move left one column. Stops at column 0 (no line wrapping).
    pub fn move_left(&mut self) -> Movement {
        self.pos.col = self.pos.col.saturating_sub(1);
        self.desired_col = self.pos.col;
        self.settle()
    }

    /// Move right one column, up to just past the last character.
    pub fn move_right(&mut self, buffer: &LineBuffer) -> Movement {
        if self.pos.col < line_len(buffer, self.pos.line) {
            self.pos.col += 1;
        }
        self.desired_col = self.pos.col;
        self.settle()
    }

    /// Put the cursor at `pos` after an edit. The position is clamped to the
    /// buffer and becomes the new sticky column. Returns `true` if the
    /// window moved.
    pub fn place(&mut self, pos: Position, buffer: &LineBuffer) -> bool {
        let line = pos.line.min(buffer.line_count() - 1);
        self.pos = Position::new(line, pos.col.min(line_len(buffer, line)));
        self.desired_col = self.pos.col;
        self.scroll_to_cursor()
    }

    /// Back to the origin with both offsets cleared (after loading a file).
    pub const fn reset(&mut self) {
        self.pos = Position::ZERO;
        self.desired_col = 0;
        self.top_line = 0;
        self.left_col = 0;
    }

    // -- Scrolling ----------------------------------------------------------

    fn settle(&mut self) -> Movement {
        if self.scroll_to_cursor() {
            Movement::Scrolled
        } else {
            Movement::Cursor
        }
    }

    /// Shift the offsets until the cursor is inside the window.
    fn scroll_to_cursor(&mut self) -> bool {
        let before = (self.top_line, self.left_col);

        if self.pos.line < self.top_line {
            self.top_line = self.pos.line;
        } else if self.pos.line >= self.top_line + self.text_rows {
            self.top_line = self.pos.line + 1 - self.text_rows;
        }

        let stride = self.stride();
        while self.pos.col < self.left_col {
            self.left_col = self.left_col.saturating_sub(stride);
        }
        while self.pos.col >= self.left_col + self.text_cols {
            self.left_col += stride;
        }

        before != (self.top_line, self.left_col)
    }
}

fn line_len(buffer: &LineBuffer, line: usize) -> usize {
    buffer.line_len(line).unwrap_or(0)
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn viewport(rows: u16, cols: u16) -> ViewportCursor {
        ViewportCursor::new(rows, cols, 2, 8)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::plain(code)
    }

    // -- Sticky column ------------------------------------------------------

    #[test]
    fn sticky_column_survives_short_line() {
        let buf = LineBuffer::from_lines(&["abcdef", "xy", "ghijkl"]);
        let mut vc = viewport(24, 80);
        vc.place(Position::new(0, 5), &buf);

        vc.move_down(&buf);
        assert_eq!(vc.position(), Position::new(1, 2));
        vc.move_down(&buf);
        assert_eq!(vc.position(), Position::new(2, 5));
        assert_eq!(vc.desired_col(), 5);
    }

    #[test]
    fn horizontal_move_resets_sticky_column() {
        let buf = LineBuffer::from_lines(&["abcdef", "xy", "ghijkl"]);
        let mut vc = viewport(24, 80);
        vc.place(Position::new(0, 5), &buf);
        vc.move_down(&buf);
        vc.move_left();
        vc.move_down(&buf);
        assert_eq!(vc.position(), Position::new(2, 1));
    }

    #[test]
    fn vertical_moves_stop_at_buffer_edges() {
        let buf = LineBuffer::from_lines(&["a", "b"]);
        let mut vc = viewport(24, 80);
        assert_eq!(vc.move_up(&buf), Movement::Cursor);
        assert_eq!(vc.position(), Position::ZERO);
        vc.move_down(&buf);
        vc.move_down(&buf);
        assert_eq!(vc.position().line, 1);
    }

    #[test]
    fn horizontal_moves_do_not_wrap() {
        let buf = LineBuffer::from_lines(&["ab", "cd"]);
        let mut vc = viewport(24, 80);
        vc.move_left();
        assert_eq!(vc.position(), Position::ZERO);
        vc.move_right(&buf);
        vc.move_right(&buf);
        vc.move_right(&buf);
        assert_eq!(vc.position(), Position::new(0, 2));
    }

    // -- Key dispatch -------------------------------------------------------

    #[test]
    fn only_plain_arrows_are_movements() {
        let buf = LineBuffer::from_lines(&["abc"]);
        let mut vc = viewport(24, 80);
        assert!(vc.handle_key(&press(KeyCode::Right), &buf).is_consumed());
        assert_eq!(vc.handle_key(&press(KeyCode::Char('a')), &buf), Movement::Ignored);
        assert_eq!(vc.handle_key(&press(KeyCode::Enter), &buf), Movement::Ignored);
        assert_eq!(vc.handle_key(&KeyEvent::ctrl('a'), &buf), Movement::Ignored);
    }

    // -- Horizontal windowing -----------------------------------------------

    #[test]
    fn right_past_window_advances_by_stride() {
        let line = "x".repeat(30);
        let buf = LineBuffer::from_lines(&[line.as_str()]);
        let mut vc = viewport(5, 10);
        assert_eq!(vc.text_cols(), 8);

        for _ in 0..7 {
            assert_eq!(vc.move_right(&buf), Movement::Cursor);
        }
        assert_eq!(vc.left_col(), 0);
        let w = vc.window(30);
        assert!(w.clipped_right);
        assert!(!w.clipped_left);

        assert_eq!(vc.move_right(&buf), Movement::Scrolled);
        assert_eq!(vc.left_col(), 8);
        assert_eq!(vc.screen_cursor(), ScreenPos::new(1, 0));
        let w = vc.window(30);
        assert_eq!(w.range, 8..16);
        assert!(w.clipped_left);
        assert!(w.clipped_right);
    }

    #[test]
    fn left_at_window_edge_retreats_one_stride() {
        let line = "x".repeat(30);
        let buf = LineBuffer::from_lines(&[line.as_str()]);
        let mut vc = viewport(5, 10);
        vc.place(Position::new(0, 17), &buf);
        assert_eq!(vc.left_col(), 16);

        assert_eq!(vc.move_left(), Movement::Cursor);
        assert_eq!(vc.move_left(), Movement::Scrolled);
        assert_eq!(vc.position().col, 15);
        assert_eq!(vc.left_col(), 8);
        assert_eq!(vc.screen_cursor().col, 7);
    }

    #[test]
    fn end_of_window_shows_no_right_marker() {
        let vc = viewport(5, 10);
        let w = vc.window(8);
        assert_eq!(w.range, 0..8);
        assert!(!w.clipped_right);
    }

    #[test]
    fn stride_is_capped_by_window_width() {
        let vc = ViewportCursor::new(5, 6, 2, 50);
        assert_eq!(vc.text_cols(), 4);
        assert_eq!(vc.stride(), 4);
    }

    #[test]
    fn vertical_move_into_short_line_scrolls_back() {
        let long = "y".repeat(20);
        let buf = LineBuffer::from_lines(&[long.as_str(), "ab"]);
        let mut vc = viewport(5, 10);
        vc.place(Position::new(0, 12), &buf);
        assert_eq!(vc.left_col(), 8);
        assert_eq!(vc.move_down(&buf), Movement::Scrolled);
        assert_eq!(vc.left_col(), 0);
        assert_eq!(vc.position(), Position::new(1, 2));
    }

    // -- Vertical windowing -------------------------------------------------

    #[test]
    fn moving_inside_rows_does_not_scroll() {
        let lines: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        let buf = LineBuffer::from_lines(&lines);
        let mut vc = viewport(6, 20); // 4 text rows
        for _ in 0..3 {
            assert_eq!(vc.move_down(&buf), Movement::Cursor);
        }
        assert_eq!(vc.screen_cursor(), ScreenPos::new(4, 0));
    }

    #[test]
    fn moving_past_bottom_shifts_one_line() {
        let lines: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        let buf = LineBuffer::from_lines(&lines);
        let mut vc = viewport(6, 20);
        for _ in 0..3 {
            vc.move_down(&buf);
        }
        assert_eq!(vc.move_down(&buf), Movement::Scrolled);
        assert_eq!(vc.top_line(), 1);
        assert_eq!(vc.visible_lines(&buf), 1..5);
        assert_eq!(vc.screen_cursor().row, 4);

        for _ in 0..3 {
            assert_eq!(vc.move_up(&buf), Movement::Cursor);
        }
        assert_eq!(vc.move_up(&buf), Movement::Scrolled);
        assert_eq!(vc.top_line(), 0);
    }

    #[test]
    fn visible_lines_clamped_to_buffer() {
        let buf = LineBuffer::from_lines(&["a", "b"]);
        let vc = viewport(24, 80);
        assert_eq!(vc.visible_lines(&buf), 0..2);
    }

    #[test]
    fn shrinking_screen_keeps_cursor_visible() {
        let lines: Vec<String> = (0..20).map(|i| i.to_string()).collect();
        let buf = LineBuffer::from_lines(&lines);
        let mut vc = viewport(24, 80);
        vc.place(Position::new(15, 0), &buf);
        assert!(vc.set_screen_size(6, 80));
        assert_eq!(vc.top_line(), 12);
    }

    #[test]
    fn place_clamps_and_reset_returns_home() {
        let buf = LineBuffer::from_lines(&["abc"]);
        let mut vc = viewport(24, 80);
        vc.place(Position::new(9, 9), &buf);
        assert_eq!(vc.position(), Position::new(0, 3));
        vc.reset();
        assert_eq!(vc.position(), Position::ZERO);
        assert_eq!((vc.top_line(), vc.left_col()), (0, 0));
    }

    // -- Properties ---------------------------------------------------------

    fn arrow() -> impl Strategy<Value = KeyCode> {
        prop_oneof![
            Just(KeyCode::Up),
            Just(KeyCode::Down),
            Just(KeyCode::Left),
            Just(KeyCode::Right),
        ]
    }

    proptest! {
        #[test]
        fn cursor_stays_in_bounds_and_on_screen(
            lines in prop::collection::vec("[a-z]{0,40}", 1..30),
            keys in prop::collection::vec(arrow(), 0..200),
            rows in 3u16..30,
            cols in 3u16..60,
        ) {
            let buf = LineBuffer::from_lines(&lines);
            let mut vc = ViewportCursor::new(rows, cols, 2, 8);
            for code in keys {
                vc.handle_key(&KeyEvent::plain(code), &buf);
                let pos = vc.position();
                prop_assert!(pos.line < buf.line_count());
                prop_assert!(pos.col <= buf.line_len(pos.line).unwrap());
                let screen = vc.screen_cursor();
                prop_assert!(screen.row >= 1);
                prop_assert!(usize::from(screen.row) <= vc.text_rows());
                prop_assert!(usize::from(screen.col) < vc.text_cols());
            }
        }
    }
}
