//! Rendering surface — where the editor draws.
//!
//! The editor only knows the [`Surface`] trait: a grid of character cells
//! with a style tag each, plus a cursor. [`TermSurface`] is the real one.
//! It paints into a [`FrameBuffer`], resolves tags through a [`Theme`],
//! and lets a [`DiffRenderer`] send only the cells that changed.
//!
//! ```text
//! Editor ── put_char / put_str / move_cursor ──► FrameBuffer (cells persist)
//!                                  refresh() ──► DiffRenderer ──► writer
//! ```
//!
//! Cells persist between refreshes, so a caller only repaints what moved.

use std::io::{self, Write};

use meda_term::buffer::FrameBuffer;
use meda_term::diff::DiffRenderer;
use meda_term::terminal;
use meda_theme::{StyleTag, Theme};

/// A character-cell drawing target.
pub trait Surface {
    /// Current size as `(rows, cols)`.
    fn size(&self) -> (u16, u16);

    /// Draw `ch` at `(row, col)`. Out-of-range cells are ignored.
    fn put_char(&mut self, row: u16, col: u16, ch: char, style: StyleTag);

    /// Draw `text` left to right from `(row, col)`, clipped at the right edge.
    fn put_str(&mut self, row: u16, col: u16, text: &str, style: StyleTag) {
        let (_, cols) = self.size();
        for (x, ch) in (col..cols).zip(text.chars()) {
            self.put_char(row, x, ch, style);
        }
    }

    /// Where the terminal cursor is shown after the next refresh.
    fn move_cursor(&mut self, row: u16, col: u16);

    /// Push everything drawn so far to the screen.
    ///
    /// # Errors
    ///
    /// Returns the underlying write error.
    fn refresh(&mut self) -> io::Result<()>;

    /// Pick up a changed screen size. Returns `true` if the size changed;
    /// the contents are then blank and must be redrawn.
    fn sync_size(&mut self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// TermSurface
// ---------------------------------------------------------------------------

/// A [`Surface`] that renders to an ANSI terminal through `W`.
pub struct TermSurface<W: Write> {
    frame: FrameBuffer,
    renderer: DiffRenderer,
    theme: Theme,
    /// `(x, y)`, the renderer's convention.
    cursor: Option<(u16, u16)>,
    out: W,
}

impl<W: Write> TermSurface<W> {
    /// A blank `rows` x `cols` surface writing to `out`.
    #[must_use]
    pub fn new(out: W, rows: u16, cols: u16, theme: Theme) -> Self {
        log::debug!("surface {cols}x{rows}, theme {}", theme.name);
        Self {
            frame: FrameBuffer::new(cols, rows),
            renderer: DiffRenderer::new(),
            theme,
            cursor: None,
            out,
        }
    }

    /// The cells as currently drawn.
    #[inline]
    #[must_use]
    pub const fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Apply a new size. The contents are cleared and fully repainted on
    /// the next refresh.
    pub fn resize(&mut self, rows: u16, cols: u16) {
        self.frame.resize(cols, rows);
        self.renderer.force_redraw();
        self.cursor = None;
    }

    /// Recover the writer, e.g. to inspect what was sent.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Surface for TermSurface<W> {
    fn size(&self) -> (u16, u16) {
        (self.frame.height(), self.frame.width())
    }

    fn put_char(&mut self, row: u16, col: u16, ch: char, style: StyleTag) {
        self.frame.set(col, row, self.theme.group(style).cell(ch));
    }

    fn move_cursor(&mut self, row: u16, col: u16) {
        self.cursor = self.frame.in_bounds(col, row).then_some((col, row));
    }

    fn refresh(&mut self) -> io::Result<()> {
        let stats = self.renderer.render(&self.frame, self.cursor);
        log::trace!(
            "refresh: {} cells rendered, {} skipped",
            stats.cells_rendered,
            stats.cells_skipped
        );
        self.renderer.flush_to(&mut self.out)
    }

    fn sync_size(&mut self) -> bool {
        let Some(size) = terminal::get_size() else {
            return false;
        };
        if size.rows == self.frame.height() && size.cols == self.frame.width() {
            return false;
        }
        log::debug!("terminal resized to {}x{}", size.cols, size.rows);
        self.resize(size.rows, size.cols);
        true
    }
}

// ---------------------------------------------------------------------------
// Test double
// ---------------------------------------------------------------------------

/// An in-memory surface that remembers the tag of every cell.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct GridSurface {
    rows: u16,
    cols: u16,
    cells: Vec<(char, StyleTag)>,
    pub cursor: (u16, u16),
    pub refreshes: usize,
    pending_size: Option<(u16, u16)>,
}

#[cfg(test)]
impl GridSurface {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            rows,
            cols,
            cells: vec![(' ', StyleTag::Default); usize::from(rows) * usize::from(cols)],
            cursor: (0, 0),
            refreshes: 0,
            pending_size: None,
        }
    }

    /// Make the next `sync_size` report a new size.
    pub fn schedule_resize(&mut self, rows: u16, cols: u16) {
        self.pending_size = Some((rows, cols));
    }

    pub fn row_text(&self, row: u16) -> String {
        let start = usize::from(row) * usize::from(self.cols);
        self.cells[start..start + usize::from(self.cols)]
            .iter()
            .map(|(ch, _)| *ch)
            .collect()
    }

    pub fn tag_at(&self, row: u16, col: u16) -> StyleTag {
        self.cells[usize::from(row) * usize::from(self.cols) + usize::from(col)].1
    }

    pub fn char_at(&self, row: u16, col: u16) -> char {
        self.cells[usize::from(row) * usize::from(self.cols) + usize::from(col)].0
    }
}

#[cfg(test)]
impl Surface for GridSurface {
    fn size(&self) -> (u16, u16) {
        (self.rows, self.cols)
    }

    fn put_char(&mut self, row: u16, col: u16, ch: char, style: StyleTag) {
        if row < self.rows && col < self.cols {
            self.cells[usize::from(row) * usize::from(self.cols) + usize::from(col)] = (ch, style);
        }
    }

    fn move_cursor(&mut self, row: u16, col: u16) {
        self.cursor = (row, col);
    }

    fn refresh(&mut self) -> io::Result<()> {
        self.refreshes += 1;
        Ok(())
    }

    fn sync_size(&mut self) -> bool {
        match self.pending_size.take() {
            Some((rows, cols)) => {
                *self = Self::new(rows, cols);
                true
            }
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use meda_term::color::CellColor;
    use pretty_assertions::assert_eq;

    fn term(rows: u16, cols: u16) -> TermSurface<Vec<u8>> {
        TermSurface::new(Vec::new(), rows, cols, Theme::terminal())
    }

    #[test]
    fn put_str_clips_at_right_edge() {
        let mut s = term(2, 5);
        s.put_str(0, 2, "hello", StyleTag::Default);
        assert_eq!(s.frame().row_text(0), "  hel");
    }

    #[test]
    fn tags_resolve_through_theme() {
        let mut s = term(1, 3);
        s.put_char(0, 0, 'x', StyleTag::Keyword);
        let cell = s.frame().get(0, 0).copied().unwrap();
        assert_eq!(cell.ch, 'x');
        assert_eq!(cell.fg, CellColor::BLUE);
    }

    #[test]
    fn out_of_range_draws_are_ignored() {
        let mut s = term(1, 3);
        s.put_char(5, 5, 'x', StyleTag::Default);
        s.move_cursor(9, 9);
        assert_eq!(s.cursor, None);
        assert_eq!(s.frame().row_text(0), "   ");
    }

    #[test]
    fn refresh_writes_changes_then_nothing_new() {
        let mut s = term(2, 4);
        s.put_str(0, 0, "ab", StyleTag::Default);
        s.move_cursor(1, 1);
        s.refresh().unwrap();
        let first = String::from_utf8_lossy(&s.out).into_owned();
        assert!(first.contains("ab"));
        // Cursor at row 1, col 1 → CSI 2;2 H
        assert!(first.contains("\x1b[2;2H"));

        s.out.clear();
        s.refresh().unwrap();
        let second = String::from_utf8_lossy(&s.into_inner()).into_owned();
        assert!(!second.contains("ab"));
    }

    #[test]
    fn control_chars_never_reach_the_terminal() {
        let mut s = term(1, 6);
        s.put_str(0, 0, "a\tb\r", StyleTag::Default);
        s.refresh().unwrap();
        let out = String::from_utf8_lossy(&s.into_inner()).into_owned();
        assert!(out.contains("a b "));
        assert!(!out.contains('\t'));
        assert!(!out.contains('\r'));
    }

    #[test]
    fn resize_clears_frame() {
        let mut s = term(2, 4);
        s.put_str(0, 0, "ab", StyleTag::Default);
        s.resize(3, 6);
        assert_eq!(s.size(), (3, 6));
        assert_eq!(s.frame().row_text(0), "      ");
    }

    #[test]
    fn grid_surface_records_cells() {
        let mut g = GridSurface::new(2, 4);
        g.put_str(1, 1, "hey!", StyleTag::Inverse);
        assert_eq!(g.row_text(1), " hey");
        assert_eq!(g.tag_at(1, 2), StyleTag::Inverse);
        g.schedule_resize(3, 3);
        assert!(g.sync_size());
        assert_eq!(g.size(), (3, 3));
        assert!(!g.sync_size());
    }
}
