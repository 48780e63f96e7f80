// SPDX-License-Identifier: MIT
//
// FrameBuffer — the 2D cell grid the editor paints to.
//
// Header, text rows, status line and overlay boxes are all painted into
// one of these. The diff renderer then compares it with the previous frame
// and emits escape sequences only for the cells that changed.
//
// Storage is a flat `Vec<Cell>` in row-major order, so one row is one
// contiguous slice and a whole-row comparison is a single slice `==`.
// Writes outside the grid are dropped rather than wrapped or panicking.

use crate::cell::Cell;

// ─── FrameBuffer ────────────────────────────────────────────────────────────

/// A fixed-size grid of [`Cell`]s addressed by `(x, y)`.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    /// Create a buffer filled with [`Cell::EMPTY`].
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; usize::from(width) * usize::from(height)],
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Whether `(x, y)` lies inside the grid.
    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> usize {
        usize::from(y) * usize::from(self.width) + usize::from(x)
    }

    /// The cell at `(x, y)`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            self.cells.get(self.index(x, y))
        } else {
            None
        }
    }

    /// One full row as a slice.
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y < self.height {
            let start = self.index(0, y);
            Some(&self.cells[start..start + usize::from(self.width)])
        } else {
            None
        }
    }

    /// The characters of row `y` as a `String`, for tests and debugging.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        self.row(y)
            .map(|cells| cells.iter().map(|c| c.ch).collect())
            .unwrap_or_default()
    }

    // ─── Mutation ────────────────────────────────────────────────────────

    /// Overwrite the cell at `(x, y)`. Returns `false` if out of bounds.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    /// Reset every cell to [`Cell::EMPTY`].
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Change the dimensions. Contents are cleared.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(usize::from(width) * usize::from(height), Cell::EMPTY);
    }

    /// Copy another buffer of the same size into this one without
    /// reallocating. Falls back to a clone when the sizes differ.
    pub fn copy_from(&mut self, other: &Self) {
        if self.width == other.width && self.height == other.height {
            self.cells.copy_from_slice(&other.cells);
        } else {
            self.clone_from(other);
        }
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "FrameBuffer({}x{})", self.width, self.height)?;
        for y in 0..self.height {
            writeln!(f, "|{}|", self.row_text(y))?;
        }
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Attr;
    use crate::color::CellColor;

    // ── Construction ────────────────────────────────────────────────────

    #[test]
    fn new_buffer_is_blank() {
        let fb = FrameBuffer::new(4, 2);
        assert_eq!(fb.width(), 4);
        assert_eq!(fb.height(), 2);
        assert_eq!(fb.row_text(0), "    ");
        assert!(fb.get(3, 1).is_some_and(|c| c.is_empty()));
    }

    #[test]
    fn zero_sized_buffer_has_no_rows() {
        let fb = FrameBuffer::new(0, 0);
        assert!(fb.row(0).is_none());
        assert!(fb.get(0, 0).is_none());
    }

    // ── Access ──────────────────────────────────────────────────────────

    #[test]
    fn set_and_get_roundtrip() {
        let mut fb = FrameBuffer::new(3, 3);
        let cell = Cell::styled('x', CellColor::RED, CellColor::Default, Attr::BOLD);
        assert!(fb.set(1, 2, cell));
        assert_eq!(fb.get(1, 2), Some(&cell));
        assert_eq!(fb.row_text(2), " x ");
    }

    #[test]
    fn set_out_of_bounds_is_dropped() {
        let mut fb = FrameBuffer::new(3, 3);
        assert!(!fb.set(3, 0, Cell::new('x')));
        assert!(!fb.set(0, 3, Cell::new('x')));
        assert_eq!(fb, FrameBuffer::new(3, 3));
    }

    // ── Clear & Resize ──────────────────────────────────────────────────

    #[test]
    fn clear_resets_cells() {
        let mut fb = FrameBuffer::new(2, 1);
        fb.set(0, 0, Cell::new('a'));
        fb.clear();
        assert_eq!(fb.row_text(0), "  ");
    }

    #[test]
    fn resize_changes_dimensions_and_clears() {
        let mut fb = FrameBuffer::new(2, 2);
        fb.set(0, 0, Cell::new('a'));
        fb.resize(5, 1);
        assert_eq!((fb.width(), fb.height()), (5, 1));
        assert_eq!(fb.row_text(0), "     ");
    }

    #[test]
    fn copy_from_handles_size_mismatch() {
        let mut a = FrameBuffer::new(2, 2);
        let mut b = FrameBuffer::new(3, 1);
        b.set(2, 0, Cell::new('z'));
        a.copy_from(&b);
        assert_eq!(a, b);
    }
}
