// SPDX-License-Identifier: MIT
//
// Differential renderer.
//
// Instead of repainting the whole screen per keystroke, the current
// FrameBuffer is compared with the previous one and only changed cells are
// written. Unchanged rows are skipped with a single slice comparison.
//
// Per frame:
//
//   1. The editor paints a FrameBuffer.
//   2. `render()` diffs it against the stored previous frame and feeds the
//      changed cells to a CellWriter.
//   3. The cursor is parked where the editor asked for it.
//   4. `flush_to()` issues one write.

use std::io::{self, Write};

use crate::ansi;
use crate::buffer::FrameBuffer;
use crate::output::{CellWriter, OutputBuffer};

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// Statistics from a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Cells that differed from the previous frame and were written.
    pub cells_rendered: usize,
    /// Cells that matched the previous frame and were skipped.
    pub cells_skipped: usize,
}

// ─── DiffRenderer ────────────────────────────────────────────────────────────

/// Differential renderer that emits ANSI only for changed cells.
pub struct DiffRenderer {
    output: OutputBuffer,
    writer: CellWriter,
    previous: Option<FrameBuffer>,
}

impl DiffRenderer {
    /// Create a renderer with no previous frame; the first render draws
    /// everything.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: OutputBuffer::new(),
            writer: CellWriter::new(),
            previous: None,
        }
    }

    /// Diff `current` against the previous frame and queue the ANSI output.
    /// `cursor` is the `(x, y)` cell the terminal cursor is left on, or
    /// `None` to hide it.
    pub fn render(&mut self, current: &FrameBuffer, cursor: Option<(u16, u16)>) -> RenderStats {
        self.output.clear();
        self.writer.reset_state();

        let width = current.width();
        let height = current.height();
        let mut stats = RenderStats::default();

        if width == 0 || height == 0 {
            self.store_frame(current);
            return stats;
        }

        ansi::begin_sync(&mut self.output).ok();
        ansi::cursor_hide(&mut self.output).ok();

        let previous = self
            .previous
            .as_ref()
            .filter(|prev| prev.width() == width && prev.height() == height);

        if previous.is_none() {
            ansi::clear_screen(&mut self.output).ok();
        }

        for y in 0..height {
            let (Some(row), prev_row) = (current.row(y), previous.and_then(|p| p.row(y))) else {
                continue;
            };

            if prev_row == Some(row) {
                stats.cells_skipped += usize::from(width);
                continue;
            }

            for (x, cell) in (0..width).zip(row) {
                let unchanged = prev_row
                    .and_then(|r| r.get(usize::from(x)))
                    .is_some_and(|p| p == cell);
                if unchanged {
                    stats.cells_skipped += 1;
                } else {
                    self.writer.render_cell(&mut self.output, x, y, cell);
                    stats.cells_rendered += 1;
                }
            }
        }

        ansi::reset(&mut self.output).ok();
        if let Some((x, y)) = cursor {
            ansi::cursor_to(&mut self.output, x, y).ok();
            ansi::cursor_show(&mut self.output).ok();
        }
        ansi::end_sync(&mut self.output).ok();

        self.store_frame(current);
        stats
    }

    #[cfg(test)]
    fn output_bytes(&self) -> &[u8] {
        self.output.as_bytes()
    }

    /// Write the queued output to `w` and clear it.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        self.output.flush_to(w)
    }

    /// Discard the previous frame so the next render draws everything.
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }

    fn store_frame(&mut self, current: &FrameBuffer) {
        match &mut self.previous {
            Some(prev) => prev.copy_from(current),
            None => self.previous = Some(current.clone()),
        }
    }
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    fn text(r: &DiffRenderer) -> String {
        String::from_utf8_lossy(r.output_bytes()).into_owned()
    }

    #[test]
    fn first_render_draws_everything() {
        let mut r = DiffRenderer::new();
        let fb = FrameBuffer::new(3, 2);
        let stats = r.render(&fb, None);
        assert_eq!(stats.cells_rendered, 6);
        assert_eq!(stats.cells_skipped, 0);
        assert!(text(&r).contains("\x1b[2J"));
    }

    #[test]
    fn identical_frame_renders_nothing() {
        let mut r = DiffRenderer::new();
        let fb = FrameBuffer::new(3, 2);
        r.render(&fb, None);
        let stats = r.render(&fb, None);
        assert_eq!(stats.cells_rendered, 0);
        assert_eq!(stats.cells_skipped, 6);
    }

    #[test]
    fn single_change_renders_one_cell() {
        let mut r = DiffRenderer::new();
        let mut fb = FrameBuffer::new(4, 3);
        r.render(&fb, None);
        fb.set(2, 1, Cell::new('q'));
        let stats = r.render(&fb, None);
        assert_eq!(stats.cells_rendered, 1);
        assert!(text(&r).contains("\x1b[2;3H"));
        assert!(text(&r).contains('q'));
        assert!(!text(&r).contains("\x1b[2J"));
    }

    #[test]
    fn resize_triggers_full_redraw() {
        let mut r = DiffRenderer::new();
        r.render(&FrameBuffer::new(2, 2), None);
        let stats = r.render(&FrameBuffer::new(3, 2), None);
        assert_eq!(stats.cells_rendered, 6);
    }

    #[test]
    fn cursor_is_parked_and_shown() {
        let mut r = DiffRenderer::new();
        r.render(&FrameBuffer::new(2, 2), Some((1, 0)));
        assert!(text(&r).ends_with("\x1b[1;2H\x1b[?25h\x1b[?2026l"));
    }

    #[test]
    fn force_redraw_repaints() {
        let mut r = DiffRenderer::new();
        let fb = FrameBuffer::new(2, 1);
        r.render(&fb, None);
        r.force_redraw();
        assert_eq!(r.render(&fb, None).cells_rendered, 2);
    }

    #[test]
    fn flush_to_drains_output() {
        let mut r = DiffRenderer::new();
        r.render(&FrameBuffer::new(1, 1), None);
        let mut sink = Vec::new();
        r.flush_to(&mut sink).unwrap();
        assert!(!sink.is_empty());
        assert!(r.output_bytes().is_empty());
    }
}
