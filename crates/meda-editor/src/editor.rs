//! The editor — one buffer, one screen, one key at a time.
//!
//! `Editor` owns the [`LineBuffer`], the [`ViewportCursor`], the
//! [`HighlightCache`] and the [`FocusRouter`], plus the three collaborators
//! it talks to: a [`Surface`] to draw on, a [`FileStore`] to load and save
//! through, and (per call) a [`KeySource`].
//!
//! # Screen layout
//!
//! ```text
//! ┌──────────────────────────────┐
//! │        file.py*  (INVERSE)   │  ← row 0: header, `*` while dirty
//! ├──────────────────────────────┤
//! │ text                         │  ← rows 1 ..= rows - 2
//! ├──────────────────────────────┤
//! │ message              12:5    │  ← last row: status
//! └──────────────────────────────┘
//! ```
//!
//! # Key flow
//!
//! ```text
//! key ─► FocusRouter::route ─► Command
//!            Edit(key) ─► ViewportCursor::handle_key ─► (not a move) ─► edit
//!            AwaitConfirm ─► nested poll: keys go to the confirmation
//!                            until it is answered or cancelled
//!            Confirmed / Open / SaveAs / Quit ─► save, load, exit
//! ```
//!
//! The text area is repainted only when the window scrolled, the text
//! changed, or an overlay was just removed from on top of it. Moving the
//! cursor inside the window only moves the terminal cursor.

use std::io;
use std::path::{Path, PathBuf};

use meda_term::input::{KeyCode, KeyEvent, Modifiers};
use meda_theme::StyleTag;

use crate::buffer::LineBuffer;
use crate::config::{Config, defaults};
use crate::error::{BufferError, BufferResult, FileError};
use crate::files::FileStore;
use crate::highlight::HighlightCache;
use crate::keys::KeySource;
use crate::overlay::Overlay;
use crate::position::Position;
use crate::router::{Command, FocusRouter, Intent};
use crate::surface::Surface;
use crate::viewport::{Movement, ViewportCursor};

/// Header text for a buffer with no file.
const NO_NAME: &str = "[No Name]";

// ---------------------------------------------------------------------------
// Options and results
// ---------------------------------------------------------------------------

/// Settings the editor needs from the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorOptions {
    pub h_stride: usize,
    pub h_margin: usize,
    pub tab_width: usize,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            h_stride: defaults::H_STRIDE,
            h_margin: defaults::H_MARGIN,
            tab_width: defaults::TAB_WIDTH,
        }
    }
}

impl From<&Config> for EditorOptions {
    fn from(config: &Config) -> Self {
        Self {
            h_stride: config.view.h_stride,
            h_margin: config.view.h_margin,
            tab_width: config.editor.tab_width,
        }
    }
}

/// Whether the editor keeps running after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// A line of feedback on the status row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub is_error: bool,
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

/// The editor state, generic over where it draws and where files live.
pub struct Editor<S: Surface, F: FileStore> {
    buffer: LineBuffer,
    viewport: ViewportCursor,
    cache: HighlightCache,
    router: FocusRouter,
    surface: S,
    files: F,

    /// File the buffer is saved to. `None` until the user names it.
    path: Option<PathBuf>,
    tab_width: usize,

    /// Shown on the status row until the next key.
    message: Option<Message>,

    /// Screen size the viewport was last laid out for, `(rows, cols)`.
    screen: (u16, u16),
    /// The text rows must be repainted on the next draw.
    text_stale: bool,
    /// An overlay covered the text on the last draw.
    overlay_drawn: bool,
}

impl<S: Surface, F: FileStore> Editor<S, F> {
    /// An editor with an empty, unnamed buffer.
    pub fn new(surface: S, files: F, options: EditorOptions) -> Self {
        let (rows, cols) = surface.size();
        Self {
            buffer: LineBuffer::new(),
            viewport: ViewportCursor::new(rows, cols, options.h_margin, options.h_stride),
            cache: HighlightCache::new(),
            router: FocusRouter::new(),
            surface,
            files,
            path: None,
            tab_width: options.tab_width.max(1),
            message: None,
            screen: (rows, cols),
            text_stale: true,
            overlay_drawn: false,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    #[inline]
    #[must_use]
    pub const fn viewport(&self) -> &ViewportCursor {
        &self.viewport
    }

    #[inline]
    #[must_use]
    pub const fn router(&self) -> &FocusRouter {
        &self.router
    }

    #[inline]
    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    #[inline]
    #[must_use]
    pub const fn files(&self) -> &F {
        &self.files
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub const fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    fn set_message(&mut self, text: impl Into<String>) {
        self.message = Some(Message {
            text: text.into(),
            is_error: false,
        });
    }

    fn set_error(&mut self, text: impl Into<String>) {
        self.message = Some(Message {
            text: text.into(),
            is_error: true,
        });
    }

    // -- Files --------------------------------------------------------------

    /// Load `path` into the buffer. A file that does not exist gives an
    /// empty buffer that will be saved to `path`. Any other read failure
    /// leaves the current buffer alone and shows the error.
    pub fn open(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        match self.files.read_lines(&path) {
            Ok(lines) => {
                self.buffer.load(lines.as_slice());
                self.set_message(format!("\"{}\" {} lines", path.display(), lines.len()));
            }
            Err(FileError::NotFound(_)) => {
                log::info!("{} does not exist, starting empty", path.display());
                self.buffer = LineBuffer::new();
                self.set_message(format!("\"{}\" [New File]", path.display()));
            }
            Err(e) => {
                log::error!("open failed: {e}");
                self.set_error(e.to_string());
                return;
            }
        }
        self.path = Some(path);
        self.viewport.reset();
        self.cache.clear();
        self.text_stale = true;
    }

    /// Write the buffer to `path`. On success the buffer becomes clean; on
    /// failure the buffer is kept and the error is shown.
    fn write_to(&mut self, path: &Path) -> bool {
        let lines = self.buffer.to_lines();
        match self.files.write_lines(path, &lines) {
            Ok(()) => {
                self.buffer.mark_saved();
                self.set_message(format!("wrote {} lines to {}", lines.len(), path.display()));
                true
            }
            Err(e) => {
                log::error!("save failed: {e}");
                self.set_error(e.to_string());
                false
            }
        }
    }

    // -- Main loop ----------------------------------------------------------

    /// Draw, then handle keys from `keys` until the user quits.
    ///
    /// # Errors
    ///
    /// Returns the first error from reading keys or drawing.
    pub fn run<K: KeySource>(&mut self, keys: &mut K) -> io::Result<()> {
        self.draw()?;
        loop {
            let key = keys.next_key()?;
            if self.handle_key(&key, keys)? == Flow::Quit {
                log::info!("quit");
                return Ok(());
            }
            self.draw()?;
        }
    }

    /// Handle one key. `keys` is read again, synchronously, when the key
    /// opens a save confirmation.
    ///
    /// # Errors
    ///
    /// Returns an error from reading keys or drawing during a nested poll.
    pub fn handle_key<K: KeySource>(&mut self, key: &KeyEvent, keys: &mut K) -> io::Result<Flow> {
        self.message = None;
        let command = self.router.route(key, self.buffer.is_dirty());
        self.apply(command, keys)
    }

    fn apply<K: KeySource>(&mut self, command: Command, keys: &mut K) -> io::Result<Flow> {
        Ok(match command {
            Command::Edit(key) => {
                self.edit_or_move(&key);
                Flow::Continue
            }
            Command::Redraw | Command::Closed | Command::Ignored => Flow::Continue,
            Command::AwaitConfirm(intent) => {
                log::debug!("waiting for save confirmation before {intent:?}");
                return self.await_confirmation(keys);
            }
            Command::Confirmed { save, then } => {
                if save {
                    self.save_then(then)
                } else {
                    self.proceed(then)
                }
            }
            Command::Open(name) => {
                self.open(name);
                Flow::Continue
            }
            Command::SaveAs { name, then } => {
                let path = PathBuf::from(name);
                if self.write_to(&path) {
                    self.path = Some(path);
                    self.proceed(then)
                } else {
                    Flow::Continue
                }
            }
            Command::Quit => Flow::Quit,
        })
    }

    /// Feed keys to the open confirmation until it resolves or is
    /// cancelled. The outer loop does not run in the meantime.
    fn await_confirmation<K: KeySource>(&mut self, keys: &mut K) -> io::Result<Flow> {
        loop {
            self.draw()?;
            let key = keys.next_key()?;
            match self.router.route(&key, self.buffer.is_dirty()) {
                Command::Redraw | Command::Ignored => {}
                command => return self.apply(command, keys),
            }
        }
    }

    /// Save, then carry on with `then`. An unnamed buffer is named first.
    fn save_then(&mut self, then: Intent) -> Flow {
        let Some(path) = self.path.clone() else {
            self.router.prompt_save_as(then);
            return Flow::Continue;
        };
        if self.write_to(&path) {
            self.proceed(then)
        } else {
            Flow::Continue
        }
    }

    fn proceed(&mut self, then: Intent) -> Flow {
        match then {
            Intent::OpenFile => {
                self.router.prompt_open_file();
                Flow::Continue
            }
            Intent::Quit => Flow::Quit,
        }
    }

    // -- Editing ------------------------------------------------------------

    fn edit_or_move(&mut self, key: &KeyEvent) {
        match self.viewport.handle_key(key, &self.buffer) {
            Movement::Scrolled => self.text_stale = true,
            Movement::Cursor => {}
            Movement::Ignored => self.edit(key),
        }
    }

    /// Apply an editing key at the cursor.
    fn edit(&mut self, key: &KeyEvent) {
        let pos = self.viewport.position();
        let result = match key.code {
            KeyCode::Tab if key.modifiers == Modifiers::SHIFT => self.outdent(pos),
            KeyCode::Tab if key.modifiers.is_empty() => self.indent(pos),
            KeyCode::Enter => self
                .buffer
                .split_at(pos.line, pos.col)
                .map(|()| Some(Position::new(pos.line + 1, 0))),
            KeyCode::Backspace => self.backspace(pos),
            KeyCode::Delete => self.delete(pos),
            KeyCode::Home => Ok(Some(Position::new(pos.line, 0))),
            KeyCode::End => Ok(Some(Position::new(pos.line, self.line_len(pos.line)))),
            _ => match key.printable() {
                Some(ch) => self
                    .buffer
                    .insert_char(pos.line, pos.col, ch)
                    .map(|()| Some(Position::new(pos.line, pos.col + 1))),
                None => Ok(None),
            },
        };

        match result {
            Ok(Some(new_pos)) => {
                if self.viewport.place(new_pos, &self.buffer) {
                    self.text_stale = true;
                }
                self.refresh_lines(pos.line.min(new_pos.line), pos.line.max(new_pos.line));
            }
            Ok(None) => {}
            Err(e) => buffer_fault(&e),
        }
    }

    fn line_len(&self, line: usize) -> usize {
        self.buffer.line_len(line).unwrap_or(0)
    }

    fn backspace(&mut self, pos: Position) -> BufferResult<Option<Position>> {
        if pos.col > 0 {
            self.buffer.delete_range(pos.line, pos.col - 1, pos.col)?;
            Ok(Some(Position::new(pos.line, pos.col - 1)))
        } else if pos.line > 0 {
            let seam = self.buffer.join_with_previous(pos.line)?;
            Ok(Some(Position::new(pos.line - 1, seam)))
        } else {
            Ok(None)
        }
    }

    fn delete(&mut self, pos: Position) -> BufferResult<Option<Position>> {
        if pos.col < self.line_len(pos.line) {
            self.buffer.delete_range(pos.line, pos.col, pos.col + 1)?;
            Ok(Some(pos))
        } else if pos.line + 1 < self.buffer.line_count() {
            self.buffer.join_with_previous(pos.line + 1)?;
            Ok(Some(pos))
        } else {
            Ok(None)
        }
    }

    /// Insert spaces up to the next tab stop.
    fn indent(&mut self, pos: Position) -> BufferResult<Option<Position>> {
        let width = self.tab_width - pos.col % self.tab_width;
        for i in 0..width {
            self.buffer.insert_char(pos.line, pos.col + i, ' ')?;
        }
        Ok(Some(Position::new(pos.line, pos.col + width)))
    }

    /// Remove up to one tab width of leading spaces.
    fn outdent(&mut self, pos: Position) -> BufferResult<Option<Position>> {
        let leading = self
            .buffer
            .line(pos.line)
            .map_or(0, |text| text.chars().take(self.tab_width).take_while(|&c| c == ' ').count());
        if leading == 0 {
            return Ok(None);
        }
        self.buffer.delete_range(pos.line, 0, leading)?;
        Ok(Some(Position::new(pos.line, pos.col.saturating_sub(leading))))
    }

    /// Recompute highlighting for lines whose text just changed.
    fn refresh_lines(&mut self, first: usize, last: usize) {
        for line in first..=last {
            if let Some(text) = self.buffer.line(line) {
                self.cache.refresh(&text);
            }
        }
        self.text_stale = true;
    }

    // -- Drawing ------------------------------------------------------------

    /// Paint everything that changed and refresh the surface.
    ///
    /// # Errors
    ///
    /// Returns the surface's write error.
    pub fn draw(&mut self) -> io::Result<()> {
        if self.surface.sync_size() {
            self.text_stale = true;
        }
        let (rows, cols) = self.surface.size();
        if (rows, cols) != self.screen {
            self.screen = (rows, cols);
            self.viewport.set_screen_size(rows, cols);
            self.text_stale = true;
        }

        self.draw_header(cols);
        if self.text_stale || self.overlay_drawn {
            self.draw_text(cols);
            self.text_stale = false;
        }
        if rows >= 2 {
            self.draw_status(rows - 1, cols);
        }

        self.overlay_drawn = match self.router.widget() {
            Some(widget) => {
                widget.render(&mut self.surface);
                true
            }
            None => {
                let cursor = self.viewport.screen_cursor();
                self.surface.move_cursor(cursor.row, cursor.col);
                false
            }
        };
        self.surface.refresh()
    }

    fn draw_header(&mut self, cols: u16) {
        let mut title = self
            .path
            .as_deref()
            .map_or_else(|| NO_NAME.to_string(), |p| p.display().to_string());
        if self.buffer.is_dirty() {
            title.push('*');
        }
        let width = usize::from(cols);
        let pad = width.saturating_sub(title.chars().count()) / 2;
        let line = format!("{:pad$}{title:<rest$}", "", rest = width - pad);
        self.surface.put_str(0, 0, &line, StyleTag::Inverse);
    }

    fn draw_text(&mut self, cols: u16) {
        let text_cols = to_u16(self.viewport.text_cols());
        for i in 0..self.viewport.text_rows() {
            let row = to_u16(i + 1);
            for x in 0..cols {
                self.surface.put_char(row, x, ' ', StyleTag::Default);
            }

            let Some(text) = self.buffer.line(self.viewport.top_line() + i) else {
                continue;
            };
            let tags = self.cache.get(&text);
            let window = self.viewport.window(tags.len());
            let visible = text
                .chars()
                .zip(tags.iter().copied())
                .skip(window.range.start)
                .take(window.range.len());
            for (x, (ch, tag)) in visible.enumerate() {
                self.surface.put_char(row, to_u16(x), cell_char(ch), tag);
            }

            if window.clipped_left {
                self.surface.put_char(row, 0, '<', StyleTag::Inverse);
            }
            if window.clipped_right {
                self.surface.put_char(row, text_cols, '>', StyleTag::Inverse);
            }
        }
    }

    fn draw_status(&mut self, row: u16, cols: u16) {
        let position = self.viewport.position().to_string();

        for x in 0..cols {
            self.surface.put_char(row, x, ' ', StyleTag::Default);
        }
        if let Some(msg) = &self.message {
            let style = if msg.is_error { StyleTag::Error } else { StyleTag::Default };
            self.surface.put_str(row, 0, &msg.text, style);
        }
        let col = usize::from(cols).saturating_sub(position.len() + 1);
        self.surface.put_str(row, to_u16(col), &position, StyleTag::Default);
    }
}

/// What a buffer char looks like on screen. Every char takes exactly one
/// cell, so tabs and the `\r` of CRLF files show as a blank and other
/// control chars as `?`.
fn cell_char(ch: char) -> char {
    match ch {
        '\t' | '\r' => ' ',
        c if c.is_control() => '?',
        c => c,
    }
}

/// A buffer call with coordinates the editor computed itself failed.
fn buffer_fault(err: &BufferError) {
    log::error!("buffer coordinate fault: {err}");
    debug_assert!(false, "buffer coordinate fault: {err}");
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
