//! Overlay widgets — modal boxes drawn over the text.
//!
//! An overlay owns every keystroke while it is open. Each key produces an
//! [`Outcome`]: `Pending` while the user is still deciding (the widget is
//! redrawn), or `Done` with the widget's result, after which the caller
//! closes it.
//!
//! | Widget            | Keys                                   | Result              |
//! |-------------------|----------------------------------------|---------------------|
//! | [`SelectionList`] | Left / Right move, Enter picks         | index of the option |
//! | [`YesNoConfirm`]  | as above, plus `y` / `n` answer at once | `bool`             |
//! | [`TextInput`]     | printable inserts, Left / Right / Home / End move, Backspace / Delete erase, Enter submits | `String` |
//!
//! Widgets are built fresh for each use and thrown away when they close.
//!
//! # Box layout
//!
//! ```text
//!  ______________________________
//! |                              |
//! |                              |
//! |   Would you like to save?    |   ← height / 3
//! |                              |
//! |                              |
//! |        YES         NO        |   ← 2 * (height / 3)
//! |                              |
//! |______________________________|
//! ```

use meda_term::input::{KeyCode, KeyEvent};
use meda_theme::StyleTag;

use crate::surface::Surface;

/// Box height in rows.
const BOX_HEIGHT: u16 = 10;

/// Narrowest box drawn on a screen that is wide enough for it.
const MIN_BOX_WIDTH: u16 = 16;

// ---------------------------------------------------------------------------
// Outcome and the widget capability
// ---------------------------------------------------------------------------

/// What a key did to an overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Still open; redraw it.
    Pending,
    /// Finished with a result; close it.
    Done(T),
}

impl<T> Outcome<T> {
    /// Transform the result, if there is one.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Pending => Outcome::Pending,
            Self::Done(value) => Outcome::Done(f(value)),
        }
    }
}

/// A modal box: something that draws itself and takes keys.
pub trait Overlay {
    type Output;

    /// Feed one key.
    fn handle_key(&mut self, key: &KeyEvent) -> Outcome<Self::Output>;

    /// Draw the whole box and place the cursor inside it.
    fn render(&self, surface: &mut dyn Surface);
}

// ---------------------------------------------------------------------------
// Box chrome
// ---------------------------------------------------------------------------

/// Where a box sits on a `rows` x `cols` screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxRect {
    pub top: u16,
    pub left: u16,
    pub height: u16,
    pub width: u16,
}

impl BoxRect {
    /// Half the screen wide, a third of the way down, centered horizontally.
    #[must_use]
    pub fn centered(rows: u16, cols: u16) -> Self {
        let height = BOX_HEIGHT.min(rows);
        let width = (cols / 2).max(MIN_BOX_WIDTH).min(cols);
        Self {
            top: (rows / 3).min(rows - height),
            left: (cols - width) / 2,
            height,
            width,
        }
    }

    /// Row holding the title.
    #[inline]
    #[must_use]
    pub const fn title_row(&self) -> u16 {
        self.top + self.height / 3
    }

    /// Row holding the options or the input field.
    #[inline]
    #[must_use]
    pub const fn body_row(&self) -> u16 {
        self.top + (self.height / 3) * 2
    }

    /// Columns between the two side borders.
    #[inline]
    #[must_use]
    pub const fn inner_width(&self) -> u16 {
        self.width.saturating_sub(2)
    }

    /// First column inside the left border.
    #[inline]
    #[must_use]
    pub const fn inner_left(&self) -> u16 {
        self.left + 1
    }
}

/// Draw the border, blank the inside, and center `title`.
fn draw_frame(surface: &mut dyn Surface, rect: BoxRect, title: &str) -> BoxRect {
    let inner = usize::from(rect.inner_width());
    let bottom = rect.top + rect.height.saturating_sub(1);

    for row in rect.top..rect.top + rect.height {
        let (edge, fill) = if row == rect.top {
            (' ', '_')
        } else if row == bottom {
            ('|', '_')
        } else {
            ('|', ' ')
        };
        surface.put_char(row, rect.left, edge, StyleTag::Default);
        for x in 0..rect.inner_width() {
            surface.put_char(row, rect.inner_left() + x, fill, StyleTag::Default);
        }
        surface.put_char(row, rect.left + rect.width.saturating_sub(1), edge, StyleTag::Default);
    }

    let shown: String = title.chars().take(inner).collect();
    let pad = (inner - shown.chars().count()) / 2;
    surface.put_str(rect.title_row(), rect.inner_left() + to_u16(pad), &shown, StyleTag::Default);
    rect
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

// ---------------------------------------------------------------------------
// SelectionList
// ---------------------------------------------------------------------------

/// A row of options, one highlighted. Enter picks the highlighted one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionList {
    title: String,
    options: Vec<String>,
    active: usize,
}

impl SelectionList {
    /// A list with the first option highlighted.
    #[must_use]
    pub fn new(title: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            title: title.into(),
            options,
            active: 0,
        }
    }

    #[inline]
    #[must_use]
    pub const fn active(&self) -> usize {
        self.active
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Start column of each option inside a box of `inner` columns. Each
    /// option is right-aligned within a slot of `inner / (n + 1)` columns.
    fn option_columns(&self, inner: usize) -> Vec<usize> {
        let spacing = inner / (self.options.len() + 1);
        let mut x = 0;
        self.options
            .iter()
            .map(|opt| {
                let len = opt.chars().count();
                x += spacing.saturating_sub(len);
                let start = x;
                x += len;
                start
            })
            .collect()
    }
}

impl Overlay for SelectionList {
    type Output = usize;

    fn handle_key(&mut self, key: &KeyEvent) -> Outcome<usize> {
        match key.code {
            KeyCode::Left => self.active = self.active.saturating_sub(1),
            KeyCode::Right => {
                if self.active + 1 < self.options.len() {
                    self.active += 1;
                }
            }
            KeyCode::Enter if !self.options.is_empty() => return Outcome::Done(self.active),
            _ => {}
        }
        Outcome::Pending
    }

    fn render(&self, surface: &mut dyn Surface) {
        let (rows, cols) = surface.size();
        let rect = draw_frame(surface, BoxRect::centered(rows, cols), &self.title);
        let row = rect.body_row();
        let mut cursor = rect.inner_left();

        for (i, (opt, x)) in self
            .options
            .iter()
            .zip(self.option_columns(usize::from(rect.inner_width())))
            .enumerate()
        {
            let col = rect.inner_left() + to_u16(x);
            let style = if i == self.active {
                cursor = col;
                StyleTag::Inverse
            } else {
                StyleTag::Default
            };
            surface.put_str(row, col, opt, style);
        }
        surface.move_cursor(row, cursor);
    }
}

// ---------------------------------------------------------------------------
// YesNoConfirm
// ---------------------------------------------------------------------------

/// "Would you like to save?" with YES / NO.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YesNoConfirm {
    list: SelectionList,
}

impl YesNoConfirm {
    pub const SAVE_TITLE: &'static str = "Would you like to save?";

    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            list: SelectionList::new(title, vec!["YES".to_string(), "NO".to_string()]),
        }
    }

    /// The save-changes prompt.
    #[must_use]
    pub fn save_changes() -> Self {
        Self::new(Self::SAVE_TITLE)
    }
}

impl Overlay for YesNoConfirm {
    type Output = bool;

    fn handle_key(&mut self, key: &KeyEvent) -> Outcome<bool> {
        match key.printable() {
            Some('y' | 'Y') => Outcome::Done(true),
            Some('n' | 'N') => Outcome::Done(false),
            _ => self.list.handle_key(key).map(|index| index == 0),
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        self.list.render(surface);
    }
}

// ---------------------------------------------------------------------------
// TextInput
// ---------------------------------------------------------------------------

/// A single-line text field in a box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInput {
    title: String,
    text: String,
    /// Insertion point (char offset).
    cursor: usize,
}

impl TextInput {
    pub const FILE_NAME_TITLE: &'static str = "File Name:";

    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: String::new(),
            cursor: 0,
        }
    }

    /// The file-name prompt.
    #[must_use]
    pub fn file_name() -> Self {
        Self::new(Self::FILE_NAME_TITLE)
    }

    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn insert_char(&mut self, ch: char) {
        let idx = self.char_to_byte(self.cursor);
        self.text.insert(idx, ch);
        self.cursor += 1;
    }

    fn erase_before_cursor(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let idx = self.char_to_byte(self.cursor);
        self.text.remove(idx);
    }

    fn char_to_byte(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map_or(self.text.len(), |(byte_idx, _)| byte_idx)
    }

    /// Width of the input field for a box of `rect`'s size.
    fn field_width(rect: BoxRect) -> usize {
        usize::from(rect.width / 2).clamp(1, usize::from(rect.inner_width()).max(1))
    }
}

impl Overlay for TextInput {
    type Output = String;

    fn handle_key(&mut self, key: &KeyEvent) -> Outcome<String> {
        if let Some(ch) = key.printable() {
            self.insert_char(ch);
            return Outcome::Pending;
        }
        match key.code {
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            KeyCode::Backspace | KeyCode::Delete => self.erase_before_cursor(),
            KeyCode::Enter => return Outcome::Done(self.text.clone()),
            _ => {}
        }
        Outcome::Pending
    }

    fn render(&self, surface: &mut dyn Surface) {
        let (rows, cols) = surface.size();
        let rect = draw_frame(surface, BoxRect::centered(rows, cols), &self.title);
        let row = rect.body_row();
        let width = Self::field_width(rect);
        let field_left =
            rect.inner_left() + to_u16((usize::from(rect.inner_width()).saturating_sub(width)) / 2);

        // Scroll so the insertion point always has a cell of its own.
        let start = (self.cursor + 1).saturating_sub(width);
        let mut visible = self.text.chars().skip(start);
        for x in 0..width {
            let ch = visible.next().unwrap_or('_');
            surface.put_char(row, field_left + to_u16(x), ch, StyleTag::Default);
        }
        surface.move_cursor(row, field_left + to_u16(self.cursor - start));
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

/// Any overlay widget the focus router can hold. A bare [`SelectionList`]
/// only appears inside [`YesNoConfirm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Widget {
    Confirm(YesNoConfirm),
    Input(TextInput),
}

/// The result of a finished [`Widget`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Confirmed(bool),
    Text(String),
}

impl Overlay for Widget {
    type Output = Answer;

    fn handle_key(&mut self, key: &KeyEvent) -> Outcome<Answer> {
        match self {
            Self::Confirm(w) => w.handle_key(key).map(Answer::Confirmed),
            Self::Input(w) => w.handle_key(key).map(Answer::Text),
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        match self {
            Self::Confirm(w) => w.render(surface),
            Self::Input(w) => w.render(surface),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
