//! Theme assembly — one highlight group per style tag.
//!
//! A `Theme` resolves every [`StyleTag`] to terminal-ready colors and
//! attributes up front, so painting a cell is a table lookup.

use meda_term::cell::{Attr, Cell};
use meda_term::color::CellColor;

use crate::style::StyleTag;

// ---------------------------------------------------------------------------
// HighlightGroup
// ---------------------------------------------------------------------------

/// A resolved style for one kind of character cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HighlightGroup {
    pub fg: CellColor,
    pub bg: CellColor,
    pub attrs: Attr,
}

impl HighlightGroup {
    /// Create a highlight group with just a foreground color.
    #[must_use]
    pub const fn fg_only(fg: CellColor) -> Self {
        Self {
            fg,
            bg: CellColor::Default,
            attrs: Attr::empty(),
        }
    }

    /// Create a highlight group with foreground and attributes.
    #[must_use]
    pub const fn fg_attrs(fg: CellColor, attrs: Attr) -> Self {
        Self {
            fg,
            bg: CellColor::Default,
            attrs,
        }
    }

    /// Create a highlight group with foreground and background.
    #[must_use]
    pub const fn fg_bg(fg: CellColor, bg: CellColor) -> Self {
        Self {
            fg,
            bg,
            attrs: Attr::empty(),
        }
    }

    /// A cell showing `ch` in this style.
    #[inline]
    #[must_use]
    pub const fn cell(self, ch: char) -> Cell {
        Cell::styled(ch, self.fg, self.bg, self.attrs)
    }
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// A complete editor theme: one [`HighlightGroup`] per [`StyleTag`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Name of this theme.
    pub name: String,

    pub normal: HighlightGroup,
    pub inverse: HighlightGroup,
    pub keyword: HighlightGroup,
    pub declaration: HighlightGroup,
    pub dot_access: HighlightGroup,
    pub string_or_comment: HighlightGroup,
    pub numeric: HighlightGroup,
    pub literal: HighlightGroup,
    pub error_msg: HighlightGroup,
}

impl Theme {
    /// Terminal-native theme on the classic 8-color palette, so it follows
    /// the user's terminal colors. Text sits on the terminal's default
    /// background; the inverse group is black on white.
    #[must_use]
    pub fn terminal() -> Self {
        Self {
            name: "terminal".to_string(),
            normal: HighlightGroup::default(),
            inverse: HighlightGroup::fg_bg(CellColor::BLACK, CellColor::WHITE),
            keyword: HighlightGroup::fg_only(CellColor::BLUE),
            declaration: HighlightGroup::fg_only(CellColor::YELLOW),
            dot_access: HighlightGroup::fg_only(CellColor::CYAN),
            string_or_comment: HighlightGroup::fg_only(CellColor::GREEN),
            numeric: HighlightGroup::fg_only(CellColor::MAGENTA),
            literal: HighlightGroup::fg_only(CellColor::RED),
            error_msg: HighlightGroup::fg_bg(CellColor::WHITE, CellColor::RED),
        }
    }

    /// Monochrome theme for terminals without color: everything plain
    /// except the inverse group, which uses reverse video.
    #[must_use]
    pub fn monochrome() -> Self {
        let plain = HighlightGroup::default();
        Self {
            name: "monochrome".to_string(),
            normal: plain,
            inverse: HighlightGroup::fg_attrs(CellColor::Default, Attr::INVERSE),
            keyword: plain,
            declaration: plain,
            dot_access: plain,
            string_or_comment: plain,
            numeric: plain,
            literal: plain,
            error_msg: HighlightGroup::fg_attrs(CellColor::Default, Attr::BOLD),
        }
    }

    /// Look up a theme by name (`terminal`, `monochrome`).
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "terminal" => Some(Self::terminal()),
            "monochrome" => Some(Self::monochrome()),
            _ => None,
        }
    }

    /// The group a style tag resolves to.
    #[must_use]
    pub const fn group(&self, tag: StyleTag) -> HighlightGroup {
        match tag {
            StyleTag::Default => self.normal,
            StyleTag::Inverse => self.inverse,
            StyleTag::Keyword => self.keyword,
            StyleTag::Declaration => self.declaration,
            StyleTag::DotAccess => self.dot_access,
            StyleTag::StringOrComment => self.string_or_comment,
            StyleTag::Numeric => self.numeric,
            StyleTag::Literal => self.literal,
            StyleTag::Error => self.error_msg,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::terminal()
    }
}
