//! # meda-theme — style tags and color themes
//!
//! ```text
//! StyleTag (what a cell is)
//!     │
//!     ▼
//! Theme::group(tag) → HighlightGroup (fg, bg, attrs)
//!     │
//!     ▼
//! HighlightGroup::cell(ch) → meda_term::cell::Cell
//! ```
//!
//! Colors are resolved when the theme is built, so painting a cell never
//! does more than a match on the tag.

pub mod highlight;
pub mod style;

pub use highlight::{HighlightGroup, Theme};
pub use style::StyleTag;
