//! Style tags — the opaque per-cell style identifiers.
//!
//! The highlighter and the editor chrome only ever say *what* a character
//! is ("a keyword", "inside a string", "the header"). How that looks on
//! screen is the [`Theme`](crate::Theme)'s business.

/// What a single character cell represents, for coloring purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StyleTag {
    /// Plain text: letters and anything not otherwise classified.
    #[default]
    Default,
    /// Reversed video: header line, highlighted overlay option.
    Inverse,
    /// Keywords and punctuation.
    Keyword,
    /// The name introduced by `def`, `class` or `import`.
    Declaration,
    /// An identifier followed by `.`.
    DotAccess,
    /// Comments and quoted strings.
    StringOrComment,
    /// Digits and the target of an assignment.
    Numeric,
    /// `self`, `None`, `True`, `False`.
    Literal,
    /// Status-line error messages.
    Error,
}

impl StyleTag {
    /// Every tag, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Default,
        Self::Inverse,
        Self::Keyword,
        Self::Declaration,
        Self::DotAccess,
        Self::StringOrComment,
        Self::Numeric,
        Self::Literal,
        Self::Error,
    ];
}
