//! Syntax coloring — per-character style tags for a single line.
//!
//! [`classify`] is a pure function from line text to one [`StyleTag`] per
//! character. It knows nothing about other lines, so constructs that span
//! lines (block strings) are not recognized.
//!
//! # Rule layers
//!
//! Rules are applied in order. Later layers overwrite earlier ones
//! wherever their spans overlap.
//!
//! | Layer | Matches                                             | Tag               |
//! |-------|-----------------------------------------------------|-------------------|
//! | 1     | digit / letter / anything else                      | `Numeric` / `Default` / `Keyword` |
//! | 2     | keyword bounded by `(`, line start or space, then `:` or space | `Keyword` |
//! | 3     | name after `def`, `class`, `import` up to `(` or `:` | `Declaration`    |
//! | 4     | letters right before a `.`                          | `DotAccess`       |
//! | 5     | `#` to end of line, `"..."`, `'...'`                | `StringOrComment` |
//! | 6     | assignment target (`x =`, `x +=`, ...)              | `Numeric`         |
//! | 7     | `self`, `None`, `True`, `False`                     | `Literal`         |
//!
//! # Cache
//!
//! [`HighlightCache`] maps line *content* to its tags. Two lines with the
//! same text share one entry. An entry whose length no longer matches the
//! line it is asked for is recomputed, never returned.

use std::collections::HashMap;
use std::sync::OnceLock;

use meda_theme::StyleTag;
use regex::Regex;

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

const KEYWORDS: &str = r"(\(|^|\s)(class|import|def|if|else|elif|while|for|try|except|or|and|match|case|return|is|in|not|with|as|assert|pass|break|continue)(:|\s)";
const DECLARERS: [&str; 3] = ["def", "class", "import"];
const DOT_ACCESS: &str = r"[^a-zA-Z][a-zA-Z]*\.";
const STRINGS_AND_COMMENTS: [&str; 3] = [r"#.*", r#""[^"]*""#, r"'[^']*'"];
const ASSIGNMENTS: [&str; 2] = [r"^\s*\S*\s*=", r"^\s*\S*\s*(\*=|\+=|-=)"];
const LITERALS: &str = r"\b(self|None|True|False)\b";

struct Rules {
    keyword: Regex,
    declarations: Vec<(usize, Regex)>,
    dot_access: Regex,
    strings: Vec<Regex>,
    assignments: Vec<Regex>,
    literal: Regex,
}

fn rules() -> &'static Rules {
    static RULES: OnceLock<Rules> = OnceLock::new();
    RULES.get_or_init(|| {
        let re = |pattern: &str| Regex::new(pattern).expect("highlight pattern is valid");
        Rules {
            keyword: re(KEYWORDS),
            declarations: DECLARERS
                .iter()
                .map(|word| (word.len(), re(&format!(r"{word}\s\S*?(\(|:)"))))
                .collect(),
            dot_access: re(DOT_ACCESS),
            strings: STRINGS_AND_COMMENTS.iter().map(|p| re(p)).collect(),
            assignments: ASSIGNMENTS.iter().map(|p| re(p)).collect(),
            literal: re(LITERALS),
        }
    })
}

// ---------------------------------------------------------------------------
// classify
// ---------------------------------------------------------------------------

/// Style tags for `line`, one per character.
#[must_use]
pub fn classify(line: &str) -> Vec<StyleTag> {
    let mut tags = Tags::new(line);
    let rules = rules();

    for m in rules.keyword.find_iter(line) {
        tags.paint(m.start(), m.end(), StyleTag::Keyword);
    }

    for (word_len, re) in &rules.declarations {
        if let Some(m) = re.find(line) {
            // The span starts at the separator after the word and stops
            // short of the closing `(` or `:`.
            tags.paint(m.start() + word_len, m.end() - 1, StyleTag::Declaration);
        }
    }

    for m in rules.dot_access.find_iter(line) {
        let boundary = line[m.start()..].chars().next().map_or(0, char::len_utf8);
        tags.paint(m.start() + boundary, m.end(), StyleTag::DotAccess);
    }

    for re in &rules.strings {
        for m in re.find_iter(line) {
            tags.paint(m.start(), m.end(), StyleTag::StringOrComment);
        }
    }

    for re in &rules.assignments {
        if let Some(m) = re.find(line) {
            let op_len = m.as_str().chars().last().map_or(0, char::len_utf8);
            tags.paint(m.start(), m.end() - op_len, StyleTag::Numeric);
        }
    }

    for m in rules.literal.find_iter(line) {
        tags.paint(m.start(), m.end(), StyleTag::Literal);
    }

    tags.into_vec()
}

/// The tag a character gets before any span rule applies.
fn base_tag(ch: char) -> StyleTag {
    if ch.is_ascii_digit() {
        StyleTag::Numeric
    } else if ch.is_alphanumeric() {
        StyleTag::Default
    } else {
        StyleTag::Keyword
    }
}

/// Per-char tags addressed by the byte offsets regex matches report.
struct Tags {
    tags: Vec<StyleTag>,
    /// Byte offset where each char starts.
    starts: Vec<usize>,
}

impl Tags {
    fn new(line: &str) -> Self {
        let (starts, tags) = line.char_indices().map(|(i, ch)| (i, base_tag(ch))).unzip();
        Self { tags, starts }
    }

    fn char_index(&self, byte: usize) -> usize {
        self.starts.partition_point(|&s| s < byte)
    }

    fn paint(&mut self, start_byte: usize, end_byte: usize, tag: StyleTag) {
        let start = self.char_index(start_byte);
        let end = self.char_index(end_byte);
        if start < end {
            self.tags[start..end].fill(tag);
        }
    }

    fn into_vec(self) -> Vec<StyleTag> {
        self.tags
    }
}

// ---------------------------------------------------------------------------
// HighlightCache
// ---------------------------------------------------------------------------

/// Entries kept before the cache starts over.
const DEFAULT_CAPACITY: usize = 4096;

/// Content-addressed cache of [`classify`] results.
#[derive(Debug, Clone)]
pub struct HighlightCache {
    entries: HashMap<String, Vec<StyleTag>>,
    capacity: usize,
}

impl HighlightCache {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// A cache that is emptied whenever it would grow past `capacity`.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Tags for `line`. A cached entry is used only if its length matches
    /// the line; otherwise the line is classified again and stored.
    pub fn get(&mut self, line: &str) -> &[StyleTag] {
        let len = line.chars().count();
        let fresh = self.entries.get(line).is_some_and(|tags| tags.len() == len);
        if !fresh {
            return self.refresh(line);
        }
        &self.entries[line]
    }

    /// Classify `line` unconditionally and replace its entry. Call after
    /// editing a line.
    pub fn refresh(&mut self, line: &str) -> &[StyleTag] {
        if self.entries.len() >= self.capacity && !self.entries.contains_key(line) {
            log::trace!("highlight cache full ({} entries), clearing", self.entries.len());
            self.entries.clear();
        }
        self.entries.insert(line.to_owned(), classify(line));
        &self.entries[line]
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry (after loading a new file).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for HighlightCache {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use meda_theme::StyleTag::{
        Declaration, Default as Plain, DotAccess, Keyword, Literal, Numeric, StringOrComment,
    };
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    // -- Base layer ---------------------------------------------------------

    #[test]
    fn empty_line_has_no_tags() {
        assert!(classify("").is_empty());
    }

    #[test]
    fn base_layer_by_char_class() {
        assert_eq!(classify("a1+"), vec![Plain, Numeric, Keyword]);
    }

    // -- Keywords -----------------------------------------------------------

    #[test]
    fn keyword_span_includes_its_boundaries() {
        let tags = classify("for x in y:");
        assert_eq!(&tags[0..4], &[Keyword; 4]);
        assert_eq!(tags[4], Plain);
        assert_eq!(&tags[5..9], &[Keyword; 4]);
        assert_eq!(tags[9], Plain);
    }

    #[test]
    fn keyword_inside_identifier_is_plain() {
        let tags = classify("format = 1");
        assert_eq!(&tags[0..3], &[Numeric; 3]);
        assert_eq!(classify("xfor y"), vec![Plain, Plain, Plain, Plain, Keyword, Plain]);
    }

    #[test]
    fn keyword_after_paren() {
        let tags = classify("(not x)");
        assert_eq!(&tags[0..5], &[Keyword; 5]);
    }

    // -- Declarations -------------------------------------------------------

    #[test]
    fn def_name_is_declaration() {
        let tags = classify("def foo(x):");
        assert_eq!(&tags[0..3], &[Keyword; 3]);
        assert_eq!(&tags[3..7], &[Declaration; 4]);
        assert_eq!(tags[7], Keyword);
        assert_eq!(tags[8], Plain);
    }

    #[test]
    fn class_name_is_declaration() {
        let tags = classify("class Point:");
        assert_eq!(&tags[5..11], &[Declaration; 6]);
        assert_eq!(tags[11], Keyword);
    }

    // -- Dot access ---------------------------------------------------------

    #[test]
    fn letters_before_dot_are_dot_access() {
        let tags = classify("x = os.path");
        assert_eq!(&tags[4..7], &[DotAccess; 3]);
        assert_eq!(&tags[7..], &[Plain; 4]);
    }

    // -- Strings and comments -----------------------------------------------

    #[test]
    fn comment_runs_to_end_of_line() {
        let tags = classify("a # note");
        assert_eq!(tags[0], Plain);
        assert_eq!(&tags[2..], &[StringOrComment; 6]);
    }

    #[test]
    fn quoted_strings_include_quotes() {
        let tags = classify(r#"print("hi", 'yo')"#);
        assert_eq!(&tags[6..10], &[StringOrComment; 4]);
        assert_eq!(&tags[12..16], &[StringOrComment; 4]);
        assert_eq!(tags[16], Keyword);
    }

    // -- Assignments and literals -------------------------------------------

    #[test]
    fn assignment_target_is_numeric() {
        assert_eq!(classify("x = 1"), vec![Numeric, Numeric, Keyword, Keyword, Numeric]);
    }

    #[test]
    fn augmented_assignment_excludes_final_operator_char() {
        let tags = classify("  n += 2");
        assert_eq!(&tags[0..5], &[Numeric; 5]);
        assert_eq!(tags[5], Keyword);
    }

    #[test]
    fn literals_win_over_everything() {
        let tags = classify("self.x = None");
        assert_eq!(&tags[0..4], &[Literal; 4]);
        assert_eq!(&tags[4..7], &[Numeric; 3]);
        assert_eq!(tags[7], Keyword);
        assert_eq!(&tags[9..13], &[Literal; 4]);
    }

    #[test]
    fn literal_needs_word_boundaries() {
        let tags = classify("selfish");
        assert_eq!(tags, vec![Plain; 7]);
    }

    #[test]
    fn non_ascii_text_is_tagged_per_char() {
        let tags = classify("é = 'ü'");
        assert_eq!(tags.len(), 7);
        assert_eq!(&tags[4..7], &[StringOrComment; 3]);
    }

    // -- Cache --------------------------------------------------------------

    #[test]
    fn cache_recomputes_after_edit() {
        let mut cache = HighlightCache::new();
        assert_eq!(cache.get("x = 1").len(), 5);
        assert_eq!(cache.get("x = 12").len(), 6);
    }

    #[test]
    fn stale_length_entry_is_never_returned() {
        let mut cache = HighlightCache::new();
        cache.entries.insert("x = 12".to_owned(), vec![Plain; 5]);
        let tags = cache.get("x = 12").to_vec();
        assert_eq!(tags.len(), 6);
        assert_eq!(tags, classify("x = 12"));
    }

    #[test]
    fn identical_lines_share_an_entry() {
        let mut cache = HighlightCache::new();
        cache.get("pass");
        cache.get("pass");
        cache.get("x");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn full_cache_starts_over() {
        let mut cache = HighlightCache::with_capacity(2);
        cache.get("a");
        cache.get("b");
        cache.get("c");
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    // -- Properties ---------------------------------------------------------

    proptest! {
        #[test]
        fn one_tag_per_char(line in "\\PC{0,60}") {
            prop_assert_eq!(classify(&line).len(), line.chars().count());
        }
    }
}
