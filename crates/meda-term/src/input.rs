// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into key events. Covers what a legacy-mode
// terminal sends for the keys the editor binds:
//
// - Control bytes (Enter, Tab, Backspace, Ctrl+letter)
// - CSI sequences (arrows, Home/End, Delete, Shift+Tab as `CSI Z`)
// - SS3 sequences (arrows and Home/End in application cursor mode)
// - Alt+key (ESC followed by a printable character)
// - UTF-8 multi-byte characters
//
// Escape sequences can span several `read()` calls, so the parser keeps a
// small byte buffer. Feed bytes with [`Parser::advance`]. A lone ESC stays
// pending until [`Parser::flush`] is called after a short quiet period,
// which turns it into a real Escape keypress.

use bitflags::bitflags;

// ─── Key Types ───────────────────────────────────────────────────────────────

/// A keyboard event: key identity plus modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key with no modifiers.
    #[inline]
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// Ctrl + a letter, as a raw control byte decodes.
    #[inline]
    #[must_use]
    pub const fn ctrl(ch: char) -> Self {
        Self {
            code: KeyCode::Char(ch),
            modifiers: Modifiers::CTRL,
        }
    }

    /// Shift+Tab.
    #[inline]
    #[must_use]
    pub const fn back_tab() -> Self {
        Self {
            code: KeyCode::Tab,
            modifiers: Modifiers::SHIFT,
        }
    }

    /// The character this key types, if it is an unmodified printable
    /// ASCII key (space through `~`).
    #[must_use]
    pub fn printable(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(ch)
                if (self.modifiers - Modifiers::SHIFT).is_empty() && (' '..='~').contains(&ch) =>
            {
                Some(ch)
            }
            _ => None,
        }
    }
}

/// Identity of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A Unicode character.
    Char(char),
    Enter,
    /// Tab; Shift+Tab is `Tab` with [`Modifiers::SHIFT`].
    Tab,
    Backspace,
    Delete,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

bitflags! {
    /// Keyboard modifier flags, in xterm's `param = 1 + bitmask` encoding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Incremental byte-to-key parser.
pub struct Parser {
    buf: Vec<u8>,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
        }
    }

    /// Feed raw bytes and return every key that can be decoded so far.
    /// Incomplete sequences stay buffered for the next call.
    pub fn advance(&mut self, data: &[u8]) -> Vec<KeyEvent> {
        self.buf.extend_from_slice(data);
        let mut keys = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf[pos..]) {
                Parsed::Key(key, consumed) => {
                    keys.push(key);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => pos += n,
            }
        }

        if pos > 0 {
            self.buf.drain(..pos);
        }
        keys
    }

    /// Are there buffered bytes that might complete with more input?
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Resolve buffered bytes as literal keys: a lone ESC becomes
    /// [`KeyCode::Escape`], and an unfinished sequence degrades to
    /// Escape followed by its printable bytes.
    pub fn flush(&mut self) -> Vec<KeyEvent> {
        let keys = self
            .buf
            .iter()
            .filter_map(|&byte| match byte {
                0x1B => Some(KeyEvent::plain(KeyCode::Escape)),
                b @ 0x20..=0x7E => Some(KeyEvent::plain(KeyCode::Char(char::from(b)))),
                _ => None,
            })
            .collect();
        self.buf.clear();
        keys
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Stateless Parsing ──────────────────────────────────────────────────────

enum Parsed {
    /// A key, consuming `usize` bytes.
    Key(KeyEvent, usize),
    /// The sequence needs more bytes.
    Incomplete,
    /// Unrecognized bytes to drop.
    Skip(usize),
}

fn try_parse(buf: &[u8]) -> Parsed {
    let Some(&first) = buf.first() else {
        return Parsed::Skip(0);
    };

    match first {
        0x1B => parse_escape(buf),
        0x08 | 0x7F => Parsed::Key(KeyEvent::plain(KeyCode::Backspace), 1),
        0x09 => Parsed::Key(KeyEvent::plain(KeyCode::Tab), 1),
        0x0A | 0x0D => Parsed::Key(KeyEvent::plain(KeyCode::Enter), 1),
        b @ 0x01..=0x1A => Parsed::Key(KeyEvent::ctrl(char::from(b + b'a' - 1)), 1),
        b @ 0x20..=0x7E => Parsed::Key(KeyEvent::plain(KeyCode::Char(char::from(b))), 1),
        0xC0..=0xFF => parse_utf8(buf),
        _ => Parsed::Skip(1),
    }
}

fn parse_escape(buf: &[u8]) -> Parsed {
    let Some(&second) = buf.get(1) else {
        return Parsed::Incomplete;
    };

    match second {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        b @ 0x20..=0x7E => Parsed::Key(
            KeyEvent {
                code: KeyCode::Char(char::from(b)),
                modifiers: Modifiers::ALT,
            },
            2,
        ),
        _ => Parsed::Key(KeyEvent::plain(KeyCode::Escape), 1),
    }
}

fn parse_csi(buf: &[u8]) -> Parsed {
    // Scan for the final byte; parameters and intermediates are 0x20..=0x3F.
    let mut end = 2;
    while let Some(&b) = buf.get(end) {
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }
    let Some(&final_byte) = buf.get(end) else {
        return Parsed::Incomplete;
    };

    let params = parse_params(&buf[2..end]);
    let consumed = end + 1;
    let modifiers = params.get(1).map_or(Modifiers::empty(), |&p| decode_modifiers(p));
    let with = |code| KeyEvent { code, modifiers };

    let key = match final_byte {
        b'A' => with(KeyCode::Up),
        b'B' => with(KeyCode::Down),
        b'C' => with(KeyCode::Right),
        b'D' => with(KeyCode::Left),
        b'H' => with(KeyCode::Home),
        b'F' => with(KeyCode::End),
        b'Z' => KeyEvent::back_tab(),
        b'~' => match params.first().copied().unwrap_or(0) {
            1 | 7 => with(KeyCode::Home),
            3 => with(KeyCode::Delete),
            4 | 8 => with(KeyCode::End),
            _ => return Parsed::Skip(consumed),
        },
        _ => return Parsed::Skip(consumed),
    };
    Parsed::Key(key, consumed)
}

fn parse_ss3(buf: &[u8]) -> Parsed {
    let Some(&b) = buf.get(2) else {
        return Parsed::Incomplete;
    };
    let code = match b {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        _ => return Parsed::Skip(3),
    };
    Parsed::Key(KeyEvent::plain(code), 3)
}

fn parse_utf8(buf: &[u8]) -> Parsed {
    let len = match buf[0] {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return Parsed::Skip(1),
    };
    if buf.len() < len {
        return Parsed::Incomplete;
    }
    match std::str::from_utf8(&buf[..len])
        .ok()
        .and_then(|s| s.chars().next())
    {
        Some(ch) => Parsed::Key(KeyEvent::plain(KeyCode::Char(ch)), len),
        None => Parsed::Skip(1),
    }
}

/// Parse `;`-separated decimal parameters. Empty fields read as 0.
fn parse_params(raw: &[u8]) -> Vec<u16> {
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .filter(|b| b.is_ascii_digit())
                .fold(0u16, |acc, &b| {
                    acc.saturating_mul(10).saturating_add(u16::from(b - b'0'))
                })
        })
        .collect()
}

/// xterm encodes modifiers as `1 + bitmask`.
fn decode_modifiers(param: u16) -> Modifiers {
    let bits = u8::try_from(param.saturating_sub(1)).unwrap_or(0);
    Modifiers::from_bits_truncate(bits)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
