//! Key source — where keystrokes come from.
//!
//! [`KeySource::next_key`] blocks until one key is available. [`TermKeys`]
//! reads raw stdin bytes and decodes them with the terminal input parser.
//! A lone ESC is ambiguous (it also starts every escape sequence), so once
//! bytes are pending it waits only [`ESC_TIMEOUT`] for the rest before
//! reporting a plain Escape.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use meda_term::input::{KeyEvent, Parser};
use meda_term::terminal;

/// How long an unfinished escape sequence may wait for its next byte.
pub const ESC_TIMEOUT: Duration = Duration::from_millis(25);

/// A blocking source of key events.
pub trait KeySource {
    /// Wait for the next key.
    ///
    /// # Errors
    ///
    /// Returns the read error. A closed input is
    /// [`io::ErrorKind::UnexpectedEof`].
    fn next_key(&mut self) -> io::Result<KeyEvent>;
}

/// Keys decoded from the terminal's stdin.
pub struct TermKeys {
    parser: Parser,
    queue: VecDeque<KeyEvent>,
    buf: [u8; 256],
}

impl TermKeys {
    #[must_use]
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
            queue: VecDeque::new(),
            buf: [0; 256],
        }
    }
}

impl Default for TermKeys {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySource for TermKeys {
    fn next_key(&mut self) -> io::Result<KeyEvent> {
        loop {
            if let Some(key) = self.queue.pop_front() {
                return Ok(key);
            }
            let timeout = self.parser.has_pending().then_some(ESC_TIMEOUT);
            let n = terminal::read_input(&mut self.buf, timeout)?;
            if n == 0 {
                // Timed out (or interrupted) with a partial sequence.
                if timeout.is_some() {
                    self.queue.extend(self.parser.flush());
                }
                continue;
            }
            self.queue.extend(self.parser.advance(&self.buf[..n]));
        }
    }
}

// ---------------------------------------------------------------------------
// Test double
// ---------------------------------------------------------------------------

/// Replays a fixed list of keys, then reports end of input.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct ScriptedKeys {
    keys: VecDeque<KeyEvent>,
}

#[cfg(test)]
impl ScriptedKeys {
    pub fn new(keys: impl IntoIterator<Item = KeyEvent>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}

#[cfg(test)]
impl KeySource for ScriptedKeys {
    fn next_key(&mut self) -> io::Result<KeyEvent> {
        self.keys
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meda_term::input::KeyCode;

    #[test]
    fn scripted_keys_replay_in_order() {
        let mut keys = ScriptedKeys::new([KeyEvent::plain(KeyCode::Up), KeyEvent::ctrl('x')]);
        assert_eq!(keys.next_key().unwrap(), KeyEvent::plain(KeyCode::Up));
        assert_eq!(keys.remaining(), 1);
        assert_eq!(keys.next_key().unwrap(), KeyEvent::ctrl('x'));
        let err = keys.next_key().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn escape_timeout_is_short() {
        assert!(ESC_TIMEOUT < Duration::from_millis(100));
    }
}
