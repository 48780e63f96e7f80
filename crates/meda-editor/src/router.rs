//! Focus router — decides who gets each keystroke.
//!
//! Focus is exactly one of:
//!
//! ```text
//!                 Ctrl-O (clean)                 non-empty name
//!   ┌────────┐ ──────────────────► OpenFilePrompt ──────────────► Open(name)
//!   │ Editor │
//!   └────────┘ ──► SaveConfirm{then} ── y / n ──► Confirmed{save, then}
//!       ▲     Ctrl-O / Ctrl-X (dirty)
//!       │
//!       └──── Esc / Ctrl-A from any overlay (no side effect)
//! ```
//!
//! Three override keys preempt normal routing whatever has focus:
//!
//! | Key    | Action                                    |
//! |--------|-------------------------------------------|
//! | Ctrl-O | open a file (asks to save first if dirty) |
//! | Ctrl-A | close any overlay, back to the editor     |
//! | Ctrl-X | quit (asks to save first if dirty)        |
//!
//! A save confirmation is a decision in progress, so Ctrl-O and Ctrl-X are
//! ignored while it is open. Ctrl-A and Esc cancel it along with whatever
//! it was asked for.
//!
//! The router only tracks state and translates widget results into
//! [`Command`]s. Saving, loading and quitting are the editor's job; after a
//! save succeeds the editor calls back into the router to continue
//! ([`prompt_open_file`](FocusRouter::prompt_open_file)).

use meda_term::input::{KeyCode, KeyEvent};

use crate::overlay::{Answer, Outcome, Overlay, TextInput, Widget, YesNoConfirm};

/// Ctrl-O: open a file.
pub const OPEN_FILE_KEY: KeyEvent = KeyEvent::ctrl('o');
/// Ctrl-A: return to the editor.
pub const RETURN_KEY: KeyEvent = KeyEvent::ctrl('a');
/// Ctrl-X: quit.
pub const QUIT_KEY: KeyEvent = KeyEvent::ctrl('x');

/// Title of the prompt for naming an unnamed buffer.
const SAVE_AS_TITLE: &str = "Save As:";

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// What the user asked for before being asked to save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    OpenFile,
    Quit,
}

/// Why an overlay is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    /// "Would you like to save?" before `then`.
    SaveConfirm { then: Intent },
    /// "File Name:" for the file to open.
    OpenFilePrompt,
    /// A name for a buffer that has none, before `then`.
    SaveAsPrompt { then: Intent },
}

/// Who receives keystrokes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Focus {
    Editor,
    Overlay { kind: OverlayKind, widget: Widget },
}

/// What the editor should do after a key was routed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Not for an overlay: try movement, then editing.
    Edit(KeyEvent),
    /// An overlay opened or changed; draw it.
    Redraw,
    /// A save confirmation opened; poll keys into it until it resolves.
    AwaitConfirm(Intent),
    /// The overlay closed without effect; redraw the text.
    Closed,
    /// The save confirmation was answered.
    Confirmed { save: bool, then: Intent },
    /// The open prompt produced a file name.
    Open(String),
    /// The save-as prompt produced a file name.
    SaveAs { name: String, then: Intent },
    /// Exit now.
    Quit,
    /// Nothing to do.
    Ignored,
}

// ---------------------------------------------------------------------------
// FocusRouter
// ---------------------------------------------------------------------------

/// Owns the focus state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusRouter {
    focus: Focus,
}

impl FocusRouter {
    /// Focus starts on the editor.
    #[must_use]
    pub const fn new() -> Self {
        Self { focus: Focus::Editor }
    }

    #[inline]
    #[must_use]
    pub const fn focus(&self) -> &Focus {
        &self.focus
    }

    #[inline]
    #[must_use]
    pub const fn is_editor(&self) -> bool {
        matches!(self.focus, Focus::Editor)
    }

    /// The open overlay's widget, for drawing.
    #[must_use]
    pub const fn widget(&self) -> Option<&Widget> {
        match &self.focus {
            Focus::Editor => None,
            Focus::Overlay { widget, .. } => Some(widget),
        }
    }

    /// Route one key. `dirty` is whether the buffer has unsaved changes.
    pub fn route(&mut self, key: &KeyEvent, dirty: bool) -> Command {
        if *key == RETURN_KEY {
            return self.cancel();
        }
        if *key == OPEN_FILE_KEY || *key == QUIT_KEY {
            if matches!(self.kind(), Some(OverlayKind::SaveConfirm { .. })) {
                return Command::Ignored;
            }
            let intent = if *key == QUIT_KEY { Intent::Quit } else { Intent::OpenFile };
            return self.begin(intent, dirty);
        }

        if key.code == KeyCode::Escape && !self.is_editor() {
            return self.cancel();
        }
        let Focus::Overlay { kind, widget } = &mut self.focus else {
            return Command::Edit(*key);
        };

        let kind = *kind;
        match widget.handle_key(key) {
            Outcome::Pending => Command::Redraw,
            Outcome::Done(answer) => self.finish(kind, answer),
        }
    }

    /// Open the file-name prompt.
    pub fn prompt_open_file(&mut self) {
        self.open(OverlayKind::OpenFilePrompt, Widget::Input(TextInput::file_name()));
    }

    /// Ask for a name to save an unnamed buffer under, then carry on with
    /// `then`.
    pub fn prompt_save_as(&mut self, then: Intent) {
        self.open(
            OverlayKind::SaveAsPrompt { then },
            Widget::Input(TextInput::new(SAVE_AS_TITLE)),
        );
    }

    /// Drop any overlay and give focus back to the editor.
    pub fn close(&mut self) {
        if let Focus::Overlay { kind, .. } = &self.focus {
            log::debug!("closing overlay {kind:?}");
        }
        self.focus = Focus::Editor;
    }

    // -- Internal -----------------------------------------------------------

    fn kind(&self) -> Option<OverlayKind> {
        match &self.focus {
            Focus::Editor => None,
            Focus::Overlay { kind, .. } => Some(*kind),
        }
    }

    fn open(&mut self, kind: OverlayKind, widget: Widget) {
        log::debug!("opening overlay {kind:?}");
        self.focus = Focus::Overlay { kind, widget };
    }

    fn begin(&mut self, intent: Intent, dirty: bool) -> Command {
        if dirty {
            self.open(
                OverlayKind::SaveConfirm { then: intent },
                Widget::Confirm(YesNoConfirm::save_changes()),
            );
            return Command::AwaitConfirm(intent);
        }
        match intent {
            Intent::OpenFile => {
                self.prompt_open_file();
                Command::Redraw
            }
            Intent::Quit => {
                self.close();
                Command::Quit
            }
        }
    }

    fn cancel(&mut self) -> Command {
        if self.is_editor() {
            return Command::Ignored;
        }
        self.close();
        Command::Closed
    }

    fn finish(&mut self, kind: OverlayKind, answer: Answer) -> Command {
        self.close();
        match (kind, answer) {
            (OverlayKind::SaveConfirm { then }, Answer::Confirmed(save)) => {
                Command::Confirmed { save, then }
            }
            (OverlayKind::OpenFilePrompt, Answer::Text(name)) if !name.is_empty() => {
                Command::Open(name)
            }
            (OverlayKind::SaveAsPrompt { then }, Answer::Text(name)) if !name.is_empty() => {
                Command::SaveAs { name, then }
            }
            (kind, answer) => {
                log::debug!("overlay {kind:?} finished with {answer:?}, nothing to do");
                Command::Closed
            }
        }
    }
}

impl Default for FocusRouter {
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
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::plain(code)
    }

    fn ch(c: char) -> KeyEvent {
        KeyEvent::plain(KeyCode::Char(c))
    }

    fn kind(router: &FocusRouter) -> Option<OverlayKind> {
        router.kind()
    }

    // -- Editor focus -------------------------------------------------------

    #[test]
    fn plain_keys_go_to_editor() {
        let mut r = FocusRouter::new();
        assert_eq!(r.route(&ch('a'), false), Command::Edit(ch('a')));
        assert_eq!(r.route(&key(KeyCode::Up), true), Command::Edit(key(KeyCode::Up)));
        assert_eq!(r.route(&key(KeyCode::Escape), false), Command::Edit(key(KeyCode::Escape)));
        assert!(r.is_editor());
    }

    #[test]
    fn return_key_in_editor_does_nothing() {
        let mut r = FocusRouter::new();
        assert_eq!(r.route(&RETURN_KEY, true), Command::Ignored);
    }

    // -- Quit ---------------------------------------------------------------

    #[test]
    fn clean_quit_is_immediate() {
        let mut r = FocusRouter::new();
        assert_eq!(r.route(&QUIT_KEY, false), Command::Quit);
    }

    #[test]
    fn dirty_quit_asks_then_saves() {
        let mut r = FocusRouter::new();
        assert_eq!(r.route(&QUIT_KEY, true), Command::AwaitConfirm(Intent::Quit));
        assert_eq!(kind(&r), Some(OverlayKind::SaveConfirm { then: Intent::Quit }));
        assert_eq!(
            r.route(&ch('y'), true),
            Command::Confirmed { save: true, then: Intent::Quit }
        );
        assert!(r.is_editor());
    }

    #[test]
    fn dirty_quit_can_discard_with_arrows() {
        let mut r = FocusRouter::new();
        r.route(&QUIT_KEY, true);
        assert_eq!(r.route(&key(KeyCode::Right), true), Command::Redraw);
        assert_eq!(
            r.route(&key(KeyCode::Enter), true),
            Command::Confirmed { save: false, then: Intent::Quit }
        );
    }

    #[test]
    fn overrides_are_ignored_during_confirmation() {
        let mut r = FocusRouter::new();
        r.route(&QUIT_KEY, true);
        assert_eq!(r.route(&OPEN_FILE_KEY, true), Command::Ignored);
        assert_eq!(r.route(&QUIT_KEY, true), Command::Ignored);
        assert_eq!(kind(&r), Some(OverlayKind::SaveConfirm { then: Intent::Quit }));
    }

    #[test]
    fn cancel_abandons_confirmation() {
        let mut r = FocusRouter::new();
        r.route(&QUIT_KEY, true);
        assert_eq!(r.route(&key(KeyCode::Escape), true), Command::Closed);
        assert!(r.is_editor());

        r.route(&QUIT_KEY, true);
        assert_eq!(r.route(&RETURN_KEY, true), Command::Closed);
        assert!(r.is_editor());
    }

    // -- Open ---------------------------------------------------------------

    #[test]
    fn clean_open_goes_straight_to_prompt() {
        let mut r = FocusRouter::new();
        assert_eq!(r.route(&OPEN_FILE_KEY, false), Command::Redraw);
        assert_eq!(kind(&r), Some(OverlayKind::OpenFilePrompt));
        assert!(matches!(r.widget(), Some(Widget::Input(_))));
    }

    #[test]
    fn prompt_collects_name() {
        let mut r = FocusRouter::new();
        r.route(&OPEN_FILE_KEY, false);
        for c in "a.py".chars() {
            assert_eq!(r.route(&ch(c), false), Command::Redraw);
        }
        assert_eq!(r.route(&key(KeyCode::Enter), false), Command::Open("a.py".into()));
        assert!(r.is_editor());
    }

    #[test]
    fn empty_name_closes_prompt() {
        let mut r = FocusRouter::new();
        r.route(&OPEN_FILE_KEY, false);
        assert_eq!(r.route(&key(KeyCode::Enter), false), Command::Closed);
        assert!(r.is_editor());
    }

    #[test]
    fn dirty_open_confirms_first() {
        let mut r = FocusRouter::new();
        assert_eq!(r.route(&OPEN_FILE_KEY, true), Command::AwaitConfirm(Intent::OpenFile));
        assert_eq!(
            r.route(&ch('n'), true),
            Command::Confirmed { save: false, then: Intent::OpenFile }
        );
        r.prompt_open_file();
        assert_eq!(kind(&r), Some(OverlayKind::OpenFilePrompt));
    }

    #[test]
    fn overlay_swallows_editor_keys() {
        let mut r = FocusRouter::new();
        r.route(&OPEN_FILE_KEY, false);
        assert_eq!(r.route(&key(KeyCode::Up), false), Command::Redraw);
        assert_eq!(r.route(&key(KeyCode::Tab), false), Command::Redraw);
    }

    #[test]
    fn quit_from_prompt_starts_quit_flow() {
        let mut r = FocusRouter::new();
        r.route(&OPEN_FILE_KEY, false);
        assert_eq!(r.route(&QUIT_KEY, false), Command::Quit);
        assert!(r.is_editor());
    }

    // -- Save as ------------------------------------------------------------

    #[test]
    fn save_as_prompt_carries_intent() {
        let mut r = FocusRouter::new();
        r.prompt_save_as(Intent::Quit);
        r.route(&ch('x'), true);
        assert_eq!(
            r.route(&key(KeyCode::Enter), true),
            Command::SaveAs { name: "x".into(), then: Intent::Quit }
        );
    }

    #[test]
    fn empty_save_as_name_aborts() {
        let mut r = FocusRouter::new();
        r.prompt_save_as(Intent::OpenFile);
        assert_eq!(r.route(&key(KeyCode::Enter), true), Command::Closed);
    }
}
