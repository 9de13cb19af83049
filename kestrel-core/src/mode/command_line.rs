use std::fmt;
use std::sync::Arc;

use super::{ModeContext, ModeState, StateId};
use crate::input::{keysym, Key, KeySequence};
use crate::keymap::CommandRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandLineSubstate {
    Command,
}

/// A single-line text editor for commands.
#[derive(Clone)]
pub struct CommandLineMode {
    pub(super) id: StateId,
    pub(super) ctx: Arc<ModeContext>,
    /// The text as keys, one per character.
    pub current_keys: KeySequence,
    /// Index into `current_keys`, in `0..=current_keys.len()`.
    cursor: usize,
    pub substate: CommandLineSubstate,
    finalizer: CommandRunner,
}

impl CommandLineMode {
    /// A command line holding `text` with the cursor at its end, finalized
    /// by running the text as a command.
    #[must_use]
    pub fn new(ctx: &Arc<ModeContext>, text: &str) -> Self {
        Self::with_finalizer(ctx, text, Arc::clone(&ctx.runner))
    }

    #[must_use]
    pub fn with_finalizer(ctx: &Arc<ModeContext>, text: &str, finalizer: CommandRunner) -> Self {
        let current_keys = KeySequence::from_literal(text);
        Self {
            id: StateId::next(),
            ctx: Arc::clone(ctx),
            cursor: current_keys.len(),
            current_keys,
            substate: CommandLineSubstate::Command,
            finalizer,
        }
    }

    /// The full text, rendered literally.
    #[must_use]
    pub fn text(&self) -> String {
        self.current_keys.to_string_selective(false)
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// This command line with the cursor moved to `cursor`, clamped to the
    /// end of the text.
    #[must_use]
    pub fn with_cursor(&self, cursor: usize) -> Self {
        self.moved(cursor)
    }

    /// The text before the cursor, rendered literally.
    #[must_use]
    pub fn text_before_cursor(&self) -> String {
        let keys: &[Key] = &self.current_keys;
        KeySequence::from(keys.get(..self.cursor).unwrap_or(keys)).to_string_selective(false)
    }

    /// This command line with its text replaced and the cursor at the end.
    /// The finalizer is kept.
    #[must_use]
    pub fn replaced(&self, text: &str) -> Self {
        let keys = KeySequence::from_literal(text);
        let cursor = keys.len();
        self.edited(keys, cursor)
    }

    fn edited(&self, current_keys: KeySequence, cursor: usize) -> Self {
        Self {
            id: StateId::next(),
            ctx: Arc::clone(&self.ctx),
            cursor: cursor.min(current_keys.len()),
            current_keys,
            substate: self.substate,
            finalizer: Arc::clone(&self.finalizer),
        }
    }

    fn moved(&self, cursor: usize) -> Self {
        self.edited(self.current_keys.clone(), cursor)
    }

    pub(super) fn process_key(&self, key: Key) -> (ModeState, bool) {
        let len = self.current_keys.len();
        let next = if key.is(keysym::RETURN) || key.is(keysym::KP_ENTER) {
            let text = self.text();
            log::debug!("command line finalized: '{text}'");
            (self.finalizer)(&text);
            return (ModeState::normal(&self.ctx), true);
        } else if key.is(keysym::ESCAPE) {
            return (ModeState::normal(&self.ctx), true);
        } else if key.is(keysym::LEFT) {
            self.moved(self.cursor.saturating_sub(1))
        } else if key.is(keysym::RIGHT) {
            self.moved((self.cursor + 1).min(len))
        } else if key.is(keysym::HOME) {
            self.moved(0)
        } else if key.is(keysym::END) {
            self.moved(len)
        } else if key.is(keysym::BACKSPACE) {
            if self.cursor == 0 {
                return (ModeState::CommandLine(self.clone()), true);
            }
            let mut keys = self.current_keys.clone();
            keys.remove(self.cursor - 1);
            self.edited(keys, self.cursor - 1)
        } else if key.is(keysym::DELETE) {
            if self.cursor >= len {
                return (ModeState::CommandLine(self.clone()), true);
            }
            let mut keys = self.current_keys.clone();
            keys.remove(self.cursor);
            self.edited(keys, self.cursor)
        } else if let Some(c) = key.text_char() {
            let mut keys = self.current_keys.clone();
            keys.insert(self.cursor, Key::from_char(c));
            self.edited(keys, self.cursor + 1)
        } else {
            return (ModeState::CommandLine(self.clone()), true);
        };
        (ModeState::CommandLine(next), true)
    }
}

impl fmt::Debug for CommandLineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandLineMode")
            .field("id", &self.id)
            .field("text", &self.text())
            .field("cursor", &self.cursor)
            .field("substate", &self.substate)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::input::KeyModifiers;
    use crate::test_helpers::{fixture_context, keys};

    fn type_keys(state: ModeState, text: &str) -> ModeState {
        keys(text).iter().fold(state, |state, key| {
            let (next, consumed) = state.process_key(*key);
            assert!(consumed, "command line consumes every key");
            next
        })
    }

    fn line(state: &ModeState) -> (String, usize) {
        match state {
            ModeState::CommandLine(mode) => (mode.text(), mode.cursor),
            other => panic!("expected CommandLine, got {other:?}"),
        }
    }

    #[test]
    fn typing_inserts_at_cursor() {
        let (ctx, _) = fixture_context(&[]);
        let state = type_keys(ModeState::command_line(&ctx, ""), "opn<Left>e");
        assert_eq!(line(&state), ("open".to_string(), 3));
    }

    #[test]
    fn cursor_motion_is_clamped() {
        let (ctx, _) = fixture_context(&[]);
        let state = type_keys(ModeState::command_line(&ctx, "ab"), "<Right><Right><Left><Left><Left><Left>");
        assert_eq!(line(&state), ("ab".to_string(), 0));
        let state = type_keys(state, "<End>");
        assert_eq!(line(&state).1, 2);
        let state = type_keys(state, "<Home>");
        assert_eq!(line(&state).1, 0);
    }

    #[test]
    fn backspace_and_delete() {
        let (ctx, _) = fixture_context(&[]);
        let state = type_keys(ModeState::command_line(&ctx, "abcd"), "<Left><BackSpace>");
        assert_eq!(line(&state), ("abd".to_string(), 2));
        let state = type_keys(state, "<Delete>");
        assert_eq!(line(&state), ("ab".to_string(), 2));
        let state = type_keys(state, "<Delete><Home><BackSpace>");
        assert_eq!(line(&state), ("ab".to_string(), 0));
    }

    #[test]
    fn space_and_less_are_literal() {
        let (ctx, _) = fixture_context(&[]);
        let state = type_keys(ModeState::command_line(&ctx, "x"), "<space><less>");
        assert_eq!(line(&state), ("x <".to_string(), 3));
    }

    #[test]
    fn modified_and_unprintable_keys_are_ignored() {
        let (ctx, _) = fixture_context(&[]);
        let state = ModeState::command_line(&ctx, "ab");
        let ctrl_a = Key::from_char('a').with_modifiers(KeyModifiers::CONTROL);
        let (state, consumed) = state.process_key(ctrl_a);
        assert!(consumed);
        let state = type_keys(state, "<F1><Tab>");
        assert_eq!(line(&state), ("ab".to_string(), 2));
    }

    #[test]
    fn return_runs_the_text() {
        let (ctx, log) = fixture_context(&[]);
        let state = type_keys(ModeState::command_line(&ctx, ""), "open<space>example.com");
        let (state, consumed) = state.process_key(Key::named(keysym::RETURN));
        assert!(consumed);
        assert!(matches!(state, ModeState::Normal(_)));
        assert_eq!(*log.lock(), ["open example.com"]);
    }

    #[test]
    fn escape_discards() {
        let (ctx, log) = fixture_context(&[]);
        let (state, consumed) = ModeState::command_line(&ctx, "quit").process_key(Key::named(keysym::ESCAPE));
        assert!(consumed);
        assert!(matches!(state, ModeState::Normal(_)));
        assert!(log.lock().is_empty());
    }

    #[test]
    fn custom_finalizer() {
        let (ctx, _) = fixture_context(&[]);
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let mode = CommandLineMode::with_finalizer(&ctx, "abc", Arc::new(move |text: &str| {
            *sink.lock() = Some(text.to_string());
        }));
        let _ = ModeState::CommandLine(mode).process_key(Key::named(keysym::KP_ENTER));
        assert_eq!(seen.lock().as_deref(), Some("abc"));
    }

    #[test]
    fn text_before_cursor() {
        let (ctx, _) = fixture_context(&[]);
        let state = type_keys(ModeState::command_line(&ctx, "open ab"), "<Left>");
        let ModeState::CommandLine(mode) = state else {
            panic!("expected CommandLine");
        };
        assert_eq!(mode.text_before_cursor(), "open a");
    }

    #[test]
    fn cursor_past_the_end_is_clamped() {
        let (ctx, _) = fixture_context(&[]);
        let mode = CommandLineMode::new(&ctx, "open").with_cursor(1);
        assert_eq!(mode.text_before_cursor(), "o");
        let mode = mode.with_cursor(99);
        assert_eq!(mode.cursor(), 4);
        assert_eq!(mode.text_before_cursor(), "open");
    }

    #[test]
    fn replaced_keeps_finalizer() {
        let (ctx, log) = fixture_context(&[]);
        let mode = CommandLineMode::new(&ctx, "op");
        let replaced = mode.replaced("open example.com");
        assert_eq!(replaced.cursor, 16);
        assert_ne!(replaced.id, mode.id);
        let _ = ModeState::CommandLine(replaced).process_key(Key::named(keysym::RETURN));
        assert_eq!(*log.lock(), ["open example.com"]);
    }
}
