use std::sync::Arc;

use super::{ModeContext, ModeState, StateId};
use crate::input::{keysym, Key};

/// Keys pass through to the content; only Escape is interpreted.
#[derive(Debug, Clone)]
pub struct InsertMode {
    pub(super) id: StateId,
    pub(super) ctx: Arc<ModeContext>,
}

impl InsertMode {
    #[must_use]
    pub fn new(ctx: &Arc<ModeContext>) -> Self {
        Self {
            id: StateId::next(),
            ctx: Arc::clone(ctx),
        }
    }

    pub(super) fn process_key(&self, key: Key) -> (ModeState, bool) {
        if key.is(keysym::ESCAPE) {
            return (ModeState::normal(&self.ctx), true);
        }
        (ModeState::Insert(self.clone()), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyModifiers;
    use crate::test_helpers::{fixture_context, key};

    #[test]
    fn bound_keys_still_fall_through() {
        let (ctx, log) = fixture_context(&[("a", "cmd:never")]);
        let state = ModeState::insert(&ctx);
        let (next, consumed) = state.process_key(key('a'));
        assert!(!consumed);
        assert_eq!(next.id(), state.id());
        assert!(log.lock().is_empty());
    }

    #[test]
    fn modified_escape_is_not_the_escape_key() {
        let (ctx, _) = fixture_context(&[]);
        let escape = Key::named(keysym::ESCAPE).with_modifiers(KeyModifiers::CONTROL);
        let (next, consumed) = ModeState::insert(&ctx).process_key(escape);
        assert!(!consumed);
        assert!(matches!(next, ModeState::Insert(_)));
    }
}
