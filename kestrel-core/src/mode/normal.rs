use std::sync::Arc;

use super::{ModeContext, ModeState, StateId};
use crate::input::{Key, KeySequence, VirtualKey};
use crate::keymap::Lookup;

/// What a pending normal-mode chord is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalSubstate {
    Normal,
    /// A quickmark name, opened in the current view.
    Quickmark,
    /// A quickmark name, opened in a new tab.
    QuickmarkTab,
    /// A quickmark name, opened in a new window.
    QuickmarkWindow,
    /// Quickmark names, each opened in a background tab, until a key that
    /// names none.
    QuickmarksRapid,
}

impl NormalSubstate {
    /// The virtual key quickmarks of this substate are bound under.
    #[must_use]
    pub fn virtual_key(self) -> Option<VirtualKey> {
        match self {
            Self::Normal => None,
            Self::Quickmark => Some(VirtualKey::QuickmarkOpen),
            Self::QuickmarkTab => Some(VirtualKey::QuickmarkTab),
            Self::QuickmarkWindow => Some(VirtualKey::QuickmarkWindow),
            Self::QuickmarksRapid => Some(VirtualKey::QuickmarksRapid),
        }
    }

    #[must_use]
    pub fn is_quickmark(self) -> bool {
        self != Self::Normal
    }
}

/// Key chords resolved against the binding trie.
#[derive(Debug, Clone)]
pub struct NormalMode {
    pub(super) id: StateId,
    pub(super) ctx: Arc<ModeContext>,
    /// The chord typed so far.
    pub current_keys: KeySequence,
    pub substate: NormalSubstate,
}

impl NormalMode {
    #[must_use]
    pub fn new(ctx: &Arc<ModeContext>) -> Self {
        Self::with_keys(ctx, KeySequence::new(), NormalSubstate::Normal)
    }

    #[must_use]
    pub fn with_keys(ctx: &Arc<ModeContext>, current_keys: KeySequence, substate: NormalSubstate) -> Self {
        Self {
            id: StateId::next(),
            ctx: Arc::clone(ctx),
            current_keys,
            substate,
        }
    }

    /// Normal mode waiting for a quickmark name.
    #[must_use]
    pub fn quickmark(ctx: &Arc<ModeContext>, substate: NormalSubstate) -> Self {
        let keys = substate
            .virtual_key()
            .map(|v| KeySequence::from(vec![Key::virtual_key(v)]))
            .unwrap_or_default();
        Self::with_keys(ctx, keys, substate)
    }

    pub(super) fn process_key(&self, key: Key) -> (ModeState, bool) {
        let keys = self.current_keys.with(key);
        let action = {
            let trie = self.ctx.bindings.load();
            match trie.lookup(&keys) {
                Lookup::Terminal(binding) => Some(binding.action.clone()),
                Lookup::Interior(_) => {
                    let pending = Self::with_keys(&self.ctx, keys, self.substate);
                    return (ModeState::Normal(pending), true);
                }
                Lookup::Absent => None,
            }
        };

        if let Some(action) = action {
            log::debug!("key sequence '{keys}' fired");
            action.invoke(&[]);
            return (ModeState::normal(&self.ctx), true);
        }

        if self.current_keys.is_empty() {
            // Unbound single key: let it reach the content.
            return (ModeState::normal(&self.ctx), false);
        }
        log::debug!("dropping unbound chord '{keys}'");
        NormalMode::new(&self.ctx).process_key(key)
    }

    /// The state reached by typing `suffix` after the current chord,
    /// without firing any binding.
    #[must_use]
    pub fn predict(&self, suffix: &[Key]) -> ModeState {
        let mut keys = self.current_keys.clone();
        for key in suffix {
            keys.push(*key);
        }
        ModeState::Normal(Self::with_keys(&self.ctx, keys, self.substate))
    }
}
