//! The modal state machine.
//!
//! A window is always in exactly one [`ModeState`]. States are value
//! objects: a transition builds the successor state and reports whether
//! the key was consumed, it never mutates the state it was called on.

mod command_line;
mod insert;
mod normal;
mod status;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

pub use command_line::{CommandLineMode, CommandLineSubstate};
pub use insert::InsertMode;
pub use normal::{NormalMode, NormalSubstate};
pub use status::{Status, StatusMode};

use crate::input::Key;
use crate::keymap::{BindingTrie, CommandRunner};

/// Identity of a constructed state. Clones share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateId(u64);

impl StateId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// What every state of a window shares.
pub struct ModeContext {
    /// The window's bindings. Rebuilding swaps the trie, so live states
    /// always resolve against the current one.
    pub bindings: Arc<ArcSwap<BindingTrie>>,
    /// Runs a command line in the window.
    pub runner: CommandRunner,
}

impl ModeContext {
    #[must_use]
    pub fn new(bindings: Arc<ArcSwap<BindingTrie>>, runner: CommandRunner) -> Arc<Self> {
        Arc::new(Self { bindings, runner })
    }
}

impl fmt::Debug for ModeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeContext").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub enum ModeState {
    Normal(NormalMode),
    Insert(InsertMode),
    CommandLine(CommandLineMode),
    Status(StatusMode),
}

impl ModeState {
    /// A fresh normal mode with no keys pending.
    #[must_use]
    pub fn normal(ctx: &Arc<ModeContext>) -> Self {
        Self::Normal(NormalMode::new(ctx))
    }

    #[must_use]
    pub fn insert(ctx: &Arc<ModeContext>) -> Self {
        Self::Insert(InsertMode::new(ctx))
    }

    /// A command line pre-filled with `text`, finalized by running it.
    #[must_use]
    pub fn command_line(ctx: &Arc<ModeContext>, text: &str) -> Self {
        Self::CommandLine(CommandLineMode::new(ctx, text))
    }

    #[must_use]
    pub fn with_status(self, status: Status) -> Self {
        Self::Status(StatusMode::new(self, status))
    }

    /// Transition on `key`: the successor state and whether the key was
    /// consumed.
    #[must_use]
    pub fn process_key(&self, key: Key) -> (Self, bool) {
        match self {
            Self::Normal(mode) => mode.process_key(key),
            Self::Insert(mode) => mode.process_key(key),
            Self::CommandLine(mode) => mode.process_key(key),
            Self::Status(mode) => mode.process_key(key),
        }
    }

    #[must_use]
    pub fn id(&self) -> StateId {
        match self {
            Self::Normal(mode) => mode.id,
            Self::Insert(mode) => mode.id,
            Self::CommandLine(mode) => mode.id,
            Self::Status(mode) => mode.id,
        }
    }

    #[must_use]
    pub fn ctx(&self) -> &Arc<ModeContext> {
        match self {
            Self::Normal(mode) => &mode.ctx,
            Self::Insert(mode) => &mode.ctx,
            Self::CommandLine(mode) => &mode.ctx,
            Self::Status(mode) => mode.inner.ctx(),
        }
    }

    /// The state underneath any status overlay.
    #[must_use]
    pub fn base(&self) -> &Self {
        match self {
            Self::Status(mode) => mode.inner.base(),
            other => other,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<&Status> {
        match self {
            Self::Status(mode) => Some(&mode.status),
            _ => None,
        }
    }

    /// Short mode label for a status line.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self.base() {
            Self::Normal(_) | Self::Status(_) => "NORMAL",
            Self::Insert(_) => "INSERT",
            Self::CommandLine(_) => "COMMAND",
        }
    }
}

impl fmt::Display for ModeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal(mode) => write!(f, "{}", mode.current_keys),
            Self::Insert(_) => f.write_str("-- INSERT --"),
            Self::CommandLine(mode) => write!(f, ":{}", mode.text()),
            Self::Status(mode) => write!(f, "{}", mode.status),
        }
    }
}
