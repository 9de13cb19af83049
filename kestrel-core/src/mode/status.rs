use std::fmt;

use super::{ModeState, StateId};
use crate::input::Key;

/// A one-shot message shown over the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

impl Status {
    pub fn error(err: impl fmt::Display) -> Self {
        Self::Error(err.to_string())
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info(msg) => f.write_str(msg),
            Self::Error(msg) => write!(f, "Error: {msg}"),
        }
    }
}

/// Overlays a [`Status`] on another state and delegates every key to it.
#[derive(Debug, Clone)]
pub struct StatusMode {
    pub(super) id: StateId,
    pub inner: Box<ModeState>,
    pub status: Status,
}

impl StatusMode {
    #[must_use]
    pub fn new(inner: ModeState, status: Status) -> Self {
        Self {
            id: StateId::next(),
            inner: Box::new(inner),
            status,
        }
    }

    /// The inner state's successor; the status is dropped.
    pub(super) fn process_key(&self, key: Key) -> (ModeState, bool) {
        self.inner.process_key(key)
    }
}
