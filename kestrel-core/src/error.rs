//! Error taxonomy shared by the key model, keymap and command layers.
//!
//! Every failure here is returned as a value. Callers surface them as
//! status messages; none of them is fatal to the interpreter.

use thiserror::Error;

/// Malformed key or key-sequence text.
///
/// Carries the text that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to parse key for value: {0}")]
pub struct KeyParseError(pub String);

/// A raw binding that could not be turned into a [`crate::keymap::Binding`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("invalid key sequence '{from}': {source}")]
    Keys {
        from: String,
        #[source]
        source: KeyParseError,
    },
    #[error("binding '{from}': no such builtin '{builtin}'")]
    UnknownBuiltin { from: String, builtin: String },
    #[error("binding '{from}': empty action")]
    EmptyAction { from: String },
    #[error("binding '{from}': malformed action '{to}': {reason}")]
    Malformed { from: String, to: String, reason: String },
}

/// Failures while parsing or dispatching a command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("failed to run command '{0}': no such command")]
    NotFound(String),
    #[error("failed to parse command '{line}': {reason}")]
    Parse { line: String, reason: String },
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("no such quickmark '{0}'")]
    NoSuchQuickmark(String),
    #[error(transparent)]
    Setting(#[from] SettingError),
    #[error(transparent)]
    Binding(#[from] BindingError),
}

/// Failures of the `set` command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingError {
    #[error("unknown setting '{0}'")]
    Unknown(String),
    #[error("setting '{name}' expects a value of type {expected}, got '{value}'")]
    InvalidValue {
        name: String,
        expected: &'static str,
        value: String,
    },
}

/// Failures reported by a viewport provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewportError {
    #[error("viewport unavailable")]
    Unavailable,
    #[error("viewport request failed: {0}")]
    Request(String),
}
