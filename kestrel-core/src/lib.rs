//! kestrel core - key bindings, modes and completion for a keyboard-driven
//! browser shell.
//!
//! This crate interprets key presses the way vim-like browsers do: key
//! descriptions are parsed into [`input::Key`]s, bound sequences live in a
//! [`keymap::BindingTrie`], and a [`mode::ModeState`] decides what every key
//! means. A [`window::Window`] drives one state machine over a content
//! [`surface::Surface`] supplied by the front end.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use kestrel_core::input::parse_sequence;
//! use kestrel_core::session::{Session, SessionConfig};
//! use kestrel_core::window::Window;
//!
//! # fn run(surface: Arc<dyn kestrel_core::surface::Surface>) -> Result<(), kestrel_core::error::KeyParseError> {
//! let session = Session::new(SessionConfig::default());
//! let window = Window::new(&session, surface);
//! window.handle_keys(&parse_sequence(":open<space>example.com<Return>")?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! States are immutable values. A transition returns the successor state
//! and whether the key was consumed; bound actions act on the window
//! through a weak handle. Completion runs on a blocking worker and is
//! cancelled through a watch channel whenever a newer session starts.

pub mod builtins;
pub mod command;
pub mod commands;
pub mod completion;
pub mod error;
pub mod input;
pub mod keymap;
pub mod mode;
pub mod registry;
pub mod session;
pub mod shellwords;
pub mod surface;
pub mod window;

#[cfg(test)]
mod test_helpers;

pub use input::{parse_key, parse_sequence, Key, KeySequence};
pub use mode::{ModeState, Status};
pub use session::{Session, SessionConfig};
pub use window::{Window, WindowHandle};
