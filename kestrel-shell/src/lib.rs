//! Line-driven front end for kestrel.
//!
//! [`shell::Shell`] owns one session and one window over a
//! [`surface::TerminalSurface`] and feeds it key-sequence text line by line.

pub mod config;
pub mod shell;
pub mod surface;

pub use config::ShellConfig;
pub use shell::Shell;
