//! Key model: single keys, named keyvals and key sequences.

pub mod key;
pub mod keysym;
pub mod sequence;

pub use key::{parse_key, Key, KeyModifiers, VirtualKey};
pub use sequence::{parse_sequence, KeySequence};
