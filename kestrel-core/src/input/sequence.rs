//! Ordered key chords and their compact text notation.
//!
//! A sequence renders each key as its single character when it has one,
//! and as `<name>` otherwise, e.g. `gg`, `<C-a>x`, `<Escape>`.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use super::key::{parse_key, Key};
use crate::error::KeyParseError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeySequence(Vec<Key>);

impl KeySequence {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Each character of `text` as an unmodified key.
    ///
    /// This is how typed command-line text is represented; no bracket
    /// notation is interpreted.
    #[must_use]
    pub fn from_literal(text: &str) -> Self {
        Self(text.chars().map(Key::from_char).collect())
    }

    pub fn push(&mut self, key: Key) {
        self.0.push(key);
    }

    /// A copy of this sequence with `key` appended.
    #[must_use]
    pub fn with(&self, key: Key) -> Self {
        let mut keys = self.0.clone();
        keys.push(key);
        Self(keys)
    }

    pub fn insert(&mut self, index: usize, key: Key) {
        self.0.insert(index, key);
    }

    pub fn remove(&mut self, index: usize) -> Key {
        self.0.remove(index)
    }

    /// The keys after the first `len` keys.
    #[must_use]
    pub fn suffix(&self, len: usize) -> Self {
        Self(self.0.get(len..).map(<[Key]>::to_vec).unwrap_or_default())
    }

    /// Element-wise binding equality.
    #[must_use]
    pub fn matches(&self, other: &[Key]) -> bool {
        self.0.len() == other.len() && self.0.iter().zip(other).all(|(a, b)| a.matches(b))
    }

    /// Whether `prefix` matches the start of this sequence.
    #[must_use]
    pub fn starts_with_keys(&self, prefix: &[Key]) -> bool {
        prefix.len() <= self.0.len() && self.0.iter().zip(prefix).all(|(a, b)| a.matches(b))
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<Key> {
        self.0
    }

    #[must_use]
    pub fn to_string_selective(&self, selective: bool) -> String {
        let mut out = String::new();
        for key in &self.0 {
            let rendered = key.to_string_selective(selective);
            if rendered.chars().count() <= 1 {
                out.push_str(&rendered);
            } else if key.to_char() == Some('>') {
                // A literal '>' would close the bracket early.
                out.push('<');
                out.push_str(&rendered[..rendered.len() - 1]);
                out.push_str("greater>");
            } else {
                out.push('<');
                out.push_str(&rendered);
                out.push('>');
            }
        }
        out
    }
}

/// Parse key-sequence text.
///
/// `<` opens a bracketed key name only when a `>` follows somewhere later
/// in the text; otherwise it is the literal `<` key. Use `<less>` to bind
/// `<` in a sequence that also contains `>`.
pub fn parse_sequence(text: &str) -> Result<KeySequence, KeyParseError> {
    let mut keys = Vec::new();
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        if c == '<' {
            if let Some(end) = rest[1..].find('>') {
                let inner = &rest[1..=end];
                keys.push(parse_key(inner)?);
                rest = &rest[end + 2..];
                continue;
            }
        }
        keys.push(Key::from_char(c));
        rest = &rest[c.len_utf8()..];
    }
    Ok(KeySequence(keys))
}

impl Deref for KeySequence {
    type Target = [Key];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Key>> for KeySequence {
    fn from(keys: Vec<Key>) -> Self {
        Self(keys)
    }
}

impl From<&[Key]> for KeySequence {
    fn from(keys: &[Key]) -> Self {
        Self(keys.to_vec())
    }
}

impl FromIterator<Key> for KeySequence {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a KeySequence {
    type Item = &'a Key;
    type IntoIter = std::slice::Iter<'a, Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromStr for KeySequence {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_sequence(s)
    }
}

impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_selective(true))
    }
}
