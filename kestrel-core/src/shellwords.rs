//! Shell-word splitting for command lines.
//!
//! Whitespace separates words, single quotes group literally, double
//! quotes group with `\"` and `\\` escapes, and a backslash outside quotes
//! escapes the next character.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShellwordsError {
    #[error("unterminated {0} quote")]
    UnterminatedQuote(char),
    #[error("trailing backslash")]
    TrailingEscape,
}

/// The words of `text`, plus whether it ends on an unquoted separator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Words {
    pub words: Vec<String>,
    pub trailing_separator: bool,
}

pub fn split(text: &str) -> Result<Vec<String>, ShellwordsError> {
    split_words(text).map(|w| w.words)
}

pub fn split_words(text: &str) -> Result<Words, ShellwordsError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars.next().ok_or(ShellwordsError::TrailingEscape)?;
                current.push(escaped);
                in_word = true;
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => current.push(c),
                        None => return Err(ShellwordsError::UnterminatedQuote('\'')),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c @ ('"' | '\\')) => current.push(c),
                            Some(c) => {
                                current.push('\\');
                                current.push(c);
                            }
                            None => return Err(ShellwordsError::UnterminatedQuote('"')),
                        },
                        Some(c) => current.push(c),
                        None => return Err(ShellwordsError::UnterminatedQuote('"')),
                    }
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }

    let trailing_separator = !in_word && text.chars().last().is_some_and(char::is_whitespace);
    if in_word {
        words.push(current);
    }
    Ok(Words {
        words,
        trailing_separator,
    })
}

/// Blank lines and `"` comment lines are no-ops.
#[must_use]
pub fn is_blank_or_comment(line: &str) -> bool {
    let line = line.trim_start();
    line.is_empty() || line.starts_with('"')
}

fn needs_quoting(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\'' | '"' | '\\')
}

/// Quote `word` so that [`split`] yields it back unchanged.
#[must_use]
pub fn escape(word: &str) -> String {
    if !word.is_empty() && !word.chars().any(needs_quoting) {
        return word.to_string();
    }
    let mut out = String::with_capacity(word.len() + 2);
    out.push('\'');
    for c in word.chars() {
        if c == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(c);
        }
    }
    out.push('\'');
    out
}

#[must_use]
pub fn join<S: AsRef<str>>(words: &[S]) -> String {
    words.iter().map(|w| escape(w.as_ref())).collect::<Vec<_>>().join(" ")
}
