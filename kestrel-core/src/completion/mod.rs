//! Completion candidates for the current state of a window.
//!
//! [`completions`] is a lazy generator; [`CompletionSession`] drives it on a
//! background worker and streams the results to a listener.

mod session;

use std::sync::Arc;

pub use session::{CompletionBuffer, CompletionListener, CompletionSession, BATCH_SIZE};

use crate::commands::{OPEN_FAMILY, QUICKMARK_ADD_FAMILY, QUICKMARK_REMOVE_FAMILY};
use crate::input::KeySequence;
use crate::keymap::BindingTrie;
use crate::mode::{CommandLineMode, ModeState, NormalMode};
use crate::registry::{SettingType, UriEntry, SETTING_PREFIXES};
use crate::shellwords;

const BUILTIN_FORMS: &[&str] = &["builtin:", "b:"];
const COMMAND_FORMS: &[&str] = &["cmd:", "c:", "command:"];

/// What accepting a candidate puts in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    /// The full key path of a binding.
    Keys(KeySequence),
    /// The full command-line text.
    Text(String),
}

#[derive(Debug, Clone)]
pub struct Candidate {
    pub replacement: Replacement,
    /// The state reached by accepting the candidate.
    pub state: Option<ModeState>,
    /// Tab-separated columns for display.
    pub description: String,
}

/// Snapshot of everything command-line completion searches.
#[derive(Debug, Clone, Default)]
pub struct CompletionSources {
    /// Command names with their docs, aliases included.
    pub commands: Vec<(String, &'static str)>,
    pub builtins: Vec<String>,
    pub settings: Vec<(String, SettingType)>,
    pub quickmarks: Vec<(String, UriEntry)>,
    pub bookmarks: Arc<Vec<UriEntry>>,
    /// Oldest first.
    pub history: Arc<Vec<UriEntry>>,
}

type Candidates<'a> = Box<dyn Iterator<Item = Candidate> + Send + 'a>;

/// Candidates for `state`, in display order.
///
/// Nothing is computed until the iterator is advanced. A state with no
/// completion context yields nothing.
#[must_use]
pub fn completions<'a>(state: &ModeState, trie: &'a BindingTrie, sources: &'a CompletionSources) -> Candidates<'a> {
    match state {
        ModeState::Normal(mode) => key_completions(mode, trie),
        ModeState::CommandLine(mode) => command_line_completions(mode, sources),
        ModeState::Status(mode) => completions(&mode.inner, trie, sources),
        ModeState::Insert(_) => Box::new(std::iter::empty()),
    }
}

fn key_completions<'a>(mode: &NormalMode, trie: &'a BindingTrie) -> Candidates<'a> {
    let mode = mode.clone();
    let prefix_len = mode.current_keys.len();
    Box::new(trie.leaves(&mode.current_keys).filter_map(move |leaf| {
        let suffix = leaf.path.suffix(prefix_len);
        if suffix.iter().any(|k| k.is_virtual()) {
            return None;
        }
        let binding = leaf.binding;
        let description = if mode.substate.is_quickmark() {
            format!("{suffix}\t{}\t{}", binding.name, binding.description)
        } else {
            format!("{}\t{}\t{}", leaf.path, binding.name, binding.description)
        };
        Some(Candidate {
            state: Some(mode.predict(&suffix)),
            replacement: Replacement::Keys(leaf.path),
            description,
        })
    }))
}

fn command_line_completions<'a>(mode: &CommandLineMode, sources: &'a CompletionSources) -> Candidates<'a> {
    let Ok(split) = shellwords::split_words(&mode.text_before_cursor()) else {
        return Box::new(std::iter::empty());
    };
    let mut words = split.words;
    if split.trailing_separator || words.is_empty() {
        words.push(String::new());
    }

    let line = LineCompleter {
        mode: mode.clone(),
        words,
    };
    let Some(command) = line.words.first().cloned() else {
        return Box::new(std::iter::empty());
    };
    let count = line.words.len();

    if count == 1 {
        return line.command_names(sources);
    }
    let command = command.as_str();
    if OPEN_FAMILY.contains(&command) {
        return line.uris(1, sources);
    }
    if QUICKMARK_ADD_FAMILY.contains(&command) && count > 2 {
        return line.uris(2, sources);
    }
    if QUICKMARK_REMOVE_FAMILY.contains(&command) {
        return line.quickmark_names(sources);
    }
    match (command, count) {
        ("bind", 3) => line.binding_targets(sources),
        ("set", 2) => line.setting_names(sources),
        _ => Box::new(std::iter::empty()),
    }
}

/// The words before the cursor and the state they came from.
struct LineCompleter {
    mode: CommandLineMode,
    words: Vec<String>,
}

impl LineCompleter {
    fn candidate(&self, text: String, description: String) -> Candidate {
        Candidate {
            state: Some(ModeState::CommandLine(self.mode.replaced(&text))),
            replacement: Replacement::Text(text),
            description,
        }
    }

    /// The line with word `index` replaced by `word`.
    fn with_word(&self, index: usize, word: &str) -> String {
        let mut words = self.words.clone();
        if let Some(slot) = words.get_mut(index) {
            *slot = word.to_string();
        }
        shellwords::join(&words)
    }

    fn last_word(&self) -> &str {
        self.words.last().map_or("", String::as_str)
    }

    fn command_names<'a>(self, sources: &'a CompletionSources) -> Candidates<'a> {
        Box::new(sources.commands.iter().filter_map(move |(name, doc)| {
            name.starts_with(self.last_word())
                .then(|| self.candidate(name.clone(), format!("{name}\t{doc}")))
        }))
    }

    /// URIs for the words from `start` on. Quickmarks come first, then
    /// bookmarks, then history from the most recent visit.
    fn uris<'a>(self, start: usize, sources: &'a CompletionSources) -> Candidates<'a> {
        let parts: Vec<String> = self.words.get(start..).unwrap_or_default().to_vec();
        let prefix = shellwords::join(self.words.get(..start).unwrap_or_default());
        let matches_uri = {
            let parts = parts.clone();
            move |entry: &UriEntry| parts.iter().all(|p| entry.uri.contains(p.as_str()))
        };
        let matches_visit = move |entry: &UriEntry| {
            parts
                .iter()
                .all(|p| entry.uri.contains(p.as_str()) || entry.title.contains(p.as_str()))
        };
        let entry_candidate = Arc::new(move |entry: &UriEntry, source: &str| {
            let text = format!("{prefix} {}", shellwords::escape(&entry.uri));
            self.candidate(text, format!("{}\t{}\t{source}", entry.uri, entry.title))
        });

        let quickmarks = {
            let matches_uri = matches_uri.clone();
            let make = Arc::clone(&entry_candidate);
            sources
                .quickmarks
                .iter()
                .filter(move |(_, entry)| matches_uri(entry))
                .map(move |(_, entry)| make(entry, "Quickmark"))
        };
        let bookmarks = {
            let make = Arc::clone(&entry_candidate);
            sources
                .bookmarks
                .iter()
                .filter(move |entry| matches_uri(*entry))
                .map(move |entry| make(entry, "Bookmark"))
        };
        let history = sources
            .history
            .iter()
            .rev()
            .filter(move |entry| matches_visit(*entry))
            .map(move |entry| entry_candidate(entry, "History"));

        Box::new(quickmarks.chain(bookmarks).chain(history))
    }

    fn binding_targets<'a>(self, sources: &'a CompletionSources) -> Candidates<'a> {
        let line = Arc::new(self);
        let builtins = {
            let line = Arc::clone(&line);
            sources.builtins.iter().filter_map(move |name| {
                let form = matching_form(BUILTIN_FORMS, name, line.last_word())?;
                Some(line.candidate(line.with_word(2, &form), format!("{name}\tbuiltin")))
            })
        };
        let commands = sources.commands.iter().filter_map(move |(name, _)| {
            let form = matching_form(COMMAND_FORMS, name, line.last_word())?;
            Some(line.candidate(line.with_word(2, &form), format!("{name}\tcommand")))
        });
        Box::new(builtins.chain(commands))
    }

    fn setting_names<'a>(self, sources: &'a CompletionSources) -> Candidates<'a> {
        Box::new(sources.settings.iter().filter_map(move |(name, ty)| {
            let form = matching_form(SETTING_PREFIXES, name, self.last_word())?;
            Some(self.candidate(self.with_word(1, &form), format!("{name}\t{ty}\tWebkit")))
        }))
    }

    fn quickmark_names<'a>(self, sources: &'a CompletionSources) -> Candidates<'a> {
        Box::new(sources.quickmarks.iter().filter_map(move |(name, entry)| {
            let partial = self.words.get(1).map_or("", String::as_str);
            name.starts_with(partial).then(|| {
                self.candidate(self.with_word(1, name), format!("{name}\t{}\t{}", entry.uri, entry.title))
            })
        }))
    }
}

/// The first `<prefix><name>` form that starts with `partial`.
fn matching_form(prefixes: &[&str], name: &str, partial: &str) -> Option<String> {
    prefixes
        .iter()
        .map(|prefix| format!("{prefix}{name}"))
        .find(|form| form.starts_with(partial))
}
