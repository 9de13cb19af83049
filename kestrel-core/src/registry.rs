//! In-memory stores behind completion and the URI commands: quickmarks,
//! bookmarks, history and the settings table.
//!
//! Persistence is not handled here; a front end loads and saves these.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::SettingError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriEntry {
    pub uri: String,
    pub title: String,
}

impl UriEntry {
    pub fn new(uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            title: title.into(),
        }
    }
}

/// Quickmarks by name, in name order.
#[derive(Debug, Clone, Default)]
pub struct Quickmarks(BTreeMap<String, UriEntry>);

impl Quickmarks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: UriEntry) -> Option<UriEntry> {
        self.0.insert(name.into(), entry)
    }

    pub fn remove(&mut self, name: &str) -> Option<UriEntry> {
        self.0.remove(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&UriEntry> {
        self.0.get(name)
    }

    /// Whether any quickmark points at `uri`.
    #[must_use]
    pub fn has_uri(&self, uri: &str) -> bool {
        self.0.values().any(|e| e.uri == uri)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &UriEntry)> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Visited URIs, oldest first, bounded by `max_len`.
///
/// Entries are shared copy-on-write so completion can take a snapshot
/// without holding any lock.
#[derive(Debug, Clone)]
pub struct History {
    entries: Arc<Vec<UriEntry>>,
    max_len: usize,
}

impl History {
    #[must_use]
    pub fn new(max_len: usize) -> Self {
        Self {
            entries: Arc::new(Vec::new()),
            max_len,
        }
    }

    /// Record a visit.
    ///
    /// A URI already present moves to the most-recent end and takes the
    /// new title. Otherwise it is appended, evicting the oldest entry when
    /// the history is full.
    pub fn record(&mut self, uri: &str, title: &str) {
        if uri.is_empty() || self.max_len == 0 {
            return;
        }
        let entries = Arc::make_mut(&mut self.entries);
        if let Some(pos) = entries.iter().position(|e| e.uri == uri) {
            let mut entry = entries.remove(pos);
            entry.title = title.to_string();
            entries.push(entry);
            return;
        }
        while entries.len() >= self.max_len {
            entries.remove(0);
        }
        entries.push(UriEntry::new(uri, title));
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<Vec<UriEntry>> {
        Arc::clone(&self.entries)
    }

    /// Replace all entries, keeping the most recent `max_len`.
    pub fn load(&mut self, mut entries: Vec<UriEntry>) {
        if entries.len() > self.max_len {
            entries.drain(..entries.len() - self.max_len);
        }
        self.entries = Arc::new(entries);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingType {
    Bool,
    Int,
    String,
}

impl fmt::Display for SettingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::String => "string",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    String(String),
}

impl SettingValue {
    #[must_use]
    pub fn setting_type(&self) -> SettingType {
        match self {
            Self::Bool(_) => SettingType::Bool,
            Self::Int(_) => SettingType::Int,
            Self::String(_) => SettingType::String,
        }
    }

    fn parse(name: &str, ty: SettingType, text: &str) -> Result<Self, SettingError> {
        let invalid = || SettingError::InvalidValue {
            name: name.to_string(),
            expected: match ty {
                SettingType::Bool => "bool",
                SettingType::Int => "int",
                SettingType::String => "string",
            },
            value: text.to_string(),
        };
        match ty {
            SettingType::Bool => match text {
                "true" | "on" | "yes" => Ok(Self::Bool(true)),
                "false" | "off" | "no" => Ok(Self::Bool(false)),
                _ => Err(invalid()),
            },
            SettingType::Int => text.parse().map(Self::Int).map_err(|_| invalid()),
            SettingType::String => Ok(Self::String(text.to_string())),
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
        }
    }
}

/// Prefixes accepted in front of a content-engine setting name.
pub const SETTING_PREFIXES: &[&str] = &["webkit:", "w:"];

const WEBKIT_SETTINGS: &[(&str, SettingType)] = &[
    ("auto-load-images", SettingType::Bool),
    ("default-charset", SettingType::String),
    ("default-font-family", SettingType::String),
    ("default-font-size", SettingType::Int),
    ("enable-developer-extras", SettingType::Bool),
    ("enable-fullscreen", SettingType::Bool),
    ("enable-javascript", SettingType::Bool),
    ("enable-plugins", SettingType::Bool),
    ("enable-smooth-scrolling", SettingType::Bool),
    ("minimum-font-size", SettingType::Int),
    ("user-agent", SettingType::String),
    ("zoom-text-only", SettingType::Bool),
];

/// Named, typed settings of the content engine.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    types: BTreeMap<String, SettingType>,
    values: BTreeMap<String, SettingValue>,
}

impl Settings {
    /// The content-engine settings, all unset.
    #[must_use]
    pub fn webkit() -> Self {
        Self {
            types: WEBKIT_SETTINGS.iter().map(|(n, t)| ((*n).to_string(), *t)).collect(),
            values: BTreeMap::new(),
        }
    }

    /// Setting names with their value types, in name order.
    #[must_use]
    pub fn names(&self) -> Vec<(String, SettingType)> {
        self.types.iter().map(|(n, t)| (n.clone(), *t)).collect()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SettingValue> {
        self.values.get(name)
    }

    /// Set `name` (with or without a `webkit:`/`w:` prefix) from text.
    pub fn set(&mut self, name: &str, value: &str) -> Result<SettingValue, SettingError> {
        let bare = SETTING_PREFIXES.iter().find_map(|p| name.strip_prefix(p)).unwrap_or(name);
        let ty = *self.types.get(bare).ok_or_else(|| SettingError::Unknown(name.to_string()))?;
        let parsed = SettingValue::parse(bare, ty, value)?;
        self.values.insert(bare.to_string(), parsed.clone());
        Ok(parsed)
    }
}
