//! State shared by every window: bindings, commands and the URI stores.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use slotmap::SlotMap;

use crate::builtins::default_bindings;
use crate::command::CommandTable;
use crate::completion::CompletionSources;
use crate::error::CommandError;
use crate::keymap::{rebind, BuiltinTable, RawBinding};
use crate::registry::{History, Quickmarks, SettingValue, Settings, UriEntry};
use crate::window::{Window, WindowHandle, WindowId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Pixels moved by one scroll builtin.
    pub scroll_delta: i64,
    /// History capacity; zero disables history.
    pub max_history_len: usize,
    /// Opened by the open commands when no URI is given.
    pub new_tab_page: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scroll_delta: 40,
            max_history_len: 1000,
            new_tab_page: "about:blank".to_string(),
        }
    }
}

pub struct Session {
    config: SessionConfig,
    commands: CommandTable,
    raw_bindings: RwLock<Vec<RawBinding>>,
    quickmarks: RwLock<Quickmarks>,
    bookmarks: RwLock<Arc<Vec<UriEntry>>>,
    history: RwLock<History>,
    settings: RwLock<Settings>,
    windows: Mutex<SlotMap<WindowId, WindowHandle>>,
}

impl Session {
    /// A session with the default bindings and the standard commands.
    #[must_use]
    pub fn new(config: SessionConfig) -> Arc<Self> {
        Self::with_commands(config, CommandTable::standard())
    }

    #[must_use]
    pub fn with_commands(config: SessionConfig, commands: CommandTable) -> Arc<Self> {
        let history = History::new(config.max_history_len);
        Arc::new(Self {
            config,
            commands,
            raw_bindings: RwLock::new(default_bindings()),
            quickmarks: RwLock::new(Quickmarks::new()),
            bookmarks: RwLock::new(Arc::new(Vec::new())),
            history: RwLock::new(history),
            settings: RwLock::new(Settings::webkit()),
            windows: Mutex::new(SlotMap::with_key()),
        })
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    #[must_use]
    pub fn raw_bindings(&self) -> Vec<RawBinding> {
        self.raw_bindings.read().clone()
    }

    /// Replace every raw binding and rebuild all windows.
    pub fn set_raw_bindings(&self, raws: Vec<RawBinding>) {
        *self.raw_bindings.write() = raws;
        self.rebuild_windows();
    }

    /// Bind `from` to `to`, replacing an existing binding of the same text.
    pub fn bind(&self, from: &str, to: &str) {
        rebind(&mut self.raw_bindings.write(), RawBinding::new(from, to));
        self.rebuild_windows();
    }

    pub fn add_quickmark(&self, name: &str, entry: UriEntry) {
        log::debug!("quickmark '{name}' -> {}", entry.uri);
        self.quickmarks.write().insert(name, entry);
        self.rebuild_windows();
    }

    pub fn remove_quickmark(&self, name: &str) -> Option<UriEntry> {
        let removed = self.quickmarks.write().remove(name);
        if removed.is_some() {
            self.rebuild_windows();
        }
        removed
    }

    #[must_use]
    pub fn quickmarks(&self) -> Quickmarks {
        self.quickmarks.read().clone()
    }

    pub fn add_bookmark(&self, entry: UriEntry) {
        let mut bookmarks = self.bookmarks.write();
        if bookmarks.iter().any(|b| b.uri == entry.uri) {
            return;
        }
        Arc::make_mut(&mut bookmarks).push(entry);
    }

    pub fn record_visit(&self, uri: &str, title: &str) {
        self.history.write().record(uri, title);
    }

    #[must_use]
    pub fn history(&self) -> Arc<Vec<UriEntry>> {
        self.history.read().snapshot()
    }

    pub fn set_setting(&self, name: &str, value: &str) -> Result<SettingValue, CommandError> {
        Ok(self.settings.write().set(name, value)?)
    }

    #[must_use]
    pub fn setting(&self, name: &str) -> Option<SettingValue> {
        self.settings.read().get(name).cloned()
    }

    /// Snapshot of what completion searches, with `builtins` as the
    /// builtin names.
    #[must_use]
    pub fn completion_sources(&self, builtins: &BuiltinTable) -> CompletionSources {
        CompletionSources {
            commands: self.commands.docs().map(|(name, doc)| (name.to_string(), doc)).collect(),
            builtins: builtins.keys().cloned().collect(),
            settings: self.settings.read().names(),
            quickmarks: self.quickmarks.read().iter().map(|(n, e)| (n.clone(), e.clone())).collect(),
            bookmarks: Arc::clone(&self.bookmarks.read()),
            history: self.history.read().snapshot(),
        }
    }

    pub(crate) fn register(&self, handle: WindowHandle) -> WindowId {
        self.windows.lock().insert(handle)
    }

    pub(crate) fn unregister(&self, id: WindowId) {
        self.windows.lock().remove(id);
    }

    /// Every live window.
    #[must_use]
    pub fn windows(&self) -> Vec<Arc<Window>> {
        self.windows.lock().values().filter_map(WindowHandle::upgrade).collect()
    }

    /// Rebuild the bindings of every live window.
    pub fn rebuild_windows(&self) {
        for window in self.windows() {
            window.rebuild_bindings();
        }
    }
}
