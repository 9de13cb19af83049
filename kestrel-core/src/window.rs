//! The window driver.
//!
//! A [`Window`] owns the live mode state and feeds it keys one at a time.
//! Actions fired during a transition reach back into the window through a
//! weak [`WindowHandle`], so they may replace the state or show a status
//! while the transition is still running.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use slotmap::new_key_type;
use tokio::task::JoinHandle;

use crate::builtins::builtins_for;
use crate::completion::{Candidate, CompletionListener, CompletionSession, Replacement};
use crate::input::{parse_sequence, Key, KeySequence};
use crate::keymap::{parse_raw_bindings, Action, Binding, BindingTrie, BuiltinTable, CommandRunner};
use crate::mode::{ModeContext, ModeState, NormalMode, NormalSubstate, Status};
use crate::session::Session;
use crate::surface::{OpenTarget, Surface};

new_key_type! {
    pub struct WindowId;
}

const QUICKMARK_TARGETS: [(NormalSubstate, OpenTarget); 4] = [
    (NormalSubstate::Quickmark, OpenTarget::Current),
    (NormalSubstate::QuickmarkTab, OpenTarget::NewTab),
    (NormalSubstate::QuickmarkWindow, OpenTarget::NewWindow),
    (NormalSubstate::QuickmarksRapid, OpenTarget::Background),
];

pub struct Window {
    id: WindowId,
    handle: WindowHandle,
    session: Arc<Session>,
    surface: Arc<dyn Surface>,
    ctx: Arc<ModeContext>,
    bindings: Arc<ArcSwap<BindingTrie>>,
    builtins: BuiltinTable,
    state: Mutex<ModeState>,
    /// Bumped whenever the state is replaced from outside a transition.
    replacements: AtomicU64,
    completion: Mutex<Option<CompletionSession>>,
}

impl Window {
    /// Open a window in `session` and build its bindings.
    pub fn new(session: &Arc<Session>, surface: Arc<dyn Surface>) -> Arc<Self> {
        let window = Arc::new_cyclic(|weak: &Weak<Self>| {
            let handle = WindowHandle(weak.clone());
            let bindings = Arc::new(ArcSwap::from_pointee(BindingTrie::new()));
            let runner: CommandRunner = {
                let handle = handle.clone();
                Arc::new(move |line: &str| handle.run_command(line))
            };
            let ctx = ModeContext::new(Arc::clone(&bindings), runner);
            Self {
                id: session.register(handle.clone()),
                session: Arc::clone(session),
                surface,
                builtins: builtins_for(&handle, session.config().scroll_delta),
                handle,
                state: Mutex::new(ModeState::normal(&ctx)),
                ctx,
                bindings,
                replacements: AtomicU64::new(0),
                completion: Mutex::new(None),
            }
        });
        log::debug!("opened window {:?}", window.id);
        window.rebuild_bindings();
        window
    }

    #[must_use]
    pub fn id(&self) -> WindowId {
        self.id
    }

    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    #[must_use]
    pub fn surface(&self) -> &dyn Surface {
        self.surface.as_ref()
    }

    #[must_use]
    pub fn ctx(&self) -> &Arc<ModeContext> {
        &self.ctx
    }

    #[must_use]
    pub fn builtins(&self) -> &BuiltinTable {
        &self.builtins
    }

    /// The current binding trie.
    #[must_use]
    pub fn bindings(&self) -> Arc<BindingTrie> {
        self.bindings.load_full()
    }

    #[must_use]
    pub fn handle(&self) -> WindowHandle {
        self.handle.clone()
    }

    #[must_use]
    pub fn state(&self) -> ModeState {
        self.state.lock().clone()
    }

    pub fn set_state(&self, state: ModeState) {
        let mut current = self.state.lock();
        *current = state;
        self.replacements.fetch_add(1, Ordering::SeqCst);
    }

    /// Overlay `status` on the current state until the next transition.
    pub fn show_status(&self, status: Status) {
        let mut current = self.state.lock();
        *current = current.clone().with_status(status);
        self.replacements.fetch_add(1, Ordering::SeqCst);
    }

    /// Feed one key. Returns whether the key was consumed.
    pub fn handle_key(&self, key: Key) -> bool {
        if key.is_modifier {
            return false;
        }
        let (before, seen) = {
            let state = self.state.lock();
            (state.clone(), self.replacements.load(Ordering::SeqCst))
        };

        let (next, consumed) = before.process_key(key);

        let mut state = self.state.lock();
        if self.replacements.load(Ordering::SeqCst) == seen {
            *state = next;
        } else if let Some(statuses) = statuses_over(&state, &before) {
            *state = statuses.into_iter().rev().fold(next, ModeState::with_status);
        }
        consumed
    }

    /// Feed every key in order. Returns whether all of them were consumed.
    pub fn handle_keys(&self, keys: &[Key]) -> bool {
        keys.iter().fold(true, |all, key| self.handle_key(*key) && all)
    }

    /// Run a command line, showing any failure as a status.
    pub fn run_command(&self, line: &str) {
        if let Err(err) = self.session.commands().execute(self, line) {
            log::warn!("{err}");
            self.show_status(Status::error(err));
        }
    }

    /// Rebuild the trie from the session's raw bindings and quickmarks.
    pub fn rebuild_bindings(&self) {
        let raws = self.session.raw_bindings();
        let (mut bindings, errors) = parse_raw_bindings(&raws, &self.builtins, &self.ctx.runner);
        bindings.extend(self.quickmark_bindings());
        self.bindings.store(Arc::new(BindingTrie::from_bindings(bindings)));

        if errors.is_empty() {
            return;
        }
        for err in &errors {
            let message = format!("failed to parse key bindings: {err}");
            log::warn!("{message}");
            self.show_status(Status::Error(message));
        }
        log::warn!("faulty bindings have been dropped");
    }

    fn quickmark_bindings(&self) -> Vec<Binding> {
        let mut bindings = Vec::new();
        for (name, entry) in self.session.quickmarks().iter() {
            let suffix = match parse_sequence(name) {
                Ok(suffix) if !suffix.is_empty() => suffix,
                _ => {
                    log::warn!("quickmark '{name}' is not a key sequence");
                    continue;
                }
            };
            for (substate, target) in QUICKMARK_TARGETS {
                let Some(virtual_key) = substate.virtual_key() else {
                    continue;
                };
                let from: KeySequence = std::iter::once(Key::virtual_key(virtual_key))
                    .chain(suffix.iter().copied())
                    .collect();
                let handle = self.handle();
                let uri = entry.uri.clone();
                let action = Action::new(move |_| {
                    if let Some(window) = handle.upgrade() {
                        window.surface().open(&uri, target);
                        if substate == NormalSubstate::QuickmarksRapid {
                            window.set_state(ModeState::Normal(NormalMode::quickmark(window.ctx(), substate)));
                        }
                    }
                });
                bindings.push(Binding::new(from, entry.uri.clone(), entry.title.clone(), action));
            }
        }
        bindings
    }

    /// Start completing the current state, cancelling any running session
    /// without waiting for it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_completion(&self, listener: Arc<dyn CompletionListener>) -> JoinHandle<()> {
        if let Some(previous) = self.completion.lock().take() {
            previous.cancel();
        }
        let sources = Arc::new(self.session.completion_sources(&self.builtins));
        let (session, handle) = CompletionSession::start(self.state(), self.bindings(), sources, listener);
        *self.completion.lock() = Some(session);
        handle
    }

    pub fn cancel_completion(&self) {
        if let Some(session) = self.completion.lock().take() {
            session.cancel();
        }
    }

    /// Candidates found so far by the current session.
    #[must_use]
    pub fn completions(&self) -> Vec<Candidate> {
        self.completion
            .lock()
            .as_ref()
            .map(|session| session.buffer().snapshot())
            .unwrap_or_default()
    }

    /// Apply a candidate. Returns `false` if it no longer fits the state.
    pub fn accept(&self, candidate: &Candidate) -> bool {
        match &candidate.replacement {
            Replacement::Text(_) => match &candidate.state {
                Some(state) => {
                    self.set_state(state.clone());
                    true
                }
                None => false,
            },
            Replacement::Keys(path) => {
                let state = self.state();
                let ModeState::Normal(mode) = state.base() else {
                    log::debug!("key candidate '{path}' outside normal mode");
                    return false;
                };
                let pending = &mode.current_keys;
                if !path.starts_with_keys(pending) {
                    log::debug!("candidate '{path}' does not continue '{pending}'");
                    return false;
                }
                self.handle_keys(&path.suffix(pending.len()))
            }
        }
    }
}

/// The statuses stacked on `base` in `state`, outermost first, if `state`
/// is nothing but status overlays on `base`.
fn statuses_over(state: &ModeState, base: &ModeState) -> Option<Vec<Status>> {
    let mut statuses = Vec::new();
    let mut current = state;
    while let ModeState::Status(overlay) = current {
        statuses.push(overlay.status.clone());
        if overlay.inner.id() == base.id() {
            return Some(statuses);
        }
        current = overlay.inner.as_ref();
    }
    None
}

impl Drop for Window {
    fn drop(&mut self) {
        log::debug!("closing window {:?}", self.id);
        self.session.unregister(self.id);
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.id)
            .field("state", &self.state.lock())
            .finish_non_exhaustive()
    }
}

/// A weak reference to a window. Calls on a closed window do nothing.
#[derive(Debug, Clone)]
pub struct WindowHandle(Weak<Window>);

impl WindowHandle {
    #[must_use]
    pub fn upgrade(&self) -> Option<Arc<Window>> {
        self.0.upgrade()
    }

    pub fn run_command(&self, line: &str) {
        match self.upgrade() {
            Some(window) => window.run_command(line),
            None => log::debug!("dropping command '{line}' for a closed window"),
        }
    }

    pub fn set_state(&self, state: ModeState) {
        if let Some(window) = self.upgrade() {
            window.set_state(state);
        }
    }

    pub fn show_status(&self, status: Status) {
        if let Some(window) = self.upgrade() {
            window.show_status(status);
        }
    }
}
