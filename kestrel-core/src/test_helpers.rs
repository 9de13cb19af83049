//! Fixtures shared by the unit and integration tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::completion::{CompletionBuffer, CompletionListener};
use crate::error::ViewportError;
use crate::input::{parse_sequence, Key, KeySequence};
use crate::keymap::{parse_raw_bindings, BindingTrie, BuiltinTable, CommandRunner, RawBinding};
use crate::mode::ModeContext;
use crate::session::{Session, SessionConfig};
use crate::surface::{Axis, Navigation, OpenTarget, Surface, Viewport};
use crate::window::Window;

pub(crate) fn key(c: char) -> Key {
    Key::from_char(c)
}

pub(crate) fn keys(text: &str) -> KeySequence {
    parse_sequence(text).expect("test key sequence should parse")
}

/// A mode context over `bindings` with no builtins. Command lines run
/// through it are recorded instead of executed.
pub(crate) fn fixture_context(bindings: &[(&str, &str)]) -> (Arc<ModeContext>, Arc<Mutex<Vec<String>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let runner: CommandRunner = Arc::new(move |line: &str| sink.lock().push(line.to_string()));

    let raws: Vec<_> = bindings.iter().map(|(from, to)| RawBinding::new(*from, *to)).collect();
    let (resolved, errors) = parse_raw_bindings(&raws, &BuiltinTable::new(), &runner);
    assert!(errors.is_empty(), "fixture bindings should parse: {errors:?}");

    let trie = Arc::new(ArcSwap::from_pointee(BindingTrie::from_bindings(resolved)));
    (ModeContext::new(trie, runner), log)
}

/// Each sequence bound to a command named after it.
pub(crate) fn trie_context(sequences: &[&str]) -> (Arc<ModeContext>, Arc<Mutex<Vec<String>>>) {
    let targets: Vec<_> = sequences.iter().map(|s| format!("cmd:{s}")).collect();
    let pairs: Vec<_> = sequences.iter().zip(&targets).map(|(s, t)| (*s, t.as_str())).collect();
    fixture_context(&pairs)
}

/// An in-memory viewport.
pub(crate) struct FakeViewport {
    horizontal: Mutex<i64>,
    vertical: Mutex<i64>,
    extent: i64,
    available: AtomicBool,
}

impl FakeViewport {
    pub(crate) fn new(extent: i64) -> Self {
        Self {
            horizontal: Mutex::new(0),
            vertical: Mutex::new(0),
            extent,
            available: AtomicBool::new(true),
        }
    }

    pub(crate) fn unavailable() -> Self {
        let viewport = Self::new(0);
        viewport.break_down();
        viewport
    }

    fn break_down(&self) {
        self.available.store(false, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), ViewportError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ViewportError::Unavailable)
        }
    }

    fn slot(&self, axis: Axis) -> &Mutex<i64> {
        match axis {
            Axis::Horizontal => &self.horizontal,
            Axis::Vertical => &self.vertical,
        }
    }
}

impl Viewport for FakeViewport {
    fn offset(&self, axis: Axis) -> Result<i64, ViewportError> {
        self.check()?;
        Ok(*self.slot(axis).lock())
    }

    fn set_offset(&self, axis: Axis, offset: i64) -> Result<(), ViewportError> {
        self.check()?;
        *self.slot(axis).lock() = offset;
        Ok(())
    }

    fn extent(&self, _axis: Axis) -> Result<i64, ViewportError> {
        self.check()?;
        Ok(self.extent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SurfaceEvent {
    Open(String, OpenTarget),
    Navigate(Navigation),
}

/// A surface that records every request.
pub(crate) struct RecordingSurface {
    events: Mutex<Vec<SurfaceEvent>>,
    uri: Mutex<Option<String>>,
    viewport: FakeViewport,
}

impl RecordingSurface {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
            uri: Mutex::new(None),
            viewport: FakeViewport::new(5000),
        })
    }

    pub(crate) fn events(&self) -> Vec<SurfaceEvent> {
        self.events.lock().clone()
    }

    pub(crate) fn set_uri(&self, uri: &str) {
        *self.uri.lock() = Some(uri.to_string());
    }

    pub(crate) fn viewport(&self) -> &FakeViewport {
        &self.viewport
    }

    pub(crate) fn break_viewport(&self) {
        self.viewport.break_down();
    }
}

impl Surface for RecordingSurface {
    fn open(&self, uri: &str, target: OpenTarget) {
        self.events.lock().push(SurfaceEvent::Open(uri.to_string(), target));
    }

    fn current_uri(&self) -> Option<String> {
        self.uri.lock().clone()
    }

    fn navigate(&self, navigation: Navigation) {
        self.events.lock().push(SurfaceEvent::Navigate(navigation));
    }

    fn viewport(&self) -> &dyn Viewport {
        &self.viewport
    }
}

/// Ignores every completion update.
pub(crate) struct NullListener;

impl CompletionListener for NullListener {
    fn first(&self, _has_results: bool) {}

    fn update(&self, _buffer: &CompletionBuffer, _done: bool) {}
}

pub(crate) fn fixture_session() -> Arc<Session> {
    Session::new(SessionConfig::default())
}

/// A window over a recording surface in a fresh default session.
pub(crate) fn fixture_window() -> (Arc<Window>, Arc<RecordingSurface>) {
    let session = fixture_session();
    let surface = RecordingSurface::new();
    let window = Window::new(&session, surface.clone());
    (window, surface)
}
