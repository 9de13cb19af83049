//! A surface that prints every request instead of rendering anything.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use kestrel_core::error::ViewportError;
use kestrel_core::surface::{Axis, Navigation, OpenTarget, Surface, Viewport};
use parking_lot::Mutex;

/// Scrollable extent of the pretend page, in pixels.
pub const PAGE_EXTENT: i64 = 10_000;

pub type Output = Arc<Mutex<Box<dyn Write + Send>>>;

#[must_use]
pub fn stdout_output() -> Output {
    Arc::new(Mutex::new(Box::new(io::stdout())))
}

pub struct TerminalSurface {
    out: Output,
    current: Mutex<Option<String>>,
    /// URIs opened since the last [`TerminalSurface::take_opened`].
    opened: Mutex<Vec<String>>,
    quit: AtomicBool,
    viewport: MemoryViewport,
}

impl TerminalSurface {
    #[must_use]
    pub fn new(out: Output) -> Arc<Self> {
        Arc::new(Self {
            out,
            current: Mutex::new(None),
            opened: Mutex::new(Vec::new()),
            quit: AtomicBool::new(false),
            viewport: MemoryViewport::new(PAGE_EXTENT),
        })
    }

    pub fn take_opened(&self) -> Vec<String> {
        std::mem::take(&mut *self.opened.lock())
    }

    /// Whether a quit was requested.
    pub fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::SeqCst)
    }

    fn print(&self, line: &str) {
        if let Err(err) = writeln!(self.out.lock(), "{line}") {
            log::warn!("failed to write surface output: {err}");
        }
    }
}

impl Surface for TerminalSurface {
    fn open(&self, uri: &str, target: OpenTarget) {
        let label = match target {
            OpenTarget::Current => "here",
            OpenTarget::NewTab => "tab",
            OpenTarget::Background => "background",
            OpenTarget::NewWindow => "window",
        };
        self.print(&format!("-> open ({label}) {uri}"));
        if target == OpenTarget::Current {
            *self.current.lock() = Some(uri.to_string());
            self.viewport.reset();
        }
        self.opened.lock().push(uri.to_string());
    }

    fn current_uri(&self) -> Option<String> {
        self.current.lock().clone()
    }

    fn navigate(&self, navigation: Navigation) {
        let name = match navigation {
            Navigation::Back => "back",
            Navigation::Forward => "forward",
            Navigation::Reload => "reload",
            Navigation::NextTab => "next tab",
            Navigation::PrevTab => "previous tab",
            Navigation::CloseTab => "close tab",
            Navigation::Quit => "quit",
        };
        self.print(&format!("-> {name}"));
        if navigation == Navigation::Quit {
            self.quit.store(true, Ordering::SeqCst);
        }
    }

    fn viewport(&self) -> &dyn Viewport {
        &self.viewport
    }
}

/// Offsets kept in memory over a fixed extent.
pub struct MemoryViewport {
    offsets: Mutex<(i64, i64)>,
    extent: i64,
}

impl MemoryViewport {
    #[must_use]
    pub fn new(extent: i64) -> Self {
        Self {
            offsets: Mutex::new((0, 0)),
            extent,
        }
    }

    fn reset(&self) {
        *self.offsets.lock() = (0, 0);
    }
}

impl Viewport for MemoryViewport {
    fn offset(&self, axis: Axis) -> Result<i64, ViewportError> {
        let offsets = self.offsets.lock();
        Ok(match axis {
            Axis::Horizontal => offsets.0,
            Axis::Vertical => offsets.1,
        })
    }

    fn set_offset(&self, axis: Axis, offset: i64) -> Result<(), ViewportError> {
        let offset = offset.clamp(0, self.extent);
        let mut offsets = self.offsets.lock();
        match axis {
            Axis::Horizontal => offsets.0 = offset,
            Axis::Vertical => offsets.1 = offset,
        }
        Ok(())
    }

    fn extent(&self, _axis: Axis) -> Result<i64, ViewportError> {
        Ok(self.extent)
    }
}
