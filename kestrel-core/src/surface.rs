//! Interfaces to the content surface a window drives.
//!
//! The surface renders pages and owns tabs; the viewport exposes scroll
//! offsets. Both are provided by the front end.

use crate::error::ViewportError;

/// Where an opened URI goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenTarget {
    Current,
    NewTab,
    /// A new tab that does not take focus.
    Background,
    NewWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Back,
    Forward,
    Reload,
    NextTab,
    PrevTab,
    CloseTab,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Scroll position of the visible content.
pub trait Viewport: Send + Sync {
    fn offset(&self, axis: Axis) -> Result<i64, ViewportError>;
    fn set_offset(&self, axis: Axis, offset: i64) -> Result<(), ViewportError>;
    /// Total scrollable extent along `axis`.
    fn extent(&self, axis: Axis) -> Result<i64, ViewportError>;
}

pub trait Surface: Send + Sync {
    fn open(&self, uri: &str, target: OpenTarget);
    /// The URI of the current view, if any.
    fn current_uri(&self) -> Option<String>;
    fn navigate(&self, navigation: Navigation);
    fn viewport(&self) -> &dyn Viewport;
}

/// Scroll by `delta` along `axis`, clamped at zero.
pub fn scroll_by(viewport: &dyn Viewport, axis: Axis, delta: i64) -> Result<(), ViewportError> {
    let offset = viewport.offset(axis)?;
    viewport.set_offset(axis, (offset + delta).max(0))
}

/// Scroll to the start (`to_end == false`) or end of `axis`.
pub fn scroll_to_edge(viewport: &dyn Viewport, axis: Axis, to_end: bool) -> Result<(), ViewportError> {
    let offset = if to_end { viewport.extent(axis)? } else { 0 };
    viewport.set_offset(axis, offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::FakeViewport;

    #[test]
    fn scroll_by_clamps_at_zero() {
        let viewport = FakeViewport::new(1000);
        scroll_by(&viewport, Axis::Vertical, 40).expect("scroll");
        assert_eq!(viewport.offset(Axis::Vertical), Ok(40));
        scroll_by(&viewport, Axis::Vertical, -100).expect("scroll");
        assert_eq!(viewport.offset(Axis::Vertical), Ok(0));
    }

    #[test]
    fn scroll_to_edges() {
        let viewport = FakeViewport::new(1000);
        scroll_to_edge(&viewport, Axis::Vertical, true).expect("scroll");
        assert_eq!(viewport.offset(Axis::Vertical), Ok(1000));
        scroll_to_edge(&viewport, Axis::Vertical, false).expect("scroll");
        assert_eq!(viewport.offset(Axis::Vertical), Ok(0));
        assert_eq!(viewport.offset(Axis::Horizontal), Ok(0));
    }

    #[test]
    fn errors_propagate() {
        let viewport = FakeViewport::unavailable();
        assert_eq!(scroll_by(&viewport, Axis::Vertical, 40), Err(ViewportError::Unavailable));
    }
}
