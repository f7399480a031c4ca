use std::cell::Cell;
use std::rc::Rc;

use crate::draw::context::DrawContext;
use crate::draw::input::InputDevice;
use crate::foundation::core::{Point, Rect, Size};

#[derive(Debug, Default)]
struct PlatformState {
    open_windows: Cell<usize>,
    leases: Cell<u64>,
}

/// Process-level platform handle shared by every frame of one host.
///
/// Replaces global init/exit counters: each open window holds a [`WindowLease`], and the
/// count of open windows is observable here.
#[derive(Clone, Debug, Default)]
pub struct PlatformContext {
    state: Rc<PlatformState>,
}

impl PlatformContext {
    /// Fresh context with no open windows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Windows currently open through this context.
    pub fn open_windows(&self) -> usize {
        self.state.open_windows.get()
    }

    /// Leases handed out over the context's lifetime.
    pub fn total_leases(&self) -> u64 {
        self.state.leases.get()
    }

    /// Register an open window; dropping the lease unregisters it.
    pub fn lease(&self) -> WindowLease {
        self.state.open_windows.set(self.state.open_windows.get() + 1);
        self.state.leases.set(self.state.leases.get() + 1);
        tracing::debug!(open = self.state.open_windows.get(), "window lease acquired");
        WindowLease {
            state: self.state.clone(),
        }
    }
}

/// RAII registration of one open window with its [`PlatformContext`].
#[derive(Debug)]
pub struct WindowLease {
    state: Rc<PlatformState>,
}

impl Drop for WindowLease {
    fn drop(&mut self) {
        let open = self.state.open_windows.get().saturating_sub(1);
        self.state.open_windows.set(open);
        tracing::debug!(open, "window lease released");
    }
}

/// Native window glue a [`crate::Frame`] draws into and queries.
pub trait PlatformWindow {
    /// Client area size.
    fn size(&self) -> Size;
    /// Window position in screen coordinates.
    fn position(&self) -> Point;
    /// Move the window; `false` if the platform refused.
    fn set_position(&mut self, position: Point) -> bool;
    /// Resize the client area; `false` if the platform refused.
    fn set_size(&mut self, size: Size) -> bool;
    /// Pointer position in screen coordinates.
    fn mouse_location(&self) -> Point;
    /// Monotonic millisecond clock.
    fn ticks_ms(&self) -> u64;
    /// Hand a draw context bound to the window surface to `paint`, then present.
    fn render(&mut self, paint: &mut dyn FnMut(&mut dyn DrawContext));
    /// Ask the platform for an expose of `rect` (window coordinates).
    fn invalidate_rect(&mut self, rect: Rect);
    /// Input device bound to the window.
    fn input(&self) -> Option<Rc<dyn InputDevice>> {
        None
    }
}
