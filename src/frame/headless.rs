use std::cell::RefCell;
use std::rc::Rc;

use crate::draw::context::DrawContext;
use crate::draw::input::{InputDevice, PollTiming, ScriptedInput};
use crate::draw::pixels::PixelBuffer;
use crate::draw::pixmap::PixmapContext;
use crate::foundation::core::{Point, Rect, Size};
use crate::foundation::error::PlugframeResult;
use crate::frame::platform::PlatformWindow;
use crate::view::tree::pixel_dims;

struct SurfaceState {
    pixmap: PixmapContext,
    presents: u32,
    invalidated: Vec<Rect>,
}

/// Observer handle onto a [`HeadlessWindow`]'s surface, usable after the window moved into
/// a frame.
#[derive(Clone)]
pub struct HeadlessSurface {
    state: Rc<RefCell<SurfaceState>>,
}

impl HeadlessSurface {
    /// Copy of the presented pixels (premultiplied RGBA8).
    pub fn pixels(&self) -> PixelBuffer {
        self.state.borrow_mut().pixmap.to_buffer()
    }

    /// Number of completed `render` calls.
    pub fn presents(&self) -> u32 {
        self.state.borrow().presents
    }

    /// Drain the rects passed to `invalidate_rect`.
    pub fn take_invalidated(&self) -> Vec<Rect> {
        std::mem::take(&mut self.state.borrow_mut().invalidated)
    }
}

/// Window backend without a display: draws into an owned pixmap and reads input from a
/// [`ScriptedInput`].
pub struct HeadlessWindow {
    surface: HeadlessSurface,
    position: Point,
    input: Rc<ScriptedInput>,
}

impl HeadlessWindow {
    /// Window with a `width` x `height` client area.
    pub fn new(width: u32, height: u32) -> PlugframeResult<Self> {
        Self::with_timing(width, height, PollTiming::default())
    }

    /// Window whose scripted input uses `timing` for the polling loops.
    pub fn with_timing(width: u32, height: u32, timing: PollTiming) -> PlugframeResult<Self> {
        let pixmap = PixmapContext::new(width, height)?;
        Ok(Self {
            surface: HeadlessSurface {
                state: Rc::new(RefCell::new(SurfaceState {
                    pixmap,
                    presents: 0,
                    invalidated: Vec::new(),
                })),
            },
            position: Point::ZERO,
            input: Rc::new(ScriptedInput::new(timing)),
        })
    }

    /// Handle for inspecting presented output.
    pub fn surface(&self) -> HeadlessSurface {
        self.surface.clone()
    }

    /// Scripted input device driving the window.
    pub fn scripted_input(&self) -> Rc<ScriptedInput> {
        self.input.clone()
    }
}

impl PlatformWindow for HeadlessWindow {
    fn size(&self) -> Size {
        let s = self.surface.state.borrow();
        Size::new(f64::from(s.pixmap.width()), f64::from(s.pixmap.height()))
    }

    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, position: Point) -> bool {
        self.position = position;
        true
    }

    fn set_size(&mut self, size: Size) -> bool {
        let (w, h) = pixel_dims(Rect::from_origin_size(Point::ZERO, size));
        match PixmapContext::new(w, h) {
            Ok(pixmap) => {
                self.surface.state.borrow_mut().pixmap = pixmap;
                true
            }
            Err(err) => {
                tracing::warn!(%err, "headless resize rejected");
                false
            }
        }
    }

    fn mouse_location(&self) -> Point {
        self.input.mouse_location()
    }

    fn ticks_ms(&self) -> u64 {
        self.input.ticks_ms()
    }

    fn render(&mut self, paint: &mut dyn FnMut(&mut dyn DrawContext)) {
        let mut s = self.surface.state.borrow_mut();
        let input: Rc<dyn InputDevice> = self.input.clone();
        s.pixmap.set_input(Some(input));
        s.pixmap.reset_state();
        paint(&mut s.pixmap);
        s.presents += 1;
    }

    fn invalidate_rect(&mut self, rect: Rect) {
        self.surface.state.borrow_mut().invalidated.push(rect);
    }

    fn input(&self) -> Option<Rc<dyn InputDevice>> {
        Some(self.input.clone())
    }
}
