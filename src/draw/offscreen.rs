//! Offscreen buffers that containers composite through.

use std::rc::Rc;

use crate::bitmap::Bitmap;
use crate::draw::context::{DrawContext, Paint, TextRun};
use crate::draw::input::InputDevice;
use crate::draw::pixels::{BlitMode, PixelBuffer, PixelView};
use crate::draw::pixmap::PixmapContext;
use crate::draw::state::{DrawState, FillRule, Font};
use crate::foundation::core::{BezPath, Color, Point, Rect, RectExt};
use crate::foundation::error::PlugframeResult;

/// Initial content of an offscreen surface.
#[derive(Clone, Debug)]
pub enum OffscreenBackground {
    /// Uniform fill.
    Color(Color),
    /// Bitmap drawn at the origin, the rest left transparent.
    Bitmap(Bitmap),
}

impl Default for OffscreenBackground {
    fn default() -> Self {
        Self::Color(Color::TRANSPARENT)
    }
}

/// Pixel surface that views render into before the result is copied to a target context.
pub struct OffscreenContext {
    inner: PixmapContext,
}

impl OffscreenContext {
    /// Allocate a `width x height` surface and paint `background` into it.
    #[tracing::instrument(level = "debug", skip(background))]
    pub fn new(width: u32, height: u32, background: OffscreenBackground) -> PlugframeResult<Self> {
        let mut inner = PixmapContext::new(width, height)?;
        match background {
            OffscreenBackground::Color(c) => inner.clear(c),
            OffscreenBackground::Bitmap(b) => {
                let r = Rect::new(0.0, 0.0, f64::from(b.width()), f64::from(b.height()));
                b.draw(&mut inner, r, Point::ZERO);
            }
        }
        Ok(Self { inner })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// Current pixels.
    pub fn pixels(&mut self) -> PixelView<'_> {
        self.inner.pixels()
    }

    /// Reset drawing state between uses, keeping the pixels.
    pub fn reset_state(&mut self) {
        self.inner.reset_state();
    }

    /// Reset a device-space rect to transparent.
    pub fn erase(&mut self, rect: Rect) {
        let r = rect.bound(self.inner.surface_bounds());
        if r.is_void() {
            return;
        }
        let w = r.width().ceil() as u32;
        let h = r.height().ceil() as u32;
        let clear = PixelBuffer::new(w, h);
        let prev = self.inner.state().clip;
        self.inner.set_clip_rect_device(r);
        let src = Rect::new(0.0, 0.0, f64::from(w), f64::from(h));
        self.inner.blit(clear.view(), src, r.origin(), BlitMode::Copy, 1.0);
        self.inner.set_clip_rect_device(prev);
    }

    /// Composite this surface onto `target`.
    ///
    /// `dest` is in the target's local coordinates; `src_offset` selects where in the offscreen
    /// the copy starts.
    pub fn copy_from(&mut self, target: &mut dyn DrawContext, dest: Rect, src_offset: Point) {
        self.copy_from_with(target, dest, src_offset, BlitMode::Over);
    }

    /// [`OffscreenContext::copy_from`] with an explicit transfer mode.
    pub fn copy_from_with(
        &mut self,
        target: &mut dyn DrawContext,
        dest: Rect,
        src_offset: Point,
        mode: BlitMode,
    ) {
        let state = target.state();
        if state.clip.is_void() || dest.is_void() {
            return;
        }
        let at = state.to_device(dest.origin());
        let alpha = state.global_alpha;
        let src_rect = Rect::from_origin_size(src_offset, dest.size());
        target.blit(self.inner.pixels(), src_rect, at, mode, alpha);
    }

    /// Copy `src_rect` (device coordinates of `source`) into this surface at `dest_offset`.
    ///
    /// Returns `false` if the source cannot read back pixels or the rect is empty.
    pub fn copy_to(&mut self, source: &mut dyn DrawContext, src_rect: Rect, dest_offset: Point) -> bool {
        let Some(buf) = source.read_pixels(src_rect) else {
            return false;
        };
        let r = Rect::new(0.0, 0.0, f64::from(buf.width), f64::from(buf.height));
        let prev = self.inner.state().clip;
        self.inner.reset_clip();
        self.inner.blit(buf.view(), r, dest_offset, BlitMode::Copy, 1.0);
        self.inner.state_mut().clip = prev;
        true
    }
}

impl DrawContext for OffscreenContext {
    fn state(&self) -> &DrawState {
        self.inner.state()
    }

    fn state_mut(&mut self) -> &mut DrawState {
        self.inner.state_mut()
    }

    fn surface_bounds(&self) -> Rect {
        self.inner.surface_bounds()
    }

    fn fill_shape(&mut self, path: &BezPath, paint: &Paint, rule: FillRule) {
        self.inner.fill_shape(path, paint, rule);
    }

    fn stroke_shape(&mut self, path: &BezPath, color: Color, stroke: &kurbo::Stroke) {
        self.inner.stroke_shape(path, color, stroke);
    }

    fn blit(&mut self, src: PixelView<'_>, src_rect: Rect, dest: Point, mode: BlitMode, alpha: f32) {
        self.inner.blit(src, src_rect, dest, mode, alpha);
    }

    fn draw_text_run(&mut self, run: &TextRun<'_>) {
        self.inner.draw_text_run(run);
    }

    fn measure_text(&mut self, text: &str, font: &Font) -> f64 {
        self.inner.measure_text(text, font)
    }

    fn read_pixel(&mut self, device: Point) -> Option<Color> {
        self.inner.read_pixel(device)
    }

    fn write_pixel(&mut self, device: Point, color: Color) {
        self.inner.write_pixel(device, color);
    }

    fn flood_fill_device(&mut self, device: Point, color: Color) {
        self.inner.flood_fill_device(device, color);
    }

    fn read_pixels(&mut self, device_rect: Rect) -> Option<PixelBuffer> {
        self.inner.read_pixels(device_rect)
    }

    fn input_device(&self) -> Option<Rc<dyn InputDevice>> {
        self.inner.input_device()
    }

    fn flush(&mut self) {
        self.inner.flush();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/draw/offscreen.rs"]
mod tests;
