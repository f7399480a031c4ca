//! Shared image resources.
//!
//! A [`Bitmap`] is a cheap handle: cloning it takes another reference, dropping the last
//! handle releases the pixels.

/// Raster and SVG decoding.
pub mod decode;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::draw::context::DrawContext;
use crate::draw::pixels::{BlitMode, PixelBuffer, PixelView};
use crate::foundation::core::{Color, Point, Rect, RectExt};
use crate::foundation::error::PlugframeResult;

struct TransparencyMask {
    key: Color,
    bits: Vec<u64>,
    pixels: PixelBuffer,
}

impl TransparencyMask {
    fn build(src: &PixelBuffer, key: Color) -> Self {
        let n = (src.width as usize) * (src.height as usize);
        let mut bits = vec![0u64; n.div_ceil(64)];
        let mut pixels = src.clone();
        let keyed = key.with_alpha(255).premul();
        for (i, px) in pixels.data.chunks_exact_mut(4).enumerate() {
            if *px == keyed {
                bits[i / 64] |= 1 << (i % 64);
                px.fill(0);
            }
        }
        Self { key, bits, pixels }
    }

    fn is_masked(&self, i: usize) -> bool {
        self.bits
            .get(i / 64)
            .is_some_and(|w| w & (1 << (i % 64)) != 0)
    }
}

struct BitmapInner {
    pixels: PixelBuffer,
    transparent_color: Cell<Color>,
    mask: RefCell<Option<TransparencyMask>>,
    mask_builds: Cell<u32>,
}

/// Reference-counted premultiplied RGBA8 image.
#[derive(Clone)]
pub struct Bitmap {
    inner: Rc<BitmapInner>,
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("refs", &self.ref_count())
            .finish()
    }
}

impl Bitmap {
    /// Wrap premultiplied pixels.
    pub fn from_premul(pixels: PixelBuffer) -> Self {
        Self {
            inner: Rc::new(BitmapInner {
                pixels,
                transparent_color: Cell::new(Color::MAGENTA),
                mask: RefCell::new(None),
                mask_builds: Cell::new(0),
            }),
        }
    }

    /// Build from straight-alpha RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> PlugframeResult<Self> {
        decode::premultiply_rgba8_in_place(&mut rgba);
        Ok(Self::from_premul(PixelBuffer::from_premul(width, height, rgba)?))
    }

    /// Build from premultiplied RGBA8 bytes.
    pub fn from_premul_rgba8(width: u32, height: u32, data: Vec<u8>) -> PlugframeResult<Self> {
        Ok(Self::from_premul(PixelBuffer::from_premul(width, height, data)?))
    }

    /// Uniformly colored bitmap.
    pub fn solid(width: u32, height: u32, color: Color) -> Self {
        Self::from_premul(PixelBuffer::filled(width, height, color))
    }

    /// Decode raster bytes (PNG, JPEG, ...).
    pub fn decode(bytes: &[u8]) -> PlugframeResult<Self> {
        Ok(Self::from_premul(decode::decode_raster(bytes)?))
    }

    /// Rasterize SVG bytes at their natural size.
    pub fn decode_svg(bytes: &[u8]) -> PlugframeResult<Self> {
        Ok(Self::from_premul(decode::decode_svg(bytes)?))
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.inner.pixels.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.inner.pixels.height
    }

    /// Premultiplied pixels.
    pub fn pixels(&self) -> PixelView<'_> {
        self.inner.pixels.view()
    }

    /// Number of live handles to this bitmap.
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }

    /// `true` when both handles share the same pixels.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Color key used by [`Bitmap::draw_transparent`].
    pub fn transparent_color(&self) -> Color {
        self.inner.transparent_color.get()
    }

    /// Change the color key. A cached mask for a different key is dropped.
    pub fn set_transparent_color(&self, color: Color) {
        if self.inner.transparent_color.replace(color) != color {
            self.inner.mask.borrow_mut().take();
        }
    }

    /// How many times the transparency mask was built.
    pub fn mask_builds(&self) -> u32 {
        self.inner.mask_builds.get()
    }

    /// `true` if the pixel at `(x, y)` matches the color key.
    pub fn is_keyed_out(&self, x: u32, y: u32) -> bool {
        if x >= self.width() || y >= self.height() {
            return false;
        }
        self.ensure_mask();
        let i = (y as usize) * (self.width() as usize) + (x as usize);
        self.inner
            .mask
            .borrow()
            .as_ref()
            .is_some_and(|m| m.is_masked(i))
    }

    fn ensure_mask(&self) {
        let key = self.transparent_color();
        let mut slot = self.inner.mask.borrow_mut();
        if slot.as_ref().is_some_and(|m| m.key == key) {
            return;
        }
        *slot = Some(TransparencyMask::build(&self.inner.pixels, key));
        self.inner.mask_builds.set(self.inner.mask_builds.get() + 1);
        tracing::trace!(key = ?key, "built transparency mask");
    }

    /// Draw the part of the bitmap starting at `offset` into `rect` (local coordinates).
    pub fn draw(&self, dc: &mut dyn DrawContext, rect: Rect, offset: Point) {
        place(dc, self.pixels(), rect, offset, 1.0);
    }

    /// Like [`Bitmap::draw`], skipping pixels that match the color key.
    pub fn draw_transparent(&self, dc: &mut dyn DrawContext, rect: Rect, offset: Point) {
        self.ensure_mask();
        let mask = self.inner.mask.borrow();
        match mask.as_ref() {
            Some(m) => place(dc, m.pixels.view(), rect, offset, 1.0),
            None => place(dc, self.pixels(), rect, offset, 1.0),
        }
    }

    /// Like [`Bitmap::draw`] with an extra uniform opacity.
    pub fn draw_alpha_blend(&self, dc: &mut dyn DrawContext, rect: Rect, offset: Point, alpha: f32) {
        place(dc, self.pixels(), rect, offset, alpha.clamp(0.0, 1.0));
    }
}

fn place(dc: &mut dyn DrawContext, src: PixelView<'_>, rect: Rect, offset: Point, alpha: f32) {
    let s = dc.state();
    if s.clip.is_void() {
        return;
    }
    let dest = s.to_device(rect.origin());
    let alpha = s.global_alpha * alpha;
    let src_rect = Rect::from_origin_size(offset, rect.size());
    dc.blit(src, src_rect, dest, BlitMode::Over, alpha);
}

/// Name-to-bitmap lookup for resources referenced by views.
#[derive(Default, Debug)]
pub struct BitmapRegistry {
    entries: HashMap<String, Bitmap>,
}

impl BitmapRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a bitmap under `name`.
    pub fn register(&mut self, name: impl Into<String>, bitmap: Bitmap) -> Option<Bitmap> {
        self.entries.insert(name.into(), bitmap)
    }

    /// Decode `bytes` (SVG or raster, sniffed) and register the result.
    pub fn load(&mut self, name: impl Into<String>, bytes: &[u8]) -> PlugframeResult<Bitmap> {
        let bitmap = if decode::looks_like_svg(bytes) {
            Bitmap::decode_svg(bytes)?
        } else {
            Bitmap::decode(bytes)?
        };
        self.entries.insert(name.into(), bitmap.clone());
        Ok(bitmap)
    }

    /// Another handle to the bitmap registered as `name`.
    pub fn get(&self, name: &str) -> Option<Bitmap> {
        self.entries.get(name).cloned()
    }

    /// Drop the registry's handle.
    pub fn remove(&mut self, name: &str) -> Option<Bitmap> {
        self.entries.remove(name)
    }

    /// Number of registered bitmaps.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bitmap/bitmap.rs"]
mod tests;
