use crate::foundation::core::{Color, Point, Rect};
use crate::foundation::error::{PlugframeError, PlugframeResult};
use crate::foundation::math::{mul_div255_u8, pixel_span, unit_to_u8};

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// How a blit combines source pixels with the destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlitMode {
    /// Replace destination pixels.
    Copy,
    /// Source-over compositing.
    Over,
}

/// Owned premultiplied RGBA8 image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8 bytes.
    pub data: Vec<u8>,
}

impl PixelBuffer {
    /// Transparent buffer of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; byte_len(width, height)],
        }
    }

    /// Buffer filled with `color`.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        let px = color.premul();
        let mut data = Vec::with_capacity(byte_len(width, height));
        for _ in 0..(width as usize) * (height as usize) {
            data.extend_from_slice(&px);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap existing premultiplied bytes.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> PlugframeResult<Self> {
        if data.len() != byte_len(width, height) {
            return Err(PlugframeError::validation(format!(
                "pixel buffer expects {} bytes for {width}x{height}, got {}",
                byte_len(width, height),
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Borrow as a view.
    pub fn view(&self) -> PixelView<'_> {
        PixelView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    /// Pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<PremulRgba8> {
        self.view().pixel(x, y)
    }

    /// Straight-alpha RGBA8 copy, as image encoders expect.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(4) {
            let c = unpremultiply([px[0], px[1], px[2], px[3]]);
            out.extend_from_slice(&[c.r, c.g, c.b, c.a]);
        }
        out
    }
}

/// Borrowed premultiplied RGBA8 image.
#[derive(Clone, Copy, Debug)]
pub struct PixelView<'a> {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8 bytes.
    pub data: &'a [u8],
}

impl PixelView<'_> {
    /// Pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<PremulRgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Copy out a sub-rectangle, clamped to the view bounds.
    pub fn crop(&self, rect: Rect) -> PixelBuffer {
        let (x0, x1) = pixel_span(rect.x0, rect.x1, self.width);
        let (y0, y1) = pixel_span(rect.y0, rect.y1, self.height);
        let mut out = PixelBuffer::new(x1 - x0, y1 - y0);
        let row = ((x1 - x0) as usize) * 4;
        for (dy, y) in (y0..y1).enumerate() {
            let s = ((y as usize) * (self.width as usize) + (x0 as usize)) * 4;
            let d = dy * row;
            out.data[d..d + row].copy_from_slice(&self.data[s..s + row]);
        }
        out
    }
}

pub(crate) fn unpremultiply(px: PremulRgba8) -> Color {
    let a = u32::from(px[3]);
    if a == 0 {
        return Color::TRANSPARENT;
    }
    let un = |c: u8| ((u32::from(c) * 255 + a / 2) / a).min(255) as u8;
    Color::rgba(un(px[0]), un(px[1]), un(px[2]), px[3])
}

pub(crate) fn byte_len(width: u32, height: u32) -> usize {
    (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4)
}

/// Source-over for one premultiplied pixel with an extra opacity multiplier.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }
    let op = u16::from(unit_to_u8(opacity));
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Scale every channel of a premultiplied pixel by `opacity`.
pub fn fade(px: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let op = u16::from(unit_to_u8(opacity));
    [
        mul_div255_u8(u16::from(px[0]), op),
        mul_div255_u8(u16::from(px[1]), op),
        mul_div255_u8(u16::from(px[2]), op),
        mul_div255_u8(u16::from(px[3]), op),
    ]
}

/// Blit `src_rect` of `src` so its top-left lands on `dest` in `dst`, restricted to `clip`.
///
/// All coordinates are device pixels. Returns the number of destination pixels written.
#[allow(clippy::too_many_arguments)]
pub(crate) fn blit(
    dst: &mut [u8],
    dst_width: u32,
    dst_height: u32,
    src: PixelView<'_>,
    src_rect: Rect,
    dest: Point,
    clip: Rect,
    mode: BlitMode,
    alpha: f32,
) -> usize {
    let src_rect = src_rect.intersect(Rect::new(
        0.0,
        0.0,
        f64::from(src.width),
        f64::from(src.height),
    ));
    if src_rect.width() <= 0.0 || src_rect.height() <= 0.0 {
        return 0;
    }
    let dx = dest.x - src_rect.x0;
    let dy = dest.y - src_rect.y0;
    let target = (src_rect + crate::foundation::core::Vec2::new(dx, dy))
        .intersect(clip)
        .intersect(Rect::new(
            0.0,
            0.0,
            f64::from(dst_width),
            f64::from(dst_height),
        ));
    let (x0, x1) = pixel_span(target.x0, target.x1, dst_width);
    let (y0, y1) = pixel_span(target.y0, target.y1, dst_height);
    let sx_off = -dx.round() as i64;
    let sy_off = -dy.round() as i64;

    let mut written = 0;
    for y in y0..y1 {
        let sy = i64::from(y) + sy_off;
        if sy < 0 {
            continue;
        }
        for x in x0..x1 {
            let sx = i64::from(x) + sx_off;
            if sx < 0 {
                continue;
            }
            let Some(s) = src.pixel(sx as u32, sy as u32) else {
                continue;
            };
            let di = ((y as usize) * (dst_width as usize) + (x as usize)) * 4;
            let Some(d) = dst.get_mut(di..di + 4) else {
                continue;
            };
            let out = match mode {
                BlitMode::Copy if alpha >= 1.0 => s,
                BlitMode::Copy => fade(s, alpha),
                BlitMode::Over => over([d[0], d[1], d[2], d[3]], s, alpha),
            };
            d.copy_from_slice(&out);
            written += 1;
        }
    }
    written
}

#[cfg(test)]
#[path = "../../tests/unit/draw/pixels.rs"]
mod tests;
