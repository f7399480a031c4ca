use crate::foundation::math::mul_div255_u8;

pub use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};

/// Legacy rectangle operations used by the view tree.
///
/// `kurbo::Rect` supplies the arithmetic; these helpers pin down the edge semantics that
/// invalidation and hit-testing rely on.
pub trait RectExt: Sized {
    /// Clamp `self` into `other`. The result is never inverted: a rect fully outside `other`
    /// collapses to a zero-area rect on its nearest edge.
    fn bound(self, other: Rect) -> Rect;
    /// Inclusive overlap test: rects that share only an edge still overlap.
    fn overlaps_inclusive(&self, other: &Rect) -> bool;
    /// `true` when `right <= left` or `bottom <= top`.
    fn is_void(&self) -> bool;
    /// Move the rect so its top-left corner sits at the origin.
    fn originize(self) -> Rect;
    /// Translate by `(dx, dy)`.
    fn offset_by(self, dx: f64, dy: f64) -> Rect;
    /// Shrink by `dx`/`dy` on each side, clamped so the rect never inverts.
    fn inset_clamped(self, dx: f64, dy: f64) -> Rect;
    /// Move the top-left corner to `p`, keeping the size.
    fn move_to_point(self, p: Point) -> Rect;
    /// Half-open containment (`left <= x < right`).
    fn point_inside(&self, p: Point) -> bool;
}

impl RectExt for Rect {
    fn bound(self, other: Rect) -> Rect {
        let r = self.abs();
        let o = other.abs();
        let x0 = r.x0.clamp(o.x0, o.x1);
        let y0 = r.y0.clamp(o.y0, o.y1);
        let x1 = r.x1.clamp(o.x0, o.x1).max(x0);
        let y1 = r.y1.clamp(o.y0, o.y1).max(y0);
        Rect::new(x0, y0, x1, y1)
    }

    fn overlaps_inclusive(&self, other: &Rect) -> bool {
        !(self.x1 < other.x0 || self.x0 > other.x1 || self.y1 < other.y0 || self.y0 > other.y1)
    }

    fn is_void(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    fn originize(self) -> Rect {
        Rect::new(0.0, 0.0, self.width(), self.height())
    }

    fn offset_by(self, dx: f64, dy: f64) -> Rect {
        self + Vec2::new(dx, dy)
    }

    fn inset_clamped(self, dx: f64, dy: f64) -> Rect {
        let cx = (self.x0 + self.x1) * 0.5;
        let cy = (self.y0 + self.y1) * 0.5;
        Rect::new(
            (self.x0 + dx).min(cx),
            (self.y0 + dy).min(cy),
            (self.x1 - dx).max(cx),
            (self.y1 - dy).max(cy),
        )
    }

    fn move_to_point(self, p: Point) -> Rect {
        self.with_origin(p)
    }

    fn point_inside(&self, p: Point) -> bool {
        p.x >= self.x0 && p.x < self.x1 && p.y >= self.y0 && p.y < self.y1
    }
}

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque mid grey.
    pub const GREY: Self = Self::rgb(127, 127, 127);
    /// Opaque red.
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Opaque green.
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    /// Magenta, the conventional transparency key.
    pub const MAGENTA: Self = Self::rgb(255, 0, 255);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Construct an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Construct a color with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Scale alpha by `factor` in `[0, 1]`.
    pub fn scale_alpha(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        Self {
            a: (f32::from(self.a) * f).round() as u8,
            ..self
        }
    }

    /// Premultiplied RGBA8 bytes.
    pub fn premul(self) -> [u8; 4] {
        let a = u16::from(self.a);
        [
            mul_div255_u8(u16::from(self.r), a),
            mul_div255_u8(u16::from(self.g), a),
            mul_div255_u8(u16::from(self.b), a),
            self.a,
        ]
    }

    /// Straight RGB comparison, ignoring alpha.
    pub fn same_rgb(self, other: Self) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b
    }

    /// Per-channel linear blend, `t` clamped to `[0, 1]`.
    pub fn lerp(self, to: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8;
        Self {
            r: mix(self.r, to.r),
            g: mix(self.g, to.g),
            b: mix(self.b, to.b),
            a: mix(self.a, to.a),
        }
    }

    pub(crate) fn to_cpu(self) -> vello_cpu::peniko::Color {
        vello_cpu::peniko::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
