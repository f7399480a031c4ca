use crate::foundation::core::{Color, Point, Rect};

/// Linear interpolation between two values of the same type.
pub trait Lerp: Sized {
    /// Value at `t` between `a` (`t = 0`) and `b` (`t = 1`).
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for f32 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        (f64::from(*a) + (f64::from(*b) - f64::from(*a)) * t) as f32
    }
}

impl Lerp for Point {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a.lerp(*b, t)
    }
}

impl Lerp for Rect {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Rect::new(
            f64::lerp(&a.x0, &b.x0, t),
            f64::lerp(&a.y0, &b.y0, t),
            f64::lerp(&a.x1, &b.x1, t),
            f64::lerp(&a.y1, &b.y1, t),
        )
    }
}

impl Lerp for Color {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Color::lerp(*a, *b, t as f32)
    }
}

/// Interpolate, returning `end` exactly once `pos` reaches 1.
pub fn lerp_to_end<T: Lerp + Clone>(start: &T, end: &T, pos: f32) -> T {
    if pos >= 1.0 {
        end.clone()
    } else {
        T::lerp(start, end, f64::from(pos))
    }
}
