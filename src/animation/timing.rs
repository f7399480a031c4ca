use std::collections::BTreeMap;

use crate::animation::ease::Ease;
use crate::foundation::core::Point;
use crate::foundation::error::{PlugframeError, PlugframeResult};

/// Maps elapsed milliseconds since an animation started to a position in `[0, 1]`.
///
/// `position` is always asked before `is_done` for the same tick; stateful functions such as
/// [`RepeatTimingFunction`] rely on that order.
pub trait TimingFunction {
    /// Position at `elapsed_ms`.
    fn position(&mut self, elapsed_ms: u64) -> f32;
    /// Whether the animation is over at `elapsed_ms`.
    fn is_done(&mut self, elapsed_ms: u64) -> bool {
        elapsed_ms >= self.length_ms()
    }
    /// Length of one run.
    fn length_ms(&self) -> u64;
}

fn fraction(elapsed_ms: u64, length_ms: u64) -> f64 {
    if length_ms == 0 {
        return 1.0;
    }
    (elapsed_ms as f64 / length_ms as f64).clamp(0.0, 1.0)
}

/// Constant-speed progression over `length` milliseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearTimingFunction {
    length: u64,
}

impl LinearTimingFunction {
    /// Run over `length_ms`.
    pub fn new(length_ms: u64) -> Self {
        Self { length: length_ms }
    }
}

impl TimingFunction for LinearTimingFunction {
    fn position(&mut self, elapsed_ms: u64) -> f32 {
        fraction(elapsed_ms, self.length) as f32
    }

    fn length_ms(&self) -> u64 {
        self.length
    }
}

/// `t^factor` progression.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PowerTimingFunction {
    length: u64,
    factor: f32,
}

impl PowerTimingFunction {
    /// Run over `length_ms` with exponent `factor`.
    pub fn new(length_ms: u64, factor: f32) -> Self {
        Self {
            length: length_ms,
            factor,
        }
    }
}

impl TimingFunction for PowerTimingFunction {
    fn position(&mut self, elapsed_ms: u64) -> f32 {
        let t = fraction(elapsed_ms, self.length);
        t.powf(f64::from(self.factor)).clamp(0.0, 1.0) as f32
    }

    fn length_ms(&self) -> u64 {
        self.length
    }
}

/// Piecewise-linear keyframes over a fixed length.
#[derive(Clone, Debug, PartialEq)]
pub struct InterpolationTimingFunction {
    length: u64,
    points: BTreeMap<u64, f32>,
}

impl InterpolationTimingFunction {
    /// Keyframes `start` at time 0 and `end` at `length_ms`.
    pub fn new(length_ms: u64, start: f32, end: f32) -> Self {
        let mut points = BTreeMap::new();
        points.insert(0, start);
        points.insert(length_ms, end);
        Self {
            length: length_ms,
            points,
        }
    }

    /// Add a keyframe at `time` (fraction of the length) with position `pos`.
    ///
    /// The first keyframe at a given time wins; later ones at the same time are ignored.
    pub fn add_point(&mut self, time: f32, pos: f32) -> PlugframeResult<()> {
        if !(0.0..=1.0).contains(&time) || !pos.is_finite() {
            return Err(PlugframeError::validation(format!(
                "keyframe time must be in [0, 1] and position finite, got ({time}, {pos})"
            )));
        }
        let at = (self.length as f64 * f64::from(time)) as u64;
        self.points.entry(at).or_insert(pos);
        Ok(())
    }

    /// Keyframe with its position added, builder style.
    pub fn with_point(mut self, time: f32, pos: f32) -> PlugframeResult<Self> {
        self.add_point(time, pos)?;
        Ok(self)
    }

    /// Number of keyframes.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }
}

impl TimingFunction for InterpolationTimingFunction {
    fn position(&mut self, elapsed_ms: u64) -> f32 {
        let before = self.points.range(..=elapsed_ms).next_back();
        let after = self.points.range(elapsed_ms..).next();
        match (before, after) {
            (Some((&t0, &p0)), Some((&t1, &p1))) => {
                if t0 == t1 {
                    return p0;
                }
                let f = (elapsed_ms - t0) as f64 / (t1 - t0) as f64;
                (f64::from(p0) + (f64::from(p1) - f64::from(p0)) * f) as f32
            }
            (Some((_, &p)), None) | (None, Some((_, &p))) => p,
            (None, None) => 1.0,
        }
    }

    fn length_ms(&self) -> u64 {
        self.length
    }
}

/// Progression shaped by one of the [`Ease`] curves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EasedTimingFunction {
    length: u64,
    ease: Ease,
}

impl EasedTimingFunction {
    /// Run over `length_ms` following `ease`.
    pub fn new(length_ms: u64, ease: Ease) -> Self {
        Self {
            length: length_ms,
            ease,
        }
    }
}

impl TimingFunction for EasedTimingFunction {
    fn position(&mut self, elapsed_ms: u64) -> f32 {
        self.ease.apply(fraction(elapsed_ms, self.length)) as f32
    }

    fn length_ms(&self) -> u64 {
        self.length
    }
}

/// Cubic Bézier curve from `(0,0)` to `(1,1)` with control points `p1`, `p2`, sampled at the
/// time fraction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezierTimingFunction {
    length: u64,
    p1: Point,
    p2: Point,
}

impl CubicBezierTimingFunction {
    /// Curve through the two control points.
    pub fn new(length_ms: u64, p1: Point, p2: Point) -> Self {
        Self {
            length: length_ms,
            p1,
            p2,
        }
    }

    /// CSS `ease`.
    pub fn easy(length_ms: u64) -> Self {
        Self::new(length_ms, Point::new(0.25, 0.1), Point::new(0.25, 1.0))
    }

    /// CSS `ease-in`.
    pub fn easy_in(length_ms: u64) -> Self {
        Self::new(length_ms, Point::new(0.42, 0.0), Point::new(1.0, 1.0))
    }

    /// CSS `ease-out`.
    pub fn easy_out(length_ms: u64) -> Self {
        Self::new(length_ms, Point::new(0.0, 0.0), Point::new(0.58, 1.0))
    }

    /// CSS `ease-in-out`.
    pub fn easy_in_out(length_ms: u64) -> Self {
        Self::new(length_ms, Point::new(0.42, 0.0), Point::new(0.58, 1.0))
    }
}

impl TimingFunction for CubicBezierTimingFunction {
    fn position(&mut self, elapsed_ms: u64) -> f32 {
        let t = fraction(elapsed_ms, self.length);
        let p0 = Point::ZERO;
        let p3 = Point::new(1.0, 1.0);
        let a = p0.lerp(self.p1, t);
        let b = self.p1.lerp(self.p2, t);
        let c = self.p2.lerp(p3, t);
        let d = a.lerp(b, t);
        let e = b.lerp(c, t);
        d.lerp(e, t).y.clamp(0.0, 1.0) as f32
    }

    fn length_ms(&self) -> u64 {
        self.length
    }
}

/// Runs an inner function several times, optionally reversing direction on every other run.
pub struct RepeatTimingFunction {
    inner: Box<dyn TimingFunction>,
    repeat_count: i32,
    run_counter: u32,
    auto_reverse: bool,
    reversed: bool,
}

impl RepeatTimingFunction {
    /// Repeat `inner` `repeat_count` times; `-1` repeats forever.
    pub fn new(inner: impl TimingFunction + 'static, repeat_count: i32, auto_reverse: bool) -> Self {
        Self {
            inner: Box::new(inner),
            repeat_count,
            run_counter: 0,
            auto_reverse,
            reversed: false,
        }
    }

    /// Completed runs so far.
    pub fn runs(&self) -> u32 {
        self.run_counter
    }

    fn run_elapsed(&self, elapsed_ms: u64) -> u64 {
        elapsed_ms.saturating_sub(self.inner.length_ms() * u64::from(self.run_counter))
    }
}

impl TimingFunction for RepeatTimingFunction {
    fn position(&mut self, elapsed_ms: u64) -> f32 {
        let ms = self.run_elapsed(elapsed_ms);
        let pos = self.inner.position(ms);
        if self.reversed { 1.0 - pos } else { pos }
    }

    fn is_done(&mut self, elapsed_ms: u64) -> bool {
        let ms = self.run_elapsed(elapsed_ms);
        if !self.inner.is_done(ms) {
            return false;
        }
        self.run_counter += 1;
        if self.auto_reverse {
            self.reversed = !self.reversed;
        }
        self.repeat_count >= 0 && i64::from(self.run_counter) >= i64::from(self.repeat_count)
    }

    fn length_ms(&self) -> u64 {
        self.inner.length_ms()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timing.rs"]
mod tests;
