//! Named per-view animations driven by timing functions.

/// Registration and ticking.
pub mod animator;
/// Easing curves.
pub mod ease;
/// Interpolation between animated values.
pub mod lerp;
pub mod targets;
/// Timing functions.
pub mod timing;

pub use animator::{AnimationTarget, Animator, FinishNotification};
pub use ease::Ease;
pub use lerp::Lerp;
pub use targets::{
    AlphaValueAnimation, ControlValueAnimation, ExchangeStyle, ExchangeViewAnimation, ViewSizeAnimation,
};
pub use timing::{
    CubicBezierTimingFunction, EasedTimingFunction, InterpolationTimingFunction, LinearTimingFunction,
    PowerTimingFunction, RepeatTimingFunction, TimingFunction,
};
