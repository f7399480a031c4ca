#![forbid(unsafe_code)]
#![deny(missing_docs)]
//! `plugframe` is a retained-mode view toolkit for plugin editor windows.
//!
//! A [`Frame`] owns a [`ViewTree`] of views and containers, routes input to them, and
//! repaints what was invalidated through a [`DrawContext`], optionally compositing
//! containers through offscreen buffers. An [`Animator`] drives named per-view animations
//! from the frame's timer.
//!
//! ```no_run
//! use plugframe::{Frame, FrameOpts, HeadlessWindow, PlatformContext, Rect};
//!
//! let platform = PlatformContext::new();
//! let mut frame = Frame::new(&platform, Rect::new(0.0, 0.0, 320.0, 200.0), FrameOpts::default());
//! frame.open(HeadlessWindow::new(320, 200)?)?;
//! frame.paint()?;
//! # Ok::<(), plugframe::PlugframeError>(())
//! ```

pub mod animation;
pub mod bitmap;
pub mod controls;
pub mod draw;
pub mod foundation;
pub mod frame;
pub mod surface;
pub mod view;

pub use animation::{
    AlphaValueAnimation, AnimationTarget, Animator, ControlValueAnimation, CubicBezierTimingFunction, Ease,
    EasedTimingFunction, ExchangeStyle, ExchangeViewAnimation, InterpolationTimingFunction, LinearTimingFunction,
    PowerTimingFunction, RepeatTimingFunction, TimingFunction, ViewSizeAnimation,
};
pub use bitmap::{Bitmap, BitmapRegistry};
pub use controls::{Control, ControlListener, HorizontalSlider, OnOffButton, TextLabel};
pub use draw::{
    DrawCommand, DrawContext, MouseButtons, NullContext, OffscreenBackground, OffscreenContext, PixelBuffer,
    PixmapContext, RecordingContext, ScriptedInput, TextAlign,
};
pub use foundation::core::{Affine, Color, Point, Rect, RectExt, Size, Vec2};
pub use foundation::error::{PlugframeError, PlugframeResult};
pub use foundation::opts::FrameOpts;
pub use frame::{Frame, HeadlessSurface, HeadlessWindow, PlatformContext, PlatformWindow};
pub use surface::{SurfaceOpts, SurfaceRenderer, WorkerSurfaceView};
pub use view::{DragPayload, EventResult, KeyCode, UpdateMode, View, ViewCx, ViewId, ViewTree, VirtualKey};
