//! Drawing contexts and the state they share.

/// The `DrawContext` trait.
pub mod context;
/// Pointer state and the blocking input polls.
pub mod input;
pub mod offscreen;
/// Premultiplied pixel buffers and compositing.
pub mod pixels;
pub mod pixmap;
/// Recording and inert contexts.
pub mod recording;
/// Draw state and its value types.
pub mod state;
pub(crate) mod text;

pub use context::{DrawContext, Paint, TextRun};
pub use input::{InputDevice, InputSample, MouseButtons, PollTiming, ScriptedInput};
pub use offscreen::{OffscreenBackground, OffscreenContext};
pub use pixels::{BlitMode, PixelBuffer, PixelView, PremulRgba8};
pub use pixmap::PixmapContext;
pub use recording::{DrawCommand, NullContext, RecordingContext};
pub use state::{
    DrawMode, DrawState, FillRule, Font, LineStyle, PathDrawMode, SavedOffsets, TextAlign,
};
