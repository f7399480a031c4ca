use std::rc::Rc;

use kurbo::Shape;

use crate::draw::context::{DrawContext, Paint, TextRun};
use crate::draw::input::InputDevice;
use crate::draw::pixels::{BlitMode, PixelView};
use crate::draw::state::{DrawState, FillRule};
use crate::foundation::core::{BezPath, Color, Point, Rect};

/// One primitive captured by [`RecordingContext`], in device coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Path fill.
    Fill {
        /// Path bounding box.
        bounds: Rect,
        /// Paint used.
        paint: Paint,
        /// Winding rule.
        rule: FillRule,
        /// Clip active at the time.
        clip: Rect,
    },
    /// Path stroke.
    Stroke {
        /// Bounding box of the stroked outline.
        bounds: Rect,
        /// Stroke color.
        color: Color,
        /// Device-space line width.
        width: f64,
        /// Clip active at the time.
        clip: Rect,
    },
    /// Pixel block transfer.
    Blit {
        /// Destination rect.
        dest: Rect,
        /// Source rect inside the source image.
        src_rect: Rect,
        /// Transfer mode.
        mode: BlitMode,
        /// Opacity multiplier.
        alpha: f32,
        /// Clip active at the time.
        clip: Rect,
    },
    /// Text run.
    Text {
        /// Text drawn.
        text: String,
        /// Line box origin.
        origin: Point,
        /// Text color.
        color: Color,
        /// Clip active at the time.
        clip: Rect,
    },
    /// Single pixel write.
    Pixel {
        /// Pixel position.
        at: Point,
        /// Color written.
        color: Color,
    },
    /// Flood fill request.
    FloodFill {
        /// Seed pixel.
        at: Point,
        /// Fill color.
        color: Color,
    },
}

impl DrawCommand {
    /// Device-space extent touched by the command, before clipping.
    pub fn bounds(&self) -> Rect {
        match self {
            Self::Fill { bounds, .. } | Self::Stroke { bounds, .. } => *bounds,
            Self::Blit { dest, .. } => *dest,
            Self::Text { origin, .. } => Rect::from_origin_size(*origin, (0.0, 0.0)),
            Self::Pixel { at, .. } | Self::FloodFill { at, .. } => {
                Rect::new(at.x, at.y, at.x + 1.0, at.y + 1.0)
            }
        }
    }

    /// Clip active when the command was issued.
    pub fn clip(&self) -> Option<Rect> {
        match self {
            Self::Fill { clip, .. }
            | Self::Stroke { clip, .. }
            | Self::Blit { clip, .. }
            | Self::Text { clip, .. } => Some(*clip),
            Self::Pixel { .. } | Self::FloodFill { .. } => None,
        }
    }

    /// Fill color, for solid fills.
    pub fn fill_color(&self) -> Option<Color> {
        match self {
            Self::Fill {
                paint: Paint::Solid(c),
                ..
            } => Some(*c),
            _ => None,
        }
    }
}

/// Draw context that records primitives instead of rasterizing them.
pub struct RecordingContext {
    state: DrawState,
    bounds: Rect,
    commands: Vec<DrawCommand>,
    input: Option<Rc<dyn InputDevice>>,
}

impl RecordingContext {
    /// Recording surface of the given device size.
    pub fn new(width: f64, height: f64) -> Self {
        let bounds = Rect::new(0.0, 0.0, width, height);
        Self {
            state: DrawState::new(bounds),
            bounds,
            commands: Vec::new(),
            input: None,
        }
    }

    /// Bind an input device for mouse queries.
    pub fn with_input(mut self, input: Rc<dyn InputDevice>) -> Self {
        self.input = Some(input);
        self
    }

    /// Commands recorded so far, in issue order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the recorded commands.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Bounds of every solid fill, in issue order.
    pub fn fill_bounds(&self) -> Vec<Rect> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Fill { .. }))
            .map(DrawCommand::bounds)
            .collect()
    }
}

impl DrawContext for RecordingContext {
    fn state(&self) -> &DrawState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut DrawState {
        &mut self.state
    }

    fn surface_bounds(&self) -> Rect {
        self.bounds
    }

    fn fill_shape(&mut self, path: &BezPath, paint: &Paint, rule: FillRule) {
        self.commands.push(DrawCommand::Fill {
            bounds: path.bounding_box(),
            paint: paint.clone(),
            rule,
            clip: self.state.clip,
        });
    }

    fn stroke_shape(&mut self, path: &BezPath, color: Color, stroke: &kurbo::Stroke) {
        let half = stroke.width * 0.5;
        self.commands.push(DrawCommand::Stroke {
            bounds: path.bounding_box().inflate(half, half),
            color,
            width: stroke.width,
            clip: self.state.clip,
        });
    }

    fn blit(&mut self, src: PixelView<'_>, src_rect: Rect, dest: Point, mode: BlitMode, alpha: f32) {
        let src_rect = src_rect.intersect(Rect::new(
            0.0,
            0.0,
            f64::from(src.width),
            f64::from(src.height),
        ));
        self.commands.push(DrawCommand::Blit {
            dest: Rect::from_origin_size(dest, src_rect.size()),
            src_rect,
            mode,
            alpha,
            clip: self.state.clip,
        });
    }

    fn draw_text_run(&mut self, run: &TextRun<'_>) {
        self.commands.push(DrawCommand::Text {
            text: run.text.to_string(),
            origin: run.origin,
            color: run.color,
            clip: self.state.clip,
        });
    }

    fn write_pixel(&mut self, device: Point, color: Color) {
        self.commands.push(DrawCommand::Pixel { at: device, color });
    }

    fn flood_fill_device(&mut self, device: Point, color: Color) {
        self.commands.push(DrawCommand::FloodFill { at: device, color });
    }

    fn input_device(&self) -> Option<Rc<dyn InputDevice>> {
        self.input.clone()
    }
}

/// Inert context for a missing platform surface: every primitive is a no-op.
///
/// It can still carry an input device, so event dispatch without a paint target can poll
/// the pointer.
pub struct NullContext {
    state: DrawState,
    input: Option<Rc<dyn InputDevice>>,
}

impl Default for NullContext {
    fn default() -> Self {
        Self {
            state: DrawState::new(Rect::ZERO),
            input: None,
        }
    }
}

impl NullContext {
    /// Inert context reporting pointer state from `input`.
    pub fn with_input(input: Rc<dyn InputDevice>) -> Self {
        Self {
            state: DrawState::new(Rect::ZERO),
            input: Some(input),
        }
    }
}

impl DrawContext for NullContext {
    fn state(&self) -> &DrawState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut DrawState {
        &mut self.state
    }

    fn surface_bounds(&self) -> Rect {
        Rect::ZERO
    }

    fn fill_shape(&mut self, _path: &BezPath, _paint: &Paint, _rule: FillRule) {}

    fn stroke_shape(&mut self, _path: &BezPath, _color: Color, _stroke: &kurbo::Stroke) {}

    fn blit(&mut self, _src: PixelView<'_>, _r: Rect, _dest: Point, _mode: BlitMode, _alpha: f32) {}

    fn draw_text_run(&mut self, _run: &TextRun<'_>) {}

    fn input_device(&self) -> Option<Rc<dyn InputDevice>> {
        self.input.clone()
    }
}
