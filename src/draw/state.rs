use std::sync::Arc;

use crate::foundation::core::{Affine, Color, Point, Rect, Vec2};

/// Stroke pattern for outlines and lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LineStyle {
    /// Continuous line.
    #[default]
    Solid,
    /// Dashed line, dash and gap both one line width long.
    OnOff,
}

/// Pixel transfer mode requested by the caller.
///
/// Rasterizing backends always anti-alias; the mode is kept in the state so recording
/// backends and custom contexts can honor it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DrawMode {
    /// Plain copy.
    #[default]
    Copy,
    /// Bitwise or.
    Or,
    /// Bitwise xor.
    Xor,
    /// Anti-aliased copy.
    AntiAliased,
}

/// Horizontal text placement inside the string rect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TextAlign {
    /// Flush left.
    Left,
    /// Centered.
    #[default]
    Center,
    /// Flush right.
    Right,
}

/// How [`crate::DrawContext::draw_graphics_path`] renders a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathDrawMode {
    /// Non-zero fill with the fill color.
    Filled,
    /// Even-odd fill with the fill color.
    FilledEvenOdd,
    /// Outline with the frame color and line width.
    Stroked,
}

/// Winding rule used when filling a path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FillRule {
    /// Non-zero winding.
    #[default]
    NonZero,
    /// Even-odd winding.
    EvenOdd,
}

/// Font selection. `data` carries the font bytes used by rasterizing contexts.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    /// Family name, used for display and lookup.
    pub family: String,
    /// Size in pixels.
    pub size: f32,
    /// Raw font file bytes, if the font can be shaped.
    pub data: Option<Arc<Vec<u8>>>,
}

impl Default for Font {
    fn default() -> Self {
        Self::new("system", 12.0)
    }
}

impl Font {
    /// Font descriptor without shaping data.
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            data: None,
        }
    }

    /// Attach font bytes.
    pub fn with_data(mut self, bytes: Vec<u8>) -> Self {
        self.data = Some(Arc::new(bytes));
        self
    }

    /// Same font at a different size.
    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }
}

/// Mutable drawing state shared by every [`crate::DrawContext`] implementation.
///
/// `offset` maps local coordinates to device coordinates; `clip` is stored in device
/// coordinates so nested containers can only narrow it.
#[derive(Clone, Debug)]
pub struct DrawState {
    /// Fill color for `fill_*` primitives.
    pub fill_color: Color,
    /// Stroke color for `draw_*` primitives.
    pub frame_color: Color,
    /// Text color.
    pub font_color: Color,
    /// Stroke width in local units.
    pub line_width: f64,
    /// Stroke pattern.
    pub line_style: LineStyle,
    /// Transfer mode.
    pub draw_mode: DrawMode,
    /// Active font.
    pub font: Font,
    /// Opacity multiplier applied to everything drawn.
    pub global_alpha: f32,
    /// Local-to-device translation.
    pub offset: Vec2,
    /// Device-to-screen translation used by mouse queries.
    pub offset_screen: Vec2,
    /// Clip rect in device coordinates.
    pub clip: Rect,
    /// Extra transform applied to local coordinates before `offset`.
    pub transform: Affine,
    /// Pen position for `move_to`/`line_to`, in local coordinates.
    pub pen: Point,
}

impl DrawState {
    /// Fresh state clipped to `bounds`.
    pub fn new(bounds: Rect) -> Self {
        Self {
            fill_color: Color::WHITE,
            frame_color: Color::BLACK,
            font_color: Color::BLACK,
            line_width: 1.0,
            line_style: LineStyle::Solid,
            draw_mode: DrawMode::Copy,
            font: Font::default(),
            global_alpha: 1.0,
            offset: Vec2::ZERO,
            offset_screen: Vec2::ZERO,
            clip: bounds,
            transform: Affine::IDENTITY,
            pen: Point::ZERO,
        }
    }

    /// Combined local-to-device transform.
    pub fn device_transform(&self) -> Affine {
        Affine::translate(self.offset) * self.transform
    }

    /// Map a local point to device coordinates.
    pub fn to_device(&self, p: Point) -> Point {
        self.device_transform() * p
    }
}

/// Offset and clip values saved around recursion into a child container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SavedOffsets {
    pub(crate) offset: Vec2,
    pub(crate) offset_screen: Vec2,
    pub(crate) clip: Rect,
}
