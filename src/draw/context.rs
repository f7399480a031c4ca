use std::rc::Rc;

use kurbo::Shape;

use crate::draw::input::{InputDevice, MAX_POLLS, MouseButtons};
use crate::draw::pixels::{BlitMode, PixelBuffer, PixelView};
use crate::draw::state::{
    DrawMode, DrawState, FillRule, Font, LineStyle, PathDrawMode, SavedOffsets, TextAlign,
};
use crate::draw::text::estimate_width;
use crate::foundation::core::{Affine, BezPath, Color, Point, Rect, RectExt, Vec2};

const TOLERANCE: f64 = 0.1;

/// Paint source for [`DrawContext::fill_shape`], in device coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    /// Uniform color.
    Solid(Color),
    /// Linear ramp from `start` (`from`) to `end` (`to`).
    LinearGradient {
        /// Ramp start point.
        start: Point,
        /// Ramp end point.
        end: Point,
        /// Color at `start`.
        from: Color,
        /// Color at `end`.
        to: Color,
    },
}

/// One line of text to place on the surface.
#[derive(Clone, Debug)]
pub struct TextRun<'a> {
    /// Text to draw.
    pub text: &'a str,
    /// Device-space top-left corner of the line box.
    pub origin: Point,
    /// Font to shape with.
    pub font: &'a Font,
    /// Text color, global alpha already applied.
    pub color: Color,
}

/// Stateful 2D drawing surface.
///
/// Implementations supply a handful of device-space hooks (`fill_shape`, `blit`,
/// `draw_text_run`, ...). Every local-space primitive is provided on top of them and
/// honors the state in [`DrawState`]: colors, line style, global alpha, the local-to-device
/// offset and transform, and the device-space clip.
pub trait DrawContext {
    /// Current drawing state.
    fn state(&self) -> &DrawState;
    /// Mutable drawing state.
    fn state_mut(&mut self) -> &mut DrawState;
    /// Device-space bounds of the surface.
    fn surface_bounds(&self) -> Rect;

    /// Fill a device-space path, restricted to the current clip.
    fn fill_shape(&mut self, path: &BezPath, paint: &Paint, rule: FillRule);

    /// Stroke a device-space path.
    fn stroke_shape(&mut self, path: &BezPath, color: Color, stroke: &kurbo::Stroke) {
        let outline = kurbo::stroke(
            path.iter(),
            stroke,
            &kurbo::StrokeOpts::default(),
            TOLERANCE,
        );
        self.fill_shape(&outline, &Paint::Solid(color), FillRule::NonZero);
    }

    /// Copy `src_rect` of `src` so its top-left lands on the device point `dest`.
    fn blit(&mut self, src: PixelView<'_>, src_rect: Rect, dest: Point, mode: BlitMode, alpha: f32);

    /// Draw one line of text.
    fn draw_text_run(&mut self, run: &TextRun<'_>);

    /// Advance width of `text` in `font`.
    fn measure_text(&mut self, text: &str, font: &Font) -> f64 {
        estimate_width(text, font)
    }

    /// Read a device pixel (straight alpha). Contexts without pixel storage return `None`.
    fn read_pixel(&mut self, _device: Point) -> Option<Color> {
        None
    }

    /// Write a device pixel.
    fn write_pixel(&mut self, device: Point, color: Color) {
        let px = Rect::new(device.x, device.y, device.x + 1.0, device.y + 1.0);
        self.fill_shape(&px.to_path(TOLERANCE), &Paint::Solid(color), FillRule::NonZero);
    }

    /// Flood-fill the 4-connected region of equal color around a device pixel.
    fn flood_fill_device(&mut self, _device: Point, _color: Color) {}

    /// Copy out a device-space rect of premultiplied pixels.
    fn read_pixels(&mut self, _device_rect: Rect) -> Option<PixelBuffer> {
        None
    }

    /// Live input source, if the context is bound to one.
    fn input_device(&self) -> Option<Rc<dyn InputDevice>> {
        None
    }

    /// Push pending work to the underlying surface.
    fn flush(&mut self) {}

    /// Fill color.
    fn fill_color(&self) -> Color {
        self.state().fill_color
    }

    /// Set the fill color.
    fn set_fill_color(&mut self, color: Color) {
        self.state_mut().fill_color = color;
    }

    /// Stroke color.
    fn frame_color(&self) -> Color {
        self.state().frame_color
    }

    /// Set the stroke color.
    fn set_frame_color(&mut self, color: Color) {
        self.state_mut().frame_color = color;
    }

    /// Text color.
    fn font_color(&self) -> Color {
        self.state().font_color
    }

    /// Set the text color.
    fn set_font_color(&mut self, color: Color) {
        self.state_mut().font_color = color;
    }

    /// Stroke width.
    fn line_width(&self) -> f64 {
        self.state().line_width
    }

    /// Set the stroke width. Negative widths clamp to zero.
    fn set_line_width(&mut self, width: f64) {
        self.state_mut().line_width = width.max(0.0);
    }

    /// Stroke pattern.
    fn line_style(&self) -> LineStyle {
        self.state().line_style
    }

    /// Set the stroke pattern.
    fn set_line_style(&mut self, style: LineStyle) {
        self.state_mut().line_style = style;
    }

    /// Transfer mode.
    fn draw_mode(&self) -> DrawMode {
        self.state().draw_mode
    }

    /// Set the transfer mode.
    fn set_draw_mode(&mut self, mode: DrawMode) {
        self.state_mut().draw_mode = mode;
    }

    /// Active font.
    fn font(&self) -> &Font {
        &self.state().font
    }

    /// Set the active font.
    fn set_font(&mut self, font: Font) {
        self.state_mut().font = font;
    }

    /// Global opacity multiplier.
    fn global_alpha(&self) -> f32 {
        self.state().global_alpha
    }

    /// Set the global opacity multiplier.
    fn set_global_alpha(&mut self, alpha: f32) {
        self.state_mut().global_alpha = alpha.clamp(0.0, 1.0);
    }

    /// Local-to-device translation.
    fn offset(&self) -> Vec2 {
        self.state().offset
    }

    /// Set the local-to-device translation.
    fn set_offset(&mut self, offset: Vec2) {
        self.state_mut().offset = offset;
    }

    /// Device-to-screen translation.
    fn offset_screen(&self) -> Vec2 {
        self.state().offset_screen
    }

    /// Set the device-to-screen translation.
    fn set_offset_screen(&mut self, offset: Vec2) {
        self.state_mut().offset_screen = offset;
    }

    /// Extra local transform.
    fn transform(&self) -> Affine {
        self.state().transform
    }

    /// Set the extra local transform.
    fn set_transform(&mut self, transform: Affine) {
        self.state_mut().transform = transform;
    }

    /// Clip rect in local coordinates.
    fn clip_rect(&self) -> Rect {
        let s = self.state();
        s.clip - s.offset
    }

    /// Replace the clip with a local rect, bounded by the surface.
    fn set_clip_rect(&mut self, rect: Rect) {
        let device = (rect + self.state().offset).bound(self.surface_bounds());
        self.state_mut().clip = device;
    }

    /// Clip rect in device coordinates.
    fn clip_rect_device(&self) -> Rect {
        self.state().clip
    }

    /// Replace the device clip.
    fn set_clip_rect_device(&mut self, rect: Rect) {
        self.state_mut().clip = rect;
    }

    /// Reset the clip to the whole surface.
    fn reset_clip(&mut self) {
        let b = self.surface_bounds();
        self.state_mut().clip = b;
    }

    /// Narrow the clip to a local rect and return the previous device clip.
    fn intersect_clip(&mut self, rect: Rect) -> Rect {
        let prev = self.state().clip;
        let device = (rect + self.state().offset).bound(prev);
        self.state_mut().clip = device;
        prev
    }

    /// Shift offsets by a container origin before painting its children.
    fn modify_for_container(&mut self, origin: Vec2) -> SavedOffsets {
        let s = self.state_mut();
        let saved = SavedOffsets {
            offset: s.offset,
            offset_screen: s.offset_screen,
            clip: s.clip,
        };
        s.offset += origin;
        s.offset_screen += origin;
        saved
    }

    /// Undo [`DrawContext::modify_for_container`].
    fn restore_offsets(&mut self, saved: SavedOffsets) {
        let s = self.state_mut();
        s.offset = saved.offset;
        s.offset_screen = saved.offset_screen;
        s.clip = saved.clip;
    }

    /// Copy of the whole state.
    fn save(&self) -> DrawState {
        self.state().clone()
    }

    /// Restore a state captured with [`DrawContext::save`].
    fn restore(&mut self, state: DrawState) {
        *self.state_mut() = state;
    }

    /// Move the pen without drawing.
    fn move_to(&mut self, p: Point) {
        self.state_mut().pen = p;
    }

    /// Draw from the pen to `p` and move the pen there.
    fn line_to(&mut self, p: Point) {
        let from = self.state().pen;
        self.draw_line(from, p);
        self.state_mut().pen = p;
    }

    /// Draw a line segment.
    fn draw_line(&mut self, from: Point, to: Point) {
        let mut path = BezPath::new();
        path.move_to(from);
        path.line_to(to);
        stroke_local(self, &path);
    }

    /// Draw connected line segments.
    fn poly_line(&mut self, points: &[Point]) {
        if let Some(path) = polygon_path(points, false) {
            stroke_local(self, &path);
        }
        if let Some(last) = points.last() {
            self.state_mut().pen = *last;
        }
    }

    /// Outline a rect.
    fn draw_rect(&mut self, rect: Rect) {
        stroke_local(self, &rect.to_path(TOLERANCE));
    }

    /// Fill a rect.
    fn fill_rect(&mut self, rect: Rect) {
        fill_local(self, &rect.to_path(TOLERANCE), FillRule::NonZero);
    }

    /// Outline the ellipse inscribed in `rect`.
    fn draw_ellipse(&mut self, rect: Rect) {
        stroke_local(self, &kurbo::Ellipse::from_rect(rect).to_path(TOLERANCE));
    }

    /// Fill the ellipse inscribed in `rect`.
    fn fill_ellipse(&mut self, rect: Rect) {
        fill_local(
            self,
            &kurbo::Ellipse::from_rect(rect).to_path(TOLERANCE),
            FillRule::NonZero,
        );
    }

    /// Outline an elliptic arc inscribed in `rect`. Angles in degrees, clockwise from three o'clock.
    fn draw_arc(&mut self, rect: Rect, start_deg: f64, end_deg: f64) {
        let arc = arc_in(rect, start_deg, end_deg);
        stroke_local(self, &arc.to_path(TOLERANCE));
    }

    /// Fill a pie slice inscribed in `rect`.
    fn fill_arc(&mut self, rect: Rect, start_deg: f64, end_deg: f64) {
        let arc = arc_in(rect, start_deg, end_deg);
        let mut path = BezPath::new();
        path.move_to(arc.center);
        let (sin, cos) = arc.start_angle.sin_cos();
        path.line_to(arc.center + Vec2::new(arc.radii.x * cos, arc.radii.y * sin));
        path.extend(arc.append_iter(TOLERANCE));
        path.close_path();
        fill_local(self, &path, FillRule::NonZero);
    }

    /// Outline a closed polygon.
    fn draw_polygon(&mut self, points: &[Point]) {
        if let Some(path) = polygon_path(points, true) {
            stroke_local(self, &path);
        }
    }

    /// Fill a closed polygon.
    fn fill_polygon(&mut self, points: &[Point]) {
        if let Some(path) = polygon_path(points, true) {
            fill_local(self, &path, FillRule::NonZero);
        }
    }

    /// Width of `text` in the active font.
    fn string_width(&mut self, text: &str) -> f64 {
        let font = self.state().font.clone();
        self.measure_text(text, &font)
    }

    /// Draw `text` vertically centered in `rect`. `opaque` fills `rect` with the fill color first.
    fn draw_string(&mut self, text: &str, rect: Rect, align: TextAlign, opaque: bool) {
        if opaque {
            self.fill_rect(rect);
        }
        if text.is_empty() {
            return;
        }
        let font = self.state().font.clone();
        let width = self.measure_text(text, &font);
        let x = match align {
            TextAlign::Left => rect.x0,
            TextAlign::Center => rect.center().x - width * 0.5,
            TextAlign::Right => rect.x1 - width,
        };
        let line_height = f64::from(font.size) * 1.2;
        let y = rect.center().y - line_height * 0.5;

        let prev = self.intersect_clip(rect);
        if !self.state().clip.is_void() {
            let s = self.state();
            let run = TextRun {
                text,
                origin: s.to_device(Point::new(x, y)),
                font: &font,
                color: s.font_color.scale_alpha(s.global_alpha),
            };
            self.draw_text_run(&run);
        }
        self.set_clip_rect_device(prev);
    }

    /// Fill or stroke `path`, optionally pre-transformed by `transform`.
    fn draw_graphics_path(&mut self, path: &BezPath, mode: PathDrawMode, transform: Option<Affine>) {
        let local = match transform {
            Some(t) => t * path.clone(),
            None => path.clone(),
        };
        match mode {
            PathDrawMode::Filled => fill_local(self, &local, FillRule::NonZero),
            PathDrawMode::FilledEvenOdd => fill_local(self, &local, FillRule::EvenOdd),
            PathDrawMode::Stroked => stroke_local(self, &local),
        }
    }

    /// Fill `path` with a linear gradient from `start` to `end` (local coordinates).
    fn fill_linear_gradient(
        &mut self,
        path: &BezPath,
        start: Point,
        end: Point,
        from: Color,
        to: Color,
        transform: Option<Affine>,
    ) {
        if self.state().clip.is_void() {
            return;
        }
        let s = self.state();
        let t = s.device_transform() * transform.unwrap_or(Affine::IDENTITY);
        let alpha = s.global_alpha;
        let device = t * path.clone();
        let paint = Paint::LinearGradient {
            start: t * start,
            end: t * end,
            from: from.scale_alpha(alpha),
            to: to.scale_alpha(alpha),
        };
        self.fill_shape(&device, &paint, FillRule::NonZero);
    }

    /// Set a single pixel at a local point.
    fn draw_point(&mut self, p: Point, color: Color) {
        let device = self.state().to_device(p);
        if self.state().clip.point_inside(device) {
            self.write_pixel(device, color);
        }
    }

    /// Read a single pixel at a local point.
    fn get_point(&mut self, p: Point) -> Option<Color> {
        let device = self.state().to_device(p);
        self.read_pixel(device)
    }

    /// Flood-fill with the fill color starting at a local point.
    fn flood_fill(&mut self, p: Point) {
        let device = self.state().to_device(p);
        if self.state().clip.point_inside(device) {
            let color = self.state().fill_color;
            self.flood_fill_device(device, color);
        }
    }

    /// Buttons currently held, or none without an input device.
    fn get_mouse_buttons(&self) -> MouseButtons {
        self.input_device()
            .map(|i| i.mouse_buttons())
            .unwrap_or(MouseButtons::NONE)
    }

    /// Pointer position relative to this context's screen offset.
    fn get_mouse_location(&self) -> Point {
        match self.input_device() {
            Some(i) => i.mouse_location() - self.state().offset_screen,
            None => Point::ZERO,
        }
    }

    /// Poll for a second click near the current pointer position.
    ///
    /// Returns `true` once the button is released and pressed again inside the double-click
    /// window; `false` on timeout or when the pointer leaves the observe rect.
    fn wait_double_click(&mut self) -> bool {
        let Some(input) = self.input_device() else {
            return false;
        };
        let timing = input.timing();
        let observe = observe_rect(input.mouse_location(), timing.drag_threshold_px);
        let deadline = input.ticks_ms().saturating_add(timing.double_click_ms);
        let mut released = !input.mouse_buttons().any_button();

        for _ in 0..MAX_POLLS {
            input.pump();
            if input.ticks_ms() >= deadline || !observe.contains(input.mouse_location()) {
                return false;
            }
            if !input.mouse_buttons().any_button() {
                released = true;
            } else if released {
                return true;
            }
        }
        false
    }

    /// Poll while the primary button is held and report whether the pointer started a drag.
    fn wait_drag(&mut self) -> bool {
        let Some(input) = self.input_device() else {
            return false;
        };
        if !input.mouse_buttons().contains(MouseButtons::LEFT) {
            return false;
        }
        let timing = input.timing();
        let observe = observe_rect(input.mouse_location(), timing.drag_threshold_px);
        let started = input.ticks_ms();
        let mut left_at: Option<u64> = None;

        for _ in 0..MAX_POLLS {
            input.pump();
            if !input.mouse_buttons().contains(MouseButtons::LEFT) {
                return false;
            }
            let now = input.ticks_ms();
            if now.saturating_sub(started) > timing.drag_timeout_ms {
                return false;
            }
            match left_at {
                None if !observe.contains(input.mouse_location()) => {
                    if timing.drag_delay_ms == 0 {
                        return true;
                    }
                    left_at = Some(now);
                }
                Some(t) if now.saturating_sub(t) >= timing.drag_delay_ms => return true,
                _ => {}
            }
        }
        false
    }
}

fn observe_rect(center: Point, half: f64) -> Rect {
    Rect::new(
        center.x - half,
        center.y - half,
        center.x + half,
        center.y + half,
    )
}

fn arc_in(rect: Rect, start_deg: f64, end_deg: f64) -> kurbo::Arc {
    let mut sweep = end_deg - start_deg;
    if sweep <= 0.0 {
        sweep += 360.0;
    }
    kurbo::Arc::new(
        rect.center(),
        Vec2::new(rect.width() * 0.5, rect.height() * 0.5),
        start_deg.to_radians(),
        sweep.to_radians(),
        0.0,
    )
}

fn polygon_path(points: &[Point], close: bool) -> Option<BezPath> {
    let (first, rest) = points.split_first()?;
    let mut path = BezPath::new();
    path.move_to(*first);
    for p in rest {
        path.line_to(*p);
    }
    if close {
        path.close_path();
    }
    Some(path)
}

fn fill_local<C: DrawContext + ?Sized>(dc: &mut C, path: &BezPath, rule: FillRule) {
    let s = dc.state();
    if s.clip.is_void() {
        return;
    }
    let device = s.device_transform() * path.clone();
    let color = s.fill_color.scale_alpha(s.global_alpha);
    dc.fill_shape(&device, &Paint::Solid(color), rule);
}

fn stroke_local<C: DrawContext + ?Sized>(dc: &mut C, path: &BezPath) {
    let s = dc.state();
    if s.clip.is_void() || s.line_width <= 0.0 {
        return;
    }
    let t = s.device_transform();
    let scale = t.determinant().abs().sqrt();
    let width = s.line_width * scale;
    let mut stroke = kurbo::Stroke::new(width);
    if s.line_style == LineStyle::OnOff {
        stroke = stroke.with_dashes(0.0, [width, width]);
    }
    let color = s.frame_color.scale_alpha(s.global_alpha);
    let device = t * path.clone();
    dc.stroke_shape(&device, color, &stroke);
}

#[cfg(test)]
#[path = "../../tests/unit/draw/context.rs"]
mod tests;
