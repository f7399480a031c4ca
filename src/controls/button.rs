//! Two-state button.

use crate::bitmap::Bitmap;
use crate::controls::control::{Control, ControlBase};
use crate::draw::context::DrawContext;
use crate::draw::input::MouseButtons;
use crate::foundation::core::{Color, Point};
use crate::view::{EventResult, View, ViewCx};

/// Two-state button that flips between `min` and `max` on each click.
///
/// With a handle bitmap the off frame is the top half and the on frame the bottom half;
/// otherwise the button fills its bounds with the on or off color.
#[derive(Debug)]
pub struct OnOffButton {
    base: ControlBase,
    on_color: Color,
    off_color: Color,
    frames: Option<Bitmap>,
}

impl Default for OnOffButton {
    fn default() -> Self {
        Self::new()
    }
}

impl OnOffButton {
    /// Off button with grey/white fills.
    pub fn new() -> Self {
        Self {
            base: ControlBase::new(0.0, 1.0),
            on_color: Color::WHITE,
            off_color: Color::GREY,
            frames: None,
        }
    }

    /// Use `on` and `off` as fill colors.
    pub fn with_colors(mut self, on: Color, off: Color) -> Self {
        self.on_color = on;
        self.off_color = off;
        self
    }

    /// Paint from a two-frame bitmap instead of solid fills.
    pub fn with_frames(mut self, frames: Bitmap) -> Self {
        self.frames = Some(frames);
        self
    }

    /// `true` when the value is in the upper half of the range.
    pub fn is_on(&self) -> bool {
        self.base.normalized() > 0.5
    }
}

impl Control for OnOffButton {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }
}

impl View for OnOffButton {
    fn draw(&mut self, cx: &mut ViewCx<'_>, dc: &mut dyn DrawContext) {
        let size = cx.view_size();
        match self.frames.as_ref() {
            Some(frames) => {
                let y = if self.is_on() { size.height() } else { 0.0 };
                frames.draw(dc, size, Point::new(0.0, y));
            }
            None => {
                let prev = dc.fill_color();
                dc.set_fill_color(if self.is_on() { self.on_color } else { self.off_color });
                dc.fill_rect(size);
                dc.set_fill_color(prev);
            }
        }
    }

    fn mouse(
        &mut self,
        cx: &mut ViewCx<'_>,
        _dc: &mut dyn DrawContext,
        _where: Point,
        buttons: MouseButtons,
    ) -> EventResult {
        if !buttons.contains(MouseButtons::LEFT) {
            return EventResult::Unhandled;
        }
        let next = if self.is_on() { self.base.min() } else { self.base.max() };
        if self.base.set_value(next) {
            self.base.notify(cx.tag());
            cx.invalid();
        }
        EventResult::Handled
    }

    fn wants_focus(&self) -> bool {
        true
    }

    fn as_control(&self) -> Option<&dyn Control> {
        Some(self)
    }

    fn as_control_mut(&mut self) -> Option<&mut dyn Control> {
        Some(self)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/controls/button.rs"]
mod tests;
