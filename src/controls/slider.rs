//! Horizontal slider.

use crate::controls::control::{Control, ControlBase};
use crate::draw::context::DrawContext;
use crate::draw::input::{MouseButtons, MAX_POLLS};
use crate::foundation::core::{Color, Point, Rect};
use crate::view::{EventResult, KeyCode, View, ViewCx, VirtualKey};

/// Slider whose value follows the pointer's horizontal position while the button is held.
#[derive(Debug)]
pub struct HorizontalSlider {
    base: ControlBase,
    handle_width: f64,
    track_color: Color,
    handle_color: Color,
    key_step: f32,
}

impl HorizontalSlider {
    /// Slider over `[min, max]` with a handle `handle_width` pixels wide.
    pub fn new(min: f32, max: f32, handle_width: f64) -> Self {
        Self {
            base: ControlBase::new(min, max),
            handle_width: handle_width.max(1.0),
            track_color: Color::GREY,
            handle_color: Color::WHITE,
            key_step: 0.05,
        }
    }

    /// Replace the track and handle colors.
    pub fn with_colors(mut self, track: Color, handle: Color) -> Self {
        self.track_color = track;
        self.handle_color = handle;
        self
    }

    /// Handle rect for bounds `size`, in the same space.
    pub fn handle_rect(&self, size: Rect) -> Rect {
        let w = self.handle_width.min(size.width());
        let travel = (size.width() - w).max(0.0);
        let x = size.x0 + travel * f64::from(self.base.normalized());
        Rect::new(x, size.y0, x + w, size.y1)
    }

    fn track_to(&mut self, size: Rect, x: f64) -> bool {
        let w = self.handle_width.min(size.width());
        let travel = size.width() - w;
        let t = if travel <= 0.0 { 0.0 } else { (x - size.x0 - w * 0.5) / travel };
        self.base.set_normalized(t as f32)
    }

    fn changed(&self, cx: &mut ViewCx<'_>) {
        self.base.notify(cx.tag());
        cx.invalid();
    }
}

impl Control for HorizontalSlider {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }
}

impl View for HorizontalSlider {
    fn draw(&mut self, cx: &mut ViewCx<'_>, dc: &mut dyn DrawContext) {
        let size = cx.view_size();
        let prev = dc.fill_color();
        dc.set_fill_color(self.track_color);
        dc.fill_rect(size);
        dc.set_fill_color(self.handle_color);
        dc.fill_rect(self.handle_rect(size));
        dc.set_fill_color(prev);
    }

    fn mouse(
        &mut self,
        cx: &mut ViewCx<'_>,
        dc: &mut dyn DrawContext,
        where_: Point,
        buttons: MouseButtons,
    ) -> EventResult {
        if !buttons.contains(MouseButtons::LEFT) {
            return EventResult::Unhandled;
        }
        let size = cx.view_size();
        if self.track_to(size, where_.x) {
            self.changed(cx);
        }

        let Some(input) = dc.input_device() else {
            return EventResult::Handled;
        };
        let started = input.ticks_ms();
        let timeout = input.timing().drag_timeout_ms;
        for _ in 0..MAX_POLLS {
            input.pump();
            if !dc.get_mouse_buttons().contains(MouseButtons::LEFT)
                || input.ticks_ms().saturating_sub(started) > timeout
            {
                break;
            }
            let p = dc.get_mouse_location();
            if self.track_to(size, p.x) {
                self.changed(cx);
            }
        }
        EventResult::Handled
    }

    fn on_wheel(&mut self, cx: &mut ViewCx<'_>, _dc: &mut dyn DrawContext, _where: Point, distance: f32) -> bool {
        let step = (self.base.max() - self.base.min()) * self.key_step * distance;
        if self.base.set_value(self.base.value() + step) {
            self.changed(cx);
        }
        true
    }

    fn on_key_down(&mut self, cx: &mut ViewCx<'_>, key: &KeyCode) -> EventResult {
        let dir = match key.virt {
            Some(VirtualKey::Left | VirtualKey::Down) => -1.0,
            Some(VirtualKey::Right | VirtualKey::Up) => 1.0,
            _ => return EventResult::Unhandled,
        };
        let step = (self.base.max() - self.base.min()) * self.key_step * dir;
        if self.base.set_value(self.base.value() + step) {
            self.changed(cx);
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
#[path = "../../tests/unit/controls/slider.rs"]
mod tests;
