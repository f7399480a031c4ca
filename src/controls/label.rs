//! Static text view.

use crate::draw::context::DrawContext;
use crate::draw::state::{Font, TextAlign};
use crate::foundation::core::Color;
use crate::view::{View, ViewCx, ViewData};

/// Static text. Never takes mouse input.
#[derive(Clone, Debug)]
pub struct TextLabel {
    text: String,
    align: TextAlign,
    font: Font,
    font_color: Color,
    back_color: Option<Color>,
}

impl TextLabel {
    /// Centered label in the default font.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            align: TextAlign::Center,
            font: Font::default(),
            font_color: Color::WHITE,
            back_color: None,
        }
    }

    /// Replace the alignment.
    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    /// Replace the font.
    pub fn with_font(mut self, font: Font) -> Self {
        self.font = font;
        self
    }

    /// Replace the text color.
    pub fn with_font_color(mut self, color: Color) -> Self {
        self.font_color = color;
        self
    }

    /// Fill the label bounds with `color` behind the text.
    pub fn with_back_color(mut self, color: Color) -> Self {
        self.back_color = Some(color);
        self
    }

    /// Current text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text. The caller invalidates the view.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

impl View for TextLabel {
    fn configure(&self, data: &mut ViewData) {
        data.mouse_enabled = false;
    }

    fn draw(&mut self, cx: &mut ViewCx<'_>, dc: &mut dyn DrawContext) {
        let saved = dc.save();
        dc.set_font(self.font.clone());
        dc.set_font_color(self.font_color);
        if let Some(back) = self.back_color {
            dc.set_fill_color(back);
        }
        dc.draw_string(&self.text, cx.view_size(), self.align, self.back_color.is_some());
        dc.restore(saved);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/controls/label.rs"]
mod tests;
