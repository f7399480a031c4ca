use std::collections::HashMap;
use std::sync::Arc;

use crate::draw::state::Font;
use crate::foundation::error::{PlugframeError, PlugframeResult};

/// RGBA8 brush color carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrush {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Parley contexts plus the family names of fonts already registered with them.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    families: HashMap<usize, String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    fn family_for(&mut self, data: &Arc<Vec<u8>>) -> PlugframeResult<String> {
        let key = Arc::as_ptr(data) as usize;
        if let Some(name) = self.families.get(&key) {
            return Ok(name.clone());
        }
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from((**data).clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| PlugframeError::resource("no font families registered from font bytes"))?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| PlugframeError::resource("registered font family has no name"))?
            .to_string();
        self.families.insert(key, name.clone());
        Ok(name)
    }

    /// Single-line layout of `text` in `font`.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        font: &Font,
        brush: TextBrush,
    ) -> PlugframeResult<parley::Layout<TextBrush>> {
        if !font.size.is_finite() || font.size <= 0.0 {
            return Err(PlugframeError::validation("font size must be finite and > 0"));
        }
        let data = font
            .data
            .as_ref()
            .ok_or_else(|| PlugframeError::resource(format!("font '{}' has no data", font.family)))?;
        let family = self.family_for(data)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font.size));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    /// Advance width of `text`, falling back to a size-based estimate without font data.
    pub(crate) fn measure(&mut self, text: &str, font: &Font) -> f64 {
        if font.data.is_some() {
            match self.layout_line(text, font, TextBrush::default()) {
                Ok(layout) => return f64::from(layout.width()),
                Err(e) => tracing::warn!(family = %font.family, "text measure failed: {e}"),
            }
        }
        estimate_width(text, font)
    }
}

/// Width estimate used when no font data is available.
pub(crate) fn estimate_width(text: &str, font: &Font) -> f64 {
    f64::from(font.size) * 0.5 * text.chars().count() as f64
}

#[cfg(test)]
#[path = "../../tests/unit/draw/text.rs"]
mod tests;
