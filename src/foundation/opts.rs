use crate::foundation::core::Color;
use crate::foundation::error::{PlugframeError, PlugframeResult};
use crate::view::UpdateMode;

/// Environment variable overriding [`FrameOpts::animation_interval_ms`].
pub const ANIMATION_INTERVAL_ENV: &str = "PLUGFRAME_ANIMATION_INTERVAL_MS";

/// Frame-wide configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FrameOpts {
    /// Time window in which a second mouse-down counts as a double click.
    pub double_click_ms: u64,
    /// Half-size of the rect around the mouse that must be left before a drag starts.
    pub drag_threshold_px: f64,
    /// Extra delay after the pointer left the observe rect before a drag is reported.
    pub drag_delay_ms: u64,
    /// Upper bound on how long `wait_drag` keeps polling.
    pub drag_timeout_ms: u64,
    /// Whether newly created containers composite through an offscreen buffer.
    pub draw_in_offscreen: bool,
    /// Update policy for newly created containers.
    pub update_mode: UpdateMode,
    /// Animator timer period.
    pub animation_interval_ms: u64,
    /// Frame background color.
    pub background: Color,
}

impl Default for FrameOpts {
    fn default() -> Self {
        Self {
            double_click_ms: 500,
            drag_threshold_px: 2.0,
            drag_delay_ms: 0,
            drag_timeout_ms: 5_000,
            draw_in_offscreen: false,
            update_mode: UpdateMode::Normal,
            animation_interval_ms: 16,
            background: Color::BLACK,
        }
    }
}

impl FrameOpts {
    /// Parse options from JSON. Missing fields take their default values.
    pub fn from_json(text: &str) -> PlugframeResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| PlugframeError::serde(format!("invalid frame options: {e}")))
    }

    /// Apply `PLUGFRAME_*` environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(ms) = std::env::var(ANIMATION_INTERVAL_ENV)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&n| n > 0)
        {
            self.animation_interval_ms = ms;
        }
        self
    }

    /// Return options with a different double-click window.
    pub fn with_double_click_ms(mut self, ms: u64) -> Self {
        self.double_click_ms = ms;
        self
    }

    /// Return options with a different drag threshold.
    pub fn with_drag_threshold_px(mut self, px: f64) -> Self {
        self.drag_threshold_px = px.max(0.0);
        self
    }

    /// Return options with a different drag delay.
    pub fn with_drag_delay_ms(mut self, ms: u64) -> Self {
        self.drag_delay_ms = ms;
        self
    }

    /// Return options with offscreen compositing enabled or disabled by default.
    pub fn with_draw_in_offscreen(mut self, on: bool) -> Self {
        self.draw_in_offscreen = on;
        self
    }

    /// Return options with a different default container update policy.
    pub fn with_update_mode(mut self, mode: UpdateMode) -> Self {
        self.update_mode = mode;
        self
    }

    /// Return options with a different animator period.
    pub fn with_animation_interval_ms(mut self, ms: u64) -> Self {
        self.animation_interval_ms = ms.max(1);
        self
    }

    /// Return options with a different frame background.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/opts.rs"]
mod tests;
