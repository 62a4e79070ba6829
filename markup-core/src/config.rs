//! Canvas configuration.

use serde::{Deserialize, Serialize};

use crate::store::MAX_OBJECTS;
use crate::Color;

/// Background presets for the canvas surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasBackground {
    /// Plain white.
    #[default]
    White,
    /// Warm paper tone.
    Paper,
    /// Near-black.
    Dark,
}

impl CanvasBackground {
    /// The preset's color.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::White => Color::WHITE,
            Self::Paper => Color::rgb(0xFF, 0xF8, 0xE1),
            Self::Dark => Color::rgb(0x12, 0x12, 0x12),
        }
    }
}

/// Configuration for a [`Canvas`](crate::Canvas).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,
    /// Maximum number of objects before the oldest is evicted.
    pub max_objects: usize,
    /// Smallest accepted stroke width.
    pub min_stroke_width: f32,
    /// Largest accepted stroke width.
    pub max_stroke_width: f32,
    /// Stroke width for a fresh canvas.
    pub default_stroke_width: f32,
    /// Longest accepted text, in characters.
    pub max_text_length: usize,
    /// Width used to size inserted text (font size is five times this).
    pub text_width: f32,
    /// Background preset.
    pub background: CanvasBackground,
    /// Whether the grid starts visible.
    pub show_grid: bool,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            max_objects: MAX_OBJECTS,
            min_stroke_width: 1.0,
            max_stroke_width: 100.0,
            default_stroke_width: 10.0,
            max_text_length: 100,
            text_width: 10.0,
            background: CanvasBackground::White,
            show_grid: false,
        }
    }
}

impl CanvasConfig {
    /// Replace a non-finite or inverted stroke width range with the defaults.
    #[must_use]
    pub fn validated(mut self) -> Self {
        let (min, max) = (self.min_stroke_width, self.max_stroke_width);
        if !(min.is_finite() && max.is_finite() && min <= max) {
            let defaults = Self::default();
            tracing::warn!(
                "Invalid stroke width range [{min}, {max}], using [{}, {}]",
                defaults.min_stroke_width,
                defaults.max_stroke_width
            );
            self.min_stroke_width = defaults.min_stroke_width;
            self.max_stroke_width = defaults.max_stroke_width;
        }
        self
    }

    /// Clamp a stroke width into the accepted range.
    ///
    /// NaN maps to the minimum. Never panics, even on an unvalidated range.
    #[must_use]
    pub fn clamp_stroke_width(&self, width: f32) -> f32 {
        if width.is_nan() {
            return self.min_stroke_width;
        }
        width.max(self.min_stroke_width).min(self.max_stroke_width)
    }
}
