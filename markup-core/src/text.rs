//! Text measurement used to size text items.

use crate::Rect;

/// Measures rendered text.
///
/// Extents are relative to the text origin: x grows right from the start of the
/// run, y is measured from the baseline (negative above it).
pub trait TextMeasure: Send + Sync {
    /// Extents of `text` set at `font_size`.
    fn measure(&self, text: &str, font_size: f32) -> Rect;
}

/// Fixed-proportion metrics for when no font is loaded.
///
/// Every character advances by the same fraction of the font size.
#[derive(Debug, Clone, Copy)]
pub struct ApproxMetrics {
    /// Advance per character, as a fraction of the font size.
    pub advance: f32,
    /// Height above the baseline, as a fraction of the font size.
    pub ascent: f32,
    /// Depth below the baseline, as a fraction of the font size.
    pub descent: f32,
}

impl Default for ApproxMetrics {
    fn default() -> Self {
        Self {
            advance: 0.55,
            ascent: 0.75,
            descent: 0.2,
        }
    }
}

impl TextMeasure for ApproxMetrics {
    #[allow(clippy::cast_precision_loss)]
    fn measure(&self, text: &str, font_size: f32) -> Rect {
        let chars = text.chars().count() as f32;
        Rect::new(
            0.0,
            -self.ascent * font_size,
            chars * self.advance * font_size,
            self.descent * font_size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approx_metrics_scale_with_size() {
        let metrics = ApproxMetrics::default();
        let small = metrics.measure("abcd", 10.0);
        let large = metrics.measure("abcd", 20.0);
        assert!((large.width() - 2.0 * small.width()).abs() < 1e-4);
        assert!(small.top < 0.0 && small.bottom > 0.0);
        assert!(metrics.measure("", 10.0).is_empty());
    }
}
