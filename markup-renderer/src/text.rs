//! Font-backed text measurement and glyph outlines.

use std::path::Path;

use ab_glyph::{Font, FontArc, GlyphId, OutlineCurve, ScaleFont};
use markup_core::{Point, Rect, TextMeasure};
use tiny_skia::PathBuilder;

use crate::error::{RenderError, RenderResult};

/// Text metrics and outlines from a loaded font.
#[derive(Clone)]
pub struct GlyphMetrics {
    font: FontArc,
}

impl std::fmt::Debug for GlyphMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphMetrics")
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

impl GlyphMetrics {
    /// Parse a TrueType/OpenType font.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Font`] if the data is not a usable font.
    pub fn from_bytes(bytes: Vec<u8>) -> RenderResult<Self> {
        let font = FontArc::try_from_vec(bytes).map_err(|e| RenderError::Font(e.to_string()))?;
        Ok(Self { font })
    }

    /// Parse a font embedded in the binary.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Font`] if the data is not a usable font.
    pub fn from_static(bytes: &'static [u8]) -> RenderResult<Self> {
        let font = FontArc::try_from_slice(bytes).map_err(|e| RenderError::Font(e.to_string()))?;
        Ok(Self { font })
    }

    /// The font used when no font file is configured (Ubuntu Light).
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Font`] if the embedded font fails to parse.
    pub fn bundled() -> RenderResult<Self> {
        Self::from_static(epaint_default_fonts::UBUNTU_LIGHT)
    }

    /// Load a font file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> RenderResult<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| RenderError::Resource(format!("{}: {e}", path.display())))?;
        let metrics = Self::from_bytes(bytes)?;
        tracing::info!("Loaded font {}", path.display());
        Ok(metrics)
    }

    /// Glyphs and their pen x positions, with kerning.
    fn layout(&self, text: &str, font_size: f32) -> (Vec<(GlyphId, f32)>, f32) {
        let scaled = self.font.as_scaled(font_size);
        let mut glyphs = Vec::with_capacity(text.len());
        let mut cursor_x = 0.0f32;
        let mut last: Option<GlyphId> = None;
        for ch in text.chars() {
            let id = self.font.glyph_id(ch);
            if let Some(prev) = last {
                cursor_x += scaled.kern(prev, id);
            }
            glyphs.push((id, cursor_x));
            cursor_x += scaled.h_advance(id);
            last = Some(id);
        }
        (glyphs, cursor_x)
    }

    /// Outline of `text` with its baseline starting at `origin`.
    ///
    /// Returns `None` when no glyph has an outline (e.g., only spaces).
    #[must_use]
    pub fn outline(&self, text: &str, origin: Point, font_size: f32) -> Option<tiny_skia::Path> {
        let scaled = self.font.as_scaled(font_size);
        let (h, v) = (scaled.h_scale_factor(), scaled.v_scale_factor());
        let (glyphs, _) = self.layout(text, font_size);

        let mut pb = PathBuilder::new();
        for (id, pen_x) in glyphs {
            let Some(outline) = self.font.outline(id) else {
                continue;
            };
            let x0 = origin.x + pen_x;
            // Font units point up; flip onto the baseline.
            let map = |p: ab_glyph::Point| (x0 + p.x * h, origin.y - p.y * v);
            let mut cursor: Option<ab_glyph::Point> = None;
            for curve in &outline.curves {
                let start = match curve {
                    OutlineCurve::Line(p0, _)
                    | OutlineCurve::Quad(p0, _, _)
                    | OutlineCurve::Cubic(p0, _, _, _) => *p0,
                };
                if cursor != Some(start) {
                    if cursor.is_some() {
                        pb.close();
                    }
                    let (x, y) = map(start);
                    pb.move_to(x, y);
                }
                match *curve {
                    OutlineCurve::Line(_, p1) => {
                        let (x, y) = map(p1);
                        pb.line_to(x, y);
                        cursor = Some(p1);
                    }
                    OutlineCurve::Quad(_, c, p1) => {
                        let (cx, cy) = map(c);
                        let (x, y) = map(p1);
                        pb.quad_to(cx, cy, x, y);
                        cursor = Some(p1);
                    }
                    OutlineCurve::Cubic(_, c1, c2, p1) => {
                        let (c1x, c1y) = map(c1);
                        let (c2x, c2y) = map(c2);
                        let (x, y) = map(p1);
                        pb.cubic_to(c1x, c1y, c2x, c2y, x, y);
                        cursor = Some(p1);
                    }
                }
            }
            if cursor.is_some() {
                pb.close();
            }
        }
        pb.finish()
    }
}

impl TextMeasure for GlyphMetrics {
    fn measure(&self, text: &str, font_size: f32) -> Rect {
        let scaled = self.font.as_scaled(font_size);
        let (_, width) = self.layout(text, font_size);
        Rect::new(0.0, -scaled.ascent(), width, -scaled.descent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_is_not_a_font() {
        let err = GlyphMetrics::from_bytes(b"definitely not a font".to_vec()).unwrap_err();
        assert!(matches!(err, RenderError::Font(_)));
    }

    #[test]
    fn test_bundled_font_measures_and_outlines() {
        let glyphs = GlyphMetrics::bundled().expect("bundled font");
        let extents = glyphs.measure("Hello", 50.0);
        assert!(extents.width() > 50.0);
        assert!(extents.top < 0.0 && extents.bottom > 0.0);
        assert!(glyphs.outline("Hello", Point::new(0.0, 50.0), 50.0).is_some());
        assert!(glyphs.outline("   ", Point::new(0.0, 50.0), 50.0).is_none());
    }

    #[test]
    fn test_missing_font_file() {
        let err = GlyphMetrics::from_file(Path::new("/nonexistent/font.ttf")).unwrap_err();
        assert!(matches!(err, RenderError::Resource(_)));
    }
}
