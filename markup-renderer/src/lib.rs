//! # Markup Renderer
//!
//! Software renderer for Markup canvases, built on tiny-skia.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            Renderer (SharedCanvas)          │
//! ├──────────────────────┬──────────────────────┤
//! │ Frame                │ Flattened snapshot   │
//! │ - view · local       │ - local only         │
//! │ - grid, selection    │ - no view/grid/draft │
//! │ - drafts             │                      │
//! ├──────────────────────┴──────────────────────┤
//! │   Compositor (tiny-skia + ab_glyph text)    │
//! ├─────────────────────────────────────────────┤
//! │   Raster I/O (PNG / JPEG, tagged errors)    │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod compositor;
mod convert;
pub mod error;
pub mod raster_io;
pub mod text;

use std::path::PathBuf;
use std::sync::Arc;

use image::RgbaImage;
use markup_core::{Color, SharedCanvas, TextMeasure};
use serde::{Deserialize, Serialize};

pub use cache::{CacheStats, PixmapCache};
pub use compositor::Compositor;
pub use error::{RenderError, RenderResult};
pub use raster_io::{
    encode_raster, load_raster, load_raster_from_bytes, save_raster, save_raster_to, ExportFormat,
    LoadError, SaveError,
};
pub use text::GlyphMetrics;
pub use tiny_skia::Pixmap;

/// Configuration for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Background color. `None` uses the canvas background preset.
    pub background: Option<Color>,
    /// Enable anti-aliasing.
    pub anti_aliasing: bool,
    /// Grid line color.
    pub grid_color: Color,
    /// Distance between grid lines, in canvas units.
    pub grid_spacing: f32,
    /// Grid line width, in canvas units.
    pub grid_width: f32,
    /// Selection outline color.
    pub selection_color: Color,
    /// Selection outline width on screen.
    pub selection_width: f32,
    /// Selection outline dash and gap lengths.
    pub selection_dash: [f32; 2],
    /// Arrow head barb length.
    pub arrow_head_length: f32,
    /// Angle between the shaft and each barb, in degrees.
    pub arrow_head_angle: f32,
    /// Font file used for text items. `None` uses the bundled font.
    pub font_path: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: None,
            anti_aliasing: true,
            grid_color: Color::rgb(0xE0, 0xE0, 0xE0),
            grid_spacing: 100.0,
            grid_width: 2.0,
            selection_color: Color::rgb(0x00, 0x7A, 0xFF),
            selection_width: 3.0,
            selection_dash: [15.0, 15.0],
            arrow_head_length: 40.0,
            arrow_head_angle: 30.0,
            font_path: None,
        }
    }
}

impl RenderConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Config`] if the JSON is malformed.
    pub fn from_json(json: &str) -> RenderResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// The main renderer interface.
///
/// Each call locks the canvas once for the whole pass, so a frame or snapshot
/// never observes a half-applied operation.
#[derive(Debug)]
pub struct Renderer {
    compositor: Compositor,
    frame_count: u64,
}

impl Renderer {
    /// Create a renderer.
    ///
    /// Text uses the configured font file, or the bundled font when none is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the font cannot be loaded.
    pub fn new(config: RenderConfig) -> RenderResult<Self> {
        let glyphs = match config.font_path.as_deref() {
            Some(path) => GlyphMetrics::from_file(path)?,
            None => GlyphMetrics::bundled()?,
        };
        Ok(Self {
            compositor: Compositor::new(config).with_glyphs(glyphs),
            frame_count: 0,
        })
    }

    /// Text metrics matching what this renderer draws.
    #[must_use]
    pub fn text_measure(&self) -> Option<Arc<dyn TextMeasure>> {
        self.compositor
            .glyphs()
            .map(|g| Arc::new(g.clone()) as Arc<dyn TextMeasure>)
    }

    /// Size new text items on `canvas` with this renderer's font, so text
    /// bounds agree with the rendered glyphs.
    pub fn install_text_measure(&self, canvas: &SharedCanvas) {
        if let Some(measure) = self.text_measure() {
            canvas.update(|c| c.set_text_measure(measure));
        }
    }

    /// Render the live view.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame surface cannot be allocated.
    pub fn render(&mut self, canvas: &SharedCanvas) -> RenderResult<Pixmap> {
        let pixmap = {
            let guard = canvas.lock();
            self.compositor.render_frame(&guard)?
        };
        self.frame_count += 1;
        Ok(pixmap)
    }

    /// Render the live view into a straight-alpha raster.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame surface cannot be allocated.
    pub fn render_image(&mut self, canvas: &SharedCanvas) -> RenderResult<RgbaImage> {
        let pixmap = self.render(canvas)?;
        Ok(convert::pixmap_to_image(&pixmap))
    }

    /// Render the live view and encode it as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn render_png(&mut self, canvas: &SharedCanvas) -> RenderResult<Vec<u8>> {
        self.render(canvas)?
            .encode_png()
            .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))
    }

    /// Flatten the canvas into an independent raster. Always succeeds.
    pub fn flattened_raster(&mut self, canvas: &SharedCanvas) -> RgbaImage {
        let guard = canvas.lock();
        self.compositor.flatten(&guard)
    }

    /// Get the current frame count.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the renderer configuration.
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        self.compositor.config()
    }

    /// Pixmap cache statistics.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.compositor.cache_stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_json() {
        let config =
            RenderConfig::from_json(r#"{"grid_spacing": 50.0, "anti_aliasing": false}"#)
                .expect("parse");
        assert!((config.grid_spacing - 50.0).abs() < f32::EPSILON);
        assert!(!config.anti_aliasing);
        assert_eq!(config.selection_dash, [15.0, 15.0]);
        assert_eq!(config.selection_color, Color::rgb(0, 0x7A, 0xFF));
    }

    #[test]
    fn test_bad_config_json() {
        assert!(matches!(
            RenderConfig::from_json("{ nope"),
            Err(RenderError::Config(_))
        ));
    }

    #[test]
    fn test_missing_font_fails_construction() {
        let config = RenderConfig {
            font_path: Some(PathBuf::from("/no/such/font.ttf")),
            ..RenderConfig::default()
        };
        assert!(Renderer::new(config).is_err());
    }

    #[test]
    fn test_frame_count_increments() {
        let mut renderer = Renderer::new(RenderConfig::default()).expect("renderer");
        let canvas = SharedCanvas::default();
        renderer.render(&canvas).expect("frame");
        renderer.render(&canvas).expect("frame");
        assert_eq!(renderer.frame_count(), 2);
        assert!(renderer.text_measure().is_some());
    }
}
