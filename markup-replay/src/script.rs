//! Replay scripts: a JSON list of canvas operations and pointer events.
//!
//! ```json
//! { "steps": [
//!     { "op": "tool", "tool": "marker" },
//!     { "op": "color", "color": "#FF0000" },
//!     { "op": "stroke", "points": [{ "x": 10, "y": 10 }, { "x": 90, "y": 40 }] },
//!     { "op": "pointer", "phase": "down", "pointers": [{ "x": 5, "y": 5 }] },
//!     { "op": "text", "text": "Approved" },
//!     { "op": "undo" }
//! ] }
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use markup_core::{
    CanvasError, Color, Point, PointerEvent, PointerPhase, SharedCanvas, ShapeKind, ToolKind,
};
use markup_renderer::{load_raster, LoadError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that stop a replay.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Script could not be read.
    #[error("Failed to read script {path}: {source}")]
    Io {
        /// Script path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Script is not valid JSON or has unknown steps.
    #[error("Invalid script: {0}")]
    Parse(#[from] serde_json::Error),

    /// A referenced image could not be loaded.
    #[error("Step {index}: {source}")]
    Load {
        /// Index of the failing step.
        index: usize,
        /// Underlying error.
        #[source]
        source: LoadError,
    },
}

/// One scripted operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Switch tools.
    Tool {
        /// Tool to activate.
        tool: ToolKind,
    },
    /// Set the drawing color (`#RRGGBB` or `#AARRGGBB`).
    Color {
        /// Hex color.
        color: String,
    },
    /// Set the stroke width.
    Width {
        /// Requested width (clamped by the canvas).
        width: f32,
    },
    /// Configure the shape tool.
    Shape {
        /// Shape kind.
        kind: ShapeKind,
        /// Whether shapes are filled.
        #[serde(default)]
        filled: bool,
    },
    /// A raw pointer event.
    Pointer(PointerEvent),
    /// A single-finger down/move.../up sequence through `points`.
    Stroke {
        /// Screen positions, in order.
        points: Vec<Point>,
    },
    /// Insert text at the viewport centre.
    Text {
        /// Text content.
        text: String,
    },
    /// Insert an image file at the viewport centre.
    Image {
        /// Image path, relative to the script.
        path: PathBuf,
    },
    /// Set or clear the background raster.
    Background {
        /// Image path, relative to the script. `null` clears.
        path: Option<PathBuf>,
    },
    /// Show or hide the grid.
    Grid {
        /// Grid visibility.
        visible: bool,
    },
    /// Undo the last object.
    Undo,
    /// Redo the last undone object.
    Redo,
    /// Resize the viewport.
    Viewport {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
    /// Reset pan and zoom.
    ResetView,
}

/// A parsed replay script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Steps in order.
    pub steps: Vec<Step>,
}

impl FromStr for Script {
    type Err = ReplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}

impl Script {
    /// Read and parse a script file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ReplayError> {
        let json = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        json.parse()
    }
}

/// Counts reported after a replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    /// Steps applied.
    pub steps: usize,
    /// Steps the canvas rejected (bad color, invalid text).
    pub rejected: usize,
    /// Pointer events that changed what is on screen.
    pub redraws: usize,
}

/// Applies scripts to a shared canvas.
#[derive(Debug, Clone)]
pub struct Replayer {
    canvas: SharedCanvas,
    base_dir: PathBuf,
}

impl Replayer {
    /// Create a replayer resolving paths against the working directory.
    #[must_use]
    pub fn new(canvas: SharedCanvas) -> Self {
        Self {
            canvas,
            base_dir: PathBuf::new(),
        }
    }

    /// Resolve relative image paths against `dir`.
    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    fn pointer(&self, event: &PointerEvent, summary: &mut ReplaySummary) {
        if self.canvas.handle_pointer(event) {
            summary.redraws += 1;
        }
    }

    /// Apply one step.
    ///
    /// Canvas rejections are logged and counted; they do not stop the replay.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::Load`] if a referenced image cannot be loaded.
    pub fn apply(
        &self,
        index: usize,
        step: &Step,
        summary: &mut ReplaySummary,
    ) -> Result<(), ReplayError> {
        tracing::debug!("Step {index}: {step:?}");
        let rejected: Result<(), CanvasError> = match step {
            Step::Tool { tool } => {
                self.canvas.update(|c| c.set_tool(*tool));
                Ok(())
            }
            Step::Color { color } => Color::from_str(color).map(|color| {
                self.canvas.update(|c| c.set_color(color));
            }),
            Step::Width { width } => {
                self.canvas.update(|c| c.set_stroke_width(*width));
                Ok(())
            }
            Step::Shape { kind, filled } => {
                self.canvas.update(|c| {
                    c.set_shape_kind(*kind);
                    c.set_shape_filled(*filled);
                });
                Ok(())
            }
            Step::Pointer(event) => {
                self.pointer(event, summary);
                Ok(())
            }
            Step::Stroke { points } => {
                if let Some((first, rest)) = points.split_first() {
                    self.pointer(&PointerEvent::down(first.x, first.y), summary);
                    for p in rest {
                        self.pointer(&PointerEvent::move_to(p.x, p.y), summary);
                    }
                    let last = rest.last().unwrap_or(first);
                    self.pointer(
                        &PointerEvent::new(PointerPhase::Up, 0, vec![*last]),
                        summary,
                    );
                }
                Ok(())
            }
            Step::Text { text } => self.canvas.update(|c| c.add_text(text)).map(|_| ()),
            Step::Image { path } => {
                let raster = load_raster(&self.resolve(path))
                    .map_err(|source| ReplayError::Load { index, source })?;
                self.canvas.update(|c| c.add_image(raster));
                Ok(())
            }
            Step::Background { path: Some(path) } => {
                let raster = load_raster(&self.resolve(path))
                    .map_err(|source| ReplayError::Load { index, source })?;
                self.canvas.update(|c| c.set_background(raster));
                Ok(())
            }
            Step::Background { path: None } => {
                self.canvas.update(markup_core::Canvas::clear_background);
                Ok(())
            }
            Step::Grid { visible } => {
                self.canvas.update(|c| c.set_grid_visible(*visible));
                Ok(())
            }
            Step::Undo => {
                self.canvas.update(markup_core::Canvas::undo);
                Ok(())
            }
            Step::Redo => {
                self.canvas.update(markup_core::Canvas::redo);
                Ok(())
            }
            Step::Viewport { width, height } => {
                self.canvas.update(|c| c.set_viewport(*width, *height));
                Ok(())
            }
            Step::ResetView => {
                self.canvas.update(markup_core::Canvas::reset_view);
                Ok(())
            }
        };

        summary.steps += 1;
        if let Err(e) = rejected {
            tracing::warn!("Step {index} rejected: {e}");
            summary.rejected += 1;
        }
        Ok(())
    }

    /// Apply every step of a script in order.
    ///
    /// # Errors
    ///
    /// Stops at the first step that fails to load an image.
    pub fn run(&self, script: &Script) -> Result<ReplaySummary, ReplayError> {
        let mut summary = ReplaySummary::default();
        for (index, step) in script.steps.iter().enumerate() {
            self.apply(index, step, &mut summary)?;
        }
        tracing::info!(
            "Replayed {} steps ({} rejected, {} redraws)",
            summary.steps,
            summary.rejected,
            summary.redraws
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_step_kinds() {
        let json = r##"{ "steps": [
            { "op": "tool", "tool": "shape" },
            { "op": "color", "color": "#00FF00" },
            { "op": "width", "width": 4 },
            { "op": "shape", "kind": "arrow" },
            { "op": "pointer", "phase": "down", "pointers": [{ "x": 1, "y": 2 }] },
            { "op": "stroke", "points": [] },
            { "op": "text", "text": "hi" },
            { "op": "image", "path": "stamp.png" },
            { "op": "background", "path": null },
            { "op": "grid", "visible": true },
            { "op": "undo" },
            { "op": "redo" },
            { "op": "viewport", "width": 10, "height": 20 },
            { "op": "reset_view" }
        ] }"##;
        let script: Script = json.parse().expect("parse");
        assert_eq!(script.steps.len(), 14);
        assert_eq!(
            script.steps[3],
            Step::Shape {
                kind: ShapeKind::Arrow,
                filled: false
            }
        );
        assert!(matches!(
            &script.steps[4],
            Step::Pointer(e) if e.phase == PointerPhase::Down && e.pointer_count() == 1
        ));
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        let err = r#"{ "steps": [{ "op": "explode" }] }"#.parse::<Script>().unwrap_err();
        assert!(matches!(err, ReplayError::Parse(_)));
    }

    #[test]
    fn test_rejections_are_counted_not_fatal() {
        let script: Script = r##"{ "steps": [
            { "op": "color", "color": "not-a-color" },
            { "op": "text", "text": "   " },
            { "op": "text", "text": "ok" }
        ] }"##
            .parse()
            .expect("parse");
        let canvas = SharedCanvas::default();
        let summary = Replayer::new(canvas.clone()).run(&script).expect("run");
        assert_eq!(summary.steps, 3);
        assert_eq!(summary.rejected, 2);
        assert_eq!(canvas.read(markup_core::Canvas::object_count), 1);
    }

    #[test]
    fn test_stroke_step_commits_one_object() {
        let script = Script {
            steps: vec![Step::Stroke {
                points: vec![Point::new(5.0, 5.0), Point::new(5.0, 25.0)],
            }],
        };
        let canvas = SharedCanvas::default();
        let summary = Replayer::new(canvas.clone()).run(&script).expect("run");
        assert_eq!(summary.redraws, 3);
        assert_eq!(canvas.read(markup_core::Canvas::object_count), 1);
    }

    #[test]
    fn test_missing_image_stops_replay() {
        let script = Script {
            steps: vec![
                Step::Image {
                    path: PathBuf::from("missing.png"),
                },
                Step::Undo,
            ],
        };
        let dir = tempfile::tempdir().expect("tempdir");
        let err = Replayer::new(SharedCanvas::default())
            .with_base_dir(dir.path())
            .run(&script)
            .unwrap_err();
        assert!(matches!(
            err,
            ReplayError::Load {
                index: 0,
                source: LoadError::NotFound(_)
            }
        ));
    }
}
