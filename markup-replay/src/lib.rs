//! # Markup Replay
//!
//! Replays a JSON script of canvas operations and pointer events against a
//! fresh canvas, then writes the flattened snapshot (or the live frame).
//!
//! ## Usage
//!
//! ```bash
//! markup-replay session.json --out ./exports --format jpeg
//! ```
//!
//! ## With a font and a config file:
//!
//! ```bash
//! markup-replay session.json --font DejaVuSans.ttf --config markup.json --frame
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

pub mod script;

use std::path::{Path, PathBuf};

use clap::Parser;
use markup_core::{CanvasBackground, CanvasConfig};
use markup_renderer::{ExportFormat, RenderConfig};
use serde::{Deserialize, Serialize};

pub use script::{ReplayError, ReplaySummary, Replayer, Script, Step};

/// Command-line arguments for markup-replay.
#[derive(Debug, Clone, Parser)]
#[command(name = "markup-replay")]
#[command(about = "Replay scripted annotation sessions and export the result")]
#[command(version)]
pub struct CliArgs {
    /// Script to replay (JSON)
    pub script: PathBuf,

    /// JSON config file with optional `canvas` and `render` sections
    #[arg(long, env = "MARKUP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Viewport width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Viewport height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Background preset (white, paper, dark)
    #[arg(long, value_parser = parse_background)]
    pub background: Option<CanvasBackground>,

    /// Start with the grid visible
    #[arg(long)]
    pub grid: bool,

    /// Font file for text items (defaults to the bundled font)
    #[arg(long, env = "MARKUP_FONT")]
    pub font: Option<PathBuf>,

    /// Directory for the timestamped output file
    #[arg(long, env = "MARKUP_OUT_DIR", default_value = ".")]
    pub out: PathBuf,

    /// Exact output file, overriding --out
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Output format (png, jpeg)
    #[arg(long, default_value = "png")]
    pub format: ExportFormat,

    /// Write the live frame (view, grid, selection) instead of the flattened snapshot
    #[arg(long)]
    pub frame: bool,

    /// Print the final canvas status as JSON
    #[arg(long)]
    pub status: bool,
}

/// Parse a background preset name.
///
/// # Errors
///
/// Returns a message naming the accepted presets.
pub fn parse_background(s: &str) -> Result<CanvasBackground, String> {
    match s.to_lowercase().as_str() {
        "white" => Ok(CanvasBackground::White),
        "paper" => Ok(CanvasBackground::Paper),
        "dark" => Ok(CanvasBackground::Dark),
        _ => Err(format!("unknown background '{s}' (white, paper, dark)")),
    }
}

/// Canvas and render settings for a replay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Canvas settings.
    pub canvas: CanvasConfig,
    /// Render settings.
    pub render: RenderConfig,
}

impl ReplayConfig {
    /// Read a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Build the effective config: file (if any), then command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded.
    pub fn resolve(args: &CliArgs) -> anyhow::Result<Self> {
        let mut config = match args.config {
            Some(ref path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(args);
        Ok(config)
    }

    fn apply_overrides(&mut self, args: &CliArgs) {
        if let Some(width) = args.width {
            self.canvas.width = width;
        }
        if let Some(height) = args.height {
            self.canvas.height = height;
        }
        if let Some(background) = args.background {
            self.canvas.background = background;
        }
        if args.grid {
            self.canvas.show_grid = true;
        }
        if args.font.is_some() {
            self.render.font_path.clone_from(&args.font);
        }
    }
}
