//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Pixel surface could not be allocated.
    #[error("Surface allocation failed: {width}x{height}")]
    Surface {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// Font data could not be parsed.
    #[error("Invalid font: {0}")]
    Font(String),

    /// Resource loading failed.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// Encoding a frame failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// Render configuration could not be parsed.
    #[error("Invalid render config: {0}")]
    Config(#[from] serde_json::Error),
}
