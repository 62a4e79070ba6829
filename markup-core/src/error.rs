//! Error types for canvas operations.

use thiserror::Error;

use crate::ObjectId;

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in canvas operations.
///
/// None of these are fatal: the canvas is left unchanged whenever one is returned.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Object not found in the store.
    #[error("Object not found: {0}")]
    ObjectNotFound(ObjectId),

    /// Text was empty after trimming whitespace.
    #[error("Text is empty")]
    EmptyText,

    /// Text is longer than the configured maximum.
    #[error("Text too long: {len} characters (max {max})")]
    TextTooLong {
        /// Length of the rejected text, in characters.
        len: usize,
        /// Maximum accepted length.
        max: usize,
    },

    /// Text contains control characters.
    #[error("Text contains control characters")]
    ControlCharacters,

    /// A scale factor that would collapse the transform.
    #[error("Degenerate scale factor: ({sx}, {sy})")]
    DegenerateScale {
        /// Horizontal factor.
        sx: f32,
        /// Vertical factor.
        sy: f32,
    },

    /// A rotation angle that is not a finite number.
    #[error("Invalid rotation angle: {0}")]
    InvalidAngle(f32),

    /// Color string could not be parsed.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
