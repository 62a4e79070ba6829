//! # Markup Core
//!
//! Model and interaction logic for a touch-driven annotation canvas.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 markup-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Objects         │  Gestures                │
//! │  - Strokes/text  │  - Draw / drag shapes    │
//! │  - Images/shapes │  - Select and translate  │
//! │  - Local affine  │  - Pinch zoom / rotate   │
//! ├─────────────────────────────────────────────┤
//! │  Canvas          │  History                 │
//! │  - Z-ordered     │  - Undo / redo           │
//! │  - View affine   │  - 500-object cap        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Rendering lives in `markup-renderer`; this crate has no pixel output.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod canvas;
pub mod config;
pub mod error;
pub mod event;
pub mod geometry;
pub mod gesture;
pub mod history;
pub mod object;
pub mod shared;
pub mod store;
pub mod style;
pub mod text;
pub mod transform;

pub use canvas::{Canvas, CanvasStatus, Draft, StateListener};
pub use config::{CanvasBackground, CanvasConfig};
pub use error::{CanvasError, CanvasResult};
pub use event::{PointerEvent, PointerPhase};
pub use geometry::{Point, Rect};
pub use gesture::GestureState;
pub use history::History;
pub use object::{DrawingObject, ObjectId, ObjectKind, Raster, BOUNDS_PADDING};
pub use shared::SharedCanvas;
pub use store::{ObjectStore, MAX_OBJECTS};
pub use style::{Blend, Color, PaintMode, ShapeKind, Style, ToolKind, DEFAULT_PALETTE};
pub use text::{ApproxMetrics, TextMeasure};
pub use transform::Affine;

/// Markup core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
