//! Drawing objects - the building blocks of a canvas.

use std::sync::Arc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::text::TextMeasure;
use crate::{Affine, Point, Rect, ShapeKind, Style, ToolKind};

/// Slack added around strokes, text and shapes so they are easy to touch.
pub const BOUNDS_PADDING: f32 = 20.0;

/// Shared, immutable raster buffer.
pub type Raster = Arc<RgbaImage>;

/// Unique identifier for a drawing object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Create a new unique object ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The content an object draws.
#[derive(Debug, Clone)]
pub enum ObjectKind {
    /// A freehand polyline.
    Stroke {
        /// Path points in local space, in drawing order.
        path: Vec<Point>,
        /// Tool that drew it.
        tool: ToolKind,
    },

    /// A single line of text.
    Text {
        /// Text content.
        text: String,
        /// Start of the baseline.
        anchor: Point,
    },

    /// An embedded raster, drawn with its top-left corner at the local origin.
    Image {
        /// Pixel data.
        raster: Raster,
    },

    /// A geometric shape spanning two corner points.
    Shape {
        /// Which shape.
        kind: ShapeKind,
        /// First corner (drag start).
        start: Point,
        /// Second corner (drag end).
        end: Point,
    },
}

impl ObjectKind {
    /// Short name of the variant.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stroke { .. } => "stroke",
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
            Self::Shape { .. } => "shape",
        }
    }
}

/// A committed object on the canvas.
///
/// Raw bounds are computed once, in untransformed local space. Moving, scaling
/// and rotating only touch the local transform.
#[derive(Debug, Clone)]
pub struct DrawingObject {
    id: ObjectId,
    kind: ObjectKind,
    style: Style,
    transform: Affine,
    raw_bounds: Rect,
}

impl DrawingObject {
    fn new(kind: ObjectKind, style: Style, raw_bounds: Rect) -> Self {
        Self {
            id: ObjectId::new(),
            kind,
            style,
            transform: Affine::identity(),
            raw_bounds,
        }
    }

    /// A freehand stroke. Returns `None` for an empty path.
    #[must_use]
    pub fn stroke(path: Vec<Point>, tool: ToolKind, style: Style) -> Option<Self> {
        let bounds = Rect::enclosing(&path)?.inflate(BOUNDS_PADDING);
        Some(Self::new(ObjectKind::Stroke { path, tool }, style, bounds))
    }

    /// A text item whose baseline starts at `anchor`.
    #[must_use]
    pub fn text(
        text: impl Into<String>,
        anchor: Point,
        style: Style,
        measure: &dyn TextMeasure,
    ) -> Self {
        let text = text.into();
        let extents = measure.measure(&text, style.font_size);
        let bounds = Rect::new(
            anchor.x + extents.left,
            anchor.y + extents.top,
            anchor.x + extents.right,
            anchor.y + extents.bottom,
        )
        .inflate(BOUNDS_PADDING);
        Self::new(ObjectKind::Text { text, anchor }, style, bounds)
    }

    /// An image item. Bounds are exactly the raster size, with no padding.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn image(raster: Raster, style: Style) -> Self {
        let bounds = Rect::new(0.0, 0.0, raster.width() as f32, raster.height() as f32);
        Self::new(ObjectKind::Image { raster }, style, bounds)
    }

    /// A shape spanning `start` and `end`.
    #[must_use]
    pub fn shape(kind: ShapeKind, start: Point, end: Point, style: Style) -> Self {
        let bounds = Rect::from_corners(start, end).inflate(BOUNDS_PADDING);
        Self::new(ObjectKind::Shape { kind, start, end }, style, bounds)
    }

    /// Set the local transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Affine) -> Self {
        self.transform = transform;
        self
    }

    /// Unique identifier.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Object content.
    #[must_use]
    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    /// Paint style.
    #[must_use]
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Local transform (object space to canvas space).
    #[must_use]
    pub fn transform(&self) -> &Affine {
        &self.transform
    }

    /// Mutable local transform.
    pub fn transform_mut(&mut self) -> &mut Affine {
        &mut self.transform
    }

    /// Padded bounds in untransformed local space.
    #[must_use]
    pub fn raw_bounds(&self) -> Rect {
        self.raw_bounds
    }

    /// Check if a canvas-space point hits this object.
    ///
    /// The point is mapped back into local space and tested against the raw
    /// bounds, so rotated and scaled objects hit-test against their true outline.
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.transform
            .invert()
            .is_some_and(|inv| self.raw_bounds.contains(inv.map_point(Point::new(x, y))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::ApproxMetrics;
    use crate::Color;

    fn shape_style() -> Style {
        Style::for_shape(Color::BLACK, 10.0, false)
    }

    #[test]
    fn test_shape_hit_test() {
        let obj = DrawingObject::shape(
            ShapeKind::Rectangle,
            Point::new(10.0, 10.0),
            Point::new(50.0, 50.0),
            shape_style(),
        );
        assert!(obj.contains(30.0, 30.0));
        // Within the padding, so a near miss still selects.
        assert!(obj.contains(5.0, 5.0));
        assert!(!obj.contains(-15.0, 30.0));
        assert_eq!(obj.raw_bounds(), Rect::new(-10.0, -10.0, 70.0, 70.0));
    }

    #[test]
    fn test_shape_hit_test_outside_padding() {
        let obj = DrawingObject::shape(
            ShapeKind::Oval,
            Point::new(50.0, 50.0),
            Point::new(90.0, 90.0),
            shape_style(),
        );
        assert!(obj.contains(70.0, 70.0));
        assert!(!obj.contains(5.0, 5.0));
    }

    #[test]
    fn test_contains_follows_local_transform() {
        let mut obj = DrawingObject::shape(
            ShapeKind::Rectangle,
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            shape_style(),
        );
        obj.transform_mut().post_translate(200.0, 0.0);
        assert!(!obj.contains(5.0, 5.0));
        assert!(obj.contains(205.0, 5.0));

        obj.transform_mut()
            .post_scale(2.0, 2.0, 200.0, 0.0)
            .expect("scale");
        // raw right edge 30 -> 200 + 60
        assert!(obj.contains(255.0, 5.0));
        assert!(!obj.contains(265.0, 5.0));
    }

    #[test]
    fn test_empty_stroke_is_rejected() {
        assert!(DrawingObject::stroke(
            Vec::new(),
            ToolKind::Pen,
            Style::for_tool(ToolKind::Pen, Color::BLACK, 10.0)
        )
        .is_none());
    }

    #[test]
    fn test_image_bounds_have_no_padding() {
        let raster = Arc::new(RgbaImage::new(40, 30));
        let obj = DrawingObject::image(raster, Style::for_tool(ToolKind::Pen, Color::BLACK, 1.0));
        assert_eq!(obj.raw_bounds(), Rect::new(0.0, 0.0, 40.0, 30.0));
        assert_eq!(obj.kind().name(), "image");
    }

    #[test]
    fn test_text_bounds_surround_measured_extents() {
        let style = Style::for_tool(ToolKind::Text, Color::BLACK, 10.0);
        let obj =
            DrawingObject::text("Hi", Point::new(100.0, 100.0), style, &ApproxMetrics::default());
        let bounds = obj.raw_bounds();
        assert!(bounds.left < 100.0 && bounds.bottom > 100.0);
        assert!(obj.contains(110.0, 90.0));
        assert!(!obj.contains(100.0, 200.0));
    }

    #[test]
    fn test_ids_are_unique() {
        let line = || {
            DrawingObject::shape(ShapeKind::Line, Point::default(), Point::default(), shape_style())
        };
        let a = line();
        let b = a.clone();
        let c = line();
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
    }
}
