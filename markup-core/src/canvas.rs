//! The canvas: objects, view, selection, history and tool settings.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::gesture::{GestureState, GestureTracker};
use crate::object::Raster;
use crate::text::{ApproxMetrics, TextMeasure};
use crate::{
    Affine, CanvasConfig, CanvasError, CanvasResult, Color, DrawingObject, History, ObjectId,
    ObjectStore, Point, ShapeKind, Style, ToolKind,
};

/// Snapshot of the settings and history state reported to listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasStatus {
    /// Active tool.
    pub tool: ToolKind,
    /// Current color.
    pub color: Color,
    /// Current stroke width.
    pub stroke_width: f32,
    /// Shape kind used by the shape tool.
    pub shape_kind: ShapeKind,
    /// Whether new shapes are filled.
    pub shape_filled: bool,
    /// Whether undo would do anything.
    pub can_undo: bool,
    /// Whether redo would do anything.
    pub can_redo: bool,
    /// Number of objects on the canvas.
    pub object_count: usize,
}

impl CanvasStatus {
    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> CanvasResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Callback invoked after every state-affecting operation.
///
/// Listeners run while the canvas is borrowed and must not call back into it.
pub type StateListener = Box<dyn Fn(&CanvasStatus) + Send + Sync>;

/// Uncommitted, in-progress content.
#[derive(Debug, Clone, PartialEq)]
pub enum Draft {
    /// A freehand path being drawn, in canvas space.
    Stroke(Vec<Point>),
    /// A shape being dragged out, in canvas space.
    Shape {
        /// Where the drag started.
        start: Point,
        /// Latest drag position.
        current: Point,
    },
}

/// An annotation canvas.
///
/// Owns the z-ordered objects, the view transform (pan/zoom), the optional
/// background raster, undo history, the selection handle and any draft.
pub struct Canvas {
    config: CanvasConfig,
    pub(crate) store: ObjectStore,
    pub(crate) history: History,
    pub(crate) view: Affine,
    background: Option<Raster>,
    grid_visible: bool,
    pub(crate) selection: Option<ObjectId>,
    pub(crate) draft: Option<Draft>,
    pub(crate) gesture: GestureTracker,
    pub(crate) tool: ToolKind,
    color: Color,
    stroke_width: f32,
    shape_kind: ShapeKind,
    shape_filled: bool,
    text_measure: Arc<dyn TextMeasure>,
    listener: Option<StateListener>,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("config", &self.config)
            .field("objects", &self.store.len())
            .field("view", &self.view)
            .field("background", &self.background.as_ref().map(|b| b.dimensions()))
            .field("grid_visible", &self.grid_visible)
            .field("selection", &self.selection)
            .field("draft", &self.draft)
            .field("gesture", &self.gesture.state())
            .field("tool", &self.tool)
            .field("listener", &self.listener.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl Canvas {
    /// Create an empty canvas.
    #[must_use]
    pub fn new(config: CanvasConfig) -> Self {
        let config = config.validated();
        let stroke_width = config.clamp_stroke_width(config.default_stroke_width);
        Self {
            store: ObjectStore::new(config.max_objects),
            history: History::new(),
            view: Affine::identity(),
            background: None,
            grid_visible: config.show_grid,
            selection: None,
            draft: None,
            gesture: GestureTracker::default(),
            tool: ToolKind::default(),
            color: Color::BLACK,
            stroke_width,
            shape_kind: ShapeKind::default(),
            shape_filled: false,
            text_measure: Arc::new(ApproxMetrics::default()),
            listener: None,
            config: CanvasConfig {
                width: config.width.max(1),
                height: config.height.max(1),
                ..config
            },
        }
    }

    /// Use the given metrics to size text items.
    #[must_use]
    pub fn with_text_measure(mut self, measure: Arc<dyn TextMeasure>) -> Self {
        self.text_measure = measure;
        self
    }

    /// Replace the metrics used to size new text items.
    pub fn set_text_measure(&mut self, measure: Arc<dyn TextMeasure>) {
        self.text_measure = measure;
    }

    /// Register the state-change listener, replacing any previous one.
    pub fn on_state_changed<F>(&mut self, listener: F)
    where
        F: Fn(&CanvasStatus) + Send + Sync + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    /// Current status snapshot.
    #[must_use]
    pub fn status(&self) -> CanvasStatus {
        CanvasStatus {
            tool: self.tool,
            color: self.color,
            stroke_width: self.stroke_width,
            shape_kind: self.shape_kind,
            shape_filled: self.shape_filled,
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            object_count: self.store.len(),
        }
    }

    pub(crate) fn notify(&self) {
        if let Some(ref listener) = self.listener {
            listener(&self.status());
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Canvas configuration.
    #[must_use]
    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Viewport size in pixels.
    #[must_use]
    pub fn viewport(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Objects in z-order.
    #[must_use]
    pub fn objects(&self) -> &ObjectStore {
        &self.store
    }

    /// Number of objects on the canvas.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.store.len()
    }

    /// The view (pan/zoom) transform, canvas space to screen space.
    #[must_use]
    pub fn view_transform(&self) -> &Affine {
        &self.view
    }

    /// Background raster, if any.
    #[must_use]
    pub fn background(&self) -> Option<&Raster> {
        self.background.as_ref()
    }

    /// Whether grid lines are drawn.
    #[must_use]
    pub fn grid_visible(&self) -> bool {
        self.grid_visible
    }

    /// Handle of the selected object.
    #[must_use]
    pub fn selection(&self) -> Option<ObjectId> {
        self.selection
    }

    /// The selected object, if the handle still resolves.
    #[must_use]
    pub fn selected_object(&self) -> Option<&DrawingObject> {
        self.selection.and_then(|id| self.store.get(id))
    }

    /// In-progress content, if any.
    #[must_use]
    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    /// Style the current draft is previewed with.
    #[must_use]
    pub fn draft_style(&self) -> Style {
        match self.draft {
            Some(Draft::Shape { .. }) => {
                Style::for_shape(self.color, self.stroke_width, self.shape_filled)
            }
            _ => Style::for_tool(self.tool, self.color, self.stroke_width),
        }
    }

    /// Current gesture state.
    #[must_use]
    pub fn gesture_state(&self) -> GestureState {
        self.gesture.state()
    }

    /// Active tool.
    #[must_use]
    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Current color.
    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Current stroke width.
    #[must_use]
    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    /// Shape kind used by the shape tool.
    #[must_use]
    pub fn shape_kind(&self) -> ShapeKind {
        self.shape_kind
    }

    /// Whether new shapes are filled.
    #[must_use]
    pub fn shape_filled(&self) -> bool {
        self.shape_filled
    }

    /// Whether undo would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo(&self.store)
    }

    /// Whether redo would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// Switch tools. Always clears the selection.
    pub fn set_tool(&mut self, tool: ToolKind) {
        tracing::debug!("Tool: {:?} -> {:?}", self.tool, tool);
        self.tool = tool;
        self.selection = None;
        self.notify();
    }

    /// Set the color for new content.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        self.notify();
    }

    /// Set the stroke width for new content, clamped into the configured range.
    pub fn set_stroke_width(&mut self, width: f32) {
        let clamped = self.config.clamp_stroke_width(width);
        if (clamped - width).abs() > f32::EPSILON {
            tracing::debug!("Stroke width {width} clamped to {clamped}");
        }
        self.stroke_width = clamped;
        self.notify();
    }

    /// Set the shape drawn by the shape tool.
    pub fn set_shape_kind(&mut self, kind: ShapeKind) {
        self.shape_kind = kind;
        self.notify();
    }

    /// Set whether new shapes are filled.
    pub fn set_shape_filled(&mut self, filled: bool) {
        self.shape_filled = filled;
        self.notify();
    }

    /// Replace the background raster.
    pub fn set_background(&mut self, raster: Raster) {
        tracing::debug!("Background set: {}x{}", raster.width(), raster.height());
        self.background = Some(raster);
        self.notify();
    }

    /// Remove the background raster.
    pub fn clear_background(&mut self) {
        self.background = None;
        self.notify();
    }

    /// Show or hide the grid.
    pub fn set_grid_visible(&mut self, visible: bool) {
        self.grid_visible = visible;
        self.notify();
    }

    /// Resize the viewport. Zero dimensions are raised to one pixel.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
    }

    /// Reset pan and zoom.
    pub fn reset_view(&mut self) {
        self.view = Affine::identity();
        self.notify();
    }

    // ------------------------------------------------------------------
    // Coordinates
    // ------------------------------------------------------------------

    /// Map a screen point into canvas space.
    #[must_use]
    pub fn to_canvas(&self, screen: Point) -> Point {
        match self.view.invert() {
            Some(inv) => inv.map_point(screen),
            None => {
                tracing::warn!("View transform is singular, using screen coordinates");
                screen
            }
        }
    }

    /// Canvas-space point at the centre of the viewport.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn viewport_center(&self) -> Point {
        let (w, h) = self.viewport();
        self.to_canvas(Point::new(w as f32 / 2.0, h as f32 / 2.0))
    }

    // ------------------------------------------------------------------
    // Objects
    // ------------------------------------------------------------------

    /// Add an object as new work, clearing the redo stack.
    ///
    /// Returns the new object's ID.
    pub fn commit(&mut self, object: DrawingObject) -> ObjectId {
        let id = object.id();
        tracing::debug!("Commit {} {}", object.kind().name(), id);
        if let Some(evicted) = self.history.commit(&mut self.store, object) {
            if self.selection == Some(evicted.id()) {
                self.selection = None;
            }
        }
        self.notify();
        id
    }

    /// Validate and normalize text for insertion.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::EmptyText`], [`CanvasError::TextTooLong`] or
    /// [`CanvasError::ControlCharacters`].
    pub fn validate_text<'a>(&self, text: &'a str) -> CanvasResult<&'a str> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(CanvasError::EmptyText);
        }
        let len = trimmed.chars().count();
        if len > self.config.max_text_length {
            return Err(CanvasError::TextTooLong {
                len,
                max: self.config.max_text_length,
            });
        }
        if trimmed.chars().any(char::is_control) {
            return Err(CanvasError::ControlCharacters);
        }
        Ok(trimmed)
    }

    /// Insert text centered on the viewport.
    ///
    /// # Errors
    ///
    /// Returns an error if the text fails [`Canvas::validate_text`]; the canvas
    /// is unchanged.
    pub fn add_text(&mut self, text: &str) -> CanvasResult<ObjectId> {
        let text = match self.validate_text(text) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Rejected text: {e}");
                return Err(e);
            }
        };
        let style = Style::for_tool(ToolKind::Text, self.color, self.config.text_width);
        let extents = self.text_measure.measure(text, style.font_size);
        let center = self.viewport_center();
        let ext_center = extents.center();
        let anchor = Point::new(center.x - ext_center.x, center.y - ext_center.y);
        let object = DrawingObject::text(text, anchor, style, self.text_measure.as_ref());
        Ok(self.commit(object))
    }

    /// Insert an image (signature, stamp) centered on the viewport.
    #[allow(clippy::cast_precision_loss)]
    pub fn add_image(&mut self, raster: Raster) -> ObjectId {
        let center = self.viewport_center();
        let transform = Affine::translation(
            center.x - raster.width() as f32 / 2.0,
            center.y - raster.height() as f32 / 2.0,
        );
        let style = Style::for_tool(ToolKind::Pen, self.color, self.stroke_width);
        let object = DrawingObject::image(raster, style).with_transform(transform);
        self.commit(object)
    }

    /// Select the topmost object at a canvas-space point, or clear the selection.
    pub fn select_at(&mut self, x: f32, y: f32) -> Option<ObjectId> {
        self.selection = self.store.find_topmost_containing(x, y);
        tracing::debug!("Selection: {:?}", self.selection);
        self.selection
    }

    /// Select an object by ID.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ObjectNotFound`] if the object is not on the canvas.
    pub fn select(&mut self, id: ObjectId) -> CanvasResult<()> {
        if !self.store.contains_id(id) {
            return Err(CanvasError::ObjectNotFound(id));
        }
        self.selection = Some(id);
        Ok(())
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        self.selection = None;
    }

    /// Delete the topmost object at a canvas-space point.
    ///
    /// Erasing is not recorded in history. Returns the erased object's ID.
    pub fn erase_at(&mut self, x: f32, y: f32) -> Option<ObjectId> {
        let id = self.store.find_topmost_containing(x, y)?;
        self.store.remove(id);
        if self.selection == Some(id) {
            self.selection = None;
        }
        tracing::debug!("Erased {id}");
        self.notify();
        Some(id)
    }

    /// Undo the most recent object. No-op on an empty canvas.
    pub fn undo(&mut self) -> Option<ObjectId> {
        let id = self.history.undo(&mut self.store);
        if id.is_some() && self.selection == id {
            self.selection = None;
        }
        self.notify();
        id
    }

    /// Redo the most recently undone object. No-op if nothing was undone.
    pub fn redo(&mut self) -> Option<ObjectId> {
        let id = self.history.redo(&mut self.store);
        self.notify();
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use image::RgbaImage;

    #[test]
    fn test_stroke_width_clamped() {
        let mut canvas = Canvas::default();
        canvas.set_stroke_width(-10.0);
        assert!((canvas.stroke_width() - 1.0).abs() < f32::EPSILON);
        canvas.set_stroke_width(500.0);
        assert!((canvas.stroke_width() - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_text_validation() {
        let mut canvas = Canvas::default();
        assert!(matches!(canvas.add_text("   \n\t "), Err(CanvasError::EmptyText)));
        assert!(matches!(
            canvas.add_text(&"a".repeat(101)),
            Err(CanvasError::TextTooLong { len: 101, max: 100 })
        ));
        assert!(matches!(
            canvas.add_text("Hello\u{0}World"),
            Err(CanvasError::ControlCharacters)
        ));
        assert_eq!(canvas.object_count(), 0);

        assert!(canvas.add_text(&"a".repeat(100)).is_ok());
        assert_eq!(canvas.object_count(), 1);
    }

    #[test]
    fn test_text_is_trimmed_and_centered() {
        let mut canvas = Canvas::default();
        let id = canvas.add_text("  Hello  ").expect("add text");
        let obj = canvas.objects().get(id).expect("object");
        match obj.kind() {
            crate::ObjectKind::Text { text, .. } => assert_eq!(text, "Hello"),
            other => panic!("unexpected {other:?}"),
        }
        let c = obj.raw_bounds().center();
        assert!((c.x - 400.0).abs() < 1e-3);
        assert!((c.y - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_image_centered_on_zoomed_viewport() {
        let mut canvas = Canvas::default();
        canvas
            .view
            .post_scale(2.0, 2.0, 0.0, 0.0)
            .expect("scale");
        let id = canvas.add_image(Arc::new(RgbaImage::new(100, 50)));
        let obj = canvas.objects().get(id).expect("object");
        let center = obj.transform().map_point(obj.raw_bounds().center());
        // screen centre (400, 300) is canvas (200, 150) at 2x zoom
        assert!((center.x - 200.0).abs() < 1e-3);
        assert!((center.y - 150.0).abs() < 1e-3);
    }

    #[test]
    fn test_set_tool_clears_selection() {
        let mut canvas = Canvas::default();
        canvas.add_text("Select me").expect("text");
        let c = canvas.viewport_center();
        assert!(canvas.select_at(c.x, c.y).is_some());
        canvas.set_tool(ToolKind::Select);
        assert!(canvas.selection().is_none());
    }

    #[test]
    fn test_undo_clears_matching_selection() {
        let mut canvas = Canvas::default();
        let id = canvas.add_text("x").expect("text");
        canvas.selection = Some(id);
        assert_eq!(canvas.undo(), Some(id));
        assert!(canvas.selection().is_none());
        assert!(canvas.selected_object().is_none());
        assert_eq!(canvas.redo(), Some(id));
    }

    #[test]
    fn test_listener_sees_every_change() {
        let calls = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(Mutex::new(None));
        let mut canvas = Canvas::default();
        {
            let calls = Arc::clone(&calls);
            let last = Arc::clone(&last);
            canvas.on_state_changed(move |status| {
                calls.fetch_add(1, Ordering::SeqCst);
                *last.lock().unwrap_or_else(std::sync::PoisonError::into_inner) =
                    Some(status.clone());
            });
        }

        canvas.set_color(Color::RED);
        canvas.add_text("hi").expect("text");
        canvas.undo();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let status = last
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
            .expect("status");
        assert_eq!(status.color, Color::RED);
        assert!(!status.can_undo);
        assert!(status.can_redo);
        assert_eq!(status.object_count, 0);
    }

    #[test]
    fn test_inverted_width_range_falls_back_to_defaults() {
        let config: CanvasConfig =
            serde_json::from_str(r#"{"min_stroke_width": 50.0, "max_stroke_width": 10.0}"#)
                .expect("parse");
        let mut canvas = Canvas::new(config);
        assert!((canvas.stroke_width() - 10.0).abs() < f32::EPSILON);
        canvas.set_stroke_width(500.0);
        assert!((canvas.stroke_width() - 100.0).abs() < f32::EPSILON);
        canvas.set_stroke_width(-3.0);
        assert!((canvas.stroke_width() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_status_json() {
        let mut canvas = Canvas::default();
        canvas.set_tool(ToolKind::Marker);
        canvas.add_text("hi").expect("text");
        let json = canvas.status().to_json().expect("json");
        let back: CanvasStatus = serde_json::from_str(&json).expect("parse");
        assert_eq!(back, canvas.status());
        assert!(json.contains("\"tool\": \"marker\""));
    }
}
