//! Pointer gesture interpretation.
//!
//! One finger draws, erases, selects or drags; two fingers either transform
//! the selected object or pan/zoom the whole canvas.

use serde::{Deserialize, Serialize};

use crate::canvas::Draft;
use crate::{Canvas, DrawingObject, PointerEvent, PointerPhase, Point, Style, ToolKind};

/// What the current pointer sequence is doing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Building a freehand stroke.
    FreehandDrawing,
    /// Dragging out a shape.
    ShapeDragging,
    /// Moving the selected object with one finger.
    ObjectTranslating,
    /// Scaling and rotating the selected object with two fingers.
    ObjectTransforming,
    /// Zooming the view with two fingers.
    CanvasZooming,
}

/// Per-sequence bookkeeping behind [`GestureState`].
#[derive(Debug, Clone, Default)]
pub(crate) struct GestureTracker {
    state: GestureState,
    /// Last single-pointer position, canvas space.
    last: Option<Point>,
    /// Pointer distance at the previous two-finger sample, screen space.
    distance: f32,
    /// Pointer angle at the previous two-finger sample, degrees.
    angle: f32,
    /// Scale/rotate pivot. Canvas space for objects, screen space for zoom.
    pivot: Point,
}

impl GestureTracker {
    pub(crate) fn state(&self) -> GestureState {
        self.state
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

impl Canvas {
    /// Feed one pointer event through the gesture state machine.
    ///
    /// Returns `true` if anything visible changed and the canvas should be
    /// re-rendered.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> bool {
        match event.phase {
            PointerPhase::Down if event.pointer_count() >= 2 => self.on_extra_pointer_down(event),
            PointerPhase::Down => self.on_pointer_down(event),
            PointerPhase::Move => self.on_pointer_move(event),
            PointerPhase::Up => self.on_pointer_up(),
            PointerPhase::Cancel => self.on_pointer_cancel(),
        }
    }

    fn on_pointer_down(&mut self, event: &PointerEvent) -> bool {
        let Some(screen) = event.primary() else {
            return false;
        };
        let p = self.to_canvas(screen);
        self.gesture.reset();
        self.gesture.last = Some(p);

        match self.tool {
            ToolKind::Eraser => self.erase_at(p.x, p.y).is_some(),
            ToolKind::Select => {
                self.select_at(p.x, p.y);
                true
            }
            ToolKind::Shape => {
                self.selection = None;
                self.draft = Some(Draft::Shape {
                    start: p,
                    current: p,
                });
                self.gesture.state = GestureState::ShapeDragging;
                true
            }
            ToolKind::Pen | ToolKind::Marker | ToolKind::Text => {
                self.selection = None;
                self.draft = Some(Draft::Stroke(vec![p]));
                self.gesture.state = GestureState::FreehandDrawing;
                true
            }
        }
    }

    fn on_extra_pointer_down(&mut self, event: &PointerEvent) -> bool {
        let Some((a, b)) = event.pair() else {
            return false;
        };
        if self.draft.take().is_some() {
            tracing::debug!("Second pointer down, discarding draft");
        }

        let midpoint = a.midpoint(b);
        self.gesture.distance = a.distance(b);
        self.gesture.angle = a.angle_from(b);
        self.gesture.last = None;

        let has_selection = self
            .selection
            .is_some_and(|id| self.store.contains_id(id));
        if self.tool == ToolKind::Select && has_selection {
            self.gesture.pivot = self.to_canvas(midpoint);
            self.gesture.state = GestureState::ObjectTransforming;
        } else {
            self.gesture.pivot = midpoint;
            self.gesture.state = GestureState::CanvasZooming;
        }
        tracing::debug!("Two-finger gesture: {:?}", self.gesture.state);
        true
    }

    fn on_pointer_move(&mut self, event: &PointerEvent) -> bool {
        match self.gesture.state {
            GestureState::FreehandDrawing => {
                let Some(screen) = event.primary() else {
                    return false;
                };
                let p = self.to_canvas(screen);
                if let Some(Draft::Stroke(path)) = self.draft.as_mut() {
                    path.push(p);
                }
                self.gesture.last = Some(p);
                true
            }
            GestureState::ShapeDragging => {
                let Some(screen) = event.primary() else {
                    return false;
                };
                let p = self.to_canvas(screen);
                if let Some(Draft::Shape { current, .. }) = self.draft.as_mut() {
                    *current = p;
                }
                true
            }
            GestureState::Idle | GestureState::ObjectTranslating => self.drag_selection(event),
            GestureState::ObjectTransforming | GestureState::CanvasZooming => {
                self.apply_two_finger(event)
            }
        }
    }

    fn drag_selection(&mut self, event: &PointerEvent) -> bool {
        if self.tool != ToolKind::Select {
            return false;
        }
        let (Some(id), Some(last), Some(screen)) =
            (self.selection, self.gesture.last, event.primary())
        else {
            return false;
        };
        let p = self.to_canvas(screen);
        let Some(object) = self.store.get_mut(id) else {
            self.selection = None;
            return false;
        };
        object.transform_mut().post_translate(p.x - last.x, p.y - last.y);
        self.gesture.last = Some(p);
        self.gesture.state = GestureState::ObjectTranslating;
        true
    }

    fn apply_two_finger(&mut self, event: &PointerEvent) -> bool {
        let Some((a, b)) = event.pair() else {
            return false;
        };
        let distance = a.distance(b);
        let angle = a.angle_from(b);
        let ratio = distance / self.gesture.distance;
        let rotation = angle - self.gesture.angle;
        let pivot = self.gesture.pivot;

        if distance > 0.0 {
            self.gesture.distance = distance;
        }
        self.gesture.angle = angle;

        match self.gesture.state {
            GestureState::ObjectTransforming => {
                let Some(object) = self.selection.and_then(|id| self.store.get_mut(id)) else {
                    self.selection = None;
                    return false;
                };
                let transform = object.transform_mut();
                if let Err(e) = transform.post_scale(ratio, ratio, pivot.x, pivot.y) {
                    tracing::warn!("Skipping object scale sample: {e}");
                }
                if let Err(e) = transform.post_rotate(rotation, pivot.x, pivot.y) {
                    tracing::warn!("Skipping object rotate sample: {e}");
                }
                true
            }
            GestureState::CanvasZooming => {
                match self.view.post_scale(ratio, ratio, pivot.x, pivot.y) {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!("Skipping zoom sample: {e}");
                        false
                    }
                }
            }
            _ => false,
        }
    }

    fn on_pointer_up(&mut self) -> bool {
        let state = self.gesture.state;
        let draft = self.draft.take();
        self.gesture.reset();

        match (state, draft) {
            (GestureState::FreehandDrawing, Some(Draft::Stroke(path))) => {
                let style = Style::for_tool(self.tool, self.color(), self.stroke_width());
                match DrawingObject::stroke(path, self.tool, style) {
                    Some(object) => {
                        self.commit(object);
                        true
                    }
                    None => false,
                }
            }
            (GestureState::ShapeDragging, Some(Draft::Shape { start, current })) => {
                let style =
                    Style::for_shape(self.color(), self.stroke_width(), self.shape_filled());
                self.commit(DrawingObject::shape(self.shape_kind(), start, current, style));
                true
            }
            (_, draft) => draft.is_some(),
        }
    }

    fn on_pointer_cancel(&mut self) -> bool {
        let had_draft = self.draft.take().is_some();
        self.gesture.reset();
        if had_draft {
            tracing::debug!("Gesture cancelled, draft discarded");
        }
        had_draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ObjectKind, ShapeKind};

    fn pen_line(canvas: &mut Canvas, from: Point, to: Point) {
        canvas.handle_pointer(&PointerEvent::down(from.x, from.y));
        canvas.handle_pointer(&PointerEvent::move_to(to.x, to.y));
        canvas.handle_pointer(&PointerEvent::up(to.x, to.y));
    }

    #[test]
    fn test_freehand_stroke_commits_on_up() {
        let mut canvas = Canvas::default();
        canvas.handle_pointer(&PointerEvent::down(100.0, 100.0));
        assert_eq!(canvas.gesture_state(), GestureState::FreehandDrawing);
        canvas.handle_pointer(&PointerEvent::move_to(150.0, 120.0));
        canvas.handle_pointer(&PointerEvent::move_to(200.0, 100.0));
        assert!(matches!(canvas.draft(), Some(Draft::Stroke(p)) if p.len() == 3));
        assert_eq!(canvas.object_count(), 0);

        canvas.handle_pointer(&PointerEvent::up(200.0, 100.0));
        assert_eq!(canvas.gesture_state(), GestureState::Idle);
        assert!(canvas.draft().is_none());
        assert_eq!(canvas.object_count(), 1);
        assert!(canvas.can_undo());
    }

    #[test]
    fn test_single_point_stroke_is_committed() {
        let mut canvas = Canvas::default();
        canvas.handle_pointer(&PointerEvent::down(10.0, 10.0));
        canvas.handle_pointer(&PointerEvent::up(10.0, 10.0));
        assert_eq!(canvas.object_count(), 1);
    }

    #[test]
    fn test_shape_drag_commits_shape() {
        let mut canvas = Canvas::default();
        canvas.set_tool(ToolKind::Shape);
        canvas.set_shape_kind(ShapeKind::Oval);
        canvas.handle_pointer(&PointerEvent::down(10.0, 10.0));
        canvas.handle_pointer(&PointerEvent::move_to(60.0, 80.0));
        assert!(matches!(
            canvas.draft(),
            Some(Draft::Shape { current, .. }) if *current == Point::new(60.0, 80.0)
        ));
        canvas.handle_pointer(&PointerEvent::up(60.0, 80.0));

        let obj = canvas.objects().iter().next().expect("shape");
        assert!(matches!(
            obj.kind(),
            ObjectKind::Shape { kind: ShapeKind::Oval, end, .. } if *end == Point::new(60.0, 80.0)
        ));
    }

    #[test]
    fn test_second_pointer_discards_draft_and_zooms() {
        let mut canvas = Canvas::default();
        canvas.handle_pointer(&PointerEvent::down(100.0, 100.0));
        canvas.handle_pointer(&PointerEvent::move_to(110.0, 100.0));
        canvas.handle_pointer(&PointerEvent::second_down(
            Point::new(110.0, 100.0),
            Point::new(210.0, 100.0),
        ));
        assert!(canvas.draft().is_none());
        assert_eq!(canvas.gesture_state(), GestureState::CanvasZooming);

        canvas.handle_pointer(&PointerEvent::two_move(
            Point::new(60.0, 100.0),
            Point::new(260.0, 100.0),
        ));
        assert!((canvas.view_transform().scale_x() - 2.0).abs() < 1e-4);
        canvas.handle_pointer(&PointerEvent::up(260.0, 100.0));
        assert_eq!(canvas.object_count(), 0);
    }

    #[test]
    fn test_select_without_selection_zooms() {
        let mut canvas = Canvas::default();
        pen_line(&mut canvas, Point::new(100.0, 100.0), Point::new(120.0, 100.0));
        canvas.set_tool(ToolKind::Select);
        canvas.handle_pointer(&PointerEvent::down(600.0, 500.0));
        assert!(canvas.selection().is_none());

        canvas.handle_pointer(&PointerEvent::second_down(
            Point::new(600.0, 500.0),
            Point::new(700.0, 500.0),
        ));
        assert_eq!(canvas.gesture_state(), GestureState::CanvasZooming);

        canvas.handle_pointer(&PointerEvent::two_move(
            Point::new(550.0, 500.0),
            Point::new(750.0, 500.0),
        ));
        assert!((canvas.view_transform().scale_x() - 2.0).abs() < 1e-4);
        let obj = canvas.objects().iter().next().expect("stroke");
        assert!(obj.transform().approx_eq(&crate::Affine::identity(), 1e-6));
    }

    #[test]
    fn test_eraser_removes_topmost_only() {
        let mut canvas = Canvas::default();
        pen_line(&mut canvas, Point::new(100.0, 100.0), Point::new(120.0, 100.0));
        pen_line(&mut canvas, Point::new(105.0, 100.0), Point::new(125.0, 100.0));
        let bottom = canvas.objects().iter().next().map(DrawingObject::id);

        canvas.set_tool(ToolKind::Eraser);
        assert!(canvas.handle_pointer(&PointerEvent::down(110.0, 100.0)));
        canvas.handle_pointer(&PointerEvent::move_to(400.0, 400.0));
        canvas.handle_pointer(&PointerEvent::up(400.0, 400.0));

        assert_eq!(canvas.object_count(), 1);
        assert_eq!(canvas.objects().iter().next().map(DrawingObject::id), bottom);
        assert!(!canvas.can_redo());
    }

    #[test]
    fn test_select_and_drag() {
        let mut canvas = Canvas::default();
        pen_line(&mut canvas, Point::new(100.0, 100.0), Point::new(120.0, 100.0));
        canvas.set_tool(ToolKind::Select);

        canvas.handle_pointer(&PointerEvent::down(110.0, 100.0));
        assert!(canvas.selection().is_some());
        assert_eq!(canvas.gesture_state(), GestureState::Idle);
        canvas.handle_pointer(&PointerEvent::move_to(160.0, 130.0));
        assert_eq!(canvas.gesture_state(), GestureState::ObjectTranslating);
        canvas.handle_pointer(&PointerEvent::up(160.0, 130.0));

        let obj = canvas.selected_object().expect("still selected");
        let moved = obj.transform().map_point(Point::new(0.0, 0.0));
        assert!((moved.x - 50.0).abs() < 1e-4);
        assert!((moved.y - 30.0).abs() < 1e-4);
        assert!(!canvas.handle_pointer(&PointerEvent::move_to(0.0, 0.0)));
    }

    #[test]
    fn test_select_on_empty_space_clears_selection() {
        let mut canvas = Canvas::default();
        pen_line(&mut canvas, Point::new(100.0, 100.0), Point::new(120.0, 100.0));
        canvas.set_tool(ToolKind::Select);
        canvas.handle_pointer(&PointerEvent::down(110.0, 100.0));
        canvas.handle_pointer(&PointerEvent::up(110.0, 100.0));
        assert!(canvas.selection().is_some());

        canvas.handle_pointer(&PointerEvent::down(700.0, 500.0));
        assert!(canvas.selection().is_none());
        canvas.handle_pointer(&PointerEvent::move_to(720.0, 520.0));
        assert_eq!(canvas.gesture_state(), GestureState::Idle);
    }

    #[test]
    fn test_two_finger_transform_scales_selected_object() {
        let mut canvas = Canvas::default();
        pen_line(&mut canvas, Point::new(100.0, 100.0), Point::new(120.0, 100.0));
        canvas.set_tool(ToolKind::Select);
        canvas.handle_pointer(&PointerEvent::down(110.0, 100.0));
        canvas.handle_pointer(&PointerEvent::second_down(
            Point::new(100.0, 100.0),
            Point::new(120.0, 100.0),
        ));
        assert_eq!(canvas.gesture_state(), GestureState::ObjectTransforming);

        canvas.handle_pointer(&PointerEvent::two_move(
            Point::new(90.0, 100.0),
            Point::new(130.0, 100.0),
        ));
        let obj = canvas.selected_object().expect("selected");
        assert!((obj.transform().scale_x() - 2.0).abs() < 1e-4);
        assert!(canvas.view_transform().approx_eq(&crate::Affine::identity(), 1e-6));
    }

    #[test]
    fn test_cancel_discards_draft() {
        let mut canvas = Canvas::default();
        canvas.handle_pointer(&PointerEvent::down(10.0, 10.0));
        canvas.handle_pointer(&PointerEvent::move_to(20.0, 20.0));
        assert!(canvas.handle_pointer(&PointerEvent::new(PointerPhase::Cancel, 0, vec![])));
        assert!(canvas.draft().is_none());
        assert_eq!(canvas.object_count(), 0);
        assert_eq!(canvas.gesture_state(), GestureState::Idle);
    }

    #[test]
    fn test_moves_after_up_are_ignored() {
        let mut canvas = Canvas::default();
        pen_line(&mut canvas, Point::new(10.0, 10.0), Point::new(20.0, 20.0));
        assert!(!canvas.handle_pointer(&PointerEvent::move_to(30.0, 30.0)));
        assert_eq!(canvas.object_count(), 1);
    }
}
