//! Pointer input events.

use serde::{Deserialize, Serialize};

use crate::Point;

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// A pointer touched down. With more than one active pointer this is a
    /// secondary pointer landing.
    Down,
    /// One or more pointers moved.
    Move,
    /// A pointer lifted.
    Up,
    /// The platform aborted the gesture (e.g., palm rejection).
    Cancel,
}

/// A pointer event in screen coordinates.
///
/// `pointers` lists every pointer active during the event, in index order, so
/// `pointers.len()` is the pointer count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Event phase.
    pub phase: PointerPhase,
    /// Index of the pointer that triggered the event.
    #[serde(default)]
    pub pointer_index: usize,
    /// Screen positions of all active pointers.
    pub pointers: Vec<Point>,
}

impl PointerEvent {
    /// Create a new pointer event.
    #[must_use]
    pub fn new(phase: PointerPhase, pointer_index: usize, pointers: Vec<Point>) -> Self {
        Self {
            phase,
            pointer_index,
            pointers,
        }
    }

    /// First pointer touching down.
    #[must_use]
    pub fn down(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Down, 0, vec![Point::new(x, y)])
    }

    /// Single pointer moving.
    #[must_use]
    pub fn move_to(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Move, 0, vec![Point::new(x, y)])
    }

    /// Single pointer lifting.
    #[must_use]
    pub fn up(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Up, 0, vec![Point::new(x, y)])
    }

    /// Second pointer landing while the first is held at `first`.
    #[must_use]
    pub fn second_down(first: Point, second: Point) -> Self {
        Self::new(PointerPhase::Down, 1, vec![first, second])
    }

    /// Two pointers moving.
    #[must_use]
    pub fn two_move(first: Point, second: Point) -> Self {
        Self::new(PointerPhase::Move, 0, vec![first, second])
    }

    /// Number of active pointers.
    #[must_use]
    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    /// The primary (first) pointer.
    #[must_use]
    pub fn primary(&self) -> Option<Point> {
        self.pointers.first().copied()
    }

    /// The first two pointers, if at least two are active.
    #[must_use]
    pub fn pair(&self) -> Option<(Point, Point)> {
        match self.pointers.as_slice() {
            [a, b, ..] => Some((*a, *b)),
            _ => None,
        }
    }
}
