//! Points and axis-aligned rectangles in canvas space.

use serde::{Deserialize, Serialize};

/// A 2D point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Angle of the vector `other -> self`, in degrees.
    #[must_use]
    pub fn angle_from(self, other: Point) -> f32 {
        (self.y - other.y).atan2(self.x - other.x).to_degrees()
    }

    /// Midpoint between two points.
    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// An axis-aligned rectangle given by its edges.
///
/// `contains` is half-open: the left and top edges are inside, the right and
/// bottom edges are not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub left: f32,
    /// Top edge.
    pub top: f32,
    /// Right edge.
    pub right: f32,
    /// Bottom edge.
    pub bottom: f32,
}

impl Rect {
    /// Create a rectangle from its edges.
    #[must_use]
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a rectangle from two arbitrary corners, normalizing edge order.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y),
        }
    }

    /// Smallest rectangle enclosing all `points`, or `None` if there are none.
    #[must_use]
    pub fn enclosing(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut rect = Self::new(first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            rect.left = rect.left.min(p.x);
            rect.top = rect.top.min(p.y);
            rect.right = rect.right.max(p.x);
            rect.bottom = rect.bottom.max(p.y);
        }
        Some(rect)
    }

    /// Grow every edge outward by `amount`.
    #[must_use]
    pub fn inflate(self, amount: f32) -> Self {
        Self {
            left: self.left - amount,
            top: self.top - amount,
            right: self.right + amount,
            bottom: self.bottom + amount,
        }
    }

    /// Width of the rectangle.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Height of the rectangle.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Centre point.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    /// True if the rectangle has no area.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.left < self.right && self.top < self.bottom)
    }

    /// Check whether a point lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        !self.is_empty()
            && p.x >= self.left
            && p.x < self.right
            && p.y >= self.top
            && p.y < self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_normalizes() {
        let rect = Rect::from_corners(Point::new(50.0, 10.0), Point::new(10.0, 50.0));
        assert_eq!(rect, Rect::new(10.0, 10.0, 50.0, 50.0));
    }

    #[test]
    fn test_contains_is_half_open() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(Point::new(0.0, 0.0)));
        assert!(rect.contains(Point::new(9.9, 9.9)));
        assert!(!rect.contains(Point::new(10.0, 5.0)));
        assert!(!Rect::new(5.0, 5.0, 5.0, 5.0).contains(Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_enclosing_and_inflate() {
        assert!(Rect::enclosing(&[]).is_none());
        let rect = Rect::enclosing(&[Point::new(5.0, 5.0), Point::new(5.0, 25.0)])
            .map(|r| r.inflate(20.0));
        assert_eq!(rect, Some(Rect::new(-15.0, -15.0, 25.0, 45.0)));
    }

    #[test]
    fn test_angle_and_distance() {
        let a = Point::new(10.0, 0.0);
        let b = Point::new(0.0, 0.0);
        assert!((a.distance(b) - 10.0).abs() < f32::EPSILON);
        assert!(a.angle_from(b).abs() < f32::EPSILON);
        assert!((Point::new(0.0, 10.0).angle_from(b) - 90.0).abs() < 1e-4);
    }
}
