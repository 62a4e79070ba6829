//! 2D affine transforms.
//!
//! Matrices follow the screen convention used by raster backends:
//!
//! ```text
//! | sx  kx  tx |   | x |
//! | ky  sy  ty | · | y |
//! | 0   0   1  |   | 1 |
//! ```
//!
//! The `post_*` operations compose the new operation *after* the existing
//! transform (`T' = Op · T`), so they act in the transform's output space.

use serde::{Deserialize, Serialize};

use crate::{CanvasError, CanvasResult, Point};

/// A 2D affine transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affine {
    sx: f32,
    kx: f32,
    tx: f32,
    ky: f32,
    sy: f32,
    ty: f32,
}

impl Default for Affine {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine {
    /// The identity transform.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            sx: 1.0,
            kx: 0.0,
            tx: 0.0,
            ky: 0.0,
            sy: 1.0,
            ty: 0.0,
        }
    }

    /// A pure translation.
    #[must_use]
    pub const fn translation(dx: f32, dy: f32) -> Self {
        Self {
            sx: 1.0,
            kx: 0.0,
            tx: dx,
            ky: 0.0,
            sy: 1.0,
            ty: dy,
        }
    }

    /// Build from the six matrix entries in row order `sx, kx, tx, ky, sy, ty`.
    #[must_use]
    pub const fn from_entries(sx: f32, kx: f32, tx: f32, ky: f32, sy: f32, ty: f32) -> Self {
        Self {
            sx,
            kx,
            tx,
            ky,
            sy,
            ty,
        }
    }

    /// Entries in the column order raster backends expect: `sx, ky, kx, sy, tx, ty`.
    #[must_use]
    pub const fn to_row(&self) -> [f32; 6] {
        [self.sx, self.ky, self.kx, self.sy, self.tx, self.ty]
    }

    /// The x-scale entry of the matrix.
    ///
    /// Used to keep decoration widths constant on screen across zoom levels.
    #[must_use]
    pub const fn scale_x(&self) -> f32 {
        self.sx
    }

    /// Returns `a · b`: `b` is applied first, then `a`.
    #[must_use]
    pub fn concat(a: &Affine, b: &Affine) -> Affine {
        Affine {
            sx: a.sx * b.sx + a.kx * b.ky,
            kx: a.sx * b.kx + a.kx * b.sy,
            tx: a.sx * b.tx + a.kx * b.ty + a.tx,
            ky: a.ky * b.sx + a.sy * b.ky,
            sy: a.ky * b.kx + a.sy * b.sy,
            ty: a.ky * b.tx + a.sy * b.ty + a.ty,
        }
    }

    /// Map a point through the transform.
    #[must_use]
    pub fn map_point(&self, p: Point) -> Point {
        Point::new(
            self.sx * p.x + self.kx * p.y + self.tx,
            self.ky * p.x + self.sy * p.y + self.ty,
        )
    }

    /// Inverse transform, or `None` if the matrix is singular.
    #[must_use]
    pub fn invert(&self) -> Option<Affine> {
        let det = self.sx * self.sy - self.kx * self.ky;
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        Some(Affine {
            sx: self.sy * inv,
            kx: -self.kx * inv,
            tx: (self.kx * self.ty - self.sy * self.tx) * inv,
            ky: -self.ky * inv,
            sy: self.sx * inv,
            ty: (self.ky * self.tx - self.sx * self.ty) * inv,
        })
    }

    /// Translate after the existing transform.
    pub fn post_translate(&mut self, dx: f32, dy: f32) {
        self.tx += dx;
        self.ty += dy;
    }

    /// Scale about `(px, py)` after the existing transform.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::DegenerateScale`] if either factor is zero or not
    /// finite. The transform is left unchanged.
    pub fn post_scale(&mut self, sx: f32, sy: f32, px: f32, py: f32) -> CanvasResult<()> {
        if sx == 0.0 || sy == 0.0 || !sx.is_finite() || !sy.is_finite() {
            return Err(CanvasError::DegenerateScale { sx, sy });
        }
        let op = Affine {
            sx,
            kx: 0.0,
            tx: px - sx * px,
            ky: 0.0,
            sy,
            ty: py - sy * py,
        };
        *self = Affine::concat(&op, self);
        Ok(())
    }

    /// Rotate by `degrees` about `(px, py)` after the existing transform.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidAngle`] if the angle is not finite.
    pub fn post_rotate(&mut self, degrees: f32, px: f32, py: f32) -> CanvasResult<()> {
        if !degrees.is_finite() {
            return Err(CanvasError::InvalidAngle(degrees));
        }
        let (sin, cos) = degrees.to_radians().sin_cos();
        let op = Affine {
            sx: cos,
            kx: -sin,
            tx: px - cos * px + sin * py,
            ky: sin,
            sy: cos,
            ty: py - sin * px - cos * py,
        };
        *self = Affine::concat(&op, self);
        Ok(())
    }

    /// Entry-wise comparison with an absolute tolerance.
    #[must_use]
    pub fn approx_eq(&self, other: &Affine, tolerance: f32) -> bool {
        let a = [self.sx, self.kx, self.tx, self.ky, self.sy, self.ty];
        let b = [other.sx, other.kx, other.tx, other.ky, other.sy, other.ty];
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() <= tolerance)
    }
}
