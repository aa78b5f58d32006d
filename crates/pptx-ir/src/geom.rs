// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Point, rect and affine matrix primitives.
//!
//! `Matrix` is a 2x3 affine transform embedded in the bottom row
//! `[0 0 1]` of a conceptual 3x3 matrix, matching the SVG `transform`
//! grammar's `matrix(a b c d e f)` layout.

/// An immutable 2D point.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// An axis-aligned rectangle. `width` and `height` are always >= 0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Creates a new rect, swapping/normalizing so that width/height are non-negative.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        let (x, width) = if width < 0.0 { (x + width, -width) } else { (x, width) };
        let (y, height) = if height < 0.0 { (y + height, -height) } else { (y, height) };
        Rect { x, y, width, height }
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// The smallest rect containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.left().min(other.left());
        let y = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Builds a rect from two arbitrary (not necessarily ordered) corners.
    pub fn from_corners(a: Point, b: Point) -> Rect {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Rect::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left(), self.top()),
            Point::new(self.right(), self.top()),
            Point::new(self.right(), self.bottom()),
            Point::new(self.left(), self.bottom()),
        ]
    }
}

/// A decomposition of an affine matrix into translation, rotation, scale and skew.
///
/// Used by mappers to pick a simpler DrawingML transform encoding (a
/// plain `<a:off>`/`<a:ext>` pair) when a matrix carries no rotation or
/// skew, instead of always falling back to `custGeom`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decomposed {
    pub translate_x: f64,
    pub translate_y: f64,
    pub rotation: f64, // radians, clockwise in the SVG y-down frame
    pub scale_x: f64,
    pub scale_y: f64,
    pub skew: f64, // radians
}

/// An immutable affine matrix: `[a c e; b d f; 0 0 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    #[inline]
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Matrix { a, b, c, d, e, f }
    }

    pub fn translate(tx: f64, ty: f64) -> Self {
        Matrix::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Matrix::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// `angle` in degrees, clockwise (SVG convention, y-axis down).
    pub fn rotate(angle_deg: f64) -> Self {
        let r = angle_deg.to_radians();
        Matrix::new(r.cos(), r.sin(), -r.sin(), r.cos(), 0.0, 0.0)
    }

    pub fn skew_x(angle_deg: f64) -> Self {
        Matrix::new(1.0, 0.0, angle_deg.to_radians().tan(), 1.0, 0.0, 0.0)
    }

    pub fn skew_y(angle_deg: f64) -> Self {
        Matrix::new(1.0, angle_deg.to_radians().tan(), 0.0, 1.0, 0.0, 0.0)
    }

    pub fn is_identity(&self) -> bool {
        *self == Matrix::IDENTITY
    }

    /// Composes `self` and `other` such that applying the result to a
    /// point equals applying `self` then `other`: `self.compose(other)`
    /// is "self, then other" in *application* order, i.e. the matrix
    /// product `other * self` in row-vector-on-the-right convention.
    ///
    /// Concretely: when the coordinate space pushes a nested
    /// `transform`, the new CTM is `parent_ctm.compose(local)` so that
    /// `local` is applied first (closest to the raw coordinates) and
    /// `parent_ctm` afterwards — this is the right-to-left composition
    /// spec.md §4.2 requires.
    pub fn compose(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Inverts the matrix. Fails when `|det| < 1e-12` (spec.md §4.2 `Singular`).
    pub fn inverse(&self) -> Result<Matrix, crate::Error> {
        let det = self.determinant();
        if det.abs() < 1e-12 {
            return Err(crate::Error::Singular);
        }
        let inv_det = 1.0 / det;
        Ok(Matrix {
            a: self.d * inv_det,
            b: -self.b * inv_det,
            c: -self.c * inv_det,
            d: self.a * inv_det,
            e: (self.c * self.f - self.d * self.e) * inv_det,
            f: (self.b * self.e - self.a * self.f) * inv_det,
        })
    }

    #[inline]
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        (self.a * x + self.c * y + self.e, self.b * x + self.d * y + self.f)
    }

    /// Transforms a vector (ignores translation) — used for relative
    /// path commands, where only the linear part of the CTM applies.
    #[inline]
    pub fn transform_vector(&self, x: f64, y: f64) -> (f64, f64) {
        (self.a * x + self.c * y, self.b * x + self.d * y)
    }

    pub fn transform_points(&self, points: &[(f64, f64)]) -> Vec<(f64, f64)> {
        points.iter().map(|&(x, y)| self.transform_point(x, y)).collect()
    }

    /// Transforms an axis-aligned rect's corners and returns their
    /// bounding box, per spec.md §4.5's Rectangle transform rule.
    pub fn transform_rect_bbox(&self, rect: &Rect) -> Rect {
        let corners = rect.corners();
        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;
        for p in &corners {
            let (x, y) = self.transform_point(p.x, p.y);
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// True when the linear part is a pure (possibly non-uniform) scale
    /// plus translation: no rotation and no skew. Used to decide whether
    /// a rotated rectangle must be demoted to a `PathShape` (spec.md §4.5).
    pub fn is_axis_aligned(&self) -> bool {
        self.b.abs() < 1e-9 && self.c.abs() < 1e-9
    }

    /// True when x/y scale factors are (approximately) equal, used to
    /// decide whether a transformed circle stays a `Circle` or is
    /// promoted to an `Ellipse` (spec.md §4.5, Scenario B).
    pub fn has_uniform_scale(&self) -> bool {
        let Decomposed { scale_x, scale_y, skew, .. } = self.decompose();
        (scale_x - scale_y).abs() < 1e-6 && skew.abs() < 1e-9
    }

    /// Standard QR-style decomposition into translate/rotate/scale/skew.
    pub fn decompose(&self) -> Decomposed {
        let delta = self.a * self.d - self.b * self.c;

        let (rotation, scale_x, scale_y, skew);
        if self.a != 0.0 || self.b != 0.0 {
            let r = (self.a * self.a + self.b * self.b).sqrt();
            rotation = if self.b >= 0.0 { (self.a / r).acos() } else { -(self.a / r).acos() };
            scale_x = r;
            scale_y = delta / r;
            skew = ((self.a * self.c + self.b * self.d) / (r * r)).atan();
        } else if self.c != 0.0 || self.d != 0.0 {
            let s = (self.c * self.c + self.d * self.d).sqrt();
            rotation = std::f64::consts::FRAC_PI_2
                - if self.d >= 0.0 { (self.c / s).acos() } else { -(self.c / s).acos() };
            scale_x = delta / s;
            scale_y = s;
            skew = 0.0;
        } else {
            rotation = 0.0;
            scale_x = 0.0;
            scale_y = 0.0;
            skew = 0.0;
        }

        Decomposed {
            translate_x: self.e,
            translate_y: self.f,
            rotation,
            scale_x,
            scale_y,
            skew,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_with_identity_is_identity() {
        let m = Matrix::new(2.0, 0.3, -0.1, 1.5, 10.0, -4.0);
        assert_eq!(m.compose(&Matrix::IDENTITY), m);
        assert_eq!(Matrix::IDENTITY.compose(&m), m);
    }

    #[test]
    fn inverse_round_trips() {
        let m = Matrix::translate(5.0, -3.0).compose(&Matrix::rotate(30.0)).compose(&Matrix::scale(2.0, 0.5));
        let inv = m.inverse().unwrap();
        let back = inv.inverse().unwrap();
        assert!((back.a - m.a).abs() < 1e-9);
        assert!((back.e - m.e).abs() < 1e-9);
    }

    #[test]
    fn singular_matrix_is_rejected() {
        let m = Matrix::new(1.0, 2.0, 2.0, 4.0, 0.0, 0.0);
        assert!(matches!(m.inverse(), Err(crate::Error::Singular)));
    }

    #[test]
    fn translate_then_scale_matches_scenario_a() {
        // Scenario A: rect baked through translate(5,10) composed under
        // the root viewport matrix is applied elsewhere; here we check
        // the raw translate arithmetic.
        let m = Matrix::translate(5.0, 10.0);
        let (x, y) = m.transform_point(10.0, 20.0);
        assert_eq!((x, y), (15.0, 30.0));
    }

    #[test]
    fn nested_group_scenario_c() {
        let outer = Matrix::translate(10.0, 20.0);
        let inner = Matrix::scale(2.0, 2.0);
        let ctm = outer.compose(&inner);
        let (x, y) = ctm.transform_point(5.0, 10.0);
        assert_eq!((x, y), (20.0, 40.0));
        let rect = Rect::new(x, y, 20.0 * 2.0, 30.0 * 2.0);
        assert_eq!(rect, Rect::new(20.0, 40.0, 40.0, 60.0));
    }
}
