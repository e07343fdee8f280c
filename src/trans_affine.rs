//! Affine transformation matrix and rotated-rectangle geometry.
//!
//! Canvas rotation and glyph placement both go through `TransAffine`:
//! rotation, scaling and translation composed by post-multiplication.
//! With the y axis pointing down, a positive rotation angle turns content
//! clockwise on screen.

use crate::basics::deg2rad;

/// 2D affine transformation matrix.
///
/// Stores six components: `[sx, shy, shx, sy, tx, ty]` representing the
/// matrix:
///
/// ```text
///   | sx  shx tx |
///   | shy  sy ty |
///   |  0    0  1 |
/// ```
///
/// Transform: `x' = x*sx + y*shx + tx`, `y' = x*shy + y*sy + ty`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransAffine {
    pub sx: f64,
    pub shy: f64,
    pub shx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

impl TransAffine {
    // ====================================================================
    // Construction
    // ====================================================================

    /// Identity matrix.
    pub fn new() -> Self {
        Self::new_custom(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// Custom matrix from six components.
    pub fn new_custom(sx: f64, shy: f64, shx: f64, sy: f64, tx: f64, ty: f64) -> Self {
        Self {
            sx,
            shy,
            shx,
            sy,
            tx,
            ty,
        }
    }

    /// Rotation matrix, angle in radians.
    pub fn new_rotation(a: f64) -> Self {
        let (sa, ca) = a.sin_cos();
        Self::new_custom(ca, sa, -sa, ca, 0.0, 0.0)
    }

    /// Translation matrix.
    pub fn new_translation(x: f64, y: f64) -> Self {
        Self::new_custom(1.0, 0.0, 0.0, 1.0, x, y)
    }

    /// Rotation by `deg` degrees about `(cx, cy)`.
    pub fn new_rotation_about(deg: f64, cx: f64, cy: f64) -> Self {
        let mut m = Self::new_translation(-cx, -cy);
        m.multiply(&Self::new_rotation(deg2rad(deg)));
        m.multiply(&Self::new_translation(cx, cy));
        m
    }

    // ====================================================================
    // Composition
    // ====================================================================

    /// Post-multiply: `self = self * m` (apply `self` first, then `m`).
    pub fn multiply(&mut self, m: &TransAffine) -> &mut Self {
        let t0 = self.sx * m.sx + self.shy * m.shx;
        let t2 = self.shx * m.sx + self.sy * m.shx;
        let t4 = self.tx * m.sx + self.ty * m.shx + m.tx;
        self.shy = self.sx * m.shy + self.shy * m.sy;
        self.sy = self.shx * m.shy + self.sy * m.sy;
        self.ty = self.tx * m.shy + self.ty * m.sy + m.ty;
        self.sx = t0;
        self.shx = t2;
        self.tx = t4;
        self
    }

    // ====================================================================
    // Application
    // ====================================================================

    /// Transform a point in place.
    #[inline]
    pub fn transform(&self, x: &mut f64, y: &mut f64) {
        let tmp = *x;
        *x = tmp * self.sx + *y * self.shx + self.tx;
        *y = tmp * self.shy + *y * self.sy + self.ty;
    }

    /// Apply the inverse without building the inverted matrix.
    #[inline]
    pub fn inverse_transform(&self, x: &mut f64, y: &mut f64) {
        let d = self.determinant_reciprocal();
        let a = (*x - self.tx) * d;
        let b = (*y - self.ty) * d;
        *x = a * self.sy - b * self.shx;
        *y = b * self.sx - a * self.shy;
    }

    fn determinant_reciprocal(&self) -> f64 {
        1.0 / (self.sx * self.sy - self.shy * self.shx)
    }
}

impl Default for TransAffine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Rotated rectangle geometry
// ============================================================================

/// Rotate `(x, y)` about the origin given a precomputed sine and cosine.
#[inline]
pub fn rotate_point(x: f64, y: f64, sin: f64, cos: f64) -> (f64, f64) {
    (x * cos - y * sin, x * sin + y * cos)
}

/// Size of the axis-aligned box holding a `w`x`h` rectangle rotated by
/// `angle` degrees. Fractional overflow above 0.1 rounds up.
pub fn rotated_size(w: i32, h: i32, angle: f64) -> (i32, i32) {
    if w <= 0 || h <= 0 {
        return (0, 0);
    }
    let (sin, cos) = deg2rad(angle).sin_cos();
    let (x1, y1) = rotate_point((w - 1) as f64, 0.0, sin, cos);
    let (x2, y2) = rotate_point((w - 1) as f64, (h - 1) as f64, sin, cos);
    let (x3, y3) = rotate_point(0.0, (h - 1) as f64, sin, cos);

    let min_x = x1.min(x2).min(x3).min(0.0);
    let max_x = x1.max(x2).max(x3).max(0.0);
    let min_y = y1.min(y2).min(y3).min(0.0);
    let max_y = y1.max(y2).max(y3).max(0.0);

    let round_up = |v: f64| {
        if v - v.floor() > 0.1 {
            v + 1.0
        } else {
            v
        }
    };
    let width = round_up(max_x - min_x + 1.0);
    let height = round_up(max_y - min_y + 1.0);
    (width as i32, height as i32)
}

// ============================================================================
// Tests
// ============================================================================
