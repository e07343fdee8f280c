//! Flattened vector paths.
//!
//! Glyph outlines arrive as move/line/quadratic/cubic commands and are
//! flattened here into closed polygons by incremental forward differencing
//! (step count from the control polygon length), ready for the scanline
//! rasterizer.

use crate::basics::uround;
use crate::trans_affine::TransAffine;

/// Flattening step count for a control polygon of length `len`.
#[inline]
fn curve_steps(len: f64) -> u32 {
    uround(len * 0.25).max(4)
}

/// A set of closed polygons in pixel space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    polygons: Vec<Vec<(f64, f64)>>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn polygons(&self) -> &[Vec<(f64, f64)>] {
        &self.polygons
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.iter().all(|p| p.len() < 3)
    }

    /// Append a closed polygon.
    pub fn add_polygon(&mut self, pts: Vec<(f64, f64)>) {
        if pts.len() >= 2 {
            self.polygons.push(pts);
        }
    }

    /// Append every polygon of `other`.
    pub fn append(&mut self, other: Path) {
        self.polygons.extend(other.polygons);
    }

    /// Apply an affine transform to every vertex.
    pub fn transform(&mut self, m: &TransAffine) {
        for poly in &mut self.polygons {
            for (x, y) in poly.iter_mut() {
                m.transform(x, y);
            }
        }
    }

    /// `(min_x, min_y, max_x, max_y)`, `None` for an empty path.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut it = self.polygons.iter().flatten();
        let &(x0, y0) = it.next()?;
        let mut b = (x0, y0, x0, y0);
        for &(x, y) in it {
            b.0 = b.0.min(x);
            b.1 = b.1.min(y);
            b.2 = b.2.max(x);
            b.3 = b.3.max(y);
        }
        Some(b)
    }
}

// ============================================================================
// PathBuilder: implements ttf_parser::OutlineBuilder
// ============================================================================

/// Collects glyph outline commands into flattened polygons.
///
/// Font units are mapped to pixels as `x * scale + origin_x`,
/// `origin_y - y * scale` (font y grows up, canvas y grows down).
pub struct PathBuilder {
    path: Path,
    current: Vec<(f64, f64)>,
    scale: f64,
    origin_x: f64,
    origin_y: f64,
    last: (f64, f64),
}

impl PathBuilder {
    pub fn new(scale: f64, origin_x: f64, origin_y: f64) -> Self {
        Self {
            path: Path::new(),
            current: Vec::with_capacity(64),
            scale,
            origin_x,
            origin_y,
            last: (0.0, 0.0),
        }
    }

    /// Move the pen origin, used between glyphs of one string.
    pub fn set_origin(&mut self, origin_x: f64, origin_y: f64) {
        self.origin_x = origin_x;
        self.origin_y = origin_y;
    }

    pub fn finish(mut self) -> Path {
        self.flush();
        self.path
    }

    #[inline]
    fn map(&self, x: f32, y: f32) -> (f64, f64) {
        (
            x as f64 * self.scale + self.origin_x,
            self.origin_y - y as f64 * self.scale,
        )
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            let poly = std::mem::take(&mut self.current);
            self.path.add_polygon(poly);
        }
    }

    fn push(&mut self, p: (f64, f64)) {
        self.current.push(p);
        self.last = p;
    }

    fn quad(&mut self, c: (f64, f64), e: (f64, f64)) {
        let s = self.last;
        let len = ((c.0 - s.0).hypot(c.1 - s.1)) + ((e.0 - c.0).hypot(e.1 - c.1));
        let n = curve_steps(len);
        let step = 1.0 / n as f64;
        let step2 = step * step;

        let tmpx = (s.0 - c.0 * 2.0 + e.0) * step2;
        let tmpy = (s.1 - c.1 * 2.0 + e.1) * step2;
        let (mut fx, mut fy) = s;
        let mut dfx = tmpx + (c.0 - s.0) * (2.0 * step);
        let mut dfy = tmpy + (c.1 - s.1) * (2.0 * step);
        let ddfx = tmpx * 2.0;
        let ddfy = tmpy * 2.0;

        for _ in 1..n {
            fx += dfx;
            fy += dfy;
            dfx += ddfx;
            dfy += ddfy;
            self.push((fx, fy));
        }
        self.push(e);
    }

    fn cubic(&mut self, c1: (f64, f64), c2: (f64, f64), e: (f64, f64)) {
        let s = self.last;
        let len = (c1.0 - s.0).hypot(c1.1 - s.1)
            + (c2.0 - c1.0).hypot(c2.1 - c1.1)
            + (e.0 - c2.0).hypot(e.1 - c2.1);
        let n = curve_steps(len);
        let step = 1.0 / n as f64;
        let step2 = step * step;
        let step3 = step2 * step;

        let pre1 = 3.0 * step;
        let pre2 = 3.0 * step2;
        let pre4 = 6.0 * step2;
        let pre5 = 6.0 * step3;

        let tmp1x = s.0 - c1.0 * 2.0 + c2.0;
        let tmp1y = s.1 - c1.1 * 2.0 + c2.1;
        let tmp2x = (c1.0 - c2.0) * 3.0 - s.0 + e.0;
        let tmp2y = (c1.1 - c2.1) * 3.0 - s.1 + e.1;

        let (mut fx, mut fy) = s;
        let mut dfx = (c1.0 - s.0) * pre1 + tmp1x * pre2 + tmp2x * step3;
        let mut dfy = (c1.1 - s.1) * pre1 + tmp1y * pre2 + tmp2y * step3;
        let mut ddfx = tmp1x * pre4 + tmp2x * pre5;
        let mut ddfy = tmp1y * pre4 + tmp2y * pre5;
        let dddfx = tmp2x * pre5;
        let dddfy = tmp2y * pre5;

        for _ in 1..n {
            fx += dfx;
            fy += dfy;
            dfx += ddfx;
            dfy += ddfy;
            ddfx += dddfx;
            ddfy += dddfy;
            self.push((fx, fy));
        }
        self.push(e);
    }
}

impl ttf_parser::OutlineBuilder for PathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.flush();
        let p = self.map(x, y);
        self.push(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.map(x, y);
        self.push(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let c = self.map(x1, y1);
        let e = self.map(x, y);
        self.quad(c, e);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let c1 = self.map(x1, y1);
        let c2 = self.map(x2, y2);
        let e = self.map(x, y);
        self.cubic(c1, c2, e);
    }

    fn close(&mut self) {
        self.flush();
    }
}

// ============================================================================
// Tests
// ============================================================================
