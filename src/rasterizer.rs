//! Anti-aliased polygon rasterizer.
//!
//! Converts closed polygons into an 8-bit coverage mask. Edges deposit their
//! signed area into a dense cell buffer (one cell per pixel plus two scratch
//! columns per row); a left-to-right sweep of each row accumulates the
//! winding and turns it into coverage with the non-zero rule.

use crate::path::Path;

/// 8-bit coverage mask produced by [`Rasterizer::finish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageMask {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl CoverageMask {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Coverage at `(x, y)`, 0 outside the mask.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return 0;
        }
        self.data[y as usize * self.width + x as usize]
    }

    /// Iterate `(x, y, cover)` for every pixel with non-zero coverage.
    pub fn covered(&self) -> impl Iterator<Item = (i32, i32, u8)> + '_ {
        self.data.iter().enumerate().filter_map(move |(i, &c)| {
            (c > 0).then(|| ((i % self.width) as i32, (i / self.width) as i32, c))
        })
    }
}

/// Scanline rasterizer over a fixed `width` x `height` clip box at the origin.
pub struct Rasterizer {
    width: usize,
    height: usize,
    stride: usize,
    cells: Vec<f32>,
}

impl Rasterizer {
    pub fn new(width: usize, height: usize) -> Self {
        let stride = width + 2;
        Self {
            width,
            height,
            stride,
            cells: vec![0.0; stride * height],
        }
    }

    /// Add every polygon of `path` (each is implicitly closed).
    pub fn add_path(&mut self, path: &Path) {
        for poly in path.polygons() {
            if poly.len() < 2 {
                continue;
            }
            for i in 0..poly.len() {
                let p0 = poly[i];
                let p1 = poly[(i + 1) % poly.len()];
                self.add_clipped_line(p0, p1);
            }
        }
    }

    /// Split the edge at the vertical clip boundaries, then clamp x so that
    /// parts outside the box become vertical edges on the boundary. This
    /// keeps the winding of every row inside the box exact.
    fn add_clipped_line(&mut self, p0: (f64, f64), p1: (f64, f64)) {
        let w = self.width as f64;
        let mut ts = [0.0, 1.0, 1.0, 1.0];
        let mut n = 1;
        let dx = p1.0 - p0.0;
        if dx != 0.0 {
            for bound in [0.0, w] {
                let t = (bound - p0.0) / dx;
                if t > 0.0 && t < 1.0 {
                    ts[n] = t;
                    n += 1;
                }
            }
        }
        ts[n] = 1.0;
        ts[1..n].sort_by(|a, b| a.total_cmp(b));

        let lerp = |t: f64| (p0.0 + dx * t, p0.1 + (p1.1 - p0.1) * t);
        for k in 0..n {
            let a = lerp(ts[k]);
            let b = lerp(ts[k + 1]);
            self.add_line(
                (a.0.clamp(0.0, w) as f32, a.1 as f32),
                (b.0.clamp(0.0, w) as f32, b.1 as f32),
            );
        }
    }

    fn add_line(&mut self, p0: (f32, f32), p1: (f32, f32)) {
        if p0.1 == p1.1 {
            return;
        }
        let (dir, p0, p1) = if p0.1 < p1.1 {
            (1.0f32, p0, p1)
        } else {
            (-1.0f32, p1, p0)
        };
        let h = self.height as f32;
        if p1.1 <= 0.0 || p0.1 >= h {
            return;
        }

        let dxdy = (p1.0 - p0.0) / (p1.1 - p0.1);
        let mut x = p0.0;
        let y_start = if p0.1 < 0.0 {
            x -= p0.1 * dxdy;
            0
        } else {
            p0.1 as usize
        };
        let y_end = (p1.1.ceil() as usize).min(self.height);

        for y in y_start..y_end {
            let row = y * self.stride;
            let dy = ((y + 1) as f32).min(p1.1) - (y as f32).max(p0.1);
            let xnext = x + dxdy * dy;
            let d = dy * dir;
            let (x0, x1) = if x < xnext { (x, xnext) } else { (xnext, x) };
            let x0floor = x0.floor();
            let x0i = x0floor as usize;
            let x1ceil = x1.ceil();
            let x1i = x1ceil as usize;

            if x1i <= x0i + 1 {
                // Edge stays inside one cell on this row.
                let xmf = 0.5 * (x + xnext) - x0floor;
                self.cells[row + x0i] += d - d * xmf;
                self.cells[row + x0i + 1] += d * xmf;
            } else {
                let s = (x1 - x0).recip();
                let x0f = x0 - x0floor;
                let a0 = 0.5 * s * (1.0 - x0f) * (1.0 - x0f);
                let x1f = x1 - x1ceil + 1.0;
                let am = 0.5 * s * x1f * x1f;
                self.cells[row + x0i] += d * a0;
                if x1i == x0i + 2 {
                    self.cells[row + x0i + 1] += d * (1.0 - a0 - am);
                } else {
                    let a1 = s * (1.5 - x0f);
                    self.cells[row + x0i + 1] += d * (a1 - a0);
                    for xi in x0i + 2..x1i - 1 {
                        self.cells[row + xi] += d * s;
                    }
                    let a2 = a1 + (x1i - x0i - 3) as f32 * s;
                    self.cells[row + x1i - 1] += d * (1.0 - a2 - am);
                }
                self.cells[row + x1i] += d * am;
            }
            x = xnext;
        }
    }

    /// Sweep the cells into a coverage mask.
    pub fn finish(self) -> CoverageMask {
        let mut data = vec![0u8; self.width * self.height];
        for y in 0..self.height {
            let mut acc = 0.0f32;
            let row = y * self.stride;
            for x in 0..self.width {
                acc += self.cells[row + x];
                let cover = acc.abs().min(1.0);
                data[y * self.width + x] = (cover * 255.0 + 0.5) as u8;
            }
        }
        CoverageMask {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

/// Rasterize `path` into a `width` x `height` coverage mask.
pub fn rasterize(path: &Path, width: usize, height: usize) -> CoverageMask {
    let mut ras = Rasterizer::new(width, height);
    ras.add_path(path);
    ras.finish()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Path {
        let mut p = Path::new();
        p.add_polygon(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1)]);
        p
    }

    #[test]
    fn test_pixel_aligned_rect() {
        let m = rasterize(&rect(2.0, 3.0, 6.0, 5.0), 10, 10);
        for y in 0..10 {
            for x in 0..10 {
                let inside = (2..6).contains(&x) && (3..5).contains(&y);
                assert_eq!(m.get(x, y), if inside { 255 } else { 0 }, "({x},{y})");
            }
        }
    }

    #[test]
    fn test_half_pixel_coverage() {
        let m = rasterize(&rect(2.5, 0.0, 4.0, 1.0), 6, 1);
        assert!((m.get(2, 0) as i32 - 128).abs() <= 1);
        assert_eq!(m.get(3, 0), 255);
        assert_eq!(m.get(4, 0), 0);
    }

    #[test]
    fn test_winding_direction_irrelevant() {
        let mut p = Path::new();
        p.add_polygon(vec![(1.0, 1.0), (1.0, 4.0), (4.0, 4.0), (4.0, 1.0)]);
        let m = rasterize(&p, 6, 6);
        assert_eq!(m.get(2, 2), 255);
    }

    #[test]
    fn test_clipped_outside_box() {
        // Rectangle sticking out on every side fills the whole box.
        let m = rasterize(&rect(-5.0, -5.0, 15.0, 15.0), 8, 8);
        assert!(m.covered().count() == 64);
        assert_eq!(m.get(0, 0), 255);
        assert_eq!(m.get(7, 7), 255);
    }

    #[test]
    fn test_diagonal_triangle_area() {
        let mut p = Path::new();
        p.add_polygon(vec![(0.0, 0.0), (8.0, 0.0), (0.0, 8.0)]);
        let m = rasterize(&p, 8, 8);
        let total: f64 = m.covered().map(|(_, _, c)| c as f64 / 255.0).sum();
        assert!((total - 32.0).abs() < 0.5, "area = {total}");
    }

    #[test]
    fn test_out_of_range_get() {
        let m = rasterize(&rect(0.0, 0.0, 2.0, 2.0), 2, 2);
        assert_eq!(m.get(-1, 0), 0);
        assert_eq!(m.get(0, 2), 0);
    }
}
