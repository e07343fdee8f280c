//! Indexed-color canvas.
//!
//! One byte per pixel into a small [`Palette`]. Used for the thumbnail noise
//! layer and the distortable thumbnail: drawing snaps every pixel to the
//! nearest table entry, so edges stay crisp and the sine warp is a plain
//! index copy.

use crate::basics::{deg2rad, ifloor, Point, Size};
use crate::canvas::{Canvas, DrawString, DrawStringParams, Rotatable};
use crate::color::{Palette, Rgba8};
use crate::error::{RenderError, Result};
use crate::rgba_canvas::RgbaCanvas;
use crate::trans_affine::rotate_point;

#[derive(Debug, Clone)]
pub struct PaletteCanvas {
    width: i32,
    height: i32,
    palette: Palette,
    pix: Vec<u8>,
}

impl PaletteCanvas {
    /// Fully transparent (index 0) canvas.
    pub fn new(size: Size, palette: Palette) -> Result<Self> {
        if !size.is_valid() {
            return Err(RenderError::InvalidCanvas {
                width: size.width,
                height: size.height,
            }
            .into());
        }
        Ok(Self {
            width: size.width,
            height: size.height,
            palette,
            pix: vec![0; (size.width * size.height) as usize],
        })
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            None
        } else {
            Some((y * self.width + x) as usize)
        }
    }

    /// Palette index at `(x, y)`, 0 outside the canvas.
    #[inline]
    pub fn index_at(&self, x: i32, y: i32) -> u8 {
        self.offset(x, y).map_or(0, |i| self.pix[i])
    }

    #[inline]
    pub fn set_index(&mut self, x: i32, y: i32, index: u8) {
        if let Some(i) = self.offset(x, y) {
            self.pix[i] = index;
        }
    }

    pub fn color_at(&self, x: i32, y: i32) -> Rgba8 {
        self.palette.color(self.index_at(x, y))
    }

    /// Set the pixel to the palette entry closest to `c`.
    #[inline]
    pub fn set_color(&mut self, x: i32, y: i32, c: Rgba8) {
        if self.offset(x, y).is_some() {
            let idx = self.palette.nearest(c);
            self.set_index(x, y, idx);
        }
    }

    // ====================================================================
    // Primitives
    // ====================================================================

    /// Horizontal run `from_x..=to_x` on row `y`.
    pub fn draw_horiz_line(&mut self, from_x: i32, to_x: i32, y: i32, c: Rgba8) {
        if y < 0 || y >= self.height {
            return;
        }
        let idx = self.palette.nearest(c);
        for x in from_x.max(0)..=to_x.min(self.width - 1) {
            self.set_index(x, y, idx);
        }
    }

    /// Filled circle, midpoint algorithm with symmetric horizontal spans.
    pub fn draw_circle(&mut self, x: i32, y: i32, radius: i32, c: Rgba8) {
        let mut f = 1 - radius;
        let mut dfx = 1;
        let mut dfy = -2 * radius;
        let mut xo = 0;
        let mut yo = radius;

        self.set_color(x, y + radius, c);
        self.set_color(x, y - radius, c);
        self.draw_horiz_line(x - radius, x + radius, y, c);

        while xo < yo {
            if f >= 0 {
                yo -= 1;
                dfy += 2;
                f += dfy;
            }
            xo += 1;
            dfx += 2;
            f += dfx;
            self.draw_horiz_line(x - xo, x + xo, y + yo, c);
            self.draw_horiz_line(x - xo, x + xo, y - yo, c);
            self.draw_horiz_line(x - yo, x + yo, y + xo, c);
            self.draw_horiz_line(x - yo, x + yo, y - xo, c);
        }
    }

    /// Bresenham line, each step widened to 5px horizontally.
    pub fn draw_line(&mut self, p1: Point, p2: Point, c: Rgba8) {
        let idx = self.palette.nearest(c);
        let dx = (p1.x - p2.x).abs();
        let dy = (p2.y - p1.y).abs();
        let sx = if p1.x >= p2.x { -1 } else { 1 };
        let sy = if p1.y >= p2.y { -1 } else { 1 };
        let mut err = dx - dy;
        let (mut x, mut y) = (p1.x, p1.y);
        loop {
            for off in -2..=2 {
                self.set_index(x + off, y, idx);
            }
            if x == p2.x && y == p2.y {
                return;
            }
            let e2 = err * 2;
            if e2 > -dy {
                err -= dy;
                x += sx;
            }
            if e2 < dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Sine-wave warp: every pixel `(x, y)` takes the index of
    /// `(x + amp*sin(2πy/period), y + amp*cos(2πx/period))`.
    pub fn distort(&mut self, amplitude: f64, period: f64) {
        if period == 0.0 {
            return;
        }
        let k = 2.0 * std::f64::consts::PI / period;
        let mut out = vec![0u8; self.pix.len()];
        for y in 0..self.height {
            let xo = (amplitude * (y as f64 * k).sin()) as i32;
            for x in 0..self.width {
                let yo = (amplitude * (x as f64 * k).cos()) as i32;
                out[(y * self.width + x) as usize] = self.index_at(x + xo, y + yo);
            }
        }
        self.pix = out;
    }

    /// Composite an RGBA canvas at `at`, snapping blended colors to the palette.
    pub fn draw_rgba(&mut self, src: &RgbaCanvas, at: Point) {
        let s = src.size();
        for y in 0..s.height {
            for x in 0..s.width {
                let c = src.pixel(x, y);
                if c.a == 0 {
                    continue;
                }
                let (dx, dy) = (at.x + x, at.y + y);
                let blended = self.color_at(dx, dy).blend_over(c);
                self.set_color(dx, dy, blended);
            }
        }
    }

    /// Expand to a direct-color canvas.
    pub fn to_rgba(&self) -> RgbaCanvas {
        let mut data = Vec::with_capacity(self.pix.len() * 4);
        for &i in &self.pix {
            let c = self.palette.color(i);
            data.extend_from_slice(&[c.r, c.g, c.b, c.a]);
        }
        RgbaCanvas::from_raw_parts(self.width, self.height, data)
    }
}

impl Canvas for PaletteCanvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    fn alpha_at(&self, x: i32, y: i32) -> u8 {
        self.color_at(x, y).a
    }
}

impl Rotatable for PaletteCanvas {
    /// Nearest-neighbour rotation about `(w/2, w/2)` keeping the canvas size.
    /// Pixels that map outside the source become transparent.
    fn rotate(&mut self, angle: i32) {
        if angle == 0 {
            return;
        }
        let r = (self.width / 2) as f64;
        let (sin, cos) = deg2rad(angle as f64).sin_cos();
        let mut out = vec![0u8; self.pix.len()];
        for y in 0..self.height {
            for x in 0..self.width {
                // y-up frame about the centre, turned back by the angle.
                let (qx, qy) = rotate_point(x as f64 - r, r - y as f64, -sin, cos);
                let (tx, ty) = (qx + r, r - qy);
                out[(y * self.width + x) as usize] =
                    self.index_at(ifloor(tx + 1e-9), ifloor(ty + 1e-9));
            }
        }
        self.pix = out;
    }
}

impl DrawString for PaletteCanvas {
    fn draw_string(&mut self, params: &DrawStringParams<'_>, origin: Point) -> Result<()> {
        let mask = params.coverage(self.size(), origin)?;
        for (x, y, cover) in mask.covered() {
            let blended = self.color_at(x, y).blend_over(params.color.mult_cover(cover));
            self.set_color(x, y, blended);
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba8 = Rgba8::new_opaque(255, 0, 0);
    const BLUE: Rgba8 = Rgba8::new_opaque(0, 0, 255);

    fn canvas(w: i32, h: i32) -> PaletteCanvas {
        PaletteCanvas::new(Size::new(w, h), Palette::new(&[RED, BLUE]).unwrap()).unwrap()
    }

    #[test]
    fn test_new_is_transparent() {
        let c = canvas(5, 4);
        assert_eq!(c.margin_blank_area(), None);
        assert_eq!(c.color_at(2, 2), Rgba8::TRANSPARENT);
        assert!(PaletteCanvas::new(Size::new(0, 4), Palette::new(&[]).unwrap()).is_err());
    }

    #[test]
    fn test_draw_circle() {
        let mut c = canvas(20, 20);
        c.draw_circle(10, 10, 4, RED);
        assert_eq!(c.index_at(10, 10), 1);
        assert_eq!(c.index_at(14, 10), 1);
        assert_eq!(c.index_at(10, 6), 1);
        assert_eq!(c.index_at(10, 14), 1);
        assert_eq!(c.index_at(14, 14), 0);
        assert_eq!(c.index_at(16, 10), 0);
    }

    #[test]
    fn test_draw_line_is_wide() {
        let mut c = canvas(30, 10);
        c.draw_line(Point::new(5, 2), Point::new(25, 2), BLUE);
        for x in 3..=27 {
            assert_eq!(c.index_at(x, 2), 2, "x = {x}");
        }
        assert_eq!(c.index_at(15, 3), 0);
        // Out-of-range endpoints are clipped, not a panic.
        c.draw_line(Point::new(-5, -5), Point::new(40, 20), RED);
    }

    #[test]
    fn test_distort_zero_amplitude_is_identity() {
        let mut c = canvas(16, 16);
        c.draw_circle(8, 8, 3, RED);
        let before = c.pix.clone();
        c.distort(0.0, 100.0);
        assert_eq!(c.pix, before);
    }

    #[test]
    fn test_distort_shifts() {
        let mut c = canvas(16, 16);
        c.set_index(0, 2, 1);
        // Row 0 has no x shift (sin 0) and column 0 reads two rows down (2*cos 0).
        c.distort(2.0, 4.0);
        assert_eq!(c.index_at(0, 0), 1);
    }

    #[test]
    fn test_rotate_zero_noop_and_180() {
        let mut c = canvas(10, 10);
        c.set_index(2, 3, 2);
        let before = c.pix.clone();
        c.rotate(0);
        assert_eq!(c.pix, before);

        c.rotate(180);
        assert_eq!(c.index_at(8, 7), 2);
        assert_eq!(c.index_at(2, 3), 0);
    }

    #[test]
    fn test_draw_rgba_snaps() {
        let mut c = canvas(4, 4);
        let mut src = RgbaCanvas::new(Size::new(2, 2)).unwrap();
        src.set_pixel(0, 0, Rgba8::new_opaque(240, 20, 20));
        src.set_pixel(1, 1, Rgba8::new_opaque(10, 10, 230));
        c.draw_rgba(&src, Point::new(1, 1));
        assert_eq!(c.index_at(1, 1), 1);
        assert_eq!(c.index_at(2, 2), 2);
        assert_eq!(c.index_at(0, 0), 0);
    }

    #[test]
    fn test_to_rgba() {
        let mut c = canvas(3, 1);
        c.set_index(1, 0, 2);
        let r = c.to_rgba();
        assert_eq!(r.pixel(1, 0), BLUE);
        assert_eq!(r.pixel(0, 0).a, 0);
    }
}
