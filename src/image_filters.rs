//! Bilinear image sampling and resampling.
//!
//! Sampling works on straight-alpha RGBA8 buffers. Each 2x2 neighbourhood is
//! blended premultiplied with 8-bit subpixel weights (`(x_hr, y_hr)` in
//! 24.8 fixed point) and converted back to straight alpha, so transparent
//! neighbours never darken an edge.

use crate::basics::{ifloor, AreaRect};
use crate::color::Rgba8;

pub const IMAGE_SUBPIXEL_SHIFT: u32 = 8;
pub const IMAGE_SUBPIXEL_SCALE: u32 = 1 << IMAGE_SUBPIXEL_SHIFT; // 256
pub const IMAGE_SUBPIXEL_MASK: u32 = IMAGE_SUBPIXEL_SCALE - 1;

/// What a read outside the source returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeMode {
    /// Repeat the nearest edge pixel (scaling).
    Clamp,
    /// Transparent black (rotation, affine placement).
    Transparent,
}

/// Borrowed straight-alpha RGBA8 source.
#[derive(Debug, Clone, Copy)]
pub struct ImageSource<'a> {
    pub data: &'a [u8],
    pub width: i32,
    pub height: i32,
}

impl ImageSource<'_> {
    #[inline]
    fn fetch(&self, x: i32, y: i32, edge: EdgeMode) -> [u32; 4] {
        let (x, y) = match edge {
            EdgeMode::Clamp => (x.clamp(0, self.width - 1), y.clamp(0, self.height - 1)),
            EdgeMode::Transparent => {
                if x < 0 || y < 0 || x >= self.width || y >= self.height {
                    return [0; 4];
                }
                (x, y)
            }
        };
        let i = ((y * self.width + x) * 4) as usize;
        let a = self.data[i + 3] as u32;
        // Premultiply.
        [
            self.data[i] as u32 * a,
            self.data[i + 1] as u32 * a,
            self.data[i + 2] as u32 * a,
            a * 255,
        ]
    }

    /// Bilinear sample at continuous coordinates, pixel centres at `i + 0.5`.
    pub fn sample_bilinear(&self, x: f64, y: f64, edge: EdgeMode) -> Rgba8 {
        if self.width <= 0 || self.height <= 0 {
            return Rgba8::default();
        }
        let scale = IMAGE_SUBPIXEL_SCALE as f64;
        let x_hr = ifloor((x - 0.5) * scale);
        let y_hr = ifloor((y - 0.5) * scale);
        let x_lr = x_hr >> IMAGE_SUBPIXEL_SHIFT;
        let y_lr = y_hr >> IMAGE_SUBPIXEL_SHIFT;
        let x_frac = (x_hr & IMAGE_SUBPIXEL_MASK as i32) as u32;
        let y_frac = (y_hr & IMAGE_SUBPIXEL_MASK as i32) as u32;
        let subpix = IMAGE_SUBPIXEL_SCALE;

        let weights = [
            ((subpix - x_frac) * (subpix - y_frac), x_lr, y_lr),
            (x_frac * (subpix - y_frac), x_lr + 1, y_lr),
            ((subpix - x_frac) * y_frac, x_lr, y_lr + 1),
            (x_frac * y_frac, x_lr + 1, y_lr + 1),
        ];

        let mut fg = [0u64; 4];
        for (w, sx, sy) in weights {
            if w == 0 {
                continue;
            }
            let p = self.fetch(sx, sy, edge);
            for c in 0..4 {
                fg[c] += p[c] as u64 * w as u64;
            }
        }

        // fg holds premultiplied values scaled by 255 * 2^16.
        let a = fg[3];
        if a == 0 {
            return Rgba8::default();
        }
        let un = |v: u64| ((v * 255 + a / 2) / a).min(255) as u8;
        let half = 1u64 << (IMAGE_SUBPIXEL_SHIFT * 2 - 1);
        Rgba8::new(
            un(fg[0]),
            un(fg[1]),
            un(fg[2]),
            ((a / 255 + half) >> (IMAGE_SUBPIXEL_SHIFT * 2)).min(255) as u8,
        )
    }
}

/// Bilinear resample of `src` into a `dst_w` x `dst_h` straight RGBA buffer.
pub fn resample(src: ImageSource<'_>, dst_w: i32, dst_h: i32) -> Vec<u8> {
    let mut out = vec![0u8; (dst_w.max(0) * dst_h.max(0) * 4) as usize];
    if dst_w <= 0 || dst_h <= 0 || src.width <= 0 || src.height <= 0 {
        return out;
    }
    let kx = src.width as f64 / dst_w as f64;
    let ky = src.height as f64 / dst_h as f64;
    for y in 0..dst_h {
        let sy = (y as f64 + 0.5) * ky;
        for x in 0..dst_w {
            let sx = (x as f64 + 0.5) * kx;
            let c = src.sample_bilinear(sx, sy, EdgeMode::Clamp);
            let i = ((y * dst_w + x) * 4) as usize;
            out[i..i + 4].copy_from_slice(&[c.r, c.g, c.b, c.a]);
        }
    }
    out
}

/// Rectangle that fits a `src_w` x `src_h` image into `width` x `height`
/// keeping its aspect ratio; the letterboxed axis is padded evenly when
/// `center_align` is set, otherwise the content sits at the top/left.
pub fn calc_resized_rect(src_w: i32, src_h: i32, width: i32, height: i32, center_align: bool) -> AreaRect {
    if src_w <= 0 || src_h <= 0 {
        return AreaRect::new(0, 0, width, height);
    }
    if width * src_h < height * src_w {
        let ratio = width as f64 / src_w as f64;
        let th = (src_h as f64 * ratio) as i32;
        let pad = if center_align { (height - th) / 2 } else { 0 };
        AreaRect::new(0, pad, width, pad + th)
    } else {
        let ratio = height as f64 / src_h as f64;
        let tw = (src_w as f64 * ratio) as i32;
        let pad = if center_align { (width - tw) / 2 } else { 0 };
        AreaRect::new(pad, 0, pad + tw, height)
    }
}

// ============================================================================
// Tests
// ============================================================================
