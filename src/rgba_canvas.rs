//! Direct-color canvas with straight alpha.
//!
//! Owns its pixel store outright; `scale`, `rotate`, `crop_circle` and
//! `sub_image` build a new store and replace the old one wholesale.

use image::{DynamicImage, RgbaImage};

use crate::basics::{iround, AreaRect, Point, Size};
use crate::canvas::{Canvas, DrawString, DrawStringParams, Rotatable};
use crate::color::Rgba8;
use crate::error::{RenderError, Result};
use crate::image_filters::{calc_resized_rect, resample, EdgeMode, ImageSource};
use crate::trans_affine::{rotated_size, TransAffine};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaCanvas {
    width: i32,
    height: i32,
    pix: Vec<u8>,
}

impl RgbaCanvas {
    // ====================================================================
    // Construction
    // ====================================================================

    /// Fully transparent canvas.
    pub fn new(size: Size) -> Result<Self> {
        Self::new_filled(size, Rgba8::default())
    }

    /// Canvas filled with one color.
    pub fn new_filled(size: Size, c: Rgba8) -> Result<Self> {
        if !size.is_valid() {
            return Err(RenderError::InvalidCanvas {
                width: size.width,
                height: size.height,
            }
            .into());
        }
        let n = (size.width * size.height) as usize;
        let mut pix = Vec::with_capacity(n * 4);
        for _ in 0..n {
            pix.extend_from_slice(&[c.r, c.g, c.b, c.a]);
        }
        Ok(Self {
            width: size.width,
            height: size.height,
            pix,
        })
    }

    /// Wrap an existing straight-alpha buffer. `data.len()` must be `w*h*4`.
    pub(crate) fn from_raw_parts(width: i32, height: i32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), (width.max(0) * height.max(0) * 4) as usize);
        Self {
            width,
            height,
            pix: data,
        }
    }

    pub fn from_image(img: &RgbaImage) -> Self {
        Self::from_raw_parts(img.width() as i32, img.height() as i32, img.as_raw().clone())
    }

    pub fn from_dynamic(img: &DynamicImage) -> Self {
        Self::from_image(&img.to_rgba8())
    }

    /// Decode any PNG or JPEG byte stream.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_dynamic(&img))
    }

    pub fn to_image(&self) -> Result<RgbaImage> {
        RgbaImage::from_raw(self.width as u32, self.height as u32, self.pix.clone()).ok_or(
            RenderError::InvalidCanvas {
                width: self.width,
                height: self.height,
            }
            .into(),
        )
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.pix
    }

    fn source(&self) -> ImageSource<'_> {
        ImageSource {
            data: &self.pix,
            width: self.width,
            height: self.height,
        }
    }

    // ====================================================================
    // Pixel access
    // ====================================================================

    #[inline]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            None
        } else {
            Some(((y * self.width + x) * 4) as usize)
        }
    }

    /// Pixel at `(x, y)`, transparent outside the canvas.
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Rgba8 {
        match self.offset(x, y) {
            Some(i) => Rgba8::new(self.pix[i], self.pix[i + 1], self.pix[i + 2], self.pix[i + 3]),
            None => Rgba8::default(),
        }
    }

    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, c: Rgba8) {
        if let Some(i) = self.offset(x, y) {
            self.pix[i..i + 4].copy_from_slice(&[c.r, c.g, c.b, c.a]);
        }
    }

    /// Source-over one pixel.
    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, c: Rgba8) {
        if c.a == 0 {
            return;
        }
        let d = self.pixel(x, y);
        self.set_pixel(x, y, d.blend_over(c));
    }

    // ====================================================================
    // Compositing
    // ====================================================================

    /// Source-over `src` with its top-left at `at`.
    pub fn draw_image(&mut self, src: &RgbaCanvas, at: Point) {
        self.draw_image_area(src, AreaRect::new(0, 0, src.width, src.height), at);
    }

    /// Source-over the `area` of `src` with its top-left at `at`.
    pub fn draw_image_area(&mut self, src: &RgbaCanvas, area: AreaRect, at: Point) {
        let area = area.clip(&AreaRect::new(0, 0, src.width, src.height));
        for y in area.min_y..area.max_y {
            for x in area.min_x..area.max_x {
                let c = src.pixel(x, y);
                self.blend_pixel(at.x + x - area.min_x, at.y + y - area.min_y, c);
            }
        }
    }

    /// Replace every pixel with `src` read from `src_origin` onwards
    /// (a straight copy; reads outside `src` give transparent pixels).
    pub fn copy_from(&mut self, src: &RgbaCanvas, src_origin: Point) {
        for y in 0..self.height {
            for x in 0..self.width {
                let c = src.pixel(src_origin.x + x, src_origin.y + y);
                self.set_pixel(x, y, c);
            }
        }
    }

    /// Keep only what `mask` covers: alpha is multiplied by the mask's
    /// alpha at the same coordinates.
    pub fn apply_mask(&mut self, mask: &RgbaCanvas) {
        for y in 0..self.height {
            for x in 0..self.width {
                let m = mask.pixel(x, y).a;
                let c = self.pixel(x, y);
                self.set_pixel(x, y, c.mult_cover(m));
            }
        }
    }

    /// Multiply every pixel's alpha by `alpha`.
    pub fn scale_alpha(&mut self, alpha: u8) {
        if alpha == 255 {
            return;
        }
        for px in self.pix.chunks_exact_mut(4) {
            px[3] = Rgba8::multiply(px[3], alpha);
        }
    }

    /// Silhouette in `color`: RGB replaced, alpha = source alpha x color alpha.
    pub fn tint(&mut self, color: Rgba8) {
        for px in self.pix.chunks_exact_mut(4) {
            let a = Rgba8::multiply(px[3], color.a);
            px.copy_from_slice(&[color.r, color.g, color.b, a]);
        }
    }

    /// Composite onto an opaque `bg` color, leaving every pixel opaque.
    pub fn flatten(&self, bg: Rgba8) -> RgbaCanvas {
        let mut out = self.clone();
        for px in out.pix.chunks_exact_mut(4) {
            let c = bg.blend_over(Rgba8::new(px[0], px[1], px[2], px[3]));
            px.copy_from_slice(&[c.r, c.g, c.b, 255]);
        }
        out
    }

    // ====================================================================
    // Geometry
    // ====================================================================

    /// Replace the store with the `r` sub-rectangle (clipped to the canvas).
    pub fn sub_image(&mut self, r: AreaRect) {
        *self = self.cropped(r);
    }

    /// Copy of the `r` sub-rectangle (clipped to the canvas).
    pub fn cropped(&self, r: AreaRect) -> RgbaCanvas {
        let r = r.clip(&AreaRect::new(0, 0, self.width, self.height));
        let (w, h) = (r.width().max(0), r.height().max(0));
        let mut pix = Vec::with_capacity((w * h * 4) as usize);
        for y in r.min_y..r.min_y + h {
            let start = ((y * self.width + r.min_x) * 4) as usize;
            pix.extend_from_slice(&self.pix[start..start + (w * 4) as usize]);
        }
        Self::from_raw_parts(w, h, pix)
    }

    /// Bilinear resample to exactly `target` (aspect not kept).
    pub fn resized(&self, target: Size) -> RgbaCanvas {
        let data = resample(self.source(), target.width, target.height);
        Self::from_raw_parts(target.width.max(0), target.height.max(0), data)
    }

    /// Resample into a `target`-sized store. With `keep_aspect` the image is
    /// fitted inside the target (letterboxed with transparency), either
    /// centred or top/left aligned.
    pub fn scale(&mut self, target: Size, keep_aspect: bool, center_align: bool) -> Result<()> {
        if !keep_aspect {
            *self = self.resized(target);
            return Ok(());
        }
        let r = calc_resized_rect(self.width, self.height, target.width, target.height, center_align);
        let fitted = self.resized(Size::new(r.width(), r.height()));
        let mut out = RgbaCanvas::new(target)?;
        out.draw_image(&fitted, Point::new(r.min_x, r.min_y));
        *self = out;
        Ok(())
    }

    /// Mask everything outside the disk of `radius` at `(cx, cy)`.
    ///
    /// With `shrink > 0` the mask is scaled down by `2*shrink` pixels and
    /// applied to the source shifted by `shrink`, so the result is the
    /// `(w - 2*shrink) x (h - 2*shrink)` inner disk.
    pub fn crop_circle(&mut self, cx: i32, cy: i32, radius: i32, shrink: i32) -> Result<()> {
        let mut mask = RgbaCanvas::new(self.size())?;
        let r = radius as f64;
        for y in 0..self.height {
            for x in 0..self.width {
                if ((x - cx) as f64).hypot((y - cy) as f64) <= r {
                    mask.set_pixel(x, y, Rgba8::WHITE);
                }
            }
        }

        if shrink > 0 {
            let inner = Size::new(self.width - shrink * 2, self.height - shrink * 2);
            mask = mask.resized(inner);
            let mut out = RgbaCanvas::new(inner)?;
            out.copy_from(self, Point::new(shrink, shrink));
            out.apply_mask(&mask);
            *self = out;
        } else {
            self.apply_mask(&mask);
        }
        Ok(())
    }

    /// Rotate about the centre, growing the canvas to the rotated bounding
    /// box; with `crop_to_footprint` the result is cut back to the original
    /// size, centred.
    pub fn rotate_with(&mut self, angle: i32, crop_to_footprint: bool) {
        if angle == 0 {
            return;
        }
        let (w, h) = (self.width, self.height);
        let (nw, nh) = rotated_size(w, h, angle as f64);
        let m = TransAffine::new_rotation_about(angle as f64, 0.0, 0.0);

        let src = self.source();
        let (ocx, ocy) = (w as f64 / 2.0, h as f64 / 2.0);
        let (ncx, ncy) = (nw as f64 / 2.0, nh as f64 / 2.0);
        let mut data = vec![0u8; (nw * nh * 4) as usize];
        for y in 0..nh {
            for x in 0..nw {
                let mut sx = x as f64 + 0.5 - ncx;
                let mut sy = y as f64 + 0.5 - ncy;
                m.inverse_transform(&mut sx, &mut sy);
                let c = src.sample_bilinear(sx + ocx, sy + ocy, EdgeMode::Transparent);
                let i = ((y * nw + x) * 4) as usize;
                data[i..i + 4].copy_from_slice(&[c.r, c.g, c.b, c.a]);
            }
        }
        let rotated = Self::from_raw_parts(nw, nh, data);
        if !crop_to_footprint {
            *self = rotated;
            return;
        }

        // Centre the rotated box in the original footprint; an axis that
        // shrank gets a negative offset and transparent padding.
        let ox = iround((nw - w) as f64 / 2.0);
        let oy = iround((nh - h) as f64 / 2.0);
        let mut out = Self::from_raw_parts(w, h, vec![0u8; (w * h * 4) as usize]);
        out.copy_from(&rotated, Point::new(ox, oy));
        *self = out;
    }
}

impl Canvas for RgbaCanvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    fn alpha_at(&self, x: i32, y: i32) -> u8 {
        self.offset(x, y).map_or(0, |i| self.pix[i + 3])
    }
}

impl Rotatable for RgbaCanvas {
    fn rotate(&mut self, angle: i32) {
        self.rotate_with(angle, false);
    }
}

impl DrawString for RgbaCanvas {
    fn draw_string(&mut self, params: &DrawStringParams<'_>, origin: Point) -> Result<()> {
        let mask = params.coverage(self.size(), origin)?;
        for (x, y, cover) in mask.covered() {
            self.blend_pixel(x, y, params.color.mult_cover(cover));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
