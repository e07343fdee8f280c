//! Capability traits shared by the two raster buffers.
//!
//! `PaletteCanvas` and `RgbaCanvas` each implement the operations they
//! support; generators are written against the concrete types and the
//! traits keep the common vocabulary (margin trim, rotation, text) uniform.

use crate::basics::{AreaRect, Point, Size};
use crate::color::Rgba8;
use crate::error::Result;
use crate::font_engine::Font;
use crate::rasterizer::{rasterize, CoverageMask};

/// Pixels the margin trim adds around the opaque bounding box.
pub const MARGIN_EXPAND: i32 = 2;

/// Read access every canvas provides.
pub trait Canvas {
    fn size(&self) -> Size;

    /// Alpha of the pixel at `(x, y)`, 0 outside the buffer.
    fn alpha_at(&self, x: i32, y: i32) -> u8;

    /// Bounding box of all pixels with non-zero alpha, grown by
    /// [`MARGIN_EXPAND`] on each side and clamped to the buffer.
    /// `None` when the canvas is fully transparent.
    fn margin_blank_area(&self) -> Option<AreaRect> {
        let Size { width, height } = self.size();
        let mut min_x = width;
        let mut min_y = height;
        let mut max_x = -1;
        let mut max_y = -1;
        for y in 0..height {
            for x in 0..width {
                if self.alpha_at(x, y) > 0 {
                    min_x = min_x.min(x);
                    max_x = max_x.max(x);
                    min_y = min_y.min(y);
                    max_y = max_y.max(y);
                }
            }
        }
        if max_x < 0 {
            return None;
        }
        Some(AreaRect::new(
            (min_x - MARGIN_EXPAND).max(0),
            (min_y - MARGIN_EXPAND).max(0),
            (max_x + MARGIN_EXPAND + 1).min(width),
            (max_y + MARGIN_EXPAND + 1).min(height),
        ))
    }
}

/// In-place rotation by whole degrees, clockwise on screen.
pub trait Rotatable {
    fn rotate(&mut self, angle: i32);
}

/// Glyph rendering onto a canvas.
pub trait DrawString {
    /// Draw `params.text` with its baseline starting at `origin`.
    fn draw_string(&mut self, params: &DrawStringParams<'_>, origin: Point) -> Result<()>;
}

/// What to draw for one string.
#[derive(Debug, Clone, Copy)]
pub struct DrawStringParams<'a> {
    pub font: &'a Font,
    pub text: &'a str,
    /// Point size.
    pub size: i32,
    pub dpi: i32,
    pub color: Rgba8,
}

impl DrawStringParams<'_> {
    /// Rasterize the string into a coverage mask the size of the target.
    pub(crate) fn coverage(&self, target: Size, origin: Point) -> Result<CoverageMask> {
        let px = Font::pixel_size(self.size as f64, self.dpi as f64);
        let path = self
            .font
            .outline_text(self.text, px, origin.x as f64, origin.y as f64)?;
        Ok(rasterize(
            &path,
            target.width.max(0) as usize,
            target.height.max(0) as usize,
        ))
    }
}

/// True if any char of `s` is a Han ideograph or CJK punctuation.
pub fn is_cjk(s: &str) -> bool {
    s.chars().any(|c| {
        matches!(c,
            '\u{3400}'..='\u{4DBF}'
            | '\u{4E00}'..='\u{9FFF}'
            | '\u{F900}'..='\u{FAFF}'
            | '\u{20000}'..='\u{2A6DF}'
            | '\u{3001}' | '\u{3002}'
            | '\u{300A}' | '\u{300B}'
            | '\u{201C}' | '\u{201D}'
            | '\u{FF08}' | '\u{FF09}'
            | '\u{FF0C}' | '\u{FF1A}' | '\u{FF1B}' | '\u{FF1F}')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dots {
        size: Size,
        on: Vec<(i32, i32)>,
    }

    impl Canvas for Dots {
        fn size(&self) -> Size {
            self.size
        }
        fn alpha_at(&self, x: i32, y: i32) -> u8 {
            if self.on.contains(&(x, y)) {
                255
            } else {
                0
            }
        }
    }

    #[test]
    fn test_margin_single_pixel() {
        let c = Dots {
            size: Size::new(20, 20),
            on: vec![(7, 9)],
        };
        let r = c.margin_blank_area().unwrap();
        assert!(r.contains(7, 9));
        assert!(r.min_x >= 5 && r.max_x <= 10);
        assert!(r.min_y >= 7 && r.max_y <= 12);
    }

    #[test]
    fn test_margin_clamped_at_corner() {
        let c = Dots {
            size: Size::new(4, 4),
            on: vec![(0, 0), (3, 3)],
        };
        assert_eq!(c.margin_blank_area(), Some(AreaRect::new(0, 0, 4, 4)));
    }

    #[test]
    fn test_margin_empty() {
        let c = Dots {
            size: Size::new(4, 4),
            on: vec![],
        };
        assert_eq!(c.margin_blank_area(), None);
    }

    #[test]
    fn test_is_cjk() {
        assert!(is_cjk("字"));
        assert!(is_cjk("a，"));
        assert!(!is_cjk("AB"));
        assert!(!is_cjk("é"));
    }
}
