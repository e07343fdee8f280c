//! In-memory assets shared by the integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use raster_captcha::{Font, GraphImage, Rgba8, RgbaCanvas, Size};

/// Diagonal color ramp, opaque everywhere.
pub fn gradient(width: i32, height: i32) -> RgbaCanvas {
    let mut c = RgbaCanvas::new(Size::new(width, height)).unwrap();
    for y in 0..height {
        for x in 0..width {
            let r = (x * 255 / width.max(1)) as u8;
            let g = (y * 255 / height.max(1)) as u8;
            c.set_pixel(x, y, Rgba8::new_opaque(r, g, 255 - r / 2));
        }
    }
    c
}

/// Opaque disk of `color` on a transparent square.
pub fn disk(side: i32, color: Rgba8) -> RgbaCanvas {
    let mut c = RgbaCanvas::new(Size::new(side, side)).unwrap();
    let r = side as f64 / 2.0 - 1.0;
    let m = side as f64 / 2.0;
    for y in 0..side {
        for x in 0..side {
            if (x as f64 + 0.5 - m).hypot(y as f64 + 0.5 - m) <= r {
                c.set_pixel(x, y, color);
            }
        }
    }
    c
}

/// `n` distinct named shapes: bars of growing width.
pub fn shapes(n: usize) -> BTreeMap<String, RgbaCanvas> {
    (0..n)
        .map(|i| {
            let mut c = RgbaCanvas::new(Size::new(32, 32)).unwrap();
            let w = 8 + (i as i32 * 3) % 22;
            for y in 6..26 {
                for x in (16 - w / 2)..(16 + w / 2) {
                    c.set_pixel(x, y, Rgba8::new_opaque(220, 60, 30));
                }
            }
            (format!("bar-{i:02}"), c)
        })
        .collect()
}

/// Puzzle piece: a square notch with a rounded bump.
pub fn graph() -> GraphImage {
    let mut mask = RgbaCanvas::new(Size::new(60, 60)).unwrap();
    for y in 8..52 {
        for x in 8..52 {
            mask.set_pixel(x, y, Rgba8::WHITE);
        }
    }
    mask.draw_image(&disk(16, Rgba8::WHITE), raster_captcha::Point::new(44, 22));

    let mut shadow = mask.clone();
    shadow.tint(Rgba8::new(0, 0, 0, 160));
    let mut overlay = mask.clone();
    overlay.tint(Rgba8::new(255, 255, 255, 60));
    GraphImage { overlay, shadow, mask }
}

/// DejaVu Sans Mono, shipped under `tests/fixtures` (Bitstream Vera license).
pub fn test_font() -> Font {
    Font::from_data(include_bytes!("../fixtures/DejaVuSansMono.ttf").to_vec()).unwrap()
}
