//! Rendering for the click challenge.
//!
//! Each token is drawn into its own small canvas (shadow, glyph or shape,
//! rotation, margin trim) and then placed on the master or thumbnail.
//! Thumbnails come in two flavours: a direct-color one that keeps glyph
//! shapes intact under a noise layer, and a palette one that warps the whole
//! thumbnail with a sine distortion.

use rand::Rng;

use crate::basics::{clamp_low_wins, AreaRect, Point, Size, EDGE_PADDING};
use crate::canvas::{is_cjk, Canvas, DrawString, DrawStringParams, Rotatable};
use crate::color::{Palette, Rgba8};
use crate::error::Result;
use crate::font_engine::Font;
use crate::layout::Dot;
use crate::palette_canvas::PaletteCanvas;
use crate::random::{pick, rand_cut_pos, rand_int};
use crate::rgba_canvas::RgbaCanvas;

/// Room around a token box so rotation and shadow do not clip it.
const TOKEN_MARGIN: i32 = 10;

/// Smallest x of a token on the thumbnail.
const THUMB_MIN_X: i32 = 8;

/// What a token is drawn from.
#[derive(Debug, Clone, Copy)]
pub(crate) enum TokenSource<'a> {
    Text { font: &'a Font, dpi: i32 },
    Shape { image: &'a RgbaCanvas, original_color: bool },
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Shadow {
    pub color: Rgba8,
    pub offset: Point,
}

/// Noise layer of the thumbnail.
#[derive(Debug, Clone)]
pub(crate) struct NoiseParams<'a> {
    /// Token colors; part of the palette so thumbnail glyphs stay exact.
    pub token_colors: &'a [Rgba8],
    /// Noise colors, alpha already applied.
    pub noise_colors: Vec<Rgba8>,
    pub circles: i32,
    pub lines: i32,
    /// Sine period of the warp, 0 for none.
    pub distort_period: i32,
}

impl NoiseParams<'_> {
    fn palette(&self) -> Result<Palette> {
        let mut colors = self.token_colors.to_vec();
        colors.extend_from_slice(&self.noise_colors);
        Ok(Palette::new(&colors)?)
    }
}

// ============================================================================
// Single token
// ============================================================================

/// Token drawn unrotated into a `(width + 10) x (height + 10)` canvas.
pub(crate) fn render_token(source: &TokenSource<'_>, dot: &Dot, color: Rgba8) -> Result<RgbaCanvas> {
    let size = Size::new(dot.width + TOKEN_MARGIN, dot.height + TOKEN_MARGIN);
    match *source {
        TokenSource::Text { font, dpi } => {
            let text = dot.payload.as_str();
            let mut cvs = RgbaCanvas::new(size)?;
            let origin = if is_cjk(text) {
                Point::new(10, dot.height)
            } else {
                Point::new(12, dot.height - 5)
            };
            cvs.draw_string(
                &DrawStringParams {
                    font,
                    text,
                    size: dot.size,
                    dpi,
                    color,
                },
                origin,
            )?;
            Ok(cvs)
        }
        TokenSource::Shape {
            image,
            original_color,
        } => {
            let mut cvs = image.resized(size);
            if !original_color {
                cvs.tint(color);
            }
            Ok(cvs)
        }
    }
}

/// Token with optional drop shadow, rotated, plus its trimmed area.
pub(crate) fn draw_dot_image(
    source: &TokenSource<'_>,
    dot: &Dot,
    color: Rgba8,
    shadow: Option<Shadow>,
) -> Result<(RgbaCanvas, AreaRect)> {
    let mut cvs = RgbaCanvas::new(Size::new(dot.width + TOKEN_MARGIN, dot.height + TOKEN_MARGIN))?;
    if let Some(shadow) = shadow {
        let layer = render_token(source, dot, shadow.color)?;
        cvs.draw_image(&layer, shadow.offset);
    }
    let token = render_token(source, dot, color)?;
    cvs.draw_image(&token, Point::default());
    cvs.rotate(dot.angle);

    let full = AreaRect::new(0, 0, cvs.size().width, cvs.size().height);
    let area = cvs.margin_blank_area().unwrap_or(full);
    Ok((cvs, area))
}

// ============================================================================
// Master
// ============================================================================

pub(crate) struct MasterParams<'a> {
    pub size: Size,
    pub background: &'a RgbaCanvas,
    pub alpha: u8,
    pub shadow: Option<Shadow>,
}

/// Draw every dot on a random crop of the background.
///
/// Each dot is updated to the box actually drawn: its trimmed size, at a
/// position kept inside the canvas minus the edge padding.
pub(crate) fn draw_master<R: Rng + ?Sized>(
    rng: &mut R,
    params: &MasterParams<'_>,
    dots: &mut [Dot],
    sources: &[TokenSource<'_>],
) -> Result<RgbaCanvas> {
    let size = params.size;
    let mut layer = RgbaCanvas::new(size)?;

    for (dot, source) in dots.iter_mut().zip(sources) {
        let color = Rgba8::with_opacity(&dot.color, params.alpha);
        let (img, area) = draw_dot_image(source, dot, color, params.shadow)?;
        let (w, h) = (area.width(), area.height());
        let x = clamp_low_wins(dot.x, EDGE_PADDING, size.width - EDGE_PADDING - w);
        let y = clamp_low_wins(dot.y, EDGE_PADDING, size.height - EDGE_PADDING - h);
        layer.draw_image_area(&img, area, Point::new(x, y));

        dot.x = x;
        dot.y = y;
        dot.width = w;
        dot.height = h;
    }

    let mut out = RgbaCanvas::new(size)?;
    let cut = rand_cut_pos(rng, size, params.background.size());
    out.copy_from(params.background, cut);
    out.draw_image(&layer, Point::default());
    log::trace!("master drawn with {} tokens", dots.len());
    Ok(out)
}

// ============================================================================
// Thumbnails
// ============================================================================

/// Uniform integer in `[0, n)`, 0 when the range is empty.
fn below<R: Rng + ?Sized>(rng: &mut R, n: i32) -> i32 {
    if n <= 0 {
        0
    } else {
        rand_int(rng, 0, n - 1)
    }
}

fn draw_noise<R: Rng + ?Sized>(rng: &mut R, cvs: &mut PaletteCanvas, noise: &NoiseParams<'_>) {
    let Size { width, height } = cvs.size();

    for _ in 0..noise.circles {
        let Some(&c) = pick(rng, &noise.noise_colors) else {
            break;
        };
        let r = rand_int(rng, 1, 1);
        let x = rand_int(rng, r, width - r);
        let y = rand_int(rng, r, height - r);
        cvs.draw_circle(x, y, r, c);
    }

    let first = width / 10;
    let end = first * 9;
    let band = height / 3;
    for i in 0..noise.lines {
        let mut p1 = Point::new(below(rng, first), below(rng, band));
        let mut p2 = Point::new(below(rng, first) + end, below(rng, band));
        if i % 2 == 0 {
            p1.y = below(rng, band) + band * 2;
            p2.y = below(rng, band);
        } else {
            p1.y = below(rng, band) + band * (i % 2);
            p2.y = below(rng, band) + band * 2;
        }
        let Some(&c) = pick(rng, &noise.noise_colors) else {
            break;
        };
        cvs.draw_line(p1, p2, c);
    }
}

fn lane_x(lane: i32, i: usize, token_width: i32) -> i32 {
    (lane * i as i32 + lane / token_width.max(1)).max(THUMB_MIN_X)
}

/// Random top edge for a trimmed token; pinned to 0 when it is taller than
/// the thumbnail allows.
fn thumb_y<R: Rng + ?Sized>(rng: &mut R, height: i32, token_height: i32) -> i32 {
    rand_int(rng, 1, height - token_height - 4).max(0)
}

/// Direct-color thumbnail: tokens are rotated and trimmed, spread over
/// equal lanes at a random height, and covered with the noise layer.
pub(crate) fn draw_thumb_direct<R: Rng + ?Sized>(
    rng: &mut R,
    size: Size,
    dots: &[Dot],
    sources: &[TokenSource<'_>],
    background: Option<&RgbaCanvas>,
    noise: &NoiseParams<'_>,
) -> Result<RgbaCanvas> {
    let mut out = RgbaCanvas::new(size)?;
    if let Some(bg) = background {
        let cut = rand_cut_pos(rng, size, bg.size());
        out.copy_from(bg, cut);
    }

    let mut noise_layer = PaletteCanvas::new(size, noise.palette()?)?;
    draw_noise(rng, &mut noise_layer, noise);
    if noise.distort_period > 0 {
        let amp = rand_int(rng, 5, 10);
        noise_layer.distort(amp as f64, noise.distort_period as f64);
    }

    let lane = size.width / dots.len().max(1) as i32;
    for (i, (dot, source)) in dots.iter().zip(sources).enumerate() {
        let mut img = render_token(source, dot, dot.color2)?;
        img.rotate(dot.angle);
        if let Some(area) = img.margin_blank_area() {
            img.sub_image(area);
        }
        let s = img.size();
        let dx = lane_x(lane, i, s.width);
        let dy = thumb_y(rng, size.height, s.height);
        out.draw_image(&img, Point::new(dx, dy));
    }

    out.draw_image(&noise_layer.to_rgba(), Point::default());
    Ok(out)
}

/// Palette thumbnail: tokens drawn straight into the indexed canvas, then
/// the whole canvas is warped. With a background the warped canvas is laid
/// over a random crop of it.
pub(crate) fn draw_thumb_palette<R: Rng + ?Sized>(
    rng: &mut R,
    size: Size,
    dots: &[Dot],
    sources: &[TokenSource<'_>],
    background: Option<&RgbaCanvas>,
    noise: &NoiseParams<'_>,
) -> Result<RgbaCanvas> {
    let mut cvs = PaletteCanvas::new(size, noise.palette()?)?;
    draw_noise(rng, &mut cvs, noise);

    let lane = size.width / dots.len().max(1) as i32;
    for (i, (dot, source)) in dots.iter().zip(sources).enumerate() {
        let dx = lane_x(lane, i, dot.width);
        match *source {
            TokenSource::Text { font, dpi } => {
                let chars = dot.payload.char_count() as i32;
                let dy = size.height / 2 + dot.size / 2 - below(rng, size.height / 16 * chars);
                cvs.draw_string(
                    &DrawStringParams {
                        font,
                        text: dot.payload.as_str(),
                        size: dot.size,
                        dpi,
                        color: dot.color2,
                    },
                    Point::new(dx, dy),
                )?;
            }
            TokenSource::Shape { .. } => {
                let mut img = render_token(source, dot, dot.color2)?;
                img.rotate(dot.angle);
                let dy = size.height - img.size().height;
                cvs.draw_rgba(&img, Point::new(dx, dy));
            }
        }
    }

    if let Some(bg) = background {
        let mut out = RgbaCanvas::new(size)?;
        let cut = rand_cut_pos(rng, size, bg.size());
        out.copy_from(bg, cut);
        let amp = rand_int(rng, 5, 10);
        let period = rand_int(rng, 120, 200);
        cvs.distort(amp as f64, period as f64);
        out.draw_image(&cvs.to_rgba(), Point::default());
        return Ok(out);
    }

    if noise.distort_period > 0 {
        let amp = rand_int(rng, 5, 10);
        cvs.distort(amp as f64, noise.distort_period as f64);
    }
    Ok(cvs.to_rgba())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Payload;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const GREEN: Rgba8 = Rgba8::new_opaque(0, 200, 0);

    fn star() -> RgbaCanvas {
        let mut c = RgbaCanvas::new(Size::new(16, 16)).unwrap();
        for y in 4..12 {
            for x in 4..12 {
                c.set_pixel(x, y, Rgba8::new_opaque(250, 250, 0));
            }
        }
        c
    }

    fn dot(x: i32, y: i32, angle: i32) -> Dot {
        Dot {
            index: 0,
            x,
            y,
            size: 24,
            width: 24,
            height: 24,
            angle,
            color: GREEN,
            color2: Rgba8::new_opaque(0x1f, 0x55, 0xc4),
            payload: Payload::Shape("star".into()),
        }
    }

    #[test]
    fn test_render_shape_tinted() {
        let img = star();
        let src = TokenSource::Shape {
            image: &img,
            original_color: false,
        };
        let c = render_token(&src, &dot(0, 0, 0), GREEN).unwrap();
        assert_eq!(c.size(), Size::new(34, 34));
        assert_eq!(c.pixel(17, 17), GREEN);
        assert_eq!(c.pixel(0, 0).a, 0);

        let src = TokenSource::Shape {
            image: &img,
            original_color: true,
        };
        let c = render_token(&src, &dot(0, 0, 0), GREEN).unwrap();
        assert_eq!(c.pixel(17, 17), Rgba8::new_opaque(250, 250, 0));
    }

    #[test]
    fn test_shadow_sits_down_right() {
        let img = star();
        let src = TokenSource::Shape {
            image: &img,
            original_color: false,
        };
        let shadow = Shadow {
            color: Rgba8::new_opaque(0x10, 0x10, 0x10),
            offset: Point::new(1, 1),
        };
        let (c, area) = draw_dot_image(&src, &dot(0, 0, 0), GREEN, Some(shadow)).unwrap();
        // The square spans 8..25 after scaling; the shadow shows one past it.
        assert_eq!(c.pixel(16, 16), GREEN);
        let below = c.pixel(16, area.max_y - 3);
        assert_eq!((below.r, below.g, below.b), (0x10, 0x10, 0x10));
    }

    #[test]
    fn test_master_clamps_dots() {
        let mut rng = StdRng::seed_from_u64(9);
        let img = star();
        let src = TokenSource::Shape {
            image: &img,
            original_color: false,
        };
        let bg = RgbaCanvas::new_filled(Size::new(400, 300), Rgba8::WHITE).unwrap();
        let params = MasterParams {
            size: Size::new(120, 80),
            background: &bg,
            alpha: 255,
            shadow: None,
        };
        let mut dots = vec![dot(500, -40, 45), dot(20, 20, 0)];
        let master = draw_master(&mut rng, &params, &mut dots, &[src, src]).unwrap();
        assert_eq!(master.size(), Size::new(120, 80));
        for d in &dots {
            assert!(d.x >= 10 && d.x + d.width <= 110, "{d:?}");
            assert!(d.y >= 10 && d.y + d.height <= 70, "{d:?}");
        }
        // Scaled square covers 7..=26 of the token canvas, plus the 2px margin.
        assert_eq!((dots[1].width, dots[1].height), (24, 24));
        assert_eq!(master.pixel(dots[1].x + 10, dots[1].y + 10), GREEN);
        assert_eq!(master.pixel(1, 1), Rgba8::WHITE);
    }

    #[test]
    fn test_thumbnails() {
        let mut rng = StdRng::seed_from_u64(4);
        let img = star();
        let src = TokenSource::Shape {
            image: &img,
            original_color: false,
        };
        let colors = [Rgba8::new_opaque(0x1f, 0x55, 0xc4)];
        let noise = NoiseParams {
            token_colors: &colors,
            noise_colors: vec![Rgba8::new(0x78, 0x05, 0x92, 255)],
            circles: 24,
            lines: 2,
            distort_period: 100,
        };
        let mut d = dot(0, 0, 30);
        d.width = 16;
        d.height = 16;
        let dots = vec![d.clone(), d];
        let size = Size::new(150, 40);

        let direct = draw_thumb_direct(&mut rng, size, &dots, &[src, src], None, &noise).unwrap();
        assert_eq!(direct.size(), size);
        assert!(direct.margin_blank_area().is_some());

        let bg = RgbaCanvas::new_filled(Size::new(50, 20), Rgba8::WHITE).unwrap();
        let warped = draw_thumb_palette(&mut rng, size, &dots, &[src, src], Some(&bg), &noise).unwrap();
        assert_eq!(warped.size(), size);
        let plain = draw_thumb_palette(&mut rng, size, &dots, &[src, src], None, &noise).unwrap();
        assert_eq!(plain.size(), size);
    }

    #[test]
    fn test_thumb_y_stays_on_canvas() {
        let mut rng = StdRng::seed_from_u64(12);
        for _ in 0..50 {
            let y = thumb_y(&mut rng, 40, 20);
            assert!((1..=16).contains(&y), "{y}");
        }
        assert_eq!(thumb_y(&mut rng, 40, 39), 0);
        assert_eq!(thumb_y(&mut rng, 40, 60), 0);
    }

    #[test]
    fn test_direct_thumb_keeps_tall_token_top() {
        let mut rng = StdRng::seed_from_u64(5);
        let img = star();
        let src = TokenSource::Shape {
            image: &img,
            original_color: false,
        };
        let colors = [Rgba8::new_opaque(0x1f, 0x55, 0xc4)];
        let noise = NoiseParams {
            token_colors: &colors,
            noise_colors: vec![Rgba8::new(0x78, 0x05, 0x92, 255)],
            circles: 0,
            lines: 0,
            distort_period: 0,
        };
        let mut d = dot(0, 0, 0);
        d.width = 100;
        d.height = 100;
        let size = Size::new(150, 40);
        let thumb = draw_thumb_direct(&mut rng, size, &[d], &[src], None, &noise).unwrap();
        // A token taller than the thumbnail is pinned to the top: its 2px
        // trim margin stays visible and the glyph is cut only at the bottom.
        assert_eq!(thumb.pixel(30, 0).a, 0);
        assert!(thumb.pixel(30, 4).a > 0);
        assert!(thumb.pixel(30, 39).a > 0);
    }
}
