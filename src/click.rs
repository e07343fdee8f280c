//! Click challenge: find the thumbnail's tokens on the master image.
//!
//! A generation runs the stages in order and stops at the first error:
//! resource check, token pick, master layout, master render, verification
//! subset, thumbnail layout, thumbnail render.

use std::collections::BTreeMap;

use rand::Rng;

use crate::basics::EDGE_PADDING;
use crate::canvas::is_cjk;
use crate::click_draw::{
    draw_master, draw_thumb_direct, draw_thumb_palette, MasterParams, NoiseParams, Shadow, TokenSource,
};
use crate::click_options::ClickOptions;
use crate::color::{format_alpha, Rgba8};
use crate::error::{ConfigError, ResourceError, Result};
use crate::font_engine::Font;
use crate::image_data::{JpegImageData, PngImageData};
use crate::layout::{distinct_count, gen_dots, pick_distinct, select_verify_dots, Dot, LayoutParams, Payload};
use crate::options::rand_distort_period;
use crate::random::{pick, rand_range};
use crate::rgba_canvas::RgbaCanvas;

/// What the tokens are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClickMode {
    /// Characters drawn with one of the configured fonts.
    #[default]
    Text,
    /// Named shape images.
    Shape,
}

// ============================================================================
// Resources
// ============================================================================

/// Assets a click generator draws from. Read-only once the generator is built.
#[derive(Debug, Clone)]
pub struct ClickResources {
    chars: Vec<String>,
    shapes: BTreeMap<String, RgbaCanvas>,
    fonts: Vec<Font>,
    backgrounds: Vec<RgbaCanvas>,
    thumb_backgrounds: Vec<RgbaCanvas>,
}

impl Default for ClickResources {
    fn default() -> Self {
        let chars = ('A'..='Z').chain('0'..='9').map(String::from).collect();
        Self {
            chars,
            shapes: BTreeMap::new(),
            fonts: Vec::new(),
            backgrounds: Vec::new(),
            thumb_backgrounds: Vec::new(),
        }
    }
}

impl ClickResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the token alphabet. A CJK token holds one char, any other
    /// token at most two.
    pub fn with_chars<S: AsRef<str>>(mut self, chars: &[S]) -> std::result::Result<Self, ConfigError> {
        let mut list = Vec::with_capacity(chars.len());
        for token in chars {
            let token = token.as_ref();
            let n = token.chars().count();
            let limit = if is_cjk(token) { 1 } else { 2 };
            if n == 0 || n > limit {
                return Err(ConfigError::TokenTooLong(token.to_string()));
            }
            list.push(token.to_string());
        }
        self.chars = list;
        Ok(self)
    }

    pub fn with_shapes(mut self, shapes: BTreeMap<String, RgbaCanvas>) -> Self {
        self.shapes = shapes;
        self
    }

    pub fn with_fonts(mut self, fonts: Vec<Font>) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn with_backgrounds(mut self, backgrounds: Vec<RgbaCanvas>) -> Self {
        self.backgrounds = backgrounds;
        self
    }

    pub fn with_thumb_backgrounds(mut self, backgrounds: Vec<RgbaCanvas>) -> Self {
        self.thumb_backgrounds = backgrounds;
        self
    }

    pub fn chars(&self) -> &[String] {
        &self.chars
    }

    pub fn shapes(&self) -> &BTreeMap<String, RgbaCanvas> {
        &self.shapes
    }

    pub fn fonts(&self) -> &[Font] {
        &self.fonts
    }

    pub fn backgrounds(&self) -> &[RgbaCanvas] {
        &self.backgrounds
    }

    pub fn thumb_backgrounds(&self) -> &[RgbaCanvas] {
        &self.thumb_backgrounds
    }
}

// ============================================================================
// Output
// ============================================================================

/// One click challenge: the answer and the two images.
#[derive(Debug, Clone)]
pub struct ClickCaptchaData {
    dots: BTreeMap<usize, Dot>,
    master: JpegImageData,
    thumb: PngImageData,
}

impl ClickCaptchaData {
    /// Answer record: verification index to token placement on the master.
    pub fn dots(&self) -> &BTreeMap<usize, Dot> {
        &self.dots
    }

    pub fn master_image(&self) -> &JpegImageData {
        &self.master
    }

    pub fn thumb_image(&self) -> &PngImageData {
        &self.thumb
    }

    pub fn into_parts(self) -> (BTreeMap<usize, Dot>, JpegImageData, PngImageData) {
        (self.dots, self.master, self.thumb)
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Click challenge generator. Immutable; `generate` may be called from
/// several threads at once.
#[derive(Debug, Clone)]
pub struct Click {
    mode: ClickMode,
    opts: ClickOptions,
    res: ClickResources,
}

impl Click {
    /// Build a generator, validating the options.
    pub fn new(mode: ClickMode, opts: ClickOptions, res: ClickResources) -> Result<Self> {
        opts.validate()?;
        Ok(Self { mode, opts, res })
    }

    pub fn mode(&self) -> ClickMode {
        self.mode
    }

    pub fn options(&self) -> &ClickOptions {
        &self.opts
    }

    pub fn resources(&self) -> &ClickResources {
        &self.res
    }

    pub fn generate(&self) -> Result<ClickCaptchaData> {
        self.generate_with_rng(&mut rand::rng())
    }

    pub fn generate_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<ClickCaptchaData> {
        self.check()?;
        let opts = &self.opts;
        log::debug!("click {:?}: resources checked", self.mode);

        let len = rand_range(rng, opts.range_len()).max(1) as usize;
        let payloads = self.pick_payloads(rng, len)?;

        let dots_params = LayoutParams {
            canvas: opts.image_size(),
            size: opts.range_size(),
            angles: opts.range_angles(),
            padding: EDGE_PADDING,
            colors: opts.range_colors(),
            colors2: opts.range_thumb_colors(),
        };
        let mut dots = gen_dots(rng, &dots_params, &payloads);
        log::debug!("click {:?}: {} tokens laid out", self.mode, dots.len());

        let sources = payloads
            .iter()
            .map(|p| self.token_source(rng, p))
            .collect::<Result<Vec<_>>>()?;
        let background = pick(rng, self.res.backgrounds()).ok_or(ResourceError::NoBackground)?;
        let master_params = MasterParams {
            size: opts.image_size(),
            background,
            alpha: format_alpha(opts.image_alpha()),
            shadow: opts.display_shadow().then(|| Shadow {
                color: opts.shadow_color(),
                offset: opts.shadow_offset(),
            }),
        };
        let master = draw_master(rng, &master_params, &mut dots, &sources)?;
        log::debug!("click {:?}: master rendered", self.mode);

        let verify = select_verify_dots(rng, &dots, opts.range_verify_len(), opts.disable_range_verify_len());
        let thumb = self.draw_thumb(rng, &verify)?;
        log::debug!("click {:?}: {} of {} tokens to verify", self.mode, verify.len(), dots.len());

        Ok(ClickCaptchaData {
            dots: verify,
            master: JpegImageData::new(master),
            thumb: PngImageData::new(thumb),
        })
    }

    /// Pre-flight: every asset the pipeline needs, before any drawing.
    fn check(&self) -> Result<()> {
        let need = self.opts.range_len().max.max(0) as usize;
        match self.mode {
            ClickMode::Text => {
                let have = distinct_count(self.res.chars());
                if have < need {
                    return Err(ResourceError::NotEnoughChars { have, need }.into());
                }
                if self.res.fonts().is_empty() {
                    return Err(ResourceError::NoFont.into());
                }
            }
            ClickMode::Shape => {
                let have = self.res.shapes().len();
                if have < need {
                    return Err(ResourceError::NotEnoughShapes { have, need }.into());
                }
            }
        }
        if self.res.backgrounds().is_empty() {
            return Err(ResourceError::NoBackground.into());
        }
        Ok(())
    }

    fn pick_payloads<R: Rng + ?Sized>(&self, rng: &mut R, len: usize) -> Result<Vec<Payload>> {
        match self.mode {
            ClickMode::Text => {
                let chars = self.res.chars();
                let picked = pick_distinct(rng, chars, len).ok_or(ResourceError::NotEnoughChars {
                    have: distinct_count(chars),
                    need: len,
                })?;
                Ok(picked.into_iter().map(Payload::Text).collect())
            }
            ClickMode::Shape => {
                let names: Vec<String> = self.res.shapes().keys().cloned().collect();
                let picked = pick_distinct(rng, &names, len).ok_or(ResourceError::NotEnoughShapes {
                    have: names.len(),
                    need: len,
                })?;
                Ok(picked.into_iter().map(Payload::Shape).collect())
            }
        }
    }

    /// Text tokens get a random font each, shapes their named image.
    fn token_source<R: Rng + ?Sized>(&self, rng: &mut R, payload: &Payload) -> Result<TokenSource<'_>> {
        match payload {
            Payload::Text(_) => {
                let font = pick(rng, self.res.fonts()).ok_or(ResourceError::NoFont)?;
                Ok(TokenSource::Text {
                    font,
                    dpi: self.opts.font_dpi(),
                })
            }
            Payload::Shape(name) => {
                let image = self.res.shapes().get(name).ok_or(ResourceError::NotEnoughShapes {
                    have: self.res.shapes().len(),
                    need: self.opts.range_len().max.max(0) as usize,
                })?;
                Ok(TokenSource::Shape {
                    image,
                    original_color: self.opts.use_shape_original_color(),
                })
            }
        }
    }

    fn draw_thumb<R: Rng + ?Sized>(&self, rng: &mut R, verify: &BTreeMap<usize, Dot>) -> Result<RgbaCanvas> {
        let opts = &self.opts;
        let payloads: Vec<Payload> = verify.values().map(|d| d.payload.clone()).collect();
        let params = LayoutParams {
            canvas: opts.thumb_image_size(),
            size: opts.range_thumb_size(),
            angles: opts.range_angles(),
            padding: 0,
            colors: opts.range_colors(),
            colors2: opts.range_thumb_colors(),
        };
        let dots = gen_dots(rng, &params, &payloads);
        let sources = payloads
            .iter()
            .map(|p| self.token_source(rng, p))
            .collect::<Result<Vec<_>>>()?;

        let noise_alpha = format_alpha(opts.thumb_disturb_alpha());
        let noise = NoiseParams {
            token_colors: opts.range_thumb_colors(),
            noise_colors: opts
                .range_thumb_bg_colors()
                .iter()
                .map(|c| Rgba8::with_opacity(c, noise_alpha))
                .collect(),
            circles: opts.thumb_bg_circles_num(),
            lines: opts.thumb_bg_slim_line_num(),
            distort_period: rand_distort_period(rng, opts.thumb_bg_distort()),
        };
        let background = pick(rng, self.res.thumb_backgrounds());

        if opts.use_shape_original_color() || opts.non_deform_thumb() {
            draw_thumb_direct(rng, opts.thumb_image_size(), &dots, &sources, background, &noise)
        } else {
            draw_thumb_palette(rng, opts.thumb_image_size(), &dots, &sources, background, &noise)
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Collects options and resources, then hands out owned generators.
#[derive(Debug, Clone, Default)]
pub struct ClickBuilder {
    opts: Option<ClickOptions>,
    res: ClickResources,
}

impl ClickBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_options(&mut self, opts: ClickOptions) -> &mut Self {
        self.opts = Some(opts);
        self
    }

    pub fn set_resources(&mut self, res: ClickResources) -> &mut Self {
        self.res = res;
        self
    }

    /// Back to default options and resources.
    pub fn clear(&mut self) -> &mut Self {
        self.opts = None;
        self.res = ClickResources::default();
        self
    }

    /// Text-mode generator; default text options unless options were set.
    pub fn make(&self) -> Result<Click> {
        let opts = self.opts.clone().unwrap_or_default();
        Click::new(ClickMode::Text, opts, self.res.clone())
    }

    /// Shape-mode generator; default shape options unless options were set.
    pub fn make_shape(&self) -> Result<Click> {
        let opts = self.opts.clone().unwrap_or_else(ClickOptions::default_shape);
        Click::new(ClickMode::Shape, opts, self.res.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::{RangeVal, Size};
    use crate::canvas::Canvas;
    use crate::error::CaptchaError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn background() -> RgbaCanvas {
        let mut c = RgbaCanvas::new(Size::new(400, 300)).unwrap();
        for y in 0..300 {
            for x in 0..400 {
                c.set_pixel(x, y, Rgba8::new_opaque((x % 256) as u8, (y % 256) as u8, 90));
            }
        }
        c
    }

    fn shapes(n: usize) -> BTreeMap<String, RgbaCanvas> {
        (0..n)
            .map(|i| {
                let mut c = RgbaCanvas::new(Size::new(24, 24)).unwrap();
                for y in 4..20 {
                    for x in (2 + i as i32 % 4)..22 {
                        c.set_pixel(x, y, Rgba8::new_opaque(200, 40, 40));
                    }
                }
                (format!("shape-{i}"), c)
            })
            .collect()
    }

    fn shape_click(n: usize, opts: ClickOptions) -> Click {
        let res = ClickResources::new()
            .with_shapes(shapes(n))
            .with_backgrounds(vec![background()]);
        Click::new(ClickMode::Shape, opts, res).unwrap()
    }

    #[test]
    fn test_with_chars_token_length() {
        assert!(ClickResources::new().with_chars(&["A", "BC"]).is_ok());
        assert!(matches!(
            ClickResources::new().with_chars(&["ABC"]),
            Err(ConfigError::TokenTooLong(_))
        ));
        assert!(ClickResources::new().with_chars(&["\u{4E2D}"]).is_ok());
        assert!(ClickResources::new().with_chars(&["\u{4E2D}\u{6587}"]).is_err());
        assert!(ClickResources::new().with_chars(&[""]).is_err());
        assert_eq!(ClickResources::default().chars().len(), 36);
    }

    #[test]
    fn test_resource_checks() {
        let mut rng = StdRng::seed_from_u64(1);
        let res = ClickResources::new().with_backgrounds(vec![background()]);
        let click = Click::new(ClickMode::Text, ClickOptions::default(), res).unwrap();
        let err = click.generate_with_rng(&mut rng).unwrap_err();
        assert!(matches!(err, CaptchaError::Resource(ResourceError::NoFont)));

        let res = ClickResources::new()
            .with_chars(&["A", "B", "C"])
            .unwrap()
            .with_backgrounds(vec![background()]);
        let click = Click::new(ClickMode::Text, ClickOptions::default(), res).unwrap();
        let err = click.generate_with_rng(&mut rng).unwrap_err();
        assert!(matches!(
            err,
            CaptchaError::Resource(ResourceError::NotEnoughChars { have: 3, need: 7 })
        ));

        let click = Click::new(ClickMode::Shape, ClickOptions::default_shape(), ClickResources::new().with_shapes(shapes(8)))
            .unwrap();
        let err = click.generate_with_rng(&mut rng).unwrap_err();
        assert!(matches!(err, CaptchaError::Resource(ResourceError::NoBackground)));

        let err = shape_click(4, ClickOptions::default_shape())
            .generate_with_rng(&mut rng)
            .unwrap_err();
        assert!(matches!(err, CaptchaError::Resource(ResourceError::NotEnoughShapes { have: 4, .. })));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let opts = ClickOptions::default()
            .with_range_len(RangeVal::new(2, 3))
            .unwrap();
        let err = Click::new(ClickMode::Text, opts, ClickResources::new()).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_shape_generate() {
        let mut rng = StdRng::seed_from_u64(11);
        let opts = ClickOptions::default_shape()
            .with_range_len(RangeVal::new(5, 5))
            .unwrap()
            .with_range_verify_len(RangeVal::new(3, 3))
            .unwrap();
        let click = shape_click(8, opts);
        for _ in 0..5 {
            let data = click.generate_with_rng(&mut rng).unwrap();
            assert_eq!(data.dots().len(), 3);
            assert_eq!(data.master_image().get().size(), Size::new(300, 220));
            assert_eq!(data.thumb_image().get().size(), Size::new(150, 40));
            for (i, (k, dot)) in data.dots().iter().enumerate() {
                assert_eq!(*k, i);
                assert_eq!(dot.index, i);
                assert!(dot.shape().is_some_and(|s| s.starts_with("shape-")));
                assert!(dot.x >= EDGE_PADDING && dot.x + dot.width <= 300 - EDGE_PADDING);
                assert!(dot.y >= EDGE_PADDING && dot.y + dot.height <= 220 - EDGE_PADDING);
            }
        }
    }

    #[test]
    fn test_disable_verify_len_keeps_all() {
        let mut rng = StdRng::seed_from_u64(3);
        let opts = ClickOptions::default_shape()
            .with_range_len(RangeVal::new(4, 4))
            .unwrap()
            .with_range_verify_len(RangeVal::new(1, 1))
            .unwrap()
            .with_disable_range_verify_len(true);
        let data = shape_click(6, opts).generate_with_rng(&mut rng).unwrap();
        assert_eq!(data.dots().len(), 4);
    }

    #[test]
    fn test_palette_thumbnail_path() {
        let mut rng = StdRng::seed_from_u64(5);
        let opts = ClickOptions::default_shape()
            .with_non_deform_thumb(false)
            .with_display_shadow(false);
        let click = shape_click(10, opts);
        let data = click.generate_with_rng(&mut rng).unwrap();
        assert_eq!(data.thumb_image().get().size(), Size::new(150, 40));
        assert!(!data.dots().is_empty());
    }

    #[test]
    fn test_builder() {
        let mut builder = ClickBuilder::new();
        builder.set_resources(ClickResources::new().with_shapes(shapes(8)));
        let click = builder.make_shape().unwrap();
        assert_eq!(click.mode(), ClickMode::Shape);
        assert_eq!(click.options(), &ClickOptions::default_shape());

        builder.set_options(ClickOptions::default());
        assert_eq!(builder.make_shape().unwrap().options(), &ClickOptions::default());
        assert_eq!(builder.make().unwrap().mode(), ClickMode::Text);

        builder.clear();
        assert!(builder.make().unwrap().resources().shapes().is_empty());
    }
}
