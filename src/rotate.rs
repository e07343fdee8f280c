//! Rotate challenge: turn the inner disk until it lines up with the ring.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::basics::{RangeVal, Size};
use crate::canvas::Canvas;
use crate::color::format_alpha;
use crate::error::{ConfigError, ResourceError, Result};
use crate::image_data::PngImageData;
use crate::layout::Block;
use crate::options::{check_alpha, check_angles};
use crate::random::{pick, rand_angle, rand_cut_pos};
use crate::rgba_canvas::RgbaCanvas;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotateOptions {
    image_square_size: i32,
    range_angles: Vec<RangeVal>,
    range_thumb_image_square_size: Vec<i32>,
    thumb_image_alpha: f32,
}

impl Default for RotateOptions {
    fn default() -> Self {
        Self {
            image_square_size: 220,
            range_angles: vec![RangeVal::new(30, 330)],
            range_thumb_image_square_size: vec![140, 150, 160, 170],
            thumb_image_alpha: 1.0,
        }
    }
}

impl RotateOptions {
    pub fn from_json(s: &str) -> std::result::Result<Self, ConfigError> {
        let opts: Self = serde_json::from_str(s)?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let square = self.image_square_size;
        if square <= 0 {
            return Err(ConfigError::InvalidSize {
                name: "image_square_size",
                width: square,
                height: square,
            });
        }
        check_angles("range_angles", &self.range_angles)?;
        check_alpha(self.thumb_image_alpha)?;
        if let Some(&thumb) = self
            .range_thumb_image_square_size
            .iter()
            .find(|&&t| t <= 0 || t >= square)
        {
            return Err(ConfigError::InvalidThumbSize { thumb, square });
        }
        Ok(())
    }

    /// Side of the square master image.
    pub fn with_image_square_size(mut self, size: i32) -> std::result::Result<Self, ConfigError> {
        if size <= 0 {
            return Err(ConfigError::InvalidSize {
                name: "image_square_size",
                width: size,
                height: size,
            });
        }
        self.image_square_size = size;
        Ok(self)
    }

    pub fn with_range_angles(mut self, bands: Vec<RangeVal>) -> std::result::Result<Self, ConfigError> {
        check_angles("range_angles", &bands)?;
        self.range_angles = bands;
        Ok(self)
    }

    /// Candidate sides of the inner disk; each must be smaller than the master.
    pub fn with_range_thumb_image_square_size(mut self, sizes: Vec<i32>) -> std::result::Result<Self, ConfigError> {
        let square = self.image_square_size;
        if let Some(&thumb) = sizes.iter().find(|&&t| t <= 0 || t >= square) {
            return Err(ConfigError::InvalidThumbSize { thumb, square });
        }
        self.range_thumb_image_square_size = sizes;
        Ok(self)
    }

    pub fn with_thumb_image_alpha(mut self, alpha: f32) -> std::result::Result<Self, ConfigError> {
        self.thumb_image_alpha = check_alpha(alpha)?;
        Ok(self)
    }

    pub fn image_square_size(&self) -> i32 {
        self.image_square_size
    }

    pub fn range_angles(&self) -> &[RangeVal] {
        &self.range_angles
    }

    pub fn range_thumb_image_square_size(&self) -> &[i32] {
        &self.range_thumb_image_square_size
    }

    pub fn thumb_image_alpha(&self) -> f32 {
        self.thumb_image_alpha
    }
}

#[derive(Debug, Clone, Default)]
pub struct RotateResources {
    images: Vec<RgbaCanvas>,
}

impl RotateResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_images(mut self, images: Vec<RgbaCanvas>) -> Self {
        self.images = images;
        self
    }

    pub fn images(&self) -> &[RgbaCanvas] {
        &self.images
    }
}

#[derive(Debug, Clone)]
pub struct RotateCaptchaData {
    block: Block,
    master: PngImageData,
    thumb: PngImageData,
}

impl RotateCaptchaData {
    /// Answer record; `angle` is how far the thumbnail was turned.
    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn master_image(&self) -> &PngImageData {
        &self.master
    }

    pub fn thumb_image(&self) -> &PngImageData {
        &self.thumb
    }

    pub fn into_parts(self) -> (Block, PngImageData, PngImageData) {
        (self.block, self.master, self.thumb)
    }
}

#[derive(Debug, Clone)]
pub struct Rotate {
    opts: RotateOptions,
    res: RotateResources,
}

impl Rotate {
    pub fn new(opts: RotateOptions, res: RotateResources) -> Result<Self> {
        opts.validate()?;
        Ok(Self { opts, res })
    }

    pub fn options(&self) -> &RotateOptions {
        &self.opts
    }

    pub fn generate(&self) -> Result<RotateCaptchaData> {
        self.generate_with_rng(&mut rand::rng())
    }

    pub fn generate_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<RotateCaptchaData> {
        let image = pick(rng, self.res.images()).ok_or(ResourceError::NoBackground)?;
        let thumb_size = *pick(rng, self.opts.range_thumb_image_square_size()).ok_or(ResourceError::EmptyThumbSizes)?;
        log::debug!("rotate: resources checked, thumb {thumb_size}");

        let square = self.opts.image_square_size();
        // Odd `square - thumb` rounds down, so the cut disk is one pixel wider
        // than `block.width`; the verifier only uses the angle.
        let offset = (square - thumb_size) / 2;
        let block = Block {
            x: offset,
            y: offset,
            width: thumb_size,
            height: thumb_size,
            angle: rand_angle(rng, self.opts.range_angles()),
            display_x: offset,
            display_y: offset,
        };

        let size = Size::new(square, square);
        let mut master = RgbaCanvas::new(size)?;
        master.copy_from(image, rand_cut_pos(rng, size, image.size()));
        let half = square / 2;
        master.crop_circle(half, half, half, 0)?;
        log::debug!("rotate: master rendered");

        let mut thumb = master.clone();
        thumb.crop_circle(half, half, half, offset)?;
        thumb.rotate_with(block.angle, true);
        thumb.scale_alpha(format_alpha(self.opts.thumb_image_alpha()));
        log::debug!("rotate: thumb rendered at {} degrees", block.angle);

        Ok(RotateCaptchaData {
            block,
            master: PngImageData::new(master),
            thumb: PngImageData::new(thumb),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct RotateBuilder {
    opts: RotateOptions,
    res: RotateResources,
}

impl RotateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_options(&mut self, opts: RotateOptions) -> &mut Self {
        self.opts = opts;
        self
    }

    pub fn set_resources(&mut self, res: RotateResources) -> &mut Self {
        self.res = res;
        self
    }

    pub fn clear(&mut self) -> &mut Self {
        *self = Self::default();
        self
    }

    pub fn make(&self) -> Result<Rotate> {
        Rotate::new(self.opts.clone(), self.res.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::angle_within_padding;
    use crate::color::Rgba8;
    use crate::error::CaptchaError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn photo() -> RgbaCanvas {
        let mut c = RgbaCanvas::new(Size::new(260, 240)).unwrap();
        for y in 0..240 {
            for x in 0..260 {
                c.set_pixel(x, y, Rgba8::new_opaque(x as u8, y as u8, 60));
            }
        }
        c
    }

    #[test]
    fn test_generate() {
        let mut rng = StdRng::seed_from_u64(6);
        let rotate = RotateBuilder::new()
            .set_resources(RotateResources::new().with_images(vec![photo()]))
            .make()
            .unwrap();
        for _ in 0..5 {
            let data = rotate.generate_with_rng(&mut rng).unwrap();
            let b = *data.block();
            assert!([140, 150, 160, 170].contains(&b.width));
            assert_eq!(b.width, b.height);
            assert_eq!(b.x, (220 - b.width) / 2);
            assert_eq!((b.display_x, b.display_y), (b.x, b.y));
            assert!((30..=330).contains(&b.angle));
            assert!(angle_within_padding(b.angle.into(), (360 - b.angle).into(), 0));

            let master = data.master_image().get();
            assert_eq!(master.size(), Size::new(220, 220));
            assert_eq!(master.pixel(0, 0).a, 0);
            assert_eq!(master.pixel(110, 110).a, 255);
            let thumb = data.thumb_image().get();
            assert_eq!(thumb.size(), Size::new(b.width, b.width));
            assert_eq!(thumb.pixel(0, 0).a, 0);
        }
    }

    #[test]
    fn test_odd_margin_rounds_down() {
        let mut rng = StdRng::seed_from_u64(8);
        let opts = RotateOptions::default()
            .with_image_square_size(221)
            .unwrap()
            .with_range_thumb_image_square_size(vec![140])
            .unwrap();
        let rotate = Rotate::new(opts, RotateResources::new().with_images(vec![photo()])).unwrap();
        let data = rotate.generate_with_rng(&mut rng).unwrap();
        let b = *data.block();
        assert_eq!((b.x, b.y, b.width), (40, 40, 140));
        // 221 - 2 * 40 leaves a 141 px disk, kept through the rotation.
        assert_eq!(data.thumb_image().get().size(), Size::new(141, 141));
    }

    #[test]
    fn test_thumb_alpha() {
        let mut rng = StdRng::seed_from_u64(2);
        let opts = RotateOptions::default()
            .with_thumb_image_alpha(0.5)
            .unwrap()
            .with_range_angles(vec![RangeVal::new(90, 90)])
            .unwrap();
        let rotate = Rotate::new(opts, RotateResources::new().with_images(vec![photo()])).unwrap();
        let data = rotate.generate_with_rng(&mut rng).unwrap();
        let thumb = data.thumb_image().get();
        let c = thumb.size().width / 2;
        assert!((126..=129).contains(&thumb.pixel(c, c).a));
    }

    #[test]
    fn test_option_errors() {
        assert!(matches!(
            RotateOptions::default().with_range_thumb_image_square_size(vec![120, 220]),
            Err(ConfigError::InvalidThumbSize { thumb: 220, square: 220 })
        ));
        assert!(RotateOptions::default().with_image_square_size(0).is_err());
        let opts = RotateOptions::from_json(r#"{"image_square_size":100}"#);
        assert!(matches!(opts, Err(ConfigError::InvalidThumbSize { thumb: 140, .. })));
    }

    #[test]
    fn test_resource_errors() {
        let mut rng = StdRng::seed_from_u64(2);
        let rotate = Rotate::new(RotateOptions::default(), RotateResources::new()).unwrap();
        assert!(matches!(
            rotate.generate_with_rng(&mut rng),
            Err(CaptchaError::Resource(ResourceError::NoBackground))
        ));

        let opts = RotateOptions::default().with_range_thumb_image_square_size(vec![]).unwrap();
        let rotate = Rotate::new(opts, RotateResources::new().with_images(vec![photo()])).unwrap();
        assert!(matches!(
            rotate.generate_with_rng(&mut rng),
            Err(CaptchaError::Resource(ResourceError::EmptyThumbSizes))
        ));
    }
}
