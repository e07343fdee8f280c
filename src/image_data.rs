//! Generated images with their intended encodings attached.
//!
//! Masters of the click and slide challenges are lossy JPEG, thumbnails and
//! tiles are PNG. Both wrap the rendered canvas, which stays reachable
//! through `get()`.

use std::path::Path;

use crate::codec::{encode_jpeg, encode_png, to_data_uri, JPEG_MIME, PNG_MIME};
use crate::error::Result;
use crate::rgba_canvas::RgbaCanvas;

pub const QUALITY_NONE: u8 = 100;
pub const QUALITY_LEVEL1: u8 = 95;
pub const QUALITY_LEVEL2: u8 = 85;
pub const QUALITY_LEVEL3: u8 = 75;
pub const QUALITY_LEVEL4: u8 = 65;
pub const QUALITY_LEVEL5: u8 = 55;

/// Clamp a requested quality to the supported band, anything outside
/// `QUALITY_LEVEL5..=QUALITY_NONE` meaning "no loss".
pub fn effective_quality(quality: u8) -> u8 {
    if (QUALITY_LEVEL5..=QUALITY_NONE).contains(&quality) {
        quality
    } else {
        QUALITY_NONE
    }
}

/// Quality for a level `0..=5` (0 = none).
pub fn quality_for_level(level: u8) -> u8 {
    match level {
        1 => QUALITY_LEVEL1,
        2 => QUALITY_LEVEL2,
        3 => QUALITY_LEVEL3,
        4 => QUALITY_LEVEL4,
        5 => QUALITY_LEVEL5,
        _ => QUALITY_NONE,
    }
}

#[derive(Debug, Clone)]
pub struct JpegImageData {
    image: RgbaCanvas,
}

impl JpegImageData {
    pub fn new(image: RgbaCanvas) -> Self {
        Self { image }
    }

    pub fn get(&self) -> &RgbaCanvas {
        &self.image
    }

    pub fn into_inner(self) -> RgbaCanvas {
        self.image
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode_jpeg(&self.image, QUALITY_NONE)
    }

    pub fn to_bytes_with_quality(&self, quality: u8) -> Result<Vec<u8>> {
        encode_jpeg(&self.image, effective_quality(quality))
    }

    pub fn to_base64(&self) -> Result<String> {
        Ok(to_data_uri(JPEG_MIME, &self.to_bytes()?))
    }

    pub fn to_base64_with_quality(&self, quality: u8) -> Result<String> {
        Ok(to_data_uri(JPEG_MIME, &self.to_bytes_with_quality(quality)?))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P, quality: u8) -> Result<()> {
        std::fs::write(path, self.to_bytes_with_quality(quality)?)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PngImageData {
    image: RgbaCanvas,
}

impl PngImageData {
    pub fn new(image: RgbaCanvas) -> Self {
        Self { image }
    }

    pub fn get(&self) -> &RgbaCanvas {
        &self.image
    }

    pub fn into_inner(self) -> RgbaCanvas {
        self.image
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode_png(&self.image)
    }

    pub fn to_base64(&self) -> Result<String> {
        Ok(to_data_uri(PNG_MIME, &self.to_bytes()?))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::Size;
    use crate::color::Rgba8;

    #[test]
    fn test_effective_quality() {
        assert_eq!(effective_quality(75), 75);
        assert_eq!(effective_quality(55), 55);
        assert_eq!(effective_quality(54), QUALITY_NONE);
        assert_eq!(effective_quality(0), QUALITY_NONE);
        assert_eq!(quality_for_level(3), 75);
        assert_eq!(quality_for_level(9), 100);
    }

    #[test]
    fn test_base64_prefixes() {
        let c = RgbaCanvas::new_filled(Size::new(4, 4), Rgba8::new_opaque(9, 99, 199)).unwrap();
        let jpeg = JpegImageData::new(c.clone());
        assert!(jpeg.to_base64().unwrap().starts_with("data:image/jpeg;base64,"));
        assert!(jpeg.to_base64_with_quality(10).unwrap().starts_with("data:image/jpeg;base64,"));
        let png = PngImageData::new(c.clone());
        assert!(png.to_base64().unwrap().starts_with("data:image/png;base64,"));
        assert_eq!(png.get(), &c);
    }

    #[test]
    fn test_save_to_file() {
        let c = RgbaCanvas::new_filled(Size::new(3, 2), Rgba8::BLACK).unwrap();
        let dir = std::env::temp_dir();
        let path = dir.join(format!("raster-captcha-test-{}.png", std::process::id()));
        PngImageData::new(c.clone()).save_to_file(&path).unwrap();
        let back = RgbaCanvas::decode(&std::fs::read(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(back, c);
    }
}
