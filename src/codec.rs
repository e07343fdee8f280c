//! Byte and text encodings of images and answer records.

use std::collections::BTreeMap;
use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};

use crate::color::Rgba8;
use crate::error::Result;
use crate::layout::{Block, Dot};
use crate::rgba_canvas::RgbaCanvas;

pub const PNG_MIME: &str = "image/png";
pub const JPEG_MIME: &str = "image/jpeg";

// ============================================================================
// Images
// ============================================================================

/// Lossless PNG, alpha preserved.
pub fn encode_png(canvas: &RgbaCanvas) -> Result<Vec<u8>> {
    let img = canvas.to_image()?;
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

/// JPEG at `quality` (1..=100). Transparent areas are flattened onto white.
pub fn encode_jpeg(canvas: &RgbaCanvas, quality: u8) -> Result<Vec<u8>> {
    let flat = canvas.flatten(Rgba8::WHITE).to_image()?;
    let rgb = DynamicImage::ImageRgba8(flat).to_rgb8();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100)).encode_image(&rgb)?;
    Ok(buf)
}

/// Decode PNG or JPEG bytes.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaCanvas> {
    RgbaCanvas::decode(bytes)
}

/// `data:<mime>;base64,<payload>`.
pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

// ============================================================================
// Answers
// ============================================================================

/// Click answer as a JSON object keyed by the stringified index.
pub fn encode_dots(dots: &BTreeMap<usize, Dot>) -> Result<String> {
    Ok(serde_json::to_string(dots)?)
}

pub fn decode_dots(s: &str) -> Result<BTreeMap<usize, Dot>> {
    Ok(serde_json::from_str(s)?)
}

pub fn encode_block(block: &Block) -> Result<String> {
    Ok(serde_json::to_string(block)?)
}

pub fn decode_block(s: &str) -> Result<Block> {
    Ok(serde_json::from_str(s)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::Size;
    use crate::canvas::Canvas;
    use crate::error::CaptchaError;
    use crate::layout::Payload;

    fn sample() -> RgbaCanvas {
        let mut c = RgbaCanvas::new(Size::new(6, 4)).unwrap();
        c.set_pixel(1, 1, Rgba8::new(200, 10, 10, 255));
        c.set_pixel(2, 1, Rgba8::new(10, 200, 10, 128));
        c
    }

    #[test]
    fn test_png_is_lossless() {
        let c = sample();
        let bytes = encode_png(&c).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        assert_eq!(decode_image(&bytes).unwrap(), c);
    }

    #[test]
    fn test_jpeg_is_opaque() {
        let bytes = encode_jpeg(&sample(), 95).unwrap();
        assert_eq!(&bytes[..2], &[0xff, 0xd8]);
        let back = decode_image(&bytes).unwrap();
        assert_eq!(back.size(), Size::new(6, 4));
        assert_eq!(back.pixel(5, 3).a, 255);
        assert!(back.pixel(5, 3).r > 240);
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(decode_image(b"nope"), Err(CaptchaError::Encode(_))));
    }

    #[test]
    fn test_data_uri() {
        assert_eq!(to_data_uri(PNG_MIME, b"abc"), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_dots_keyed_by_index() {
        let dot = Dot {
            index: 0,
            x: 1,
            y: 2,
            size: 3,
            width: 4,
            height: 5,
            angle: 6,
            color: Rgba8::new_opaque(1, 2, 3),
            color2: Rgba8::new_opaque(4, 5, 6),
            payload: Payload::Shape("star".into()),
        };
        let mut map = BTreeMap::new();
        map.insert(0, dot);
        let s = encode_dots(&map).unwrap();
        assert!(s.starts_with("{\"0\":{"));
        assert!(s.contains("\"shape\":\"star\""));
        assert_eq!(decode_dots(&s).unwrap(), map);
    }

    #[test]
    fn test_block_fields() {
        let block = Block {
            x: 10,
            y: 20,
            width: 64,
            height: 64,
            angle: 0,
            display_x: 5,
            display_y: 20,
        };
        let s = encode_block(&block).unwrap();
        assert!(s.contains("\"display_x\":5"));
        assert_eq!(decode_block(&s).unwrap(), block);
        assert!(matches!(decode_block("{}"), Err(CaptchaError::AnswerCodec(_))));
    }
}
