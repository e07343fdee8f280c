mod common;

use std::collections::BTreeMap;

use raster_captcha::codec::{decode_dots, decode_image, encode_dots, encode_jpeg, encode_png};
use raster_captcha::image_data::{effective_quality, QUALITY_LEVEL3, QUALITY_NONE};
use raster_captcha::{Canvas, Dot, JpegImageData, Payload, Rgba8, Size};

#[test]
fn test_dot_map_round_trip() {
    let mut dots = BTreeMap::new();
    for i in 0..3 {
        dots.insert(
            i,
            Dot {
                index: i,
                x: 10 + i as i32 * 40,
                y: 25,
                size: 28,
                width: 31,
                height: 33,
                angle: 305,
                color: Rgba8::new_opaque(0xfd, 0xe9, 0x8e),
                color2: Rgba8::new_opaque(0x1f, 0x55, 0xc4),
                payload: Payload::Text(format!("{}", (b'K' + i as u8) as char)),
            },
        );
    }
    let json = encode_dots(&dots).unwrap();
    assert!(json.contains("\"color\":\"#fde98e\""));
    assert!(json.contains("\"text\":\"K\""));
    assert_eq!(decode_dots(&json).unwrap(), dots);
}

#[test]
fn test_jpeg_quality_changes_size() {
    let img = common::gradient(120, 90);
    let best = encode_jpeg(&img, QUALITY_NONE).unwrap();
    let lossy = encode_jpeg(&img, QUALITY_LEVEL3).unwrap();
    assert!(lossy.len() < best.len());

    let data = JpegImageData::new(img.clone());
    assert_eq!(data.to_bytes_with_quality(10).unwrap(), data.to_bytes().unwrap());
    assert_eq!(effective_quality(10), QUALITY_NONE);
    assert_eq!(decode_image(&lossy).unwrap().size(), Size::new(120, 90));
}

#[test]
fn test_png_keeps_alpha() {
    let img = common::disk(20, Rgba8::new(10, 20, 30, 200));
    let back = decode_image(&encode_png(&img).unwrap()).unwrap();
    assert_eq!(back, img);
}
