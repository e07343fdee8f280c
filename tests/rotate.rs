mod common;

use rand::rngs::StdRng;
use rand::SeedableRng;
use raster_captcha::check::validate_rotate;
use raster_captcha::codec::decode_image;
use raster_captcha::{Canvas, RangeVal, RotateBuilder, RotateOptions, RotateResources, Size};

#[test]
fn test_rotate_images_and_answer() {
    let opts = RotateOptions::default()
        .with_range_angles(vec![RangeVal::new(40, 80), RangeVal::new(200, 260)])
        .unwrap();
    let mut builder = RotateBuilder::new();
    builder
        .set_options(opts)
        .set_resources(RotateResources::new().with_images(vec![common::gradient(300, 300)]));
    let rotate = builder.make().unwrap();

    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..5 {
        let data = rotate.generate_with_rng(&mut rng).unwrap();
        let b = data.block();
        assert!((40..=80).contains(&b.angle) || (200..=260).contains(&b.angle));

        let delta = 360 - b.angle as i64;
        assert!(validate_rotate(delta, b, 2));
        assert!(validate_rotate(delta + 2, b, 2));
        assert!(!validate_rotate(delta + 10, b, 2));

        // The master is PNG: the transparent corners survive encoding.
        let master = decode_image(&data.master_image().to_bytes().unwrap()).unwrap();
        assert_eq!(master.size(), Size::new(220, 220));
        assert_eq!(master.pixel(1, 1).a, 0);
        let thumb = decode_image(&data.thumb_image().to_bytes().unwrap()).unwrap();
        assert_eq!(thumb.size(), Size::new(b.width, b.height));
    }
}

#[test]
fn test_small_background_is_not_cropped() {
    let mut builder = RotateBuilder::new();
    builder.set_resources(RotateResources::new().with_images(vec![common::gradient(100, 100)]));
    let data = builder.make().unwrap().generate().unwrap();
    let master = data.master_image().get();
    assert_eq!(master.size(), Size::new(220, 220));
    // The photo covers only the top-left corner of the square.
    assert_eq!(master.pixel(150, 110).a, 0);
    assert_eq!(master.pixel(60, 60).a, 255);
}
