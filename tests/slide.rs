mod common;

use rand::rngs::StdRng;
use rand::SeedableRng;
use raster_captcha::check::{offset_within_padding, validate_slide};
use raster_captcha::codec::{decode_block, encode_block};
use raster_captcha::{
    Canvas, CaptchaError, DeadZoneDirection, ResourceError, Size, SlideBuilder, SlideOptions, SlideResources,
};

fn resources() -> SlideResources {
    SlideResources::new()
        .with_backgrounds(vec![common::gradient(360, 280)])
        .with_graph_images(vec![common::graph()])
}

#[test]
fn test_block_within_image_and_self_verifies() {
    let mut builder = SlideBuilder::new();
    builder.set_resources(resources());
    let slide = builder.make().unwrap();

    let mut rng = StdRng::seed_from_u64(12);
    for _ in 0..30 {
        let data = slide.generate_with_rng(&mut rng).unwrap();
        let b = data.block();
        assert!(b.x >= 0 && b.y >= 0);
        assert!(b.x + b.width <= 300 && b.y + b.height <= 240, "{b:?}");
        assert!(offset_within_padding(b.x as i64, b.y as i64, b.x as i64, b.y as i64, 0));
        assert!(validate_slide(b.x as i64 + 3, b.y as i64 - 3, b, 3));
        assert!(!validate_slide(b.x as i64 + 4, b.y as i64, b, 3));
    }
}

#[test]
fn test_region_mode_many_candidates() {
    let opts = SlideOptions::default()
        .with_gen_graph_number(3)
        .unwrap()
        .with_range_dead_zone_directions(vec![DeadZoneDirection::Top, DeadZoneDirection::Bottom])
        .unwrap()
        .with_enable_graph_vertical_random(true);
    let mut builder = SlideBuilder::new();
    builder.set_options(opts).set_resources(resources());
    let slide = builder.make_with_region().unwrap();
    assert!(slide.options().enable_graph_vertical_random());

    let mut rng = StdRng::seed_from_u64(40);
    for _ in 0..10 {
        let data = slide.generate_with_rng(&mut rng).unwrap();
        let b = data.block();
        assert!(b.display_y == 5 || b.display_y == 240 - b.height - 5, "{b:?}");
        assert_eq!(data.tile_image().get().size(), Size::new(b.width, b.height));
        assert_eq!(data.master_image().get().size(), Size::new(300, 240));
    }
}

#[test]
fn test_answer_round_trip() {
    let mut builder = SlideBuilder::new();
    builder.set_resources(resources());
    let data = builder.make().unwrap().generate().unwrap();
    let json = encode_block(data.block()).unwrap();
    assert_eq!(&decode_block(&json).unwrap(), data.block());
}

#[test]
fn test_missing_graph() {
    let mut builder = SlideBuilder::new();
    builder.set_resources(SlideResources::new().with_backgrounds(vec![common::gradient(300, 240)]));
    let err = builder.make().unwrap().generate().unwrap_err();
    assert!(matches!(err, CaptchaError::Resource(ResourceError::NoGraphImage)));
}
