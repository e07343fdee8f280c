// Writes one challenge of each requested kind to a directory.
//
// Usage:
//   captcha-dump <kind> [-o <dir>] [--seed <n>] [--bg <image>]... [--font <ttf>] [-q <quality>]
//   captcha-dump list
//
// Without --bg a synthetic gradient is used; text-mode click needs --font or
// an installed system font.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process;

use rand::rngs::StdRng;
use rand::SeedableRng;
use raster_captcha::codec::{encode_block, encode_dots};
use raster_captcha::font_engine::find_system_font;
use raster_captcha::{
    CaptchaError, ClickBuilder, ClickResources, Font, GraphImage, Rgba8, RgbaCanvas, RotateBuilder, RotateResources,
    Size, SlideBuilder, SlideResources,
};

const KINDS: [&str; 5] = ["click", "click-shape", "slide", "slide-region", "rotate"];

struct Args {
    kind: String,
    out_dir: PathBuf,
    seed: Option<u64>,
    backgrounds: Vec<PathBuf>,
    font: Option<PathBuf>,
    quality: u8,
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }
    if args[1] == "list" {
        for kind in KINDS {
            println!("  {kind}");
        }
        return;
    }

    let parsed = match parse_args(&args[1..]) {
        Ok(a) => a,
        Err(msg) => {
            eprintln!("{msg}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = run(&parsed) {
        eprintln!("captcha-dump: {e}");
        process::exit(1);
    }
}

fn print_usage() {
    eprintln!("captcha-dump - write challenge images and answers to a directory");
    eprintln!();
    eprintln!("  captcha-dump <kind> [-o <dir>] [--seed <n>] [--bg <image>]... [--font <ttf>] [-q <quality>]");
    eprintln!("  captcha-dump list");
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let kind = args[0].clone();
    if !KINDS.contains(&kind.as_str()) {
        return Err(format!("Unknown kind: {kind}"));
    }
    let mut parsed = Args {
        kind,
        out_dir: PathBuf::from("."),
        seed: None,
        backgrounds: Vec::new(),
        font: None,
        quality: 100,
    };

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1).ok_or_else(|| format!("Missing value for {}", args[i]))?;
        match args[i].as_str() {
            "-o" => parsed.out_dir = PathBuf::from(value),
            "--seed" => parsed.seed = Some(value.parse().map_err(|_| format!("Invalid seed: {value}"))?),
            "--bg" => parsed.backgrounds.push(PathBuf::from(value)),
            "--font" => parsed.font = Some(PathBuf::from(value)),
            "-q" => parsed.quality = value.parse().map_err(|_| format!("Invalid quality: {value}"))?,
            other => return Err(format!("Unknown option: {other}")),
        }
        i += 2;
    }
    Ok(parsed)
}

fn run(args: &Args) -> Result<(), CaptchaError> {
    std::fs::create_dir_all(&args.out_dir)?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let backgrounds = load_backgrounds(&args.backgrounds)?;
    let out = |name: &str| args.out_dir.join(format!("{}-{}", args.kind, name));

    match args.kind.as_str() {
        "click" | "click-shape" => {
            let mut res = ClickResources::new()
                .with_backgrounds(backgrounds)
                .with_shapes(demo_shapes()?);
            if args.kind == "click" {
                res = res.with_fonts(vec![load_font(args.font.as_deref())?]);
            }
            let mut builder = ClickBuilder::new();
            builder.set_resources(res);
            let click = if args.kind == "click" { builder.make()? } else { builder.make_shape()? };
            let data = click.generate_with_rng(&mut rng)?;
            data.master_image().save_to_file(out("master.jpg"), args.quality)?;
            data.thumb_image().save_to_file(out("thumb.png"))?;
            write_answer(&out("answer.json"), &encode_dots(data.dots())?)?;
        }
        "slide" | "slide-region" => {
            let mut builder = SlideBuilder::new();
            builder.set_resources(
                SlideResources::new()
                    .with_backgrounds(backgrounds)
                    .with_graph_images(vec![demo_graph()?]),
            );
            let slide = if args.kind == "slide" { builder.make()? } else { builder.make_with_region()? };
            let data = slide.generate_with_rng(&mut rng)?;
            data.master_image().save_to_file(out("master.jpg"), args.quality)?;
            data.tile_image().save_to_file(out("tile.png"))?;
            write_answer(&out("answer.json"), &encode_block(data.block())?)?;
        }
        _ => {
            let mut builder = RotateBuilder::new();
            builder.set_resources(RotateResources::new().with_images(backgrounds));
            let data = builder.make()?.generate_with_rng(&mut rng)?;
            data.master_image().save_to_file(out("master.png"))?;
            data.thumb_image().save_to_file(out("thumb.png"))?;
            write_answer(&out("answer.json"), &encode_block(data.block())?)?;
        }
    }
    println!("Saved {} challenge to {}", args.kind, args.out_dir.display());
    Ok(())
}

fn write_answer(path: &Path, json: &str) -> Result<(), CaptchaError> {
    log::info!("answer: {json}");
    std::fs::write(path, json)?;
    Ok(())
}

fn load_backgrounds(paths: &[PathBuf]) -> Result<Vec<RgbaCanvas>, CaptchaError> {
    if paths.is_empty() {
        return Ok(vec![gradient(Size::new(400, 320))?]);
    }
    paths
        .iter()
        .map(|p| RgbaCanvas::decode(&std::fs::read(p)?))
        .collect()
}

fn load_font(path: Option<&Path>) -> Result<Font, CaptchaError> {
    let data = match path {
        Some(p) => std::fs::read(p)?,
        None => find_system_font().ok_or(raster_captcha::ResourceError::NoFont)?,
    };
    Ok(Font::from_data(data)?)
}

fn gradient(size: Size) -> Result<RgbaCanvas, CaptchaError> {
    let mut c = RgbaCanvas::new(size)?;
    for y in 0..size.height {
        for x in 0..size.width {
            let r = (x * 255 / size.width) as u8;
            let g = (y * 255 / size.height) as u8;
            c.set_pixel(x, y, Rgba8::new_opaque(r, g, 160));
        }
    }
    Ok(c)
}

/// Ten shapes: squares, diamonds and rings of different sizes.
fn demo_shapes() -> Result<BTreeMap<String, RgbaCanvas>, CaptchaError> {
    let mut shapes = BTreeMap::new();
    for i in 0..10 {
        let mut c = RgbaCanvas::new(Size::new(40, 40))?;
        let r = 10 + i;
        for y in 0..40 {
            for x in 0..40 {
                let (dx, dy): (i32, i32) = (x - 20, y - 20);
                let inside = match i % 3 {
                    0 => dx.abs() <= r && dy.abs() <= r,
                    1 => dx.abs() + dy.abs() <= r,
                    _ => {
                        let d = dx * dx + dy * dy;
                        d <= r * r && d >= (r - 5) * (r - 5)
                    }
                };
                if inside {
                    c.set_pixel(x, y, Rgba8::new_opaque(240, 240, 240));
                }
            }
        }
        shapes.insert(format!("shape-{i}"), c);
    }
    Ok(shapes)
}

fn demo_graph() -> Result<GraphImage, CaptchaError> {
    let mut mask = RgbaCanvas::new(Size::new(64, 64))?;
    for y in 6..58 {
        for x in 6..58 {
            mask.set_pixel(x, y, Rgba8::WHITE);
        }
    }
    let mut shadow = mask.clone();
    shadow.tint(Rgba8::new(0, 0, 0, 150));
    let mut overlay = mask.clone();
    overlay.tint(Rgba8::new(255, 255, 255, 50));
    Ok(GraphImage { overlay, shadow, mask })
}
