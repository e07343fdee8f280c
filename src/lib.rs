//! # raster-captcha
//!
//! Procedural challenge images with a pure Rust raster core.
//!
//! Three challenge kinds share one engine:
//!
//! - **Click**: find the thumbnail's characters or shapes on the master image
//! - **Slide**: drag a tile into the notch it was cut from
//! - **Rotate**: turn the inner disk back into line with its ring
//!
//! ## Architecture
//!
//! A generation runs as a pipeline of pure stages:
//!
//! 1. **Check**: options are validated when a generator is built, assets
//!    before any drawing
//! 2. **Layout**: token placements ([`Dot`]) or a cutout position ([`Block`])
//! 3. **Render**: glyph outlines are rasterized to coverage and composited on
//!    direct-color ([`RgbaCanvas`]) or indexed ([`PaletteCanvas`]) canvases,
//!    with affine rotation, sine distortion and circular crops
//! 4. **Emit**: the answer record plus JPEG/PNG image data
//!
//! The answer record is the only thing a caller has to keep; the [`check`]
//! predicates verify a submission against it later.

// Foundation
pub mod basics;
pub mod color;
pub mod error;
pub mod random;
pub mod trans_affine;

// Raster core
pub mod canvas;
pub mod font_engine;
pub mod image_filters;
pub mod palette_canvas;
pub mod path;
pub mod rasterizer;
pub mod rgba_canvas;

// Layout, encodings, verification
pub mod check;
pub mod codec;
pub mod image_data;
pub mod layout;
pub mod options;

// Challenges
pub mod click;
mod click_draw;
pub mod click_options;
pub mod rotate;
pub mod slide;

pub use basics::{AreaRect, Point, RangeVal, Size};
pub use canvas::{Canvas, DrawString, DrawStringParams, Rotatable};
pub use color::{Palette, Rgba8};
pub use error::{CaptchaError, ConfigError, RenderError, ResourceError, Result};
pub use font_engine::Font;
pub use image_data::{JpegImageData, PngImageData};
pub use layout::{Block, Dot, Payload};
pub use palette_canvas::PaletteCanvas;
pub use rgba_canvas::RgbaCanvas;

pub use click::{Click, ClickBuilder, ClickCaptchaData, ClickMode, ClickResources};
pub use click_options::ClickOptions;
pub use rotate::{Rotate, RotateBuilder, RotateCaptchaData, RotateOptions, RotateResources};
pub use slide::{
    DeadZoneDirection, GraphImage, Slide, SlideBuilder, SlideCaptchaData, SlideMode, SlideOptions, SlideResources,
};
