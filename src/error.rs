//! Error taxonomy.
//!
//! Configuration mistakes, resource shortages and rendering failures are
//! separate enums so callers can tell "fix the options once" apart from
//! "supply more assets" and from a failed draw.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CaptchaError>;

/// Invalid option values, detected when the option is set or when a
/// generator is constructed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid hex color {0:?}")]
    InvalidHexColor(String),
    #[error("color table {table} has {len} entries, at most 255 are allowed")]
    ColorTableTooLarge { table: &'static str, len: usize },
    #[error("verify length max {verify_max} exceeds token length min {len_min}")]
    VerifyRangeExceedsLength { verify_max: i32, len_min: i32 },
    #[error("range {name} is invalid: [{min}, {max}]")]
    InvalidRange {
        name: &'static str,
        min: i32,
        max: i32,
    },
    #[error("size {name} is invalid: {width}x{height}")]
    InvalidSize {
        name: &'static str,
        width: i32,
        height: i32,
    },
    #[error("token {0:?} is too long")]
    TokenTooLong(String),
    #[error("token size {size} does not fit into a {width}x{height} image")]
    TokenTooLarge { size: i32, width: i32, height: i32 },
    #[error("thumbnail square {thumb} must be smaller than the image square {square}")]
    InvalidThumbSize { thumb: i32, square: i32 },
    #[error("distort level {0} is out of range 0..=5")]
    InvalidDistortLevel(i32),
    #[error("alpha {0} is out of range 0..=1")]
    InvalidAlpha(f32),
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("option json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Not enough assets to build a challenge, detected before any drawing.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("need at least {need} distinct chars, have {have}")]
    NotEnoughChars { have: usize, need: usize },
    #[error("need at least {need} distinct shapes, have {have}")]
    NotEnoughShapes { have: usize, need: usize },
    #[error("no font configured")]
    NoFont,
    #[error("no background image configured")]
    NoBackground,
    #[error("no graph image configured")]
    NoGraphImage,
    #[error("graph image has an empty {0} layer")]
    EmptyGraphLayer(&'static str),
    #[error("no thumbnail sizes configured")]
    EmptyThumbSizes,
}

/// Failures while drawing.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("font parse failed: {0}")]
    FontParse(String),
    #[error("font face is unavailable")]
    FaceUnavailable,
    #[error("canvas of {width}x{height} cannot be created")]
    InvalidCanvas { width: i32, height: i32 },
}

/// Top-level error returned by every fallible operation of the crate.
#[derive(Debug, Error)]
pub enum CaptchaError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("image codec error: {0}")]
    Encode(#[from] image::ImageError),
    #[error("answer codec error: {0}")]
    AnswerCodec(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CaptchaError {
    /// True for errors that will not go away without changing the options.
    pub fn is_config(&self) -> bool {
        matches!(self, CaptchaError::Config(_))
    }

    /// True for errors that more assets would fix.
    pub fn is_resource(&self) -> bool {
        matches!(self, CaptchaError::Resource(_))
    }
}
