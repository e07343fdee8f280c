//! Options of the click challenge.

use serde::{Deserialize, Serialize};

use crate::basics::{Point, RangeVal, Size, EDGE_PADDING};
use crate::color::{check_table_len, parse_hex_list, Rgba8};
use crate::error::ConfigError;
use crate::options::{
    check_alpha, check_angles, check_count, check_distort_level, check_range, check_size, DISTORT_LEVEL1,
    DISTORT_LEVEL4,
};

/// Room a token box needs around it on the master image.
const TOKEN_ROOM: i32 = EDGE_PADDING * 2 + 10;

const DEFAULT_COLORS: [Rgba8; 7] = [
    Rgba8::new_opaque(0xfd, 0xe9, 0x8e),
    Rgba8::new_opaque(0x60, 0xc1, 0xff),
    Rgba8::new_opaque(0xfc, 0xb0, 0x8e),
    Rgba8::new_opaque(0xfb, 0x88, 0xff),
    Rgba8::new_opaque(0xb4, 0xfe, 0xd4),
    Rgba8::new_opaque(0xcb, 0xfa, 0xa9),
    Rgba8::new_opaque(0x78, 0xd6, 0xf8),
];

const DEFAULT_THUMB_COLORS: [Rgba8; 7] = [
    Rgba8::new_opaque(0x1f, 0x55, 0xc4),
    Rgba8::new_opaque(0x78, 0x05, 0x92),
    Rgba8::new_opaque(0x2f, 0x6b, 0x00),
    Rgba8::new_opaque(0x91, 0x00, 0x00),
    Rgba8::new_opaque(0x86, 0x44, 0x01),
    Rgba8::new_opaque(0x67, 0x59, 0x01),
    Rgba8::new_opaque(0x01, 0x6e, 0x5c),
];

const DEFAULT_SHADOW_COLOR: Rgba8 = Rgba8::new_opaque(0x10, 0x10, 0x10);

/// Click challenge options.
///
/// Fallible setters check their own argument; cross-field rules are checked
/// by [`ClickOptions::validate`], which every generator runs on construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickOptions {
    font_dpi: i32,
    image_size: Size,
    range_len: RangeVal,
    range_angles: Vec<RangeVal>,
    range_size: RangeVal,
    range_colors: Vec<Rgba8>,
    display_shadow: bool,
    shadow_color: Rgba8,
    shadow_offset: Point,
    image_alpha: f32,

    thumb_image_size: Size,
    range_verify_len: RangeVal,
    disable_range_verify_len: bool,
    range_thumb_size: RangeVal,
    range_thumb_colors: Vec<Rgba8>,
    range_thumb_bg_colors: Vec<Rgba8>,
    thumb_bg_distort: i32,
    thumb_bg_circles_num: i32,
    thumb_bg_slim_line_num: i32,
    non_deform_thumb: bool,
    thumb_disturb_alpha: f32,

    use_shape_original_color: bool,
}

impl Default for ClickOptions {
    fn default() -> Self {
        Self {
            font_dpi: 72,
            image_size: Size::new(300, 220),
            range_len: RangeVal::new(6, 7),
            range_angles: vec![
                RangeVal::new(20, 35),
                RangeVal::new(35, 45),
                RangeVal::new(45, 60),
                RangeVal::new(290, 305),
                RangeVal::new(305, 325),
                RangeVal::new(325, 330),
            ],
            range_size: RangeVal::new(26, 32),
            range_colors: DEFAULT_COLORS.to_vec(),
            display_shadow: true,
            shadow_color: DEFAULT_SHADOW_COLOR,
            shadow_offset: Point::new(1, 1),
            image_alpha: 1.0,

            thumb_image_size: Size::new(150, 40),
            range_verify_len: RangeVal::new(2, 4),
            disable_range_verify_len: false,
            range_thumb_size: RangeVal::new(22, 28),
            range_thumb_colors: DEFAULT_THUMB_COLORS.to_vec(),
            range_thumb_bg_colors: DEFAULT_THUMB_COLORS.to_vec(),
            thumb_bg_distort: DISTORT_LEVEL4,
            thumb_bg_circles_num: 24,
            thumb_bg_slim_line_num: 2,
            non_deform_thumb: true,
            thumb_disturb_alpha: 1.0,

            use_shape_original_color: false,
        }
    }
}

impl ClickOptions {
    /// Defaults of the shape mode: milder distortion and smaller tokens.
    pub fn default_shape() -> Self {
        Self {
            thumb_bg_distort: DISTORT_LEVEL1,
            range_size: RangeVal::new(24, 30),
            range_thumb_size: RangeVal::new(14, 20),
            ..Self::default()
        }
    }

    /// Parse options from JSON. Missing fields take their defaults.
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let opts: Self = serde_json::from_str(s)?;
        opts.validate()?;
        Ok(opts)
    }

    /// Check every field and the rules between fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_size("image_size", self.image_size)?;
        check_size("thumb_image_size", self.thumb_image_size)?;
        check_range("range_len", self.range_len)?;
        if self.range_len.min < 1 {
            return Err(ConfigError::InvalidRange {
                name: "range_len",
                min: self.range_len.min,
                max: self.range_len.max,
            });
        }
        check_angles("range_angles", &self.range_angles)?;
        check_range("range_size", self.range_size)?;
        check_range("range_verify_len", self.range_verify_len)?;
        check_range("range_thumb_size", self.range_thumb_size)?;
        check_alpha(self.image_alpha)?;
        check_alpha(self.thumb_disturb_alpha)?;
        check_distort_level(self.thumb_bg_distort)?;
        check_count("thumb_bg_circles_num", self.thumb_bg_circles_num)?;
        check_count("thumb_bg_slim_line_num", self.thumb_bg_slim_line_num)?;
        if self.font_dpi <= 0 {
            return Err(ConfigError::InvalidRange {
                name: "font_dpi",
                min: self.font_dpi,
                max: self.font_dpi,
            });
        }

        if self.range_colors.is_empty() {
            return Err(ConfigError::Empty("range_colors"));
        }
        if self.range_thumb_colors.is_empty() {
            return Err(ConfigError::Empty("range_thumb_colors"));
        }
        check_table_len("range_colors", self.range_colors.len())?;
        check_table_len("range_thumb_colors", self.range_thumb_colors.len())?;
        check_table_len("range_thumb_bg_colors", self.range_thumb_bg_colors.len())?;
        // Thumbnail palette: token colors, noise colors and the transparent entry.
        check_table_len(
            "thumb palette",
            self.range_thumb_colors.len() + self.range_thumb_bg_colors.len(),
        )?;

        if !self.disable_range_verify_len && self.range_verify_len.max > self.range_len.min {
            return Err(ConfigError::VerifyRangeExceedsLength {
                verify_max: self.range_verify_len.max,
                len_min: self.range_len.min,
            });
        }

        let room = self.image_size.width.min(self.image_size.height);
        if self.range_size.max + TOKEN_ROOM > room {
            return Err(ConfigError::TokenTooLarge {
                size: self.range_size.max,
                width: self.image_size.width,
                height: self.image_size.height,
            });
        }
        Ok(())
    }

    // ====================================================================
    // Master image
    // ====================================================================

    pub fn with_font_dpi(mut self, dpi: i32) -> Result<Self, ConfigError> {
        if dpi <= 0 {
            return Err(ConfigError::InvalidRange {
                name: "font_dpi",
                min: dpi,
                max: dpi,
            });
        }
        self.font_dpi = dpi;
        Ok(self)
    }

    pub fn with_image_size(mut self, size: Size) -> Result<Self, ConfigError> {
        self.image_size = check_size("image_size", size)?;
        Ok(self)
    }

    /// Number of tokens on the master image.
    pub fn with_range_len(mut self, r: RangeVal) -> Result<Self, ConfigError> {
        self.range_len = check_range("range_len", r)?;
        Ok(self)
    }

    pub fn with_range_angles(mut self, bands: Vec<RangeVal>) -> Result<Self, ConfigError> {
        check_angles("range_angles", &bands)?;
        self.range_angles = bands;
        Ok(self)
    }

    pub fn with_range_size(mut self, r: RangeVal) -> Result<Self, ConfigError> {
        self.range_size = check_range("range_size", r)?;
        Ok(self)
    }

    pub fn with_range_colors<S: AsRef<str>>(mut self, colors: &[S]) -> Result<Self, ConfigError> {
        self.range_colors = parse_hex_list("range_colors", colors)?;
        Ok(self)
    }

    pub fn with_display_shadow(mut self, show: bool) -> Self {
        self.display_shadow = show;
        self
    }

    pub fn with_shadow_color(mut self, hex: &str) -> Result<Self, ConfigError> {
        self.shadow_color = Rgba8::parse_hex(hex)?;
        Ok(self)
    }

    /// Displacement of the shadow relative to the token, down-right positive.
    pub fn with_shadow_offset(mut self, offset: Point) -> Self {
        self.shadow_offset = offset;
        self
    }

    pub fn with_image_alpha(mut self, alpha: f32) -> Result<Self, ConfigError> {
        self.image_alpha = check_alpha(alpha)?;
        Ok(self)
    }

    // ====================================================================
    // Thumbnail
    // ====================================================================

    pub fn with_thumb_image_size(mut self, size: Size) -> Result<Self, ConfigError> {
        self.thumb_image_size = check_size("thumb_image_size", size)?;
        Ok(self)
    }

    /// Number of tokens the user must click. The maximum may not exceed the
    /// minimum of [`with_range_len`](Self::with_range_len).
    pub fn with_range_verify_len(mut self, r: RangeVal) -> Result<Self, ConfigError> {
        let r = check_range("range_verify_len", r)?;
        if r.max > self.range_len.min {
            return Err(ConfigError::VerifyRangeExceedsLength {
                verify_max: r.max,
                len_min: self.range_len.min,
            });
        }
        self.range_verify_len = r;
        Ok(self)
    }

    /// Ask for every token instead of a random subset.
    pub fn with_disable_range_verify_len(mut self, disable: bool) -> Self {
        self.disable_range_verify_len = disable;
        self
    }

    pub fn with_range_thumb_size(mut self, r: RangeVal) -> Result<Self, ConfigError> {
        self.range_thumb_size = check_range("range_thumb_size", r)?;
        Ok(self)
    }

    pub fn with_range_thumb_colors<S: AsRef<str>>(mut self, colors: &[S]) -> Result<Self, ConfigError> {
        self.range_thumb_colors = parse_hex_list("range_thumb_colors", colors)?;
        Ok(self)
    }

    pub fn with_range_thumb_bg_colors<S: AsRef<str>>(mut self, colors: &[S]) -> Result<Self, ConfigError> {
        self.range_thumb_bg_colors = parse_hex_list("range_thumb_bg_colors", colors)?;
        Ok(self)
    }

    /// Distort level `0..=5` of the thumbnail noise.
    pub fn with_thumb_bg_distort(mut self, level: i32) -> Result<Self, ConfigError> {
        self.thumb_bg_distort = check_distort_level(level)?;
        Ok(self)
    }

    pub fn with_thumb_bg_circles_num(mut self, n: i32) -> Result<Self, ConfigError> {
        self.thumb_bg_circles_num = check_count("thumb_bg_circles_num", n)?;
        Ok(self)
    }

    pub fn with_thumb_bg_slim_line_num(mut self, n: i32) -> Result<Self, ConfigError> {
        self.thumb_bg_slim_line_num = check_count("thumb_bg_slim_line_num", n)?;
        Ok(self)
    }

    /// Keep thumbnail tokens undistorted under a separate noise layer.
    pub fn with_non_deform_thumb(mut self, on: bool) -> Self {
        self.non_deform_thumb = on;
        self
    }

    pub fn with_thumb_disturb_alpha(mut self, alpha: f32) -> Result<Self, ConfigError> {
        self.thumb_disturb_alpha = check_alpha(alpha)?;
        Ok(self)
    }

    /// Draw shapes in their own colors instead of a token-colored silhouette.
    pub fn with_use_shape_original_color(mut self, on: bool) -> Self {
        self.use_shape_original_color = on;
        self
    }

    // ====================================================================
    // Getters
    // ====================================================================

    pub fn font_dpi(&self) -> i32 {
        self.font_dpi
    }
    pub fn image_size(&self) -> Size {
        self.image_size
    }
    pub fn range_len(&self) -> RangeVal {
        self.range_len
    }
    pub fn range_angles(&self) -> &[RangeVal] {
        &self.range_angles
    }
    pub fn range_size(&self) -> RangeVal {
        self.range_size
    }
    pub fn range_colors(&self) -> &[Rgba8] {
        &self.range_colors
    }
    pub fn display_shadow(&self) -> bool {
        self.display_shadow
    }
    pub fn shadow_color(&self) -> Rgba8 {
        self.shadow_color
    }
    pub fn shadow_offset(&self) -> Point {
        self.shadow_offset
    }
    pub fn image_alpha(&self) -> f32 {
        self.image_alpha
    }
    pub fn thumb_image_size(&self) -> Size {
        self.thumb_image_size
    }
    pub fn range_verify_len(&self) -> RangeVal {
        self.range_verify_len
    }
    pub fn disable_range_verify_len(&self) -> bool {
        self.disable_range_verify_len
    }
    pub fn range_thumb_size(&self) -> RangeVal {
        self.range_thumb_size
    }
    pub fn range_thumb_colors(&self) -> &[Rgba8] {
        &self.range_thumb_colors
    }
    pub fn range_thumb_bg_colors(&self) -> &[Rgba8] {
        &self.range_thumb_bg_colors
    }
    pub fn thumb_bg_distort(&self) -> i32 {
        self.thumb_bg_distort
    }
    pub fn thumb_bg_circles_num(&self) -> i32 {
        self.thumb_bg_circles_num
    }
    pub fn thumb_bg_slim_line_num(&self) -> i32 {
        self.thumb_bg_slim_line_num
    }
    pub fn non_deform_thumb(&self) -> bool {
        self.non_deform_thumb
    }
    pub fn thumb_disturb_alpha(&self) -> f32 {
        self.thumb_disturb_alpha
    }
    pub fn use_shape_original_color(&self) -> bool {
        self.use_shape_original_color
    }
}
