//! Color types and operations.
//!
//! - `Rgba8`: straight-alpha (non-premultiplied) 8-bit RGBA, the pixel type
//!   of every canvas in the crate
//! - `Palette`: the small indexed color table behind `PaletteCanvas`
//!
//! Colors enter the crate as `#rgb` or `#rrggbb` hex strings.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::basics::uround;
use crate::error::ConfigError;

/// Largest color list accepted by any option.
pub const MAX_COLOR_TABLE: usize = 255;

// ============================================================================
// Rgba8
// ============================================================================

/// 8-bit straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BASE_SHIFT: u32 = 8;
    pub const BASE_MASK: u32 = (1 << Self::BASE_SHIFT) - 1;
    pub const BASE_MSB: u32 = 1 << (Self::BASE_SHIFT - 1);

    /// Fully transparent white, the zero index of every palette.
    pub const TRANSPARENT: Rgba8 = Rgba8::new(0xFF, 0xFF, 0xFF, 0);
    pub const WHITE: Rgba8 = Rgba8::new(0xFF, 0xFF, 0xFF, 0xFF);
    pub const BLACK: Rgba8 = Rgba8::new(0, 0, 0, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn new_opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 0xFF)
    }

    pub fn with_opacity(c: &Rgba8, a: u8) -> Self {
        Self { a, ..*c }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    pub fn is_opaque(&self) -> bool {
        self.a == Self::BASE_MASK as u8
    }

    /// Fixed-point multiply, exact over u8.
    /// `(a * b + 128) >> 8`, with rounding correction.
    #[inline]
    pub fn multiply(a: u8, b: u8) -> u8 {
        let t: u32 = a as u32 * b as u32 + Self::BASE_MSB;
        (((t >> Self::BASE_SHIFT) + t) >> Self::BASE_SHIFT) as u8
    }

    /// Same color with alpha scaled by a coverage value.
    #[inline]
    pub fn mult_cover(&self, cover: u8) -> Rgba8 {
        Rgba8 {
            a: Self::multiply(self.a, cover),
            ..*self
        }
    }

    /// Source-over composite of `src` on top of `self`, straight alpha.
    #[inline]
    pub fn blend_over(&self, src: Rgba8) -> Rgba8 {
        if src.a == 0 {
            return *self;
        }
        if src.a == 255 || self.a == 0 {
            return src;
        }
        let sa = src.a as u32;
        let da = Self::multiply(self.a, (255 - src.a) as u8) as u32;
        let oa = sa + da;
        let mix = |s: u8, d: u8| ((s as u32 * sa + d as u32 * da + oa / 2) / oa) as u8;
        Rgba8 {
            r: mix(src.r, self.r),
            g: mix(src.g, self.g),
            b: mix(src.b, self.b),
            a: oa.min(255) as u8,
        }
    }

    /// Parse `#rgb` or `#rrggbb`. The result is opaque.
    pub fn parse_hex(s: &str) -> Result<Rgba8, ConfigError> {
        let invalid = || ConfigError::InvalidHexColor(s.to_string());
        let digits = s.strip_prefix('#').ok_or_else(invalid)?;
        let nibble = |b: u8| -> Result<u8, ConfigError> {
            match b {
                b'0'..=b'9' => Ok(b - b'0'),
                b'a'..=b'f' => Ok(b - b'a' + 10),
                b'A'..=b'F' => Ok(b - b'A' + 10),
                _ => Err(invalid()),
            }
        };
        let d = digits.as_bytes();
        match d.len() {
            6 => Ok(Rgba8::new_opaque(
                (nibble(d[0])? << 4) | nibble(d[1])?,
                (nibble(d[2])? << 4) | nibble(d[3])?,
                (nibble(d[4])? << 4) | nibble(d[5])?,
            )),
            3 => Ok(Rgba8::new_opaque(
                nibble(d[0])? * 17,
                nibble(d[1])? * 17,
                nibble(d[2])? * 17,
            )),
            _ => Err(invalid()),
        }
    }

    /// `#rrggbb`, alpha dropped.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    #[inline]
    fn distance_sq(&self, o: &Rgba8) -> u32 {
        let d = |a: u8, b: u8| {
            let v = a as i32 - b as i32;
            (v * v) as u32
        };
        d(self.r, o.r) + d(self.g, o.g) + d(self.b, o.b) + d(self.a, o.a)
    }
}

// Colors travel as `#rrggbb` strings in answer records and option files.
impl Serialize for Rgba8 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgba8 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgba8::parse_hex(&s).map_err(de::Error::custom)
    }
}

/// Map an opacity in `0..=1` to an 8-bit alpha, saturating above 1.
pub fn format_alpha(val: f32) -> u8 {
    let a = (val as f64).clamp(0.0, 1.0);
    uround(a * 255.0).min(255) as u8
}

/// Parse a whole color list, enforcing the table size limit.
pub fn parse_hex_list<S: AsRef<str>>(table: &'static str, list: &[S]) -> Result<Vec<Rgba8>, ConfigError> {
    check_table_len(table, list.len())?;
    list.iter().map(|s| Rgba8::parse_hex(s.as_ref())).collect()
}

/// Reject color tables over [`MAX_COLOR_TABLE`] entries.
pub fn check_table_len(table: &'static str, len: usize) -> Result<(), ConfigError> {
    if len > MAX_COLOR_TABLE {
        return Err(ConfigError::ColorTableTooLarge { table, len });
    }
    Ok(())
}

// ============================================================================
// Palette
// ============================================================================

/// Indexed color table. Index 0 is always transparent white.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgba8>,
}

impl Palette {
    /// Build a table from `colors`, prepending the transparent entry.
    pub fn new(colors: &[Rgba8]) -> Result<Self, ConfigError> {
        if colors.len() + 1 > 256 {
            return Err(ConfigError::ColorTableTooLarge {
                table: "palette",
                len: colors.len() + 1,
            });
        }
        let mut v = Vec::with_capacity(colors.len() + 1);
        v.push(Rgba8::TRANSPARENT);
        v.extend_from_slice(colors);
        Ok(Self { colors: v })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color at `index`, transparent when out of range.
    #[inline]
    pub fn color(&self, index: u8) -> Rgba8 {
        self.colors
            .get(index as usize)
            .copied()
            .unwrap_or(Rgba8::TRANSPARENT)
    }

    pub fn colors(&self) -> &[Rgba8] {
        &self.colors
    }

    /// Index of the closest entry (squared RGBA distance, first wins on ties).
    pub fn nearest(&self, c: Rgba8) -> u8 {
        let mut best = 0usize;
        let mut best_d = u32::MAX;
        for (i, p) in self.colors.iter().enumerate() {
            let d = p.distance_sq(&c);
            if d == 0 {
                return i as u8;
            }
            if d < best_d {
                best_d = d;
                best = i;
            }
        }
        best as u8
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_long() {
        let c = Rgba8::parse_hex("#fde98e").unwrap();
        assert_eq!(c, Rgba8::new(0xfd, 0xe9, 0x8e, 0xff));
        let c = Rgba8::parse_hex("#1F55C4").unwrap();
        assert_eq!(c, Rgba8::new(0x1f, 0x55, 0xc4, 0xff));
    }

    #[test]
    fn test_parse_hex_short() {
        let c = Rgba8::parse_hex("#f0a").unwrap();
        assert_eq!(c, Rgba8::new(0xff, 0x00, 0xaa, 0xff));
    }

    #[test]
    fn test_parse_hex_invalid() {
        assert!(Rgba8::parse_hex("fde98e").is_err());
        assert!(Rgba8::parse_hex("#fde98").is_err());
        assert!(Rgba8::parse_hex("#gggggg").is_err());
        assert!(Rgba8::parse_hex("").is_err());
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(Rgba8::new(1, 0x55, 0xc4, 3).to_hex(), "#0155c4");
    }

    #[test]
    fn test_multiply() {
        assert_eq!(Rgba8::multiply(255, 255), 255);
        assert_eq!(Rgba8::multiply(255, 0), 0);
        assert_eq!(Rgba8::multiply(128, 255), 128);
    }

    #[test]
    fn test_blend_over() {
        let dst = Rgba8::new(0, 0, 255, 255);
        assert_eq!(dst.blend_over(Rgba8::new(255, 0, 0, 255)), Rgba8::new(255, 0, 0, 255));
        assert_eq!(dst.blend_over(Rgba8::new(255, 0, 0, 0)), dst);

        let half = dst.blend_over(Rgba8::new(255, 0, 0, 128));
        assert_eq!(half.a, 255);
        assert!((half.r as i32 - 128).abs() <= 1);
        assert!((half.b as i32 - 127).abs() <= 1);

        let onto_clear = Rgba8::TRANSPARENT.blend_over(Rgba8::new(10, 20, 30, 77));
        assert_eq!(onto_clear, Rgba8::new(10, 20, 30, 77));
    }

    #[test]
    fn test_serde_hex() {
        let c = Rgba8::new_opaque(0x78, 0xd6, 0xf8);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"#78d6f8\"");
        assert_eq!(serde_json::from_str::<Rgba8>(&json).unwrap(), c);
        assert!(serde_json::from_str::<Rgba8>("\"blue\"").is_err());
    }

    #[test]
    fn test_format_alpha() {
        assert_eq!(format_alpha(1.0), 255);
        assert_eq!(format_alpha(3.0), 255);
        assert_eq!(format_alpha(0.0), 0);
        assert_eq!(format_alpha(0.5), 128);
    }

    #[test]
    fn test_parse_hex_list_limit() {
        let list: Vec<String> = (0..256).map(|_| "#fff".to_string()).collect();
        assert!(matches!(
            parse_hex_list("colors", &list),
            Err(ConfigError::ColorTableTooLarge { len: 256, .. })
        ));
        assert_eq!(parse_hex_list("colors", &list[..255]).unwrap().len(), 255);
    }

    #[test]
    fn test_palette() {
        let p = Palette::new(&[Rgba8::new_opaque(255, 0, 0), Rgba8::new_opaque(0, 0, 255)]).unwrap();
        assert_eq!(p.len(), 3);
        assert_eq!(p.color(0), Rgba8::TRANSPARENT);
        assert_eq!(p.color(9), Rgba8::TRANSPARENT);
        assert_eq!(p.nearest(Rgba8::new_opaque(250, 10, 10)), 1);
        assert_eq!(p.nearest(Rgba8::new_opaque(0, 0, 200)), 2);
        assert_eq!(p.nearest(Rgba8::new(255, 255, 255, 3)), 0);

        let too_many = vec![Rgba8::BLACK; 256];
        assert!(Palette::new(&too_many).is_err());
    }
}
