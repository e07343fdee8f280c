//! Option checks and constants shared by the three challenge variants.

use rand::Rng;

use crate::basics::{RangeVal, Size};
use crate::error::ConfigError;
use crate::random::rand_int;

pub const DISTORT_NONE: i32 = 0;
pub const DISTORT_LEVEL1: i32 = 1;
pub const DISTORT_LEVEL2: i32 = 2;
pub const DISTORT_LEVEL3: i32 = 3;
pub const DISTORT_LEVEL4: i32 = 4;
pub const DISTORT_LEVEL5: i32 = 5;

/// Wave period range of a distort level; `None` for no distortion.
pub fn distort_period_range(level: i32) -> Option<RangeVal> {
    match level {
        DISTORT_LEVEL1 => Some(RangeVal::new(240, 320)),
        DISTORT_LEVEL2 => Some(RangeVal::new(180, 240)),
        DISTORT_LEVEL3 => Some(RangeVal::new(120, 180)),
        DISTORT_LEVEL4 => Some(RangeVal::new(100, 160)),
        DISTORT_LEVEL5 => Some(RangeVal::new(80, 140)),
        _ => None,
    }
}

/// Sample a wave period for `level`, 0 meaning no distortion.
pub fn rand_distort_period<R: Rng + ?Sized>(rng: &mut R, level: i32) -> i32 {
    distort_period_range(level).map_or(0, |r| rand_int(rng, r.min, r.max))
}

pub(crate) fn check_distort_level(level: i32) -> Result<i32, ConfigError> {
    if (DISTORT_NONE..=DISTORT_LEVEL5).contains(&level) {
        Ok(level)
    } else {
        Err(ConfigError::InvalidDistortLevel(level))
    }
}

/// Non-negative bounds with `min <= max`.
pub(crate) fn check_range(name: &'static str, r: RangeVal) -> Result<RangeVal, ConfigError> {
    if r.is_non_negative() && r.min <= r.max {
        Ok(r)
    } else {
        Err(ConfigError::InvalidRange {
            name,
            min: r.min,
            max: r.max,
        })
    }
}

/// Like [`check_range`], for angle bands (which may not exceed a full turn).
pub(crate) fn check_angles(name: &'static str, bands: &[RangeVal]) -> Result<(), ConfigError> {
    for &b in bands {
        check_range(name, b)?;
        if b.max > 360 {
            return Err(ConfigError::InvalidRange {
                name,
                min: b.min,
                max: b.max,
            });
        }
    }
    Ok(())
}

pub(crate) fn check_size(name: &'static str, s: Size) -> Result<Size, ConfigError> {
    if s.is_valid() {
        Ok(s)
    } else {
        Err(ConfigError::InvalidSize {
            name,
            width: s.width,
            height: s.height,
        })
    }
}

pub(crate) fn check_alpha(alpha: f32) -> Result<f32, ConfigError> {
    if (0.0..=1.0).contains(&alpha) {
        Ok(alpha)
    } else {
        Err(ConfigError::InvalidAlpha(alpha))
    }
}

pub(crate) fn check_count(name: &'static str, n: i32) -> Result<i32, ConfigError> {
    if n >= 0 {
        Ok(n)
    } else {
        Err(ConfigError::InvalidRange { name, min: n, max: n })
    }
}
