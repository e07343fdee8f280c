//! Foundation value types, constants, and rounding helpers.
//!
//! Everything above this module (canvases, layout, challenge generators)
//! speaks in these integer pixel types.

use serde::{Deserialize, Serialize};

/// Padding kept between any placed token and the canvas edge on the master
/// image, so rotated glyphs are never clipped.
pub const EDGE_PADDING: i32 = 10;

// ============================================================================
// Rounding and conversion functions
// ============================================================================

/// Round a double to the nearest integer (round half away from zero).
#[inline]
pub fn iround(v: f64) -> i32 {
    if v < 0.0 {
        (v - 0.5) as i32
    } else {
        (v + 0.5) as i32
    }
}

/// Round a double to the nearest unsigned integer (round half up).
#[inline]
pub fn uround(v: f64) -> u32 {
    (v + 0.5) as u32
}

/// Floor a double to the nearest integer toward negative infinity.
#[inline]
pub fn ifloor(v: f64) -> i32 {
    let i = v as i32;
    i - (i as f64 > v) as i32
}

/// Convert degrees to radians.
#[inline]
pub fn deg2rad(deg: f64) -> f64 {
    deg * std::f64::consts::PI / 180.0
}

// ============================================================================
// Value types
// ============================================================================

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// True when both dimensions are strictly positive.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Integer pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Inclusive sampling bound. A range with `min > max` samples as `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RangeVal {
    pub min: i32,
    pub max: i32,
}

impl RangeVal {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Both bounds non-negative.
    pub fn is_non_negative(&self) -> bool {
        self.min >= 0 && self.max >= 0
    }

    /// The value a degenerate range collapses to, or the largest reachable value.
    pub fn upper(&self) -> i32 {
        self.max
    }

    /// Smallest reachable value (`max` when the range is degenerate).
    pub fn lower(&self) -> i32 {
        if self.min > self.max {
            self.max
        } else {
            self.min
        }
    }
}

/// Half-open pixel rectangle `[min_x, max_x) x [min_y, max_y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AreaRect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl AreaRect {
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Test if a point is inside the rectangle.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    /// Intersect with another rectangle.
    pub fn clip(&self, r: &AreaRect) -> AreaRect {
        AreaRect {
            min_x: self.min_x.max(r.min_x),
            min_y: self.min_y.max(r.min_y),
            max_x: self.max_x.min(r.max_x),
            max_y: self.max_y.min(r.max_y),
        }
    }
}

/// Clamp `v` into `[lo, hi]`, the lower bound winning when `lo > hi`.
#[inline]
pub fn clamp_low_wins(v: i32, lo: i32, hi: i32) -> i32 {
    v.min(hi).max(lo)
}

// ============================================================================
// Tests
// ============================================================================
