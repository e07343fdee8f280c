//! Token layout engine.
//!
//! Places an ordered list of tokens (characters or shape names) across a
//! canvas, one lane per token, and extracts the random verification subset
//! the user is asked to act on.

use std::collections::{BTreeMap, HashSet};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::basics::{clamp_low_wins, AreaRect, RangeVal, Size, EDGE_PADDING};
use crate::color::Rgba8;
use crate::random::{perm, pick, rand_angle, rand_int, rand_range};

// ============================================================================
// Answer records
// ============================================================================

/// What a placement draws.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Payload {
    /// One or two characters (a single char for CJK text).
    Text(String),
    /// Name of a shape image in the resource set.
    Shape(String),
}

impl Payload {
    pub fn as_str(&self) -> &str {
        match self {
            Payload::Text(s) | Payload::Shape(s) => s,
        }
    }

    /// Number of characters the token spans; shapes count as one.
    pub fn char_count(&self) -> usize {
        match self {
            Payload::Text(s) => s.chars().count(),
            Payload::Shape(_) => 1,
        }
    }
}

/// Placement of one token. `(x, y)` is the top-left of its box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dot {
    pub index: usize,
    pub x: i32,
    pub y: i32,
    pub size: i32,
    pub width: i32,
    pub height: i32,
    pub angle: i32,
    /// Color on the master image.
    pub color: Rgba8,
    /// Color on the thumbnail.
    pub color2: Rgba8,
    #[serde(flatten)]
    pub payload: Payload,
}

impl Dot {
    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(s) => Some(s),
            Payload::Shape(_) => None,
        }
    }

    pub fn shape(&self) -> Option<&str> {
        match &self.payload {
            Payload::Shape(s) => Some(s),
            Payload::Text(_) => None,
        }
    }

    pub fn rect(&self) -> AreaRect {
        AreaRect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// Cutout (slide) or disk (rotate) answer.
///
/// `(x, y, width, height)` is the region in the master image; the
/// `display_*` point is where the tile or thumbnail is first shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Block {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub angle: i32,
    pub display_x: i32,
    pub display_y: i32,
}

impl Block {
    pub fn rect(&self) -> AreaRect {
        AreaRect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

// ============================================================================
// Layout
// ============================================================================

/// Inputs of [`gen_dots`].
#[derive(Debug, Clone, Copy)]
pub struct LayoutParams<'a> {
    pub canvas: Size,
    pub size: RangeVal,
    pub angles: &'a [RangeVal],
    /// Extra distance kept from every canvas edge (0 for thumbnails).
    pub padding: i32,
    pub colors: &'a [Rgba8],
    pub colors2: &'a [Rgba8],
}

/// Lay out `payloads` left to right, one equal-width lane each.
///
/// Every returned box satisfies `padding <= x` and
/// `x + width <= canvas.width - padding` (and likewise vertically) whenever
/// the token fits at all; when it does not, the box is pinned to the
/// padding edge.
pub fn gen_dots<R: Rng + ?Sized>(rng: &mut R, params: &LayoutParams<'_>, payloads: &[Payload]) -> Vec<Dot> {
    let n = payloads.len();
    if n == 0 {
        return Vec::new();
    }
    let pad = params.padding;
    let (mut width, mut height) = (params.canvas.width, params.canvas.height);
    if pad > 0 {
        width -= pad;
        height -= pad;
    }
    let lane = width / n as i32;

    let mut dots = Vec::with_capacity(n);
    for (i, payload) in payloads.iter().enumerate() {
        let angle = rand_angle(rng, params.angles);
        let color = pick(rng, params.colors).copied().unwrap_or(Rgba8::BLACK);
        let color2 = pick(rng, params.colors2).copied().unwrap_or(Rgba8::BLACK);
        let size = rand_range(rng, params.size);

        let (mut cw, mut ch) = (size, size);
        let chars = payload.char_count() as i32;
        if chars > 1 {
            cw = size * chars;
            if angle > 0 {
                // A rotated wide box needs more room on both axes.
                let surplus = (cw - size) as f64;
                let grow = ((angle % 90) as f64 * (surplus / 90.0)).max(1.0) as i32;
                ch += grow;
                cw += grow;
            }
        }

        let jitter = (lane - cw).abs().max(1);
        let xx = i as i32 * lane + rand_int(rng, 0, jitter);
        let yy = rand_int(rng, EDGE_PADDING, height + ch);

        let x = xx.max(EDGE_PADDING).min(width - EDGE_PADDING - pad * 2);
        let y = yy.max(ch + EDGE_PADDING).min(height + ch / 2 - pad * 2) - ch;

        dots.push(Dot {
            index: i,
            x: clamp_low_wins(x, pad, params.canvas.width - pad - cw),
            y: clamp_low_wins(y, pad, params.canvas.height - pad - ch),
            size,
            width: cw,
            height: ch,
            angle,
            color,
            color2,
            payload: payload.clone(),
        });
    }
    log::trace!("laid out {} tokens on {}x{}", n, params.canvas.width, params.canvas.height);
    dots
}

/// Random verification subset.
///
/// Takes a permutation of `dots` and keeps its first `k` entries, `k`
/// sampled from `verify` (or every dot when `keep_all`), re-indexed
/// `0..k` in permutation order.
pub fn select_verify_dots<R: Rng + ?Sized>(
    rng: &mut R,
    dots: &[Dot],
    verify: RangeVal,
    keep_all: bool,
) -> BTreeMap<usize, Dot> {
    let order = perm(rng, dots.len());
    let count = rand_range(rng, verify).max(0) as usize;
    let take = if keep_all { dots.len() } else { count };

    order
        .into_iter()
        .take(take)
        .enumerate()
        .map(|(i, src)| {
            let mut dot = dots[src].clone();
            dot.index = i;
            (i, dot)
        })
        .collect()
}

/// `n` distinct tokens drawn from `pool`, or `None` if the pool holds
/// fewer than `n` distinct entries.
pub fn pick_distinct<R: Rng + ?Sized>(rng: &mut R, pool: &[String], n: usize) -> Option<Vec<String>> {
    let mut seen = HashSet::new();
    let unique: Vec<&String> = pool.iter().filter(|s| seen.insert(s.as_str())).collect();
    if unique.len() < n {
        return None;
    }
    Some(perm(rng, unique.len()).into_iter().take(n).map(|i| unique[i].clone()).collect())
}

/// Number of distinct entries in `pool`.
pub fn distinct_count(pool: &[String]) -> usize {
    pool.iter().map(String::as_str).collect::<HashSet<_>>().len()
}
