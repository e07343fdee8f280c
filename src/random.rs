//! Uniform samplers over inclusive integer ranges, permutations and
//! crop-window offsets.
//!
//! Every sampler takes the generator explicitly so a seeded `StdRng` gives
//! reproducible challenges in tests.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::basics::{Point, RangeVal, Size};

/// Uniform integer in `[min, max]`. Returns `max` when `min > max`.
pub fn rand_int<R: Rng + ?Sized>(rng: &mut R, min: i32, max: i32) -> i32 {
    if min > max {
        return max;
    }
    rng.random_range(min..=max)
}

/// Uniform integer in `[r.min, r.max]`.
#[inline]
pub fn rand_range<R: Rng + ?Sized>(rng: &mut R, r: RangeVal) -> i32 {
    rand_int(rng, r.min, r.max)
}

/// Uniform index into a slice of `len` items, `None` when empty.
pub fn rand_index<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Option<usize> {
    if len == 0 {
        None
    } else {
        Some(rng.random_range(0..len))
    }
}

/// Pick one element of a slice uniformly.
pub fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    rand_index(rng, items.len()).map(|i| &items[i])
}

/// Sample an angle: choose one band uniformly, then a value inside it.
/// No bands yields 0.
pub fn rand_angle<R: Rng + ?Sized>(rng: &mut R, bands: &[RangeVal]) -> i32 {
    match pick(rng, bands) {
        Some(band) => rand_range(rng, *band),
        None => 0,
    }
}

/// Uniform random permutation of `0..n`.
pub fn perm<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<usize> {
    let mut v: Vec<usize> = (0..n).collect();
    v.shuffle(rng);
    v
}

/// Random top-left offset of a `window`-sized crop inside `image`.
/// An axis on which the image is not larger than the window gets 0.
pub fn rand_cut_pos<R: Rng + ?Sized>(rng: &mut R, window: Size, image: Size) -> Point {
    let x = if image.width - window.width > 0 {
        rand_int(rng, 0, image.width - window.width)
    } else {
        0
    };
    let y = if image.height - window.height > 0 {
        rand_int(rng, 0, image.height - window.height)
    } else {
        0
    };
    Point::new(x, y)
}
