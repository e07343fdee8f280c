//! Answer verification.
//!
//! Pure geometric predicates over a stored answer and a submitted value;
//! nothing here touches pixels.

use crate::layout::{Block, Dot};

/// True if `(sx, sy)` lies inside the `w` x `h` rectangle at `(dx, dy)`
/// grown by `padding` on every side. Bounds are inclusive.
///
/// The expanded rectangle never starts left of or above `(dx, dy)`; the
/// padding only ever extends it right and down.
pub fn point_in_padded_rect(sx: i64, sy: i64, dx: i64, dy: i64, w: i64, h: i64, padding: i64) -> bool {
    let new_w = w + padding * 2;
    let new_h = h + padding * 2;
    let new_dx = dx.max(dx - padding);
    let new_dy = dy.max(dy - padding);

    sx >= new_dx && sx <= new_dx + new_w && sy >= new_dy && sy <= new_dy + new_h
}

/// True if the submitted offset `(sx, sy)` is within `padding` of the
/// recorded `(dx, dy)` on both axes.
pub fn offset_within_padding(sx: i64, sy: i64, dx: i64, dy: i64, padding: i64) -> bool {
    (sx - dx).abs() <= padding && (sy - dy).abs() <= padding
}

/// True if rotating by `delta` from `angle` lands within `padding` degrees
/// of a full turn, i.e. `angle + delta` in `[360 - padding, 360 + padding]`.
///
/// No other wraparound is applied: a sum near 0 or 720 is rejected.
pub fn angle_within_padding(angle: i64, delta: i64, padding: i64) -> bool {
    let sum = angle + delta;
    (360 - padding..=360 + padding).contains(&sum)
}

/// Click answer check against one stored dot.
pub fn validate_click_point(sx: i64, sy: i64, dot: &Dot, padding: i64) -> bool {
    point_in_padded_rect(
        sx,
        sy,
        dot.x as i64,
        dot.y as i64,
        dot.width as i64,
        dot.height as i64,
        padding,
    )
}

/// Slide answer check: the dragged tile position against the block origin.
pub fn validate_slide(sx: i64, sy: i64, block: &Block, padding: i64) -> bool {
    offset_within_padding(sx, sy, block.x as i64, block.y as i64, padding)
}

/// Rotate answer check: the user's rotation against the recorded angle.
pub fn validate_rotate(delta: i64, block: &Block, padding: i64) -> bool {
    angle_within_padding(block.angle as i64, delta, padding)
}
