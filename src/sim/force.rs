//! Softened inverse-square gravity
//!
//! The single force law shared by every attractor interaction.

use glam::Vec2;

use crate::consts::DISTANCE_EPSILON;

/// Acceleration felt at `target` from a point mass at `source`.
///
/// Magnitude is `g * mass / (d² + softening)`, directed from the target toward
/// the source. Separations at or below [`DISTANCE_EPSILON`] yield zero instead
/// of normalizing a near-zero vector.
#[inline]
pub fn gravitational_acceleration(
    source: Vec2,
    source_mass: f32,
    softening: f32,
    target: Vec2,
    g: f32,
) -> Vec2 {
    let delta = source - target;
    let dist_sq = delta.length_squared();
    let dist = dist_sq.sqrt();
    if dist <= DISTANCE_EPSILON {
        return Vec2::ZERO;
    }

    let magnitude = g * source_mass / (dist_sq + softening);
    delta * (magnitude / dist)
}

/// Distance from `pos` to `center`, floored so it is safe to divide by
#[inline]
pub fn safe_distance(pos: Vec2, center: Vec2) -> f32 {
    pos.distance(center).max(DISTANCE_EPSILON)
}
