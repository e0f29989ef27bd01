//! Sector and half-line predicates on the drawing surface.
//!
//! These are the building blocks of the visibility decisions: they only compare signs of
//! determinants and never compute distances or depths.

use crate::Vector;

/// Determinants below this value mean that two vectors are considered linearly dependent.
pub const DEPENDENCY_EPSILON: f64 = 1e-6;

/// The coordinates `(s, t)` of `w` in the basis `{v1, v2}`, i.e. `w = s * v1 + t * v2`.
///
/// Returns `None` if `v1` and `v2` are linearly dependent.
pub fn coordinates(v1: Vector, v2: Vector, w: Vector) -> Option<(f64, f64)> {
    let det = v1.cross(v2);
    if det.abs() < DEPENDENCY_EPSILON {
        return None;
    }
    Some((w.cross(v2) / det, v1.cross(w) / det))
}

/// Whether `w` lies inside the sector spanned by `v1` and `v2`, i.e. whether it is a
/// non-negative combination of both.
///
/// `tolerance` widens the sector: coordinates down to `-tolerance` are still accepted. With a
/// tolerance of zero the test is exact. If `v1` and `v2` are dependent, the sector is
/// considered to cover `w` when they point in opposite directions.
pub fn lies_in_sector(v1: Vector, v2: Vector, w: Vector, tolerance: f64) -> bool {
    match coordinates(v1, v2, w) {
        Some((s, t)) => s >= -tolerance && t >= -tolerance,
        None => v1.dot(v2) < 0.0,
    }
}
