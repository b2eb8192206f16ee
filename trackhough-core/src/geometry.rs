//! Coordinate transforms and interpolation helpers.

/// Millimeters per meter; hits are stored in millimeters, the kernel works in meters.
pub const MILLIMETERS_PER_METER: f64 = 1000.0;

/// Converts cartesian coordinates to `(radius, angle)`.
///
/// The angle comes from `atan2` and lies in `(-π, π]`; the origin maps to angle 0.
#[inline]
#[must_use]
pub fn cartesian_to_polar(x: f64, y: f64) -> (f64, f64) {
    (x.hypot(y), y.atan2(x))
}

/// Converts `(radius, angle)` back to cartesian coordinates.
#[inline]
#[must_use]
pub fn polar_to_cartesian(radius: f64, angle: f64) -> (f64, f64) {
    let (sin, cos) = angle.sin_cos();
    (radius * cos, radius * sin)
}

/// Linear interpolation between `begin` and `end`.
#[inline]
#[must_use]
pub fn lerp(begin: f64, end: f64, t: f64) -> f64 {
    begin + (end - begin) * t
}
