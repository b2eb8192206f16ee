//! Detector hit types.

use crate::geometry::{cartesian_to_polar, MILLIMETERS_PER_METER};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single detector hit in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    /// X coordinate (mm).
    pub x: f64,
    /// Y coordinate (mm).
    pub y: f64,
    /// Z coordinate (mm). Unused by the transverse-plane kernels.
    pub z: f64,
    /// Detector layer index; only read by layered accumulators.
    #[cfg_attr(feature = "serde", serde(default))]
    pub layer: u8,
}

impl Point {
    /// Creates a hit on layer 0.
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z, layer: 0 }
    }

    /// Sets the detector layer.
    #[inline]
    #[must_use]
    pub fn with_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }

    /// Returns true if all coordinates are finite.
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Returns the transverse-plane polar form used by the voting kernels.
    #[inline]
    #[must_use]
    pub fn to_polar(&self) -> PolarPoint {
        PolarPoint::from(*self)
    }
}

/// Transverse polar form of a hit, precomputed once per run.
///
/// `r` is in meters so that `r * q_over_pt` is an angle in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolarPoint {
    /// Transverse radius (m).
    pub r: f64,
    /// Azimuthal angle (rad).
    pub phi: f64,
    /// Detector layer index.
    pub layer: u8,
}

impl PolarPoint {
    /// Creates a polar point directly.
    #[inline]
    #[must_use]
    pub fn new(r: f64, phi: f64, layer: u8) -> Self {
        Self { r, phi, layer }
    }

    /// Evaluates the point's parameter-space line `phi(q) = -r * q + phi_point`.
    #[inline]
    #[must_use]
    pub fn phi_at(&self, q_over_pt: f64) -> f64 {
        -self.r * q_over_pt + self.phi
    }

    /// Converts a slice of hits.
    #[must_use]
    pub fn from_points(points: &[Point]) -> Vec<Self> {
        points.iter().map(Point::to_polar).collect()
    }
}

impl From<Point> for PolarPoint {
    fn from(point: Point) -> Self {
        let (r, phi) = cartesian_to_polar(point.x, point.y);
        Self {
            r: r / MILLIMETERS_PER_METER,
            phi,
            layer: point.layer,
        }
    }
}
