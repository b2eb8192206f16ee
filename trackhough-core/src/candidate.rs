//! Peak cells and reconstructed track candidates.

use crate::geometry::{cartesian_to_polar, polar_to_cartesian};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Grid cell whose vote count exceeded the active threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CandidateCell {
    /// phi bin.
    pub row: usize,
    /// q/pt bin.
    pub col: usize,
}

impl CandidateCell {
    /// Creates a candidate cell.
    #[inline]
    #[must_use]
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Reconstructed circular track in the transverse plane.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackCandidate {
    /// Radius of curvature (mm). Infinite for straight tracks reported as unbounded.
    pub r: f64,
    /// Azimuthal angle of the circle center (rad).
    pub phi: f64,
}

impl TrackCandidate {
    /// Creates a track candidate.
    #[inline]
    #[must_use]
    pub fn new(r: f64, phi: f64) -> Self {
        Self { r, phi }
    }

    /// Returns true if the radius is finite.
    #[inline]
    #[must_use]
    pub fn is_bounded(&self) -> bool {
        self.r.is_finite()
    }

    /// Folds a negative radius (opposite charge) into a positive radius with
    /// the center angle turned by π, wrapped to `(-π, π]`.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let (x, y) = polar_to_cartesian(self.r, self.phi);
        if !(x.is_finite() && y.is_finite()) {
            return *self;
        }
        let (r, phi) = cartesian_to_polar(x, y);
        Self { r, phi }
    }
}
