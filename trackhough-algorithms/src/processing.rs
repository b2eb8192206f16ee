//! High-level helper that turns hits into track candidates.

use crate::converter::{ParameterConverter, ZeroCurvaturePolicy};
use crate::refinement::{RefinementController, RefinementOutcome};
use trackhough_core::{Point, PolarPoint, Result, TrackCandidate, TrackFinderConfig};

/// Coarse-to-fine track finder with parameter conversion.
#[derive(Debug, Clone)]
pub struct TrackFinder {
    controller: RefinementController,
    converter: ParameterConverter,
    normalize: bool,
}

impl TrackFinder {
    /// Creates a finder; zero-curvature candidates are an error by default.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` if `config` does not validate.
    pub fn new(config: TrackFinderConfig) -> Result<Self> {
        let converter = ParameterConverter::new(config.magnetic_field);
        Ok(Self {
            controller: RefinementController::new(config)?,
            converter,
            normalize: false,
        })
    }

    /// Sets how candidates on the q/pt = 0 bin are reported.
    #[must_use]
    pub fn with_zero_curvature_policy(mut self, policy: ZeroCurvaturePolicy) -> Self {
        self.converter = self.converter.with_policy(policy);
        self
    }

    /// Reports tracks with a positive radius and the center angle in `(-π, π]`.
    #[must_use]
    pub fn with_normalization(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Returns the refinement controller.
    #[must_use]
    pub fn controller(&self) -> &RefinementController {
        &self.controller
    }

    /// Runs the refinement and returns the raw cells of both levels.
    ///
    /// # Errors
    /// See [`RefinementController::run`].
    pub fn refine(&self, points: &[Point]) -> Result<RefinementOutcome> {
        self.controller.run(&PolarPoint::from_points(points))
    }

    /// Finds track candidates in discovery order.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` for grid or pool failures and
    /// `Error::DivisionByZero` under [`ZeroCurvaturePolicy::Fail`].
    pub fn find(&self, points: &[Point]) -> Result<Vec<TrackCandidate>> {
        let outcome = self.refine(points)?;
        let tracks = outcome.tracks(&self.converter)?;
        if self.normalize {
            Ok(tracks.iter().map(TrackCandidate::normalized).collect())
        } else {
            Ok(tracks)
        }
    }
}

/// Finds track candidates with the default zero-curvature policy.
///
/// # Errors
/// See [`TrackFinder::find`].
pub fn find_tracks(points: &[Point], config: &TrackFinderConfig) -> Result<Vec<TrackCandidate>> {
    TrackFinder::new(config.clone())?.find(points)
}
