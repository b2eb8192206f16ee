//! Bin indices back to physical track parameters.

use log::warn;
use std::f64::consts::FRAC_PI_2;
use trackhough_core::{
    AccumulatorConfig, Axis, CandidateCell, Error, Result, TrackCandidate, MILLIMETERS_PER_METER,
};

/// What to do with a candidate on the q/pt = 0 bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroCurvaturePolicy {
    /// Propagate `Error::DivisionByZero`.
    #[default]
    Fail,
    /// Drop the candidate.
    Skip,
    /// Keep it with an infinite radius.
    Unbounded,
}

/// Converts a candidate cell of the grid described by `config` into `(r, phi)`.
///
/// `r = (1 / q_over_pt) / B * 1000` (mm), `phi = phi0 + π/2`.
///
/// # Errors
/// Returns `Error::DivisionByZero` if the cell's q/pt value is exactly 0.
pub fn to_track(
    candidate: CandidateCell,
    config: &AccumulatorConfig,
    magnetic_field: f64,
) -> Result<TrackCandidate> {
    let q_over_pt = config.bin_to_value(Axis::X, candidate.col);
    let phi0 = config.bin_to_value(Axis::Y, candidate.row);
    if q_over_pt == 0.0 {
        return Err(Error::DivisionByZero {
            row: candidate.row,
            col: candidate.col,
        });
    }
    let r = (1.0 / q_over_pt) / magnetic_field * MILLIMETERS_PER_METER;
    Ok(TrackCandidate::new(r, phi0 + FRAC_PI_2))
}

/// Field-aware converter applying a zero-curvature policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterConverter {
    magnetic_field: f64,
    policy: ZeroCurvaturePolicy,
}

impl ParameterConverter {
    /// Creates a converter that fails on zero-curvature candidates.
    #[must_use]
    pub fn new(magnetic_field: f64) -> Self {
        Self {
            magnetic_field,
            policy: ZeroCurvaturePolicy::Fail,
        }
    }

    /// Sets the zero-curvature policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ZeroCurvaturePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Magnetic field (T).
    #[must_use]
    pub fn magnetic_field(&self) -> f64 {
        self.magnetic_field
    }

    /// Converts one candidate; `Ok(None)` when the policy skips it.
    ///
    /// # Errors
    /// Returns `Error::DivisionByZero` under [`ZeroCurvaturePolicy::Fail`].
    pub fn convert(
        &self,
        candidate: CandidateCell,
        config: &AccumulatorConfig,
    ) -> Result<Option<TrackCandidate>> {
        match to_track(candidate, config, self.magnetic_field) {
            Ok(track) => Ok(Some(track)),
            Err(Error::DivisionByZero { row, col }) => match self.policy {
                ZeroCurvaturePolicy::Fail => Err(Error::DivisionByZero { row, col }),
                ZeroCurvaturePolicy::Skip => {
                    warn!("skipping zero-curvature candidate at row {row}, col {col}");
                    Ok(None)
                }
                ZeroCurvaturePolicy::Unbounded => {
                    let phi0 = config.bin_to_value(Axis::Y, row);
                    Ok(Some(TrackCandidate::new(f64::INFINITY, phi0 + FRAC_PI_2)))
                }
            },
            Err(err) => Err(err),
        }
    }

    /// Converts candidates in order, each paired with the config of its grid.
    ///
    /// # Errors
    /// Returns the first `Error::DivisionByZero` under [`ZeroCurvaturePolicy::Fail`].
    pub fn convert_all<'a, I>(&self, candidates: I) -> Result<Vec<TrackCandidate>>
    where
        I: IntoIterator<Item = (CandidateCell, &'a AccumulatorConfig)>,
    {
        let mut tracks = Vec::new();
        for (candidate, config) in candidates {
            if let Some(track) = self.convert(candidate, config)? {
                tracks.push(track);
            }
        }
        Ok(tracks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config() -> AccumulatorConfig {
        AccumulatorConfig::new(-0.2, 0.2, 5, -1.0, 1.0, 3)
    }

    #[test]
    fn test_to_track_formula() {
        // col 4 -> q/pt = 0.2, row 2 -> phi0 = 1.0
        let track = to_track(CandidateCell::new(2, 4), &config(), 2.0).unwrap();
        assert_relative_eq!(track.r, 2500.0, max_relative = 1e-12);
        assert_relative_eq!(track.phi, 1.0 + FRAC_PI_2);

        let track = to_track(CandidateCell::new(0, 0), &config(), 2.0).unwrap();
        assert_relative_eq!(track.r, -2500.0, max_relative = 1e-12);
        assert_relative_eq!(track.phi, -1.0 + FRAC_PI_2);
    }

    #[test]
    fn test_zero_curvature_is_an_error() {
        let err = to_track(CandidateCell::new(1, 2), &config(), 2.0).unwrap_err();
        assert_eq!(err, Error::DivisionByZero { row: 1, col: 2 });
    }

    #[test]
    fn test_policies() {
        let cfg = config();
        let cells = [CandidateCell::new(1, 2), CandidateCell::new(1, 3)];

        let fail = ParameterConverter::new(2.0);
        assert!(fail.convert_all(cells.iter().map(|&c| (c, &cfg))).is_err());

        let skip = ParameterConverter::new(2.0).with_policy(ZeroCurvaturePolicy::Skip);
        let tracks = skip.convert_all(cells.iter().map(|&c| (c, &cfg))).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_relative_eq!(tracks[0].r, 5000.0, max_relative = 1e-12);

        let unbounded = ParameterConverter::new(2.0).with_policy(ZeroCurvaturePolicy::Unbounded);
        let tracks = unbounded
            .convert_all(cells.iter().map(|&c| (c, &cfg)))
            .unwrap();
        assert_eq!(tracks.len(), 2);
        assert!(!tracks[0].is_bounded());
        assert_relative_eq!(tracks[0].phi, FRAC_PI_2);
    }
}
