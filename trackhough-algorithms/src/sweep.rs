//! Radius sweep: circle-center Hough transform over a list of radius hypotheses.
//!
//! For a fixed radius `r` every hit votes for all centers at distance `r`
//! from it, i.e. a circle in center space. The cell where most of those
//! circles cross is the best center for that radius.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use crate::partition::{partition_shuffled, worker_pool};
use crate::peaks::find_maximum;
use log::{debug, info};
use rayon::prelude::*;
use std::f64::consts::TAU;
use trackhough_core::{
    AccumulatorConfig, AccumulatorGrid, Axis, Error, Point, Result, MAX_GRID_CELLS,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Circle samples per millimeter of circumference.
const SAMPLES_PER_MM: f64 = 4.0;

/// Default shuffle seed for distributing hypotheses over workers.
const DEFAULT_SEED: u64 = 0x5eed;

/// Best center found for one radius hypothesis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocalMaximum {
    /// Radius hypothesis (mm).
    pub radius: f64,
    /// Center x (mm).
    pub center_x: f64,
    /// Center y (mm).
    pub center_y: f64,
    /// Number of circles crossing the center cell.
    pub votes: u32,
}

/// Outcome of one hypothesis.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    /// Radius hypothesis (mm).
    pub radius: f64,
    /// Best center, or the reason the hypothesis was rejected.
    pub outcome: Result<LocalMaximum>,
}

/// Parallel sweep over radius hypotheses.
#[derive(Debug, Clone, PartialEq)]
pub struct RadiusSweep {
    detector_radius: f64,
    workers: Option<usize>,
    seed: u64,
}

impl RadiusSweep {
    /// Creates a sweep for hits inside `detector_radius` (mm).
    #[must_use]
    pub fn new(detector_radius: f64) -> Self {
        Self {
            detector_radius,
            workers: None,
            seed: DEFAULT_SEED,
        }
    }

    /// Sets the worker count (clamped to at least 1).
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers.max(1));
        self
    }

    /// Sets the seed used to shuffle hypotheses across workers.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn effective_workers(&self) -> usize {
        self.workers
            .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, usize::from))
    }

    /// Center-space grid for `radius`: a square of side `2 * (R + r)` with 1 mm cells.
    ///
    /// The grid holds at most [`MAX_GRID_CELLS`] cells, so `R + r` is limited
    /// to roughly 8 m.
    ///
    /// # Errors
    /// Returns `Error::InvalidHypothesis` for a non-finite or non-positive radius,
    /// or one whose grid would exceed [`MAX_GRID_CELLS`].
    pub fn center_grid(&self, radius: f64) -> Result<AccumulatorGrid> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidHypothesis(format!(
                "radius must be finite and positive, got {radius}"
            )));
        }
        if !self.detector_radius.is_finite() || self.detector_radius <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "detector radius must be positive, got {}",
                self.detector_radius
            )));
        }
        let side = (2.0 * (self.detector_radius + radius)).ceil();
        if !side.is_finite() || (side + 1.0).powi(2) > MAX_GRID_CELLS as f64 {
            return Err(Error::InvalidHypothesis(format!(
                "radius {radius} needs a center grid above {MAX_GRID_CELLS} cells"
            )));
        }
        let half = side * 0.5;
        let dpi = side as usize + 1;
        AccumulatorGrid::new(AccumulatorConfig::new(-half, half, dpi, -half, half, dpi))
    }

    /// Finds the best center for one radius.
    ///
    /// # Errors
    /// Returns `Error::InvalidHypothesis` for a non-finite or non-positive radius.
    pub fn best_center(&self, points: &[Point], radius: f64) -> Result<LocalMaximum> {
        let mut grid = self.center_grid(radius)?;
        let mut visited = Vec::new();
        for point in points {
            circle_cells(&grid, point, radius, &mut visited);
            for &(row, col) in &visited {
                grid.increment(row, col);
            }
        }
        let (cell, votes) = find_maximum(&grid).ok_or_else(|| {
            Error::InvalidHypothesis(format!("empty center grid for radius {radius}"))
        })?;
        Ok(LocalMaximum {
            radius,
            center_x: grid.bin_to_value(Axis::X, cell.col),
            center_y: grid.bin_to_value(Axis::Y, cell.row),
            votes,
        })
    }

    /// Evaluates every hypothesis; results are sorted by radius.
    ///
    /// Each worker handles a seeded random slice of the hypotheses with its own grid.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` if the worker pool cannot be built. Invalid
    /// hypotheses are reported in their own [`SweepResult`].
    pub fn run(&self, points: &[Point], radii: &[f64]) -> Result<Vec<SweepResult>> {
        let workers = self.effective_workers();
        let slices = partition_shuffled(radii.len(), workers, self.seed);
        debug!(
            "radius sweep: {} hypotheses over {} workers",
            radii.len(),
            slices.len()
        );
        let pool = worker_pool(workers)?;
        let mut results: Vec<SweepResult> = pool.install(|| {
            slices
                .par_iter()
                .flat_map_iter(|slice| {
                    slice.iter().map(|&i| SweepResult {
                        radius: radii[i],
                        outcome: self.best_center(points, radii[i]),
                    })
                })
                .collect()
        });
        results.sort_by(|a, b| a.radius.total_cmp(&b.radius));

        let rejected = results.iter().filter(|r| r.outcome.is_err()).count();
        info!(
            "radius sweep finished: {} hypotheses, {} rejected",
            results.len(),
            rejected
        );
        Ok(results)
    }
}

/// Cells visited while walking the circle of `radius` around `point`.
///
/// A cell is listed once per visit; the walk's end is joined to its start.
fn circle_cells(
    grid: &AccumulatorGrid,
    point: &Point,
    radius: f64,
    visited: &mut Vec<(usize, usize)>,
) {
    visited.clear();
    let samples = (TAU * radius * SAMPLES_PER_MM).ceil().max(8.0) as usize;
    let rows = grid.rows() as isize;
    let cols = grid.cols() as isize;
    for k in 0..samples {
        let (sin, cos) = (TAU * k as f64 / samples as f64).sin_cos();
        let col = grid.value_to_bin(Axis::X, point.x + radius * cos);
        let row = grid.value_to_bin(Axis::Y, point.y + radius * sin);
        if !(0..rows).contains(&row) || !(0..cols).contains(&col) {
            continue;
        }
        let cell = (row as usize, col as usize);
        if visited.last() != Some(&cell) {
            visited.push(cell);
        }
    }
    if visited.len() > 1 && visited.first() == visited.last() {
        visited.pop();
    }
}
