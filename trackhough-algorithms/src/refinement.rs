//! Two-level coarse-to-fine refinement.
//!
//! The coarse grid spans the whole configured parameter space. Every coarse
//! peak is re-examined in its own fine grid whose window is exactly the
//! coarse cell, voted with the complete point set. Fine grids of different
//! coarse cells share nothing and are processed on the worker pool.

use crate::converter::ParameterConverter;
use crate::partition::{partitioned_vote_on, worker_pool};
use crate::peaks::extract_peaks;
use crate::voting::vote;
use log::{debug, info};
use rayon::prelude::*;
use trackhough_core::{
    AccumulatorConfig, AccumulatorGrid, Axis, CandidateCell, PolarPoint, Result, TrackCandidate,
    TrackFinderConfig,
};

/// A fine-level peak together with the grid it was found in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FineCandidate {
    /// Coarse cell that spawned the fine grid.
    pub parent: CandidateCell,
    /// Peak cell inside the fine grid.
    pub cell: CandidateCell,
    /// Configuration of the fine grid.
    pub config: AccumulatorConfig,
}

/// Candidates of both levels, in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefinementOutcome {
    /// Coarse peaks, row-major.
    pub coarse: Vec<CandidateCell>,
    /// Fine peaks grouped by coarse cell in coarse order, row-major within a group.
    pub fine: Vec<FineCandidate>,
}

impl RefinementOutcome {
    /// Converts the fine candidates into tracks, skipping those the converter drops.
    ///
    /// # Errors
    /// Propagates the converter's zero-curvature error.
    pub fn tracks(&self, converter: &ParameterConverter) -> Result<Vec<TrackCandidate>> {
        converter.convert_all(self.fine.iter().map(|fine| (fine.cell, &fine.config)))
    }
}

/// Drives the coarse and fine levels of one run.
#[derive(Debug, Clone)]
pub struct RefinementController {
    config: TrackFinderConfig,
}

impl RefinementController {
    /// Creates a controller for a validated configuration.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` if `config` does not validate.
    pub fn new(config: TrackFinderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the run configuration.
    #[must_use]
    pub fn config(&self) -> &TrackFinderConfig {
        &self.config
    }

    /// Fine grid configuration covering exactly the coarse cell `cell`.
    #[must_use]
    pub fn cell_window(&self, cell: CandidateCell) -> AccumulatorConfig {
        let main = &self.config.main;
        let x = main.bin_to_value(Axis::X, cell.col);
        let y = main.bin_to_value(Axis::Y, cell.row);
        let half_dx = main.dx() * 0.5;
        let half_dy = main.dy() * 0.5;
        self.config
            .cell
            .with_window(x - half_dx, x + half_dx, y - half_dy, y + half_dy)
    }

    /// Votes the coarse grid serially; used for accumulator dumps.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` if the main grid cannot be built.
    pub fn coarse_grid(&self, points: &[PolarPoint]) -> Result<AccumulatorGrid> {
        let mut grid = AccumulatorGrid::new(self.config.main)?;
        vote(&mut grid, points);
        Ok(grid)
    }

    /// Runs the fine level for a single coarse cell.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` if the fine grid cannot be built.
    pub fn refine_cell(
        &self,
        points: &[PolarPoint],
        parent: CandidateCell,
    ) -> Result<Vec<FineCandidate>> {
        let config = self.cell_window(parent);
        let mut grid = AccumulatorGrid::new(config)?;
        vote(&mut grid, points);
        let peaks = extract_peaks(&grid, self.config.effective_cell_threshold());
        debug!(
            "coarse cell ({}, {}): {} fine candidates",
            parent.row,
            parent.col,
            peaks.len()
        );
        Ok(peaks
            .into_iter()
            .map(|cell| FineCandidate {
                parent,
                cell,
                config,
            })
            .collect())
    }

    /// Runs both levels.
    ///
    /// The outcome does not depend on the worker count.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` if a grid or the worker pool cannot be built.
    pub fn run(&self, points: &[PolarPoint]) -> Result<RefinementOutcome> {
        let workers = self.config.effective_workers();
        debug!(
            "coarse level: {} points, {}x{} grid, {} workers",
            points.len(),
            self.config.main.x_dpi,
            self.config.main.y_dpi,
            workers
        );
        let pool = worker_pool(workers)?;
        let coarse =
            partitioned_vote_on(&pool, &self.config.main, points, self.config.threshold)?;

        debug!("fine level: {} coarse cells", coarse.len());
        let groups = pool.install(|| {
            coarse
                .par_iter()
                .map(|&parent| self.refine_cell(points, parent))
                .collect::<Result<Vec<_>>>()
        })?;
        let fine: Vec<FineCandidate> = groups.into_iter().flatten().collect();

        info!(
            "refinement finished: {} points, {} coarse cells, {} fine candidates",
            points.len(),
            coarse.len(),
            fine.len()
        );
        Ok(RefinementOutcome { coarse, fine })
    }
}
