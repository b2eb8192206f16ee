//! Adaptive (quadtree) variant of the coarse vote.
//!
//! Instead of filling every cell, the grid is cut into sections that keep
//! only the points whose band crosses them. Sections without enough points
//! are dropped, the rest are halved until single cells remain.

use crate::partition::{partition, worker_pool};
use crate::voting::config_row_span;
use log::debug;
use rayon::prelude::*;
use trackhough_core::{AccumulatorConfig, Axis, CandidateCell, PolarPoint, Result};

/// Default number of tiles per axis.
const DEFAULT_DIVISIONS: usize = 4;

/// Relative widening of section bounds, in half bins, against rounding.
const BOUNDS_MARGIN: f64 = 1e-6;

/// Rectangular block of cells with the points that reach it.
#[derive(Debug, Clone)]
struct Section {
    row: usize,
    rows: usize,
    col: usize,
    cols: usize,
    points: Vec<usize>,
}

/// Parameter-space rectangle covered by a section.
#[derive(Debug, Clone, Copy)]
struct Bounds {
    x_left: f64,
    x_right: f64,
    y_bottom: f64,
    y_top: f64,
}

impl Bounds {
    /// True if the point's band over `[x_left, x_right]` meets `[y_bottom, y_top]`.
    fn reached_by(&self, point: &PolarPoint) -> bool {
        let phi_left = point.phi_at(self.x_left);
        let phi_right = point.phi_at(self.x_right);
        phi_left.max(phi_right) >= self.y_bottom && phi_left.min(phi_right) <= self.y_top
    }
}

/// Quadtree search for cells whose vote count exceeds a threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveKernel {
    config: AccumulatorConfig,
    threshold: u32,
    initial_divisions: usize,
    workers: Option<usize>,
}

impl AdaptiveKernel {
    /// Creates a kernel over the grid described by `config`.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` if `config` does not validate.
    pub fn new(config: AccumulatorConfig, threshold: u32) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            threshold,
            initial_divisions: DEFAULT_DIVISIONS,
            workers: None,
        })
    }

    /// Sets the number of tiles per axis (at least 1).
    #[must_use]
    pub fn with_initial_divisions(mut self, divisions: usize) -> Self {
        self.initial_divisions = divisions.max(1);
        self
    }

    /// Sets the worker count (at least 1).
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers.max(1));
        self
    }

    /// Cells whose points exceed the threshold, row-major and deduplicated.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` if the worker pool cannot be built.
    pub fn run(&self, points: &[PolarPoint]) -> Result<Vec<CandidateCell>> {
        let tiles = self.tiles(points.len());
        let workers = self
            .workers
            .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, usize::from));
        debug!(
            "adaptive kernel: {} tiles, {} points, {} workers",
            tiles.len(),
            points.len(),
            workers
        );
        let pool = worker_pool(workers)?;
        let mut cells: Vec<CandidateCell> = pool.install(|| {
            tiles
                .into_par_iter()
                .flat_map_iter(|tile| self.subdivide(tile, points))
                .collect()
        });
        cells.sort_unstable();
        cells.dedup();
        Ok(cells)
    }

    fn tiles(&self, len: usize) -> Vec<Section> {
        let row_ranges = partition(self.config.y_dpi, self.initial_divisions);
        let col_ranges = partition(self.config.x_dpi, self.initial_divisions);
        let mut tiles = Vec::with_capacity(row_ranges.len() * col_ranges.len());
        for rows in &row_ranges {
            for cols in &col_ranges {
                tiles.push(Section {
                    row: rows.start,
                    rows: rows.len(),
                    col: cols.start,
                    cols: cols.len(),
                    points: (0..len).collect(),
                });
            }
        }
        tiles
    }

    fn subdivide(&self, tile: Section, points: &[PolarPoint]) -> Vec<CandidateCell> {
        let mut found = Vec::new();
        let mut stack = vec![tile];
        while let Some(mut section) = stack.pop() {
            let (row, col) = (section.row, section.col);
            if section.rows == 1 && section.cols == 1 {
                section
                    .points
                    .retain(|&i| self.votes_cell(row, col, &points[i]));
            } else {
                let bounds = self.bounds(&section);
                section.points.retain(|&i| bounds.reached_by(&points[i]));
            }
            if self.support(&section, points) <= self.threshold {
                continue;
            }
            if section.rows == 1 && section.cols == 1 {
                found.push(CandidateCell::new(row, col));
                continue;
            }
            let row_halves = halves(section.row, section.rows);
            let col_halves = halves(section.col, section.cols);
            for &(row, rows) in &row_halves {
                for &(col, cols) in &col_halves {
                    stack.push(Section {
                        row,
                        rows,
                        col,
                        cols,
                        points: section.points.clone(),
                    });
                }
            }
        }
        found
    }

    /// Parameter-space extent of a section, widened by a small margin.
    fn bounds(&self, section: &Section) -> Bounds {
        let half_dx = self.config.dx() * 0.5;
        let half_dy = self.config.dy() * 0.5;
        let margin = half_dy * BOUNDS_MARGIN;
        Bounds {
            x_left: self.config.bin_to_value(Axis::X, section.col) - half_dx,
            x_right: self.config.bin_to_value(Axis::X, section.col + section.cols - 1) + half_dx,
            y_bottom: self.config.bin_to_value(Axis::Y, section.row) - half_dy - margin,
            y_top: self.config.bin_to_value(Axis::Y, section.row + section.rows - 1)
                + half_dy
                + margin,
        }
    }

    /// True if the voting kernel gives `point` a vote in cell `(row, col)`.
    fn votes_cell(&self, row: usize, col: usize, point: &PolarPoint) -> bool {
        let half_dx = self.config.dx() * 0.5;
        let x = self.config.bin_to_value(Axis::X, col);
        config_row_span(
            &self.config,
            point.phi_at(x - half_dx),
            point.phi_at(x + half_dx),
        )
        .is_some_and(|rows| rows.contains(&row))
    }

    /// Votes a section could receive: points, or distinct layers when layered.
    fn support(&self, section: &Section, points: &[PolarPoint]) -> u32 {
        match self.config.layers {
            None => u32::try_from(section.points.len()).unwrap_or(u32::MAX),
            Some(layers) => {
                let mask = section
                    .points
                    .iter()
                    .map(|&i| points[i].layer)
                    .filter(|&layer| layer < layers)
                    .fold(0u32, |mask, layer| mask | (1 << layer));
                mask.count_ones()
            }
        }
    }
}
fn halves(start: usize, len: usize) -> Vec<(usize, usize)> {
    if len > 1 {
        let first = len / 2;
        vec![(start, first), (start + first, len - first)]
    } else {
        vec![(start, len)]
    }
}
