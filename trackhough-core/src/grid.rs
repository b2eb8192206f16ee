//! Dense accumulator over the discretized (q/pt, phi) parameter space.
//!
//! Cells are stored row-major: row = phi bin, column = q/pt bin. A plain grid
//! stores vote counts; a layered grid stores one bit per detector layer so a
//! layer contributes at most one vote per cell.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use crate::config::AccumulatorConfig;
use crate::error::Result;
use std::ops::RangeInclusive;

/// Parameter-space axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// q/pt axis (columns).
    X,
    /// phi axis (rows).
    Y,
}

/// Vote accumulator for one resolution level.
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulatorGrid {
    config: AccumulatorConfig,
    dx: f64,
    dy: f64,
    /// Vote counts, or layer masks when `config.layers` is set.
    cells: Vec<u32>,
}

impl AccumulatorGrid {
    /// Creates a zeroed grid.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` if the configuration violates its invariants.
    pub fn new(config: AccumulatorConfig) -> Result<Self> {
        config.validate()?;
        let cells = config.cell_count().unwrap_or_default();
        Ok(Self {
            config,
            dx: config.dx(),
            dy: config.dy(),
            cells: vec![0; cells],
        })
    }

    /// Returns the configuration this grid was built from.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &AccumulatorConfig {
        &self.config
    }

    /// Number of phi bins.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> usize {
        self.config.y_dpi
    }

    /// Number of q/pt bins.
    #[inline]
    #[must_use]
    pub fn cols(&self) -> usize {
        self.config.x_dpi
    }

    /// q/pt bin spacing.
    #[inline]
    #[must_use]
    pub fn dx(&self) -> f64 {
        self.dx
    }

    /// phi bin spacing.
    #[inline]
    #[must_use]
    pub fn dy(&self) -> f64 {
        self.dy
    }

    /// True for the one-vote-per-layer variant.
    #[inline]
    #[must_use]
    pub fn is_layered(&self) -> bool {
        self.config.layers.is_some()
    }

    /// Bin center value along `axis`.
    #[inline]
    #[must_use]
    pub fn bin_to_value(&self, axis: Axis, index: usize) -> f64 {
        self.config.bin_to_value(axis, index)
    }

    /// Nearest bin index for `value`, unclamped. Ties go to the lower index.
    #[inline]
    #[must_use]
    pub fn value_to_bin(&self, axis: Axis, value: f64) -> isize {
        self.config.value_to_bin(axis, value)
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.config.y_dpi && col < self.config.x_dpi).then(|| row * self.config.x_dpi + col)
    }

    /// Adds one vote. Out-of-range cells are ignored.
    ///
    /// On a layered grid this marks layer 0.
    #[inline]
    pub fn increment(&mut self, row: usize, col: usize) {
        self.increment_layer(row, col, 0);
    }

    /// Adds one vote from `layer`. Out-of-range cells and layers are ignored.
    ///
    /// Plain grids ignore the layer; layered grids set the layer's flag, so
    /// repeated votes from one layer count once.
    #[inline]
    pub fn increment_layer(&mut self, row: usize, col: usize, layer: u8) {
        let Some(idx) = self.index(row, col) else {
            return;
        };
        match self.config.layers {
            None => self.cells[idx] = self.cells[idx].saturating_add(1),
            Some(layers) if layer < layers => self.cells[idx] |= 1 << layer,
            Some(_) => {}
        }
    }

    /// Votes every row of `rows` in column `col`.
    pub fn increment_span(&mut self, rows: RangeInclusive<usize>, col: usize, layer: u8) {
        for row in rows {
            self.increment_layer(row, col, layer);
        }
    }

    /// Accumulated votes of a cell (0 for out-of-range cells).
    #[inline]
    #[must_use]
    pub fn vote_count(&self, row: usize, col: usize) -> u32 {
        self.index(row, col).map_or(0, |idx| self.count_at(idx))
    }

    #[inline]
    fn count_at(&self, idx: usize) -> u32 {
        if self.is_layered() {
            self.cells[idx].count_ones()
        } else {
            self.cells[idx]
        }
    }

    /// Sum of all cell counts.
    #[must_use]
    pub fn total_votes(&self) -> u64 {
        (0..self.cells.len())
            .map(|idx| u64::from(self.count_at(idx)))
            .sum()
    }

    /// Iterates rows of vote counts, phi bin 0 first.
    pub fn count_rows(&self) -> impl Iterator<Item = Vec<u32>> + '_ {
        (0..self.rows()).map(move |row| {
            let start = row * self.cols();
            (start..start + self.cols())
                .map(|idx| self.count_at(idx))
                .collect()
        })
    }

    /// Resets every cell to zero.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use approx::assert_relative_eq;

    fn config_3x3() -> AccumulatorConfig {
        AccumulatorConfig::new(-1.0, 1.0, 3, -1.0, 1.0, 3)
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let err = AccumulatorGrid::new(AccumulatorConfig::new(1.0, -1.0, 3, -1.0, 1.0, 3));
        assert!(matches!(err, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_new_rejects_oversized_config() {
        let config = AccumulatorConfig::new(-1.0, 1.0, usize::MAX / 2, -1.0, 1.0, 3);
        assert!(matches!(
            AccumulatorGrid::new(config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_grid_starts_empty() {
        let grid = AccumulatorGrid::new(config_3x3()).unwrap();
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.total_votes(), 0);
        assert_relative_eq!(grid.dx(), 1.0);
        assert_relative_eq!(grid.dy(), 1.0);
    }

    #[test]
    fn test_bin_to_value_endpoints_and_monotonicity() {
        let grid =
            AccumulatorGrid::new(AccumulatorConfig::new(-0.3, 0.3, 7, -3.5, 3.5, 11)).unwrap();
        assert_relative_eq!(grid.bin_to_value(Axis::X, 0), -0.3);
        assert_relative_eq!(grid.bin_to_value(Axis::X, 6), 0.3);
        assert_relative_eq!(grid.bin_to_value(Axis::Y, 0), -3.5);
        assert_relative_eq!(grid.bin_to_value(Axis::Y, 10), 3.5);

        for i in 1..grid.cols() {
            assert!(grid.bin_to_value(Axis::X, i) > grid.bin_to_value(Axis::X, i - 1));
        }
        for i in 1..grid.rows() {
            assert!(grid.bin_to_value(Axis::Y, i) > grid.bin_to_value(Axis::Y, i - 1));
        }
    }

    #[test]
    fn test_value_to_bin_nearest_with_lower_ties() {
        let grid = AccumulatorGrid::new(AccumulatorConfig::new(0.0, 4.0, 5, 0.0, 4.0, 5)).unwrap();
        assert_eq!(grid.value_to_bin(Axis::Y, 2.0), 2);
        assert_eq!(grid.value_to_bin(Axis::Y, 2.4), 2);
        assert_eq!(grid.value_to_bin(Axis::Y, 2.6), 3);
        // Exactly between bins 2 and 3.
        assert_eq!(grid.value_to_bin(Axis::Y, 2.5), 2);
        assert_eq!(grid.value_to_bin(Axis::X, 0.5), 0);
        // Outside the window stays unclamped.
        assert_eq!(grid.value_to_bin(Axis::Y, -1.2), -1);
        assert_eq!(grid.value_to_bin(Axis::Y, 6.0), 6);
    }

    #[test]
    fn test_value_to_bin_inverts_bin_to_value() {
        let grid =
            AccumulatorGrid::new(AccumulatorConfig::new(-0.28, 0.28, 41, -3.6, 3.6, 97)).unwrap();
        for col in 0..grid.cols() {
            let value = grid.bin_to_value(Axis::X, col);
            assert_eq!(grid.value_to_bin(Axis::X, value), col as isize);
        }
        for row in 0..grid.rows() {
            let value = grid.bin_to_value(Axis::Y, row);
            assert_eq!(grid.value_to_bin(Axis::Y, value), row as isize);
        }
    }

    #[test]
    fn test_increment_and_clipping() {
        let mut grid = AccumulatorGrid::new(config_3x3()).unwrap();
        grid.increment(1, 2);
        grid.increment(1, 2);
        grid.increment(3, 0);
        grid.increment(0, 3);
        assert_eq!(grid.vote_count(1, 2), 2);
        assert_eq!(grid.vote_count(3, 0), 0);
        assert_eq!(grid.total_votes(), 2);
    }

    #[test]
    fn test_layered_counts_each_layer_once() {
        let mut grid = AccumulatorGrid::new(config_3x3().with_layers(4)).unwrap();
        assert!(grid.is_layered());
        grid.increment_layer(0, 0, 1);
        grid.increment_layer(0, 0, 1);
        grid.increment_layer(0, 0, 1);
        assert_eq!(grid.vote_count(0, 0), 1);

        grid.increment_layer(0, 0, 0);
        grid.increment_layer(0, 0, 3);
        assert_eq!(grid.vote_count(0, 0), 3);

        // Layer beyond the configured count is ignored.
        grid.increment_layer(0, 0, 4);
        assert_eq!(grid.vote_count(0, 0), 3);
    }

    #[test]
    fn test_plain_grid_ignores_layer() {
        let mut grid = AccumulatorGrid::new(config_3x3()).unwrap();
        grid.increment_layer(2, 2, 7);
        grid.increment_layer(2, 2, 7);
        assert_eq!(grid.vote_count(2, 2), 2);
    }

    #[test]
    fn test_increment_span_and_rows() {
        let mut grid = AccumulatorGrid::new(config_3x3()).unwrap();
        grid.increment_span(0..=2, 1, 0);
        grid.increment(2, 0);
        let rows: Vec<Vec<u32>> = grid.count_rows().collect();
        assert_eq!(rows, vec![vec![0, 1, 0], vec![0, 1, 0], vec![1, 1, 0]]);

        grid.clear();
        assert_eq!(grid.total_votes(), 0);
    }
}
