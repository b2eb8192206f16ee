//! Threshold peak extraction.

use std::ops::Range;
use trackhough_core::{AccumulatorGrid, CandidateCell};

/// Every cell with `vote_count > threshold`, in row-major order.
#[must_use]
pub fn extract_peaks(grid: &AccumulatorGrid, threshold: u32) -> Vec<CandidateCell> {
    extract_peaks_in_columns(grid, threshold, 0..grid.cols())
}

/// Like [`extract_peaks`], restricted to the q/pt columns `cols`.
#[must_use]
pub fn extract_peaks_in_columns(
    grid: &AccumulatorGrid,
    threshold: u32,
    cols: Range<usize>,
) -> Vec<CandidateCell> {
    let end = cols.end.min(grid.cols());
    let mut peaks = Vec::new();
    for row in 0..grid.rows() {
        for col in cols.start..end {
            if grid.vote_count(row, col) > threshold {
                peaks.push(CandidateCell::new(row, col));
            }
        }
    }
    peaks
}

/// Highest cell of the grid; the first one in row-major order wins ties.
#[must_use]
pub fn find_maximum(grid: &AccumulatorGrid) -> Option<(CandidateCell, u32)> {
    let mut best: Option<(CandidateCell, u32)> = None;
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let votes = grid.vote_count(row, col);
            if best.map_or(true, |(_, top)| votes > top) {
                best = Some((CandidateCell::new(row, col), votes));
            }
        }
    }
    best
}
