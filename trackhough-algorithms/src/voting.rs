//! Hough-line voting kernel.
//!
//! Every point is a line `phi(q) = -r * q + phi_point` in parameter space.
//! For each q/pt bin the line is evaluated at both bin edges and every phi
//! bin between the two results receives a vote, so a point draws a band
//! whose width matches the bin's angular sweep.
#![allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]

use std::ops::{Range, RangeInclusive};
use trackhough_core::{AccumulatorConfig, AccumulatorGrid, Axis, EdgePolicy, PolarPoint};

/// Phi rows covered by the band `[phi_a, phi_b]` (in either order).
///
/// Returns `None` when the band gives no vote under the grid's edge policy.
#[must_use]
pub fn row_span(grid: &AccumulatorGrid, phi_a: f64, phi_b: f64) -> Option<RangeInclusive<usize>> {
    config_row_span(grid.config(), phi_a, phi_b)
}

/// [`row_span`] for a grid that is described but not allocated.
#[must_use]
pub fn config_row_span(
    config: &AccumulatorConfig,
    phi_a: f64,
    phi_b: f64,
) -> Option<RangeInclusive<usize>> {
    let (low, high) = if phi_a <= phi_b {
        (phi_a, phi_b)
    } else {
        (phi_b, phi_a)
    };
    let last = config.y_dpi as isize - 1;

    match config.edge_policy {
        EdgePolicy::Clamp => {
            if high < config.y_begin || low > config.y_end {
                return None;
            }
            let first = config.value_to_bin(Axis::Y, low).clamp(0, last);
            let end = config.value_to_bin(Axis::Y, high).clamp(0, last);
            Some(first as usize..=end as usize)
        }
        EdgePolicy::Strict => {
            let first = config.value_to_bin(Axis::Y, low);
            let end = config.value_to_bin(Axis::Y, high);
            (first >= 0 && end <= last).then(|| first as usize..=end as usize)
        }
    }
}

/// Votes one point into the q/pt columns `cols` of `grid`.
///
/// Columns past the grid edge are ignored.
pub fn vote_point(grid: &mut AccumulatorGrid, point: &PolarPoint, cols: Range<usize>) {
    let half_dx = grid.dx() * 0.5;
    let end = cols.end.min(grid.cols());
    for col in cols.start..end {
        let x = grid.bin_to_value(Axis::X, col);
        let phi_left = point.phi_at(x - half_dx);
        let phi_right = point.phi_at(x + half_dx);
        if let Some(rows) = row_span(grid, phi_left, phi_right) {
            grid.increment_span(rows, col, point.layer);
        }
    }
}

/// Votes every point into every column of `grid`.
pub fn vote(grid: &mut AccumulatorGrid, points: &[PolarPoint]) {
    let cols = 0..grid.cols();
    vote_columns(grid, points, cols);
}

/// Votes every point into the q/pt columns `cols` only.
///
/// Produces exactly the cells a full [`vote`] would produce for those columns.
pub fn vote_columns(grid: &mut AccumulatorGrid, points: &[PolarPoint], cols: Range<usize>) {
    for point in points {
        vote_point(grid, point, cols.clone());
    }
}
