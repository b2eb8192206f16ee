//! Work splitting and the worker pool.

use crate::peaks::extract_peaks_in_columns;
use crate::voting::vote_columns;
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use rayon::ThreadPool;
use std::ops::Range;
use trackhough_core::{
    AccumulatorConfig, AccumulatorGrid, CandidateCell, Error, PolarPoint, Result,
};

/// Splits `0..len` into at most `workers` contiguous ranges of
/// `ceil(len / workers)` items; the last range may be shorter and empty
/// ranges are dropped.
#[must_use]
pub fn partition(len: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    let chunk = len.div_ceil(workers).max(1);
    (0..workers)
        .map(|w| (w * chunk).min(len)..((w + 1) * chunk).min(len))
        .filter(|range| !range.is_empty())
        .collect()
}

/// Seeded permutation of `0..len`, sliced like [`partition`].
///
/// The same seed always yields the same slices.
#[must_use]
pub fn partition_shuffled(len: usize, workers: usize, seed: u64) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = (0..len).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);
    partition(len, workers)
        .into_iter()
        .map(|range| order[range].to_vec())
        .collect()
}

/// Builds a dedicated pool of `workers` threads.
///
/// # Errors
/// Returns `Error::InvalidConfig` if the pool cannot be created.
pub fn worker_pool(workers: usize) -> Result<ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()
        .map_err(|e| Error::InvalidConfig(format!("failed to build worker pool: {e}")))
}

/// Votes one grid by splitting its q/pt columns across `workers`.
///
/// Each worker owns a private grid and only votes and extracts its columns,
/// so the merged, row-major sorted peaks equal a serial vote.
///
/// # Errors
/// Returns `Error::InvalidConfig` for an invalid grid configuration or pool.
pub fn partitioned_vote(
    config: &AccumulatorConfig,
    points: &[PolarPoint],
    threshold: u32,
    workers: usize,
) -> Result<Vec<CandidateCell>> {
    let pool = worker_pool(workers)?;
    partitioned_vote_on(&pool, config, points, threshold)
}

/// [`partitioned_vote`] on an existing pool, one column range per pool thread.
///
/// # Errors
/// Returns `Error::InvalidConfig` for an invalid grid configuration.
pub fn partitioned_vote_on(
    pool: &ThreadPool,
    config: &AccumulatorConfig,
    points: &[PolarPoint],
    threshold: u32,
) -> Result<Vec<CandidateCell>> {
    config.validate()?;
    let ranges = partition(config.x_dpi, pool.current_num_threads());
    debug!(
        "partitioned vote: {} columns over {} workers",
        config.x_dpi,
        ranges.len()
    );
    let per_worker = pool.install(|| {
        ranges
            .into_par_iter()
            .map(|cols| {
                let mut grid = AccumulatorGrid::new(*config)?;
                vote_columns(&mut grid, points, cols.clone());
                Ok(extract_peaks_in_columns(&grid, threshold, cols))
            })
            .collect::<Result<Vec<_>>>()
    })?;
    let mut peaks: Vec<CandidateCell> = per_worker.into_iter().flatten().collect();
    peaks.sort_unstable();
    Ok(peaks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_sizes() {
        assert_eq!(partition(10, 3), vec![0..4, 4..8, 8..10]);
        assert_eq!(partition(4, 4), vec![0..1, 1..2, 2..3, 3..4]);
        assert_eq!(partition(2, 5), vec![0..1, 1..2]);
        assert_eq!(partition(7, 1), vec![0..7]);
        assert!(partition(0, 4).is_empty());
    }

    #[test]
    fn test_partition_zero_workers_is_one() {
        assert_eq!(partition(5, 0), vec![0..5]);
    }

    #[test]
    fn test_partition_covers_every_index_once() {
        for len in 0..40 {
            for workers in 1..9 {
                let covered: Vec<usize> =
                    partition(len, workers).into_iter().flatten().collect();
                assert_eq!(covered, (0..len).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn test_partition_shuffled_is_seeded_permutation() {
        let a = partition_shuffled(50, 8, 42);
        let b = partition_shuffled(50, 8, 42);
        assert_eq!(a, b);

        let sizes: Vec<usize> = a.iter().map(Vec::len).collect();
        let expected: Vec<usize> = partition(50, 8)
            .iter()
            .map(ExactSizeIterator::len)
            .collect();
        assert_eq!(sizes, expected);

        let mut all: Vec<usize> = a.into_iter().flatten().collect();
        assert_ne!(all, (0..50).collect::<Vec<_>>());
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_worker_pool_size() {
        let pool = worker_pool(3).unwrap();
        assert_eq!(pool.current_num_threads(), 3);
    }

    #[test]
    fn test_vote_on_shared_pool_matches_own_pool() {
        let config = AccumulatorConfig::new(-0.3, 0.3, 41, -3.2, 3.2, 81);
        let points = [
            PolarPoint::new(0.12, 0.4, 0),
            PolarPoint::new(0.5, -1.1, 0),
            PolarPoint::new(0.33, 0.41, 0),
        ];
        let pool = worker_pool(4).unwrap();
        let shared = partitioned_vote_on(&pool, &config, &points, 1).unwrap();
        // The pool outlives one vote.
        let again = partitioned_vote_on(&pool, &config, &points, 1).unwrap();
        let own = partitioned_vote(&config, &points, 1, 4).unwrap();
        assert_eq!(shared, own);
        assert_eq!(again, own);
    }
}
