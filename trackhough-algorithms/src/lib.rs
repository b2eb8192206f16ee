//! trackhough-algorithms: Hough-transform kernels for circular track finding.
//!
//! This crate provides:
//! - **Voting** - band voting of hits into a (q/pt, phi) accumulator
//! - **Refinement** - two-level coarse-to-fine search on a worker pool
//! - **Adaptive** - quadtree search that skips empty parameter regions
//! - **Radius sweep** - circle-center transform over radius hypotheses
//!
#![warn(missing_docs)]

mod adaptive;
mod converter;
mod partition;
mod peaks;
mod processing;
mod refinement;
mod sweep;
pub mod voting;

pub use adaptive::AdaptiveKernel;
pub use converter::{to_track, ParameterConverter, ZeroCurvaturePolicy};
pub use partition::{
    partition, partition_shuffled, partitioned_vote, partitioned_vote_on, worker_pool,
};
pub use peaks::{extract_peaks, extract_peaks_in_columns, find_maximum};
pub use processing::{find_tracks, TrackFinder};
pub use refinement::{FineCandidate, RefinementController, RefinementOutcome};
pub use sweep::{LocalMaximum, RadiusSweep, SweepResult};
pub use voting::vote;
