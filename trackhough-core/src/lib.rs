//! trackhough-core: Core types for Hough-transform track finding.
//!
//! This crate provides the geometry helpers, the detector point types, the
//! accumulator grid over the (q/pt, phi) parameter space and the candidate
//! types produced by the track finding algorithms.
//!

pub mod candidate;
pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod point;

pub use candidate::{CandidateCell, TrackCandidate};
pub use config::{AccumulatorConfig, EdgePolicy, TrackFinderConfig, MAX_GRID_CELLS, MAX_LAYERS};
pub use error::{Error, Result};
pub use geometry::{cartesian_to_polar, lerp, polar_to_cartesian, MILLIMETERS_PER_METER};
pub use grid::{AccumulatorGrid, Axis};
pub use point::{Point, PolarPoint};
