//! Accumulator and track finder configuration.
#![allow(clippy::doc_markdown)]

use crate::error::{Error, Result};
use crate::geometry::lerp;
use crate::grid::Axis;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum number of detector layers a layered accumulator can track per cell.
pub const MAX_LAYERS: u8 = 32;

/// Largest number of cells a single accumulator may allocate (1 GiB of `u32`).
pub const MAX_GRID_CELLS: usize = 1 << 28;

/// Behavior of the voting kernel when a band edge leaves the phi window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EdgePolicy {
    /// Clamp partially visible bands onto the edge rows.
    #[default]
    Clamp,
    /// Skip the q/pt bin if either band edge maps outside the grid.
    Strict,
}

/// Rectangular window and resolution of a (q/pt, phi) accumulator.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AccumulatorConfig {
    /// First q/pt bin center.
    pub x_begin: f64,
    /// Last q/pt bin center.
    pub x_end: f64,
    /// Number of q/pt bins.
    pub x_dpi: usize,
    /// First phi bin center (rad).
    pub y_begin: f64,
    /// Last phi bin center (rad).
    pub y_end: f64,
    /// Number of phi bins.
    pub y_dpi: usize,
    /// Number of detector layers for the layered (one vote per layer) variant.
    #[cfg_attr(feature = "serde", serde(default))]
    pub layers: Option<u8>,
    /// Edge handling of the voting kernel.
    #[cfg_attr(feature = "serde", serde(default))]
    pub edge_policy: EdgePolicy,
}

impl Default for AccumulatorConfig {
    fn default() -> Self {
        Self {
            x_begin: -0.285_714_285_714_285_7,
            x_end: 0.285_714_285_714_285_7,
            x_dpi: 100,
            y_begin: -3.641_592_653_589_793,
            y_end: 3.641_592_653_589_793,
            y_dpi: 300,
            layers: None,
            edge_policy: EdgePolicy::Clamp,
        }
    }
}

impl AccumulatorConfig {
    /// Creates a plain (non-layered, clamping) configuration.
    #[must_use]
    pub fn new(
        x_begin: f64,
        x_end: f64,
        x_dpi: usize,
        y_begin: f64,
        y_end: f64,
        y_dpi: usize,
    ) -> Self {
        Self {
            x_begin,
            x_end,
            x_dpi,
            y_begin,
            y_end,
            y_dpi,
            layers: None,
            edge_policy: EdgePolicy::Clamp,
        }
    }

    /// Enables the layered variant.
    #[must_use]
    pub fn with_layers(mut self, layers: u8) -> Self {
        self.layers = Some(layers);
        self
    }

    /// Sets the edge policy.
    #[must_use]
    pub fn with_edge_policy(mut self, policy: EdgePolicy) -> Self {
        self.edge_policy = policy;
        self
    }

    /// Sets the resolution, keeping the window.
    #[must_use]
    pub fn with_resolution(mut self, x_dpi: usize, y_dpi: usize) -> Self {
        self.x_dpi = x_dpi;
        self.y_dpi = y_dpi;
        self
    }

    /// Replaces the window, keeping resolution, layers and edge policy.
    #[must_use]
    pub fn with_window(mut self, x_begin: f64, x_end: f64, y_begin: f64, y_end: f64) -> Self {
        self.x_begin = x_begin;
        self.x_end = x_end;
        self.y_begin = y_begin;
        self.y_end = y_end;
        self
    }

    /// q/pt distance between neighbouring bin centers.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn dx(&self) -> f64 {
        (self.x_end - self.x_begin) / (self.x_dpi - 1) as f64
    }

    /// phi distance between neighbouring bin centers.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn dy(&self) -> f64 {
        (self.y_end - self.y_begin) / (self.y_dpi - 1) as f64
    }

    /// Bin center along `axis`: `lerp(begin, end, index / (dpi - 1))`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bin_to_value(&self, axis: Axis, index: usize) -> f64 {
        match axis {
            Axis::X => lerp(
                self.x_begin,
                self.x_end,
                index as f64 / (self.x_dpi - 1) as f64,
            ),
            Axis::Y => lerp(
                self.y_begin,
                self.y_end,
                index as f64 / (self.y_dpi - 1) as f64,
            ),
        }
    }

    /// Nearest bin index for `value`, unclamped. Ties go to the lower index.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn value_to_bin(&self, axis: Axis, value: f64) -> isize {
        let (begin, width) = match axis {
            Axis::X => (self.x_begin, self.dx()),
            Axis::Y => (self.y_begin, self.dy()),
        };
        ((value - begin) / width - 0.5).ceil() as isize
    }

    /// Number of cells, or `None` if it overflows `usize`.
    #[inline]
    #[must_use]
    pub fn cell_count(&self) -> Option<usize> {
        self.x_dpi.checked_mul(self.y_dpi)
    }

    /// Checks the window and resolution invariants.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` describing the first violated invariant.
    pub fn validate(&self) -> Result<()> {
        if self.x_dpi < 2 || self.y_dpi < 2 {
            return Err(Error::InvalidConfig(format!(
                "resolution must be at least 2x2, got x_dpi={} y_dpi={}",
                self.x_dpi, self.y_dpi
            )));
        }
        check_cell_count(self.x_dpi, self.y_dpi)?;
        let bounds = [self.x_begin, self.x_end, self.y_begin, self.y_end];
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "window bounds must be finite, got {bounds:?}"
            )));
        }
        if self.x_end <= self.x_begin {
            return Err(Error::InvalidConfig(format!(
                "x window is empty or inverted: [{}, {}]",
                self.x_begin, self.x_end
            )));
        }
        if self.y_end <= self.y_begin {
            return Err(Error::InvalidConfig(format!(
                "y window is empty or inverted: [{}, {}]",
                self.y_begin, self.y_end
            )));
        }
        if let Some(layers) = self.layers {
            if layers == 0 || layers > MAX_LAYERS {
                return Err(Error::InvalidConfig(format!(
                    "layers must be in 1..={MAX_LAYERS}, got {layers}"
                )));
            }
        }
        Ok(())
    }
}

fn check_cell_count(x_dpi: usize, y_dpi: usize) -> Result<()> {
    match x_dpi.checked_mul(y_dpi) {
        Some(cells) if cells <= MAX_GRID_CELLS => Ok(()),
        _ => Err(Error::InvalidConfig(format!(
            "{x_dpi}x{y_dpi} grid exceeds {MAX_GRID_CELLS} cells"
        ))),
    }
}

/// Full configuration of a coarse-to-fine track finding run.
///
/// Field names on the wire follow the established JSON schema
/// (`R`, `B`, `main_accumulator_config`, `cell_accumulator_config`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackFinderConfig {
    /// Outer detector radius (mm).
    #[cfg_attr(feature = "serde", serde(rename = "R"))]
    pub detector_radius: f64,
    /// Magnetic field (T).
    #[cfg_attr(feature = "serde", serde(rename = "B"))]
    pub magnetic_field: f64,
    /// Coarse accumulator over the whole parameter space.
    #[cfg_attr(feature = "serde", serde(rename = "main_accumulator_config"))]
    pub main: AccumulatorConfig,
    /// Resolution of the per-cell fine accumulators; the window is derived per cell.
    #[cfg_attr(feature = "serde", serde(rename = "cell_accumulator_config"))]
    pub cell: AccumulatorConfig,
    /// Coarse vote threshold (strictly greater than).
    pub threshold: u32,
    /// Fine vote threshold; falls back to `threshold`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cell_threshold: Option<u32>,
    /// Worker count; falls back to the available hardware parallelism.
    #[cfg_attr(feature = "serde", serde(default))]
    pub workers: Option<usize>,
}

impl Default for TrackFinderConfig {
    fn default() -> Self {
        Self {
            detector_radius: 600.0,
            magnetic_field: 2.0,
            main: AccumulatorConfig::default(),
            cell: AccumulatorConfig::default().with_resolution(10, 10),
            threshold: 3,
            cell_threshold: None,
            workers: None,
        }
    }
}

impl TrackFinderConfig {
    /// Creates a configuration from the two accumulator blocks.
    #[must_use]
    pub fn new(main: AccumulatorConfig, cell: AccumulatorConfig, magnetic_field: f64) -> Self {
        Self {
            main,
            cell,
            magnetic_field,
            ..Self::default()
        }
    }

    /// Sets the detector radius (mm).
    #[must_use]
    pub fn with_detector_radius(mut self, radius: f64) -> Self {
        self.detector_radius = radius;
        self
    }

    /// Sets the coarse threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets a distinct fine threshold.
    #[must_use]
    pub fn with_cell_threshold(mut self, threshold: u32) -> Self {
        self.cell_threshold = Some(threshold);
        self
    }

    /// Sets the worker count.
    ///
    /// Values less than 1 are clamped to 1.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers.max(1));
        self
    }

    /// Threshold used by the fine level.
    #[must_use]
    pub fn effective_cell_threshold(&self) -> u32 {
        self.cell_threshold.unwrap_or(self.threshold)
    }

    /// Worker count, defaulting to the hardware parallelism.
    #[must_use]
    pub fn effective_workers(&self) -> usize {
        self.workers
            .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, usize::from))
            .max(1)
    }

    /// Validates both accumulator blocks and the physical constants.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` for the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.main.validate()?;
        // The cell window is replaced per coarse cell; only its resolution matters here.
        if self.cell.x_dpi < 2 || self.cell.y_dpi < 2 {
            return Err(Error::InvalidConfig(format!(
                "cell accumulator resolution must be at least 2x2, got x_dpi={} y_dpi={}",
                self.cell.x_dpi, self.cell.y_dpi
            )));
        }
        check_cell_count(self.cell.x_dpi, self.cell.y_dpi)?;
        if let Some(layers) = self.cell.layers {
            if layers == 0 || layers > MAX_LAYERS {
                return Err(Error::InvalidConfig(format!(
                    "cell layers must be in 1..={MAX_LAYERS}, got {layers}"
                )));
            }
        }
        if !self.magnetic_field.is_finite() || self.magnetic_field == 0.0 {
            return Err(Error::InvalidConfig(format!(
                "magnetic field must be finite and non-zero, got {}",
                self.magnetic_field
            )));
        }
        if !self.detector_radius.is_finite() || self.detector_radius <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "detector radius must be positive, got {}",
                self.detector_radius
            )));
        }
        if self.workers == Some(0) {
            return Err(Error::InvalidConfig("workers must be at least 1".to_string()));
        }
        Ok(())
    }
}
