//! JSON run configuration.
//!
//! ```json
//! {
//!   "R": 600.0,
//!   "B": 2.0,
//!   "threshold": 3,
//!   "main_accumulator_config": {
//!     "x_begin": -0.2857, "x_end": 0.2857, "x_dpi": 100,
//!     "y_begin": -3.6416, "y_end": 3.6416, "y_dpi": 300
//!   },
//!   "cell_accumulator_config": {
//!     "x_begin": 0.0, "x_end": 0.0, "x_dpi": 10,
//!     "y_begin": 0.0, "y_end": 0.0, "y_dpi": 10
//!   }
//! }
//! ```
//!
//! `cell_threshold`, `workers`, and the accumulator keys `layers` and
//! `edge_policy` (`"clamp"` or `"strict"`) are optional.

use crate::error::Result;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use trackhough_core::TrackFinderConfig;

/// Loads and validates a configuration file.
///
/// # Errors
/// Returns `Error::Io`, `Error::Json`, or `Error::CoreError` for a
/// configuration that does not validate.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<TrackFinderConfig> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let config: TrackFinderConfig = serde_json::from_reader(reader)?;
    config.validate()?;
    Ok(config)
}

/// Parses and validates a configuration from a JSON string.
///
/// # Errors
/// Returns `Error::Json` or `Error::CoreError`.
pub fn config_from_json(json: &str) -> Result<TrackFinderConfig> {
    let config: TrackFinderConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Serializes a configuration as pretty-printed JSON.
///
/// # Errors
/// Returns `Error::Json` if serialization fails.
pub fn config_to_json(config: &TrackFinderConfig) -> Result<String> {
    Ok(serde_json::to_string_pretty(config)?)
}
