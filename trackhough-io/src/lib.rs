//! trackhough-io: File formats for trackhough.
//!
//! This crate reads hit files and JSON run configurations and writes track
//! candidates, radius sweep results and accumulator dumps as plain text.
//!

mod config;
mod error;
mod reader;
mod writer;

pub use config::{config_from_json, config_to_json, load_config};
pub use error::{Error, Result};
pub use reader::{parse_points, read_points};
pub use writer::TrackFileWriter;
