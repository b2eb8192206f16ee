//! Text writers for track finding results.

use crate::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use trackhough_algorithms::SweepResult;
use trackhough_core::{AccumulatorGrid, CandidateCell, TrackCandidate};

/// Writer for track candidates, sweep results and accumulator dumps.
pub struct TrackFileWriter<W: Write = BufWriter<File>> {
    writer: W,
}

impl TrackFileWriter {
    /// Creates a new file writer.
    ///
    /// # Errors
    /// Returns `Error::Io` if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        Ok(Self { writer })
    }
}

impl<W: Write> TrackFileWriter<W> {
    /// Wraps any writer, e.g. standard output.
    pub fn from_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Writes one `r phi` line per candidate, in order.
    ///
    /// # Errors
    /// Returns `Error::Io` on write failure.
    pub fn write_candidates(&mut self, candidates: &[TrackCandidate]) -> Result<()> {
        for c in candidates {
            writeln!(self.writer, "{} {}", c.r, c.phi)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Writes one `row col` line per accumulator cell, in order.
    ///
    /// # Errors
    /// Returns `Error::Io` on write failure.
    pub fn write_cells(&mut self, cells: &[CandidateCell]) -> Result<()> {
        for cell in cells {
            writeln!(self.writer, "{} {}", cell.row, cell.col)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Writes the grid's vote counts, one phi row per line.
    ///
    /// # Errors
    /// Returns `Error::Io` on write failure.
    pub fn write_accumulator_dump(&mut self, grid: &AccumulatorGrid) -> Result<()> {
        for row in grid.count_rows() {
            let line: Vec<String> = row.iter().map(u32::to_string).collect();
            writeln!(self.writer, "{}", line.join(" "))?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Writes `radius center_x center_y votes` for every accepted hypothesis.
    ///
    /// Rejected hypotheses are skipped.
    ///
    /// # Errors
    /// Returns `Error::Io` on write failure.
    pub fn write_sweep(&mut self, results: &[SweepResult]) -> Result<()> {
        for result in results {
            if let Ok(max) = &result.outcome {
                writeln!(
                    self.writer,
                    "{} {} {} {}",
                    max.radius, max.center_x, max.center_y, max.votes
                )?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes the writer.
    ///
    /// # Errors
    /// Returns `Error::Io` on flush failure.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Returns the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
