//! trackhough command-line interface.
//!
//! Finds circular tracks in a point file with a JSON run configuration.
#![allow(clippy::uninlined_format_args, clippy::too_many_lines)]

use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use trackhough_algorithms::{
    AdaptiveKernel, RadiusSweep, RefinementController, TrackFinder, ZeroCurvaturePolicy,
};
use trackhough_core::{Point, PolarPoint, TrackFinderConfig};
use trackhough_io::{load_config, read_points, TrackFileWriter};

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    TrackhoughIo(#[from] trackhough_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] trackhough_core::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Handling of candidates on the q/pt = 0 bin.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ZeroCurvature {
    /// Abort with an error
    Fail,
    /// Drop the candidate
    Skip,
    /// Report an infinite radius
    Unbounded,
}

impl From<ZeroCurvature> for ZeroCurvaturePolicy {
    fn from(value: ZeroCurvature) -> Self {
        match value {
            ZeroCurvature::Fail => Self::Fail,
            ZeroCurvature::Skip => Self::Skip,
            ZeroCurvature::Unbounded => Self::Unbounded,
        }
    }
}

/// Hough-transform track finder for detector hits.
#[derive(Parser)]
#[command(name = "trackhough")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find track candidates with coarse-to-fine refinement
    Find {
        /// JSON run configuration
        #[arg(short, long)]
        config: PathBuf,

        /// Point file (`x y z [layer]` per line)
        points: PathBuf,

        /// Output file (`r phi` per line); standard output if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Worker threads (overrides the configuration)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Report positive radii with the center angle in (-pi, pi]
        #[arg(long)]
        normalize: bool,

        /// Handling of zero-curvature candidates
        #[arg(long, value_enum, default_value = "fail")]
        zero_curvature: ZeroCurvature,
    },

    /// Dump the vote counts of the main accumulator
    Vote {
        /// JSON run configuration
        #[arg(short, long)]
        config: PathBuf,

        /// Point file (`x y z [layer]` per line)
        points: PathBuf,

        /// Output file; standard output if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List main accumulator cells found by the adaptive quadtree search
    Adaptive {
        /// JSON run configuration
        #[arg(short, long)]
        config: PathBuf,

        /// Point file (`x y z [layer]` per line)
        points: PathBuf,

        /// Initial tiles per axis
        #[arg(long, default_value = "4")]
        divisions: usize,

        /// Output file (`row col` per line); standard output if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Worker threads (overrides the configuration)
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Find the best circle center for each radius hypothesis
    Sweep {
        /// Point file (`x y z [layer]` per line)
        points: PathBuf,

        /// Detector radius (mm)
        #[arg(long, default_value = "600.0")]
        detector_radius: f64,

        /// Radius hypotheses (mm)
        #[arg(short, long, value_delimiter = ',', required = true)]
        radii: Vec<f64>,

        /// Output file (`radius x y votes` per line); standard output if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Worker threads
        #[arg(short, long)]
        workers: Option<usize>,

        /// Seed for distributing hypotheses over workers
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_run(
    config: &Path,
    points: &Path,
    workers: Option<usize>,
) -> Result<(TrackFinderConfig, Vec<Point>)> {
    let mut config = load_config(config)?;
    if let Some(workers) = workers {
        if workers == 0 {
            return Err(CliError::InvalidArgument(
                "--workers must be at least 1".to_string(),
            ));
        }
        config = config.with_workers(workers);
    }
    Ok((config, read_points(points)?))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Find {
            config,
            points,
            output,
            workers,
            normalize,
            zero_curvature,
        } => {
            let start = Instant::now();
            let (config, points) = load_run(&config, &points, workers)?;
            let tracks = TrackFinder::new(config)?
                .with_zero_curvature_policy(zero_curvature.into())
                .with_normalization(normalize)
                .find(&points)?;

            match output {
                Some(path) => TrackFileWriter::create(&path)?.write_candidates(&tracks)?,
                None => TrackFileWriter::from_writer(BufWriter::new(io::stdout().lock()))
                    .write_candidates(&tracks)?,
            }
            info!(
                "{} candidates from {} points in {:.2}s",
                tracks.len(),
                points.len(),
                start.elapsed().as_secs_f64()
            );
        }

        Commands::Vote {
            config,
            points,
            output,
        } => {
            let (config, points) = load_run(&config, &points, None)?;
            let grid = RefinementController::new(config)?
                .coarse_grid(&PolarPoint::from_points(&points))?;
            match output {
                Some(path) => TrackFileWriter::create(&path)?.write_accumulator_dump(&grid)?,
                None => TrackFileWriter::from_writer(BufWriter::new(io::stdout().lock()))
                    .write_accumulator_dump(&grid)?,
            }
            info!(
                "{}x{} grid, {} votes",
                grid.cols(),
                grid.rows(),
                grid.total_votes()
            );
        }

        Commands::Adaptive {
            config,
            points,
            divisions,
            output,
            workers,
        } => {
            let (config, points) = load_run(&config, &points, workers)?;
            let polar = PolarPoint::from_points(&points);
            let cells = AdaptiveKernel::new(config.main, config.threshold)?
                .with_initial_divisions(divisions)
                .with_workers(config.effective_workers())
                .run(&polar)?;
            match output {
                Some(path) => TrackFileWriter::create(&path)?.write_cells(&cells)?,
                None => TrackFileWriter::from_writer(BufWriter::new(io::stdout().lock()))
                    .write_cells(&cells)?,
            }
            info!("{} cells above threshold {}", cells.len(), config.threshold);
        }

        Commands::Sweep {
            points,
            detector_radius,
            radii,
            output,
            workers,
            seed,
        } => {
            let points = read_points(&points)?;
            let mut sweep = RadiusSweep::new(detector_radius);
            if let Some(workers) = workers {
                sweep = sweep.with_workers(workers);
            }
            if let Some(seed) = seed {
                sweep = sweep.with_seed(seed);
            }
            let results = sweep.run(&points, &radii)?;
            for result in &results {
                if let Err(err) = &result.outcome {
                    warn!("radius {}: {}", result.radius, err);
                }
            }
            match output {
                Some(path) => TrackFileWriter::create(&path)?.write_sweep(&results)?,
                None => TrackFileWriter::from_writer(BufWriter::new(io::stdout().lock()))
                    .write_sweep(&results)?,
            }
        }
    }

    Ok(())
}
