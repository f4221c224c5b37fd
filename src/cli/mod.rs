//! Command-line parsing for the conversation simulator.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! simulation/estimation code. Most flags can also be set through `CONVSIM_*`
//! environment variables (a `.env` file is loaded at startup).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{
    DEFAULT_MAX_POSITIONING_PASSES, DEFAULT_MIN_USERS, DEFAULT_SEED, ModelKind, SimConfig,
};
use crate::logging::{LogFormat, LogLevel};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "convsim",
    version,
    about = "Synthetic conversation threads with ECDF-based calibration loss"
)]
pub struct Cli {
    /// Log level (overridden by RUST_LOG).
    #[arg(long, global = true, value_enum, env = "CONVSIM_LOG_LEVEL", default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log output format (always written to stderr).
    #[arg(long, global = true, value_enum, env = "CONVSIM_LOG_FORMAT", default_value_t = LogFormat::Human)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Simulate threads and optionally export simulated/observed records.
    Simulate(SimulateArgs),
    /// Compute the ECDF table of a records CSV.
    Ecdf(EcdfArgs),
    /// Compute the loss between two ECDF tables.
    Loss(LossArgs),
    /// Simulate, compute both ECDF tables, and report the loss.
    Evaluate(EvaluateArgs),
    /// Fit the user-count exponent and first-comment Beta from observed data.
    Fit(FitArgs),
}

/// Options shared by every command that simulates.
#[derive(Debug, Args, Clone)]
pub struct SimArgs {
    /// Observed dataset CSV.
    #[arg(long, value_name = "CSV", env = "CONVSIM_OBSERVED")]
    pub observed: PathBuf,

    /// Parameter bundle JSON.
    #[arg(long, value_name = "JSON", env = "CONVSIM_PARAMS")]
    pub params: PathBuf,

    /// Generative model.
    #[arg(long, value_enum, default_value_t = ModelKind::M1)]
    pub model: ModelKind,

    /// Number of threads to subsample (0 or absent: all threads).
    #[arg(long)]
    pub threads: Option<usize>,

    /// Minimum (and power-law scale) user count per thread.
    #[arg(long, default_value_t = DEFAULT_MIN_USERS)]
    pub min_users: usize,

    /// Cap on the drawn user count per thread (truncates the power-law tail).
    #[arg(long)]
    pub max_users: Option<usize>,

    /// Random seed.
    #[arg(long, env = "CONVSIM_SEED", default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Positioning pass budget per thread (M2).
    #[arg(long, default_value_t = DEFAULT_MAX_POSITIONING_PASSES)]
    pub max_positioning_passes: usize,

    /// Show a per-thread progress bar on stderr.
    #[arg(long, env = "CONVSIM_PROGRESS")]
    pub progress: bool,
}

impl SimArgs {
    pub fn to_config(&self) -> SimConfig {
        SimConfig {
            model: self.model,
            num_threads: self.threads,
            min_users: self.min_users,
            max_users: self.max_users,
            seed: self.seed,
            max_positioning_passes: self.max_positioning_passes,
            progress: self.progress,
        }
    }
}

/// Time grid selection: explicit values, or an even grid.
#[derive(Debug, Args, Clone)]
pub struct GridArgs {
    /// Explicit comma-separated grid (e.g. `0.05,0.1,0.5,1`). Overrides the even grid.
    #[arg(long, value_name = "LIST")]
    pub grid: Option<String>,

    /// Number of points of the even grid.
    #[arg(long, default_value_t = 101)]
    pub grid_steps: usize,

    /// First point of the even grid.
    #[arg(long, default_value_t = 0.0)]
    pub grid_start: f64,

    /// Last point of the even grid.
    #[arg(long, default_value_t = 1.0)]
    pub grid_end: f64,
}

#[derive(Debug, Args)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub sim: SimArgs,

    /// Write simulated records to CSV.
    #[arg(long, value_name = "CSV")]
    pub out: Option<PathBuf>,

    /// Write the observed rows of the simulated threads to CSV.
    #[arg(long, value_name = "CSV")]
    pub out_observed: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct EcdfArgs {
    /// Records CSV (observed or simulated).
    #[arg(long, value_name = "CSV")]
    pub records: PathBuf,

    #[command(flatten)]
    pub grid: GridArgs,

    /// Write the ECDF table to CSV (stdout otherwise).
    #[arg(long, value_name = "CSV")]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct LossArgs {
    /// Simulated ECDF table CSV.
    #[arg(long, value_name = "CSV")]
    pub simulated: PathBuf,

    /// Observed ECDF table CSV.
    #[arg(long, value_name = "CSV")]
    pub observed: PathBuf,
}

#[derive(Debug, Args)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub sim: SimArgs,

    #[command(flatten)]
    pub grid: GridArgs,

    /// Show the N worst-fitting threads.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Write a JSON run report.
    #[arg(long, value_name = "JSON")]
    pub report: Option<PathBuf>,

    /// Write the simulated ECDF table to CSV.
    #[arg(long, value_name = "CSV")]
    pub sim_ecdf: Option<PathBuf>,

    /// Write the observed ECDF table to CSV.
    #[arg(long, value_name = "CSV")]
    pub obs_ecdf: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct FitArgs {
    /// Observed dataset CSV.
    #[arg(long, value_name = "CSV", env = "CONVSIM_OBSERVED")]
    pub observed: PathBuf,

    /// Power-law `xmin` (the simulator's `min_users`).
    #[arg(long, default_value_t = DEFAULT_MIN_USERS)]
    pub min_users: usize,

    /// Write the fit as JSON.
    #[arg(long, value_name = "JSON")]
    pub out: Option<PathBuf>,

    /// Parameter bundle to update with the fitted values.
    #[arg(long, value_name = "JSON", requires = "params_out")]
    pub base_params: Option<PathBuf>,

    /// Where to write the updated bundle.
    #[arg(long, value_name = "JSON", requires = "base_params")]
    pub params_out: Option<PathBuf>,
}
