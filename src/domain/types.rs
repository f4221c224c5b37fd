//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - produced by the simulators and consumed by the ECDF estimator
//! - exported to CSV/JSON
//! - reloaded later for comparisons

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Column names of the observed social dataset.
pub const COL_USER_ID: &str = "user_id";
pub const COL_POST_ID: &str = "post_id";
pub const COL_TIME: &str = "temporal_distance_birth_base_100h";
pub const COL_SEQUENCE: &str = "sequential_number_of_comment_by_user_in_thread";

/// Which generative model to simulate with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Independent per-user timelines built from cumulative gaps.
    M1,
    /// Per-user skeletons interleaved by the positioning engine.
    M2,
}

impl ModelKind {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::M1 => "M1 (baseline)",
            ModelKind::M2 => "M2 (positioned)",
        }
    }
}

/// One comment in a thread, observed or simulated.
///
/// `time` is normalized to the observation window (1.0 = 100h after the post).
/// `sequence_index` is 1-based and local to the user within the thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub user_id: String,
    pub post_id: String,
    #[serde(rename = "temporal_distance_birth_base_100h")]
    pub time: f64,
    #[serde(rename = "sequential_number_of_comment_by_user_in_thread")]
    pub sequence_index: u32,
}

impl EventRecord {
    pub fn is_first_comment(&self) -> bool {
        self.sequence_index == 1
    }
}

/// Empirical CDF of one thread evaluated at one grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcdfRow {
    pub post_id: String,
    pub time_grid_value: f64,
    /// Fraction of the thread's comments strictly before `time_grid_value`.
    pub share: f64,
    /// Same, counting only comments that are not a user's first.
    ///
    /// The denominator is still the thread's total comment count.
    pub share_cc: f64,
}

/// Run configuration for the thread simulators.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub model: ModelKind,
    /// Number of threads to subsample; `None` (or `Some(0)`) simulates all of them.
    pub num_threads: Option<usize>,
    /// Scale of the user-count power law, and the minimum user count.
    pub min_users: usize,
    /// Optional per-thread ceiling on the drawn user count. Unset keeps the
    /// full power-law tail.
    #[serde(default)]
    pub max_users: Option<usize>,
    pub seed: u64,
    /// Budget for positioning passes per thread (M2 only).
    pub max_positioning_passes: usize,
    /// Draw a per-thread progress bar on stderr.
    #[serde(default)]
    pub progress: bool,
}

pub const DEFAULT_MIN_USERS: usize = 50;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_MAX_POSITIONING_PASSES: usize = 5_000_000;

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            model: ModelKind::M1,
            num_threads: None,
            min_users: DEFAULT_MIN_USERS,
            max_users: None,
            seed: DEFAULT_SEED,
            max_positioning_passes: DEFAULT_MAX_POSITIONING_PASSES,
            progress: false,
        }
    }
}

/// Simulated events plus the observed rows of the same threads.
#[derive(Debug, Clone)]
pub struct SimulationOutput {
    pub simulated: Vec<EventRecord>,
    pub observed: Vec<EventRecord>,
    /// Threads that were selected for simulation, in simulation order.
    pub threads: Vec<String>,
}
