//! Thread selection, seeding, and the parallel simulation driver.

use std::collections::HashSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::domain::{EventRecord, ModelKind, SimConfig, SimParams, SimulationOutput};
use crate::error::AppError;
use crate::sampling::{sample_initial_time, sample_user_count};
use crate::sim::{simulate_thread_m1, simulate_thread_m2};

/// Distinct thread ids in order of first appearance.
pub fn distinct_threads(records: &[EventRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for r in records {
        if seen.insert(r.post_id.as_str()) {
            out.push(r.post_id.clone());
        }
    }
    out
}

/// Pick the threads to simulate.
///
/// `None` and `Some(0)` select every thread. A request larger than the number
/// of available threads is clamped to all of them (not an error). Sampling is
/// without replacement.
pub fn select_threads(records: &[EventRecord], num_threads: Option<usize>, seed: u64) -> Vec<String> {
    let all = distinct_threads(records);
    match num_threads {
        Some(n) if n > 0 => {
            let n = n.min(all.len());
            let mut rng = StdRng::seed_from_u64(seed);
            all.choose_multiple(&mut rng, n).cloned().collect()
        }
        _ => all,
    }
}

/// Stable per-thread seed derived from the run seed and the thread id.
pub fn thread_seed(seed: u64, post_id: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    post_id.hash(&mut hasher);
    hasher.finish()
}

/// Users of one thread together with their first comment times.
#[derive(Debug, Clone)]
pub(crate) struct ThreadSkeleton {
    pub initial_times: Vec<f64>,
}

impl ThreadSkeleton {
    pub fn user_count(&self) -> usize {
        self.initial_times.len()
    }
}

/// Draw the user count (floored at `min_users`, capped at `max_users` when
/// set) and one first-comment time per user.
pub(crate) fn draw_skeleton(
    rng: &mut StdRng,
    params: &SimParams,
    config: &SimConfig,
) -> Result<ThreadSkeleton, AppError> {
    let drawn = sample_user_count(rng, params.gamma, config.min_users, 1)?
        .first()
        .copied()
        .unwrap_or(config.min_users);
    let users = match config.max_users {
        Some(cap) if drawn > cap => {
            warn!(drawn, cap, "user count capped; the power-law tail is truncated");
            cap
        }
        _ => drawn,
    };

    let initial_times = sample_initial_time(rng, params.a, params.b, params.loc, params.scale, users)?;
    Ok(ThreadSkeleton { initial_times })
}

/// Synthetic user id, scoped to one thread.
pub fn user_label(index: usize) -> String {
    format!("User_{index}")
}

/// Cumulatively sum a user's slot values and emit one record per time inside
/// the unit window.
///
/// An unresolved slot poisons the running sum (as a NaN would), so it and every
/// later slot are dropped. Times above 1.0 are dropped individually; surviving
/// records are numbered `1..=k` in order.
pub(crate) fn emit_user_events<I>(post_id: &str, user: usize, slots: I, out: &mut Vec<EventRecord>)
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut running = 0.0;
    let mut sequence_index = 0u32;
    for slot in slots {
        let Some(value) = slot else { break };
        running += value;
        if running <= 1.0 {
            sequence_index += 1;
            out.push(EventRecord {
                user_id: user_label(user),
                post_id: post_id.to_string(),
                time: running,
                sequence_index,
            });
        }
    }
}

fn validate_config(config: &SimConfig) -> Result<(), AppError> {
    if config.min_users == 0 {
        return Err(AppError::config("min_users must be >= 1."));
    }
    match config.max_users {
        Some(cap) if cap < config.min_users => {
            return Err(AppError::config(format!(
                "max_users={cap} must be >= min_users={}.",
                config.min_users
            )));
        }
        _ => {}
    }
    if config.model == ModelKind::M2 && config.max_positioning_passes == 0 {
        return Err(AppError::config("max_positioning_passes must be >= 1."));
    }
    Ok(())
}

/// Per-thread progress on stderr; hidden unless requested.
fn thread_progress(len: usize, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner} threads {pos}/{len} [{elapsed_precise}] {wide_bar}") {
        bar.set_style(style);
    }
    bar
}

/// Simulate the selected threads and pair them with the observed rows of every
/// thread that emitted at least one event.
pub fn simulate(
    observed: &[EventRecord],
    params: &SimParams,
    config: &SimConfig,
) -> Result<SimulationOutput, AppError> {
    params.validate()?;
    validate_config(config)?;

    let threads = select_threads(observed, config.num_threads, config.seed);
    info!(
        model = config.model.display_name(),
        threads = threads.len(),
        seed = config.seed,
        "simulating threads"
    );

    let progress = thread_progress(threads.len(), config.progress);
    let per_thread: Vec<Vec<EventRecord>> = threads
        .par_iter()
        .map(|post_id| {
            let mut rng = StdRng::seed_from_u64(thread_seed(config.seed, post_id));
            let events = match config.model {
                ModelKind::M1 => simulate_thread_m1(&mut rng, post_id, params, config),
                ModelKind::M2 => simulate_thread_m2(&mut rng, post_id, params, config),
            };
            progress.inc(1);
            events
        })
        .collect::<Result<_, AppError>>()?;
    progress.finish_and_clear();

    let simulated: Vec<EventRecord> = per_thread.into_iter().flatten().collect();

    // Threads whose every draw fell past the window have no simulated
    // counterpart, so their observed rows are left out too.
    let emitted: HashSet<&str> = simulated.iter().map(|r| r.post_id.as_str()).collect();
    let observed: Vec<EventRecord> = observed
        .iter()
        .filter(|r| emitted.contains(r.post_id.as_str()))
        .cloned()
        .collect();

    info!(
        simulated = simulated.len(),
        observed = observed.len(),
        silent_threads = threads.len() - emitted.len(),
        "simulation finished"
    );

    Ok(SimulationOutput {
        simulated,
        observed,
        threads,
    })
}

#[cfg(test)]
pub(crate) fn observed_fixture(threads: &[(&str, usize)]) -> Vec<EventRecord> {
    let mut out = Vec::new();
    for (post_id, rows) in threads {
        for i in 0..*rows {
            out.push(EventRecord {
                user_id: format!("u{}", i % 2),
                post_id: post_id.to_string(),
                time: (i as f64 + 1.0) / (*rows as f64 + 1.0),
                sequence_index: (i / 2 + 1) as u32,
            });
        }
    }
    out
}
