//! Calibration loss between simulated and observed ECDF tables.
//!
//! The tables are inner-joined on `(post_id, time_grid_value)`; rows present
//! on one side only are dropped. The loss is
//!
//! `Σ |share_sim - share_obs| + |share_cc_sim - share_cc_obs|`
//!
//! over joined rows, without normalization, so it grows with threads × grid
//! points. Joined rows are summed in key order, which makes the total exactly
//! symmetric in its two arguments.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::EcdfRow;

/// Loss plus join coverage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossReport {
    pub loss: f64,
    pub joined_rows: usize,
    pub unmatched_simulated: usize,
    pub unmatched_observed: usize,
}

type JoinKey<'a> = (&'a str, u64);

fn index_rows(rows: &[EcdfRow]) -> BTreeMap<JoinKey<'_>, &EcdfRow> {
    rows.iter()
        .map(|r| ((r.post_id.as_str(), grid_key(r.time_grid_value)), r))
        .collect()
}

/// Grid values are joined on exact equality; -0.0 and 0.0 share a key.
fn grid_key(value: f64) -> u64 {
    if value == 0.0 { 0 } else { value.to_bits() }
}

/// Join both tables and compute the loss with coverage counts.
pub fn compare(simulated: &[EcdfRow], observed: &[EcdfRow]) -> LossReport {
    let sim = index_rows(simulated);
    let obs = index_rows(observed);

    let mut loss = 0.0;
    let mut joined_rows = 0usize;
    for (key, s) in &sim {
        if let Some(o) = obs.get(key) {
            loss += (s.share - o.share).abs() + (s.share_cc - o.share_cc).abs();
            joined_rows += 1;
        }
    }

    let report = LossReport {
        loss,
        joined_rows,
        unmatched_simulated: sim.len() - joined_rows,
        unmatched_observed: obs.len() - joined_rows,
    };
    debug!(
        loss = report.loss,
        joined = report.joined_rows,
        unmatched_sim = report.unmatched_simulated,
        unmatched_obs = report.unmatched_observed,
        "loss evaluated"
    );
    report
}

/// Scalar calibration loss (lower is better).
pub fn evaluate_loss(simulated: &[EcdfRow], observed: &[EcdfRow]) -> f64 {
    compare(simulated, observed).loss
}

/// One thread's share of the total loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadLoss {
    pub post_id: String,
    pub loss: f64,
    pub joined_rows: usize,
}

/// Loss broken down by thread, worst first (ties by `post_id`).
pub fn loss_by_thread(simulated: &[EcdfRow], observed: &[EcdfRow]) -> Vec<ThreadLoss> {
    let sim = index_rows(simulated);
    let obs = index_rows(observed);

    let mut per_thread: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for (key, s) in &sim {
        if let Some(o) = obs.get(key) {
            let entry = per_thread.entry(key.0).or_insert((0.0, 0));
            entry.0 += (s.share - o.share).abs() + (s.share_cc - o.share_cc).abs();
            entry.1 += 1;
        }
    }

    let mut out: Vec<ThreadLoss> = per_thread
        .into_iter()
        .map(|(post_id, (loss, joined_rows))| ThreadLoss {
            post_id: post_id.to_string(),
            loss,
            joined_rows,
        })
        .collect();
    out.sort_by(|a, b| b.loss.total_cmp(&a.loss).then_with(|| a.post_id.cmp(&b.post_id)));
    out
}
