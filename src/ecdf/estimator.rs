//! Per-thread ECDF estimation.
//!
//! For each thread and each grid value `t`:
//!
//! - `share    = #{time < t} / total`
//! - `share_cc = #{time < t, sequence_index != 1} / total`
//!
//! Both use the thread's total comment count as denominator. Rows come out
//! ordered by `post_id`, then by grid order.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::debug;

use crate::domain::{EcdfRow, EventRecord};
use crate::ecdf::grid::validate_grid;
use crate::error::AppError;

/// ECDF rows for every thread present in `records`.
pub fn compute_ecdf(records: &[EventRecord], grid: &[f64]) -> Result<Vec<EcdfRow>, AppError> {
    validate_grid(grid)?;

    let mut groups: BTreeMap<&str, Vec<&EventRecord>> = BTreeMap::new();
    for r in records {
        groups.entry(r.post_id.as_str()).or_default().push(r);
    }

    let per_thread: Vec<Vec<EcdfRow>> = groups
        .par_iter()
        .map(|(post_id, events)| thread_ecdf(post_id, events, grid))
        .collect::<Result<_, AppError>>()?;

    let rows: Vec<EcdfRow> = per_thread.into_iter().flatten().collect();
    debug!(threads = groups.len(), rows = rows.len(), "ECDF computed");
    Ok(rows)
}

/// ECDF rows for a single thread.
///
/// A thread without events has no defined share and fails with a data error.
pub fn thread_ecdf(post_id: &str, events: &[&EventRecord], grid: &[f64]) -> Result<Vec<EcdfRow>, AppError> {
    if events.is_empty() {
        return Err(AppError::data(format!(
            "Thread {post_id} has no events; its ECDF is undefined."
        )));
    }
    let total = events.len() as f64;

    let mut all: Vec<f64> = events.iter().map(|e| e.time).collect();
    let mut continuing: Vec<f64> = events
        .iter()
        .filter(|e| !e.is_first_comment())
        .map(|e| e.time)
        .collect();
    all.sort_by(f64::total_cmp);
    continuing.sort_by(f64::total_cmp);

    Ok(grid
        .iter()
        .map(|&t| EcdfRow {
            post_id: post_id.to_string(),
            time_grid_value: t,
            share: count_below(&all, t) as f64 / total,
            share_cc: count_below(&continuing, t) as f64 / total,
        })
        .collect())
}

/// Number of values strictly below `t` in an ascending slice (NaNs never count).
fn count_below(sorted: &[f64], t: f64) -> usize {
    sorted.partition_point(|v| *v < t)
}
