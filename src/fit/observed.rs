//! Fitting inputs extracted from an observed dataset.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{EventRecord, SimParams};
use crate::error::AppError;
use crate::fit::{BetaFit, fit_beta, fit_power_law};

/// Parameters that can be estimated directly from observed threads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservedFit {
    pub gamma: f64,
    pub initial_comment: BetaFit,
    pub threads: usize,
    pub first_comments: usize,
}

/// Distinct users per thread, in order of each thread's first appearance.
pub fn observed_user_counts(records: &[EventRecord]) -> Vec<f64> {
    let mut order: Vec<&str> = Vec::new();
    let mut users: HashMap<&str, HashSet<&str>> = HashMap::new();
    for r in records {
        let entry = users.entry(r.post_id.as_str()).or_insert_with(|| {
            order.push(r.post_id.as_str());
            HashSet::new()
        });
        entry.insert(r.user_id.as_str());
    }
    order
        .iter()
        .map(|post_id| users.get(post_id).map_or(0, HashSet::len) as f64)
        .collect()
}

/// Times of every user's first comment.
pub fn observed_initial_times(records: &[EventRecord]) -> Vec<f64> {
    records
        .iter()
        .filter(|r| r.is_first_comment())
        .map(|r| r.time)
        .collect()
}

/// Fit `gamma` (with `xmin = min_users`) and the first-comment Beta.
pub fn fit_observed(records: &[EventRecord], min_users: usize) -> Result<ObservedFit, AppError> {
    let counts = observed_user_counts(records);
    let initial = observed_initial_times(records);

    let gamma = fit_power_law(&counts, min_users as f64)?;
    let initial_comment = fit_beta(&initial)?;

    info!(
        threads = counts.len(),
        first_comments = initial.len(),
        gamma,
        "observed parameters fitted"
    );

    Ok(ObservedFit {
        gamma,
        initial_comment,
        threads: counts.len(),
        first_comments: initial.len(),
    })
}

impl ObservedFit {
    /// Copy the fitted values into an existing bundle.
    pub fn apply_to(&self, base: &SimParams) -> Result<SimParams, AppError> {
        let mut params = *base;
        params.gamma = self.gamma;
        params.a = self.initial_comment.a;
        params.b = self.initial_comment.b;
        params.loc = self.initial_comment.loc;
        params.scale = self.initial_comment.scale;
        params.validate()?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(post_id: &str, user: &str, time: f64, seq: u32) -> EventRecord {
        EventRecord {
            user_id: user.to_string(),
            post_id: post_id.to_string(),
            time,
            sequence_index: seq,
        }
    }

    #[test]
    fn user_counts_are_distinct_per_thread() {
        let records = vec![
            rec("B", "u1", 0.1, 1),
            rec("A", "u1", 0.2, 1),
            rec("B", "u1", 0.3, 2),
            rec("B", "u2", 0.4, 1),
        ];
        assert_eq!(observed_user_counts(&records), vec![2.0, 1.0]);
    }

    #[test]
    fn initial_times_keep_first_comments_only() {
        let records = vec![rec("A", "u1", 0.1, 1), rec("A", "u1", 0.3, 2), rec("A", "u2", 0.2, 1)];
        assert_eq!(observed_initial_times(&records), vec![0.1, 0.2]);
    }

    #[test]
    fn fit_observed_reports_inputs() {
        let mut records = Vec::new();
        for (t, users) in [(0, 2), (1, 3), (2, 5), (3, 2), (4, 8)] {
            for u in 0..users {
                let time = 0.05 + 0.1 * ((t * 7 + u * 3) % 9) as f64;
                records.push(rec(&format!("T{t}"), &format!("u{u}"), time, 1));
            }
        }
        let fit = fit_observed(&records, 2).unwrap();
        assert_eq!(fit.threads, 5);
        assert_eq!(fit.first_comments, 20);
        assert!(fit.gamma > 1.0);
        assert!(fit.initial_comment.a > 0.0);
    }

    #[test]
    fn apply_to_overwrites_fitted_fields_only() {
        let base = crate::domain::test_params();
        let fit = ObservedFit {
            gamma: 2.1,
            initial_comment: BetaFit {
                a: 0.7,
                b: 3.0,
                loc: 0.0,
                scale: 1.0,
            },
            threads: 3,
            first_comments: 9,
        };
        let merged = fit.apply_to(&base).unwrap();
        assert_eq!(merged.gamma, 2.1);
        assert_eq!(merged.a, 0.7);
        assert_eq!(merged.b, 3.0);
        assert_eq!(merged.lambda, base.lambda);
        assert_eq!(merged.kscale, base.kscale);
    }
}
