//! Baseline thread model (M1).
//!
//! Each user's timeline is independent of every other user in the thread:
//!
//! `[T0, gap_1, ..., gap_{N-2}, final_gap]` → cumulative sum → drop times > 1.

use rand::rngs::StdRng;
use tracing::debug;

use crate::domain::{EventRecord, SimConfig, SimParams};
use crate::error::AppError;
use crate::sampling::{sample_comment_count, sample_duration};
use crate::sim::threads::{draw_skeleton, emit_user_events};

/// Simulate one thread with independent per-user timelines.
pub fn simulate_thread_m1(
    rng: &mut StdRng,
    post_id: &str,
    params: &SimParams,
    config: &SimConfig,
) -> Result<Vec<EventRecord>, AppError> {
    let skeleton = draw_skeleton(rng, params, config)?;
    let mut out = Vec::new();

    for (user, &t0) in skeleton.initial_times.iter().enumerate() {
        let extra = sample_comment_count(rng, params.alpha, params.lambda, 1)?
            .first()
            .copied()
            .unwrap_or(0);
        let n_comments = extra as usize + 1;

        let mut timing = Vec::with_capacity(n_comments);
        timing.push(t0);
        if n_comments > 1 {
            // Two or more comments: N-2 regular gaps, then one final gap.
            timing.extend(sample_duration(rng, params.c, params.d, params.l, params.s, n_comments - 2)?);
            timing.extend(sample_duration(rng, params.cf, params.df, params.lf, params.sf, 1)?);
        }

        emit_user_events(post_id, user, timing.into_iter().map(Some), &mut out);
    }

    debug!(post_id, users = skeleton.user_count(), events = out.len(), "M1 thread simulated");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::domain::{ModelKind, test_params};
    use crate::sampling::{sample_initial_time, sample_user_count};
    use crate::sim::threads::{observed_fixture, simulate, thread_seed};
    use rand::SeedableRng;

    fn config() -> SimConfig {
        SimConfig {
            model: ModelKind::M1,
            min_users: 5,
            max_users: Some(200),
            seed: 77,
            ..SimConfig::default()
        }
    }

    #[test]
    fn sequence_indices_are_contiguous_and_times_ordered() {
        let obs = observed_fixture(&[("P1", 4), ("P2", 6), ("P3", 2)]);
        let out = simulate(&obs, &test_params(), &config()).unwrap();
        assert!(!out.simulated.is_empty());

        let mut by_user: HashMap<(&str, &str), Vec<&EventRecord>> = HashMap::new();
        for r in &out.simulated {
            by_user.entry((r.post_id.as_str(), r.user_id.as_str())).or_default().push(r);
        }
        for events in by_user.values() {
            for (i, e) in events.iter().enumerate() {
                assert_eq!(e.sequence_index as usize, i + 1);
            }
            for w in events.windows(2) {
                assert!(w[1].time >= w[0].time);
            }
        }
    }

    #[test]
    fn no_event_leaves_the_unit_window() {
        let mut params = test_params();
        // Long gaps push most follow-up comments past the window.
        params.s = 0.5;
        params.sf = 0.5;
        let obs = observed_fixture(&[("P1", 4), ("P2", 6)]);
        let out = simulate(&obs, &params, &config()).unwrap();
        assert!(out.simulated.iter().all(|r| r.time <= 1.0));
    }

    #[test]
    fn full_inflation_emits_only_first_comments() {
        let obs = observed_fixture(&[("P1", 3)]);
        let mut params = test_params();
        params.alpha = 1.0;
        params.loc = 0.5;
        params.scale = 0.8;
        let config = SimConfig {
            model: ModelKind::M1,
            num_threads: Some(1),
            min_users: 1,
            seed: 2024,
            ..SimConfig::default()
        };
        let out = simulate(&obs, &params, &config).unwrap();

        // Replay the first two draws of the thread's RNG stream.
        let mut rng = StdRng::seed_from_u64(thread_seed(config.seed, "P1"));
        let users = sample_user_count(&mut rng, params.gamma, 1, 1).unwrap()[0];
        let t0s = sample_initial_time(&mut rng, params.a, params.b, params.loc, params.scale, users).unwrap();

        let mut expected = Vec::new();
        for (i, t0) in t0s.iter().enumerate() {
            if *t0 <= 1.0 {
                expected.push((format!("User_{i}"), *t0));
            }
        }

        assert_eq!(out.simulated.len(), expected.len());
        for (record, (user, t0)) in out.simulated.iter().zip(&expected) {
            assert_eq!(record.post_id, "P1");
            assert_eq!(&record.user_id, user);
            assert_eq!(record.sequence_index, 1);
            assert_eq!(record.time, *t0);
        }
        let observed_rows = if expected.is_empty() { 0 } else { 3 };
        assert_eq!(out.observed.len(), observed_rows);
    }

    /// Gap families with near-constant draws: regular gaps are ~0.2, the
    /// final gap ~0.05.
    fn separable_gap_params() -> SimParams {
        let mut params = test_params();
        params.alpha = 0.0;
        params.lambda = 1.0;
        params.loc = 0.0;
        params.scale = 0.05;
        (params.c, params.d, params.l, params.s) = (10.0, 1.0, 0.2, 1e-6);
        (params.cf, params.df, params.lf, params.sf) = (10.0, 1.0, 0.05, 1e-6);
        params
    }

    #[test]
    fn last_gap_comes_from_the_final_family() {
        let params = separable_gap_params();
        let cfg = SimConfig {
            min_users: 300,
            max_users: Some(300),
            ..config()
        };
        let mut rng = StdRng::seed_from_u64(31);
        let events = simulate_thread_m1(&mut rng, "G", &params, &cfg).unwrap();

        let mut by_user: HashMap<&str, Vec<f64>> = HashMap::new();
        for r in &events {
            by_user.entry(r.user_id.as_str()).or_default().push(r.time);
        }

        let mut two_comment_users = 0;
        let mut three_comment_users = 0;
        for times in by_user.values() {
            let steps: Vec<f64> = times.windows(2).map(|w| w[1] - w[0]).collect();
            let Some((last, regular)) = steps.split_last() else {
                continue;
            };
            for step in regular {
                assert!((step - 0.2).abs() < 1e-3, "regular step {step}");
            }
            // Five or more kept events can be a longer timeline cut by the window.
            if times.len() < 5 {
                assert!((last - 0.05).abs() < 1e-3, "final step {last} in {times:?}");
            }
            match times.len() {
                2 => two_comment_users += 1,
                3 => three_comment_users += 1,
                _ => {}
            }
        }
        // N = 2 draws no regular gap, only the final one; N = 3 draws one of each.
        assert!(two_comment_users > 0);
        assert!(three_comment_users > 0);
    }

    #[test]
    fn single_thread_draw_is_deterministic() {
        let params = test_params();
        let cfg = config();
        let mut a = StdRng::seed_from_u64(5);
        let mut b = StdRng::seed_from_u64(5);
        let ra = simulate_thread_m1(&mut a, "X", &params, &cfg).unwrap();
        let rb = simulate_thread_m1(&mut b, "X", &params, &cfg).unwrap();
        assert_eq!(ra, rb);
    }
}
