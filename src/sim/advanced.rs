//! Positioned thread model (M2).
//!
//! Draws the same per-user skeleton as M1, but every comment after the first
//! starts as a placeholder that the `PositioningEngine` fills in against the
//! thread-wide timeline.

use rand::rngs::StdRng;
use tracing::debug;

use crate::domain::{EventRecord, SimConfig, SimParams};
use crate::error::AppError;
use crate::sampling::sample_comment_count;
use crate::sim::positioning::{PositioningEngine, Slot};
use crate::sim::threads::{draw_skeleton, emit_user_events};

/// Simulate one thread with globally positioned follow-up comments.
pub fn simulate_thread_m2(
    rng: &mut StdRng,
    post_id: &str,
    params: &SimParams,
    config: &SimConfig,
) -> Result<Vec<EventRecord>, AppError> {
    let skeleton = draw_skeleton(rng, params, config)?;
    let extra = sample_comment_count(rng, params.alpha, params.lambda, skeleton.user_count())?;

    let mut lists: Vec<Vec<Slot>> = skeleton
        .initial_times
        .iter()
        .zip(&extra)
        .map(|(&t0, &n)| {
            let mut slots = vec![None; n as usize + 1];
            slots[0] = Some(t0);
            slots
        })
        .collect();

    let engine = PositioningEngine::new(params, config.max_positioning_passes)?;
    let outcome = engine
        .resolve(rng, &mut lists)
        .map_err(|e| AppError::new(e.kind(), format!("Thread {post_id}: {}", e.message())))?;

    let mut out = Vec::new();
    for (user, slots) in lists.into_iter().enumerate() {
        emit_user_events(post_id, user, slots, &mut out);
    }

    debug!(
        post_id,
        users = skeleton.user_count(),
        passes = outcome.passes,
        snapped = outcome.snapped,
        paced = outcome.paced,
        events = out.len(),
        "M2 thread simulated"
    );
    Ok(out)
}
