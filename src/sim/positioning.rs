//! Global positioning of follow-up comments (model M2).
//!
//! Every user starts with a slot list `[T0, ?, ?, ...]`. Each pass resolves
//! exactly one placeholder:
//!
//! 1. Candidates are the lists whose last slot is still unresolved. The one
//!    with the smallest most-recent resolved value goes next; ties go to the
//!    lowest user index.
//! 2. A rank quantile `k ~ Beta4(ka, kb, kloc, kscale)` becomes a step count
//!    `K = floor(k * total_slots)`. Starting at the candidate's most-recent
//!    value in the sorted global timeline, we walk `K` steps forward, taking
//!    one extra step whenever we land on a value that an earlier pass produced.
//!    Walking off the end clamps to the maximum.
//! 3. A gap `g ~ Burr3(c, d, l, s)` is drawn. With `room = target - elapsed`
//!    (elapsed = sum of the user's resolved slots so far), the slot becomes
//!    `g` when `room < 0.5 g` or `room > 10 g`, and `target` otherwise.
//!
//! Snapped targets are absolute times, yet downstream they are cumulatively
//! summed exactly like gaps. That mix is reproduced as-is.

use std::collections::HashSet;

use rand::Rng;
use rand_distr::Distribution;
use tracing::{trace, warn};

use crate::domain::SimParams;
use crate::error::AppError;
use crate::sampling::{Beta4, Burr3};

/// One comment slot: resolved value or placeholder.
pub type Slot = Option<f64>;

/// Summary of a completed positioning run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositioningOutcome {
    pub passes: usize,
    /// Slots set to the global timeline target.
    pub snapped: usize,
    /// Slots set to the drawn gap.
    pub paced: usize,
}

#[derive(Debug, Clone)]
pub struct PositioningEngine {
    gap: Burr3,
    quantile: Beta4,
    max_passes: usize,
}

impl PositioningEngine {
    pub fn new(params: &SimParams, max_passes: usize) -> Result<Self, AppError> {
        Ok(Self {
            gap: Burr3::new(params.c, params.d, params.l, params.s)?,
            quantile: Beta4::new(params.ka, params.kb, params.kloc, params.kscale)?,
            max_passes,
        })
    }

    /// Resolve every placeholder in `lists`, in place.
    ///
    /// Fails with a convergence error once `max_passes` passes have run and a
    /// placeholder is still open, or when a pass produces a non-finite value.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        lists: &mut [Vec<Slot>],
    ) -> Result<PositioningOutcome, AppError> {
        let mut state = TimelineState::new(lists);
        let mut outcome = PositioningOutcome::default();

        while let Some((user, recent)) = next_candidate(lists) {
            if outcome.passes >= self.max_passes {
                warn!(passes = outcome.passes, "positioning hit its pass budget");
                return Err(AppError::convergence(format!(
                    "Positioning did not converge within {} passes.",
                    self.max_passes
                )));
            }
            outcome.passes += 1;

            let k = self.quantile.sample(rng);
            let target = state.rank_target(recent, k);

            let list = &mut lists[user];
            let Some(slot) = list.iter().position(Option::is_none) else {
                continue;
            };
            let elapsed: f64 = list[..slot].iter().flatten().sum();
            let gap = self.gap.sample(rng);
            let (value, snapped) = resolve_slot(target, elapsed, gap);

            if !value.is_finite() {
                return Err(AppError::convergence(format!(
                    "Positioning produced a non-finite slot value (target={target}, gap={gap})."
                )));
            }
            if snapped {
                outcome.snapped += 1;
            } else {
                outcome.paced += 1;
            }
            trace!(user, slot, target, gap, value, "slot resolved");

            list[slot] = Some(value);
            state.record(value);
        }

        Ok(outcome)
    }
}

/// Choose the user whose frontier is open and whose latest resolved value is
/// smallest. Returns the user index and that value.
pub(crate) fn next_candidate(lists: &[Vec<Slot>]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (user, list) in lists.iter().enumerate() {
        if !matches!(list.last(), Some(None)) {
            continue;
        }
        let Some(recent) = list.iter().rev().find_map(|s| *s) else {
            continue;
        };
        match best {
            Some((_, current)) if recent >= current => {}
            _ => best = Some((user, recent)),
        }
    }
    best
}

/// Pick between the drawn gap and the global target. The flag is `true` for a snap.
pub(crate) fn resolve_slot(target: f64, elapsed: f64, gap: f64) -> (f64, bool) {
    let room = target - elapsed;
    if room < 0.5 * gap || room > 10.0 * gap {
        (gap, false)
    } else {
        (target, true)
    }
}

/// Engine-local state for one `resolve` call.
#[derive(Debug, Clone)]
pub(crate) struct TimelineState {
    /// Every resolved value across all users, ascending (duplicates kept).
    timeline: Vec<f64>,
    /// Values produced by earlier passes, keyed by bit pattern.
    positioned: HashSet<u64>,
    /// Total slot count across users (`sum N_i`).
    total_slots: usize,
}

impl TimelineState {
    pub fn new(lists: &[Vec<Slot>]) -> Self {
        let mut timeline: Vec<f64> = lists.iter().flatten().flatten().copied().collect();
        timeline.sort_by(f64::total_cmp);
        Self {
            timeline,
            positioned: HashSet::new(),
            total_slots: lists.iter().map(Vec::len).sum(),
        }
    }

    /// Walk forward from `recent` by `floor(k * total_slots)` ranks.
    ///
    /// `recent` must already be on the timeline.
    pub fn rank_target(&self, recent: f64, k: f64) -> f64 {
        let len = self.timeline.len();
        let steps = (k * self.total_slots as f64).floor();
        let steps = if steps > 0.0 { steps as usize } else { 0 };

        let mut idx = self.timeline.partition_point(|v| *v < recent);
        for _ in 0..steps {
            idx += 1;
            if idx >= len {
                break;
            }
            if self.positioned.contains(&bits(self.timeline[idx])) {
                idx += 1;
            }
        }

        self.timeline[idx.min(len.saturating_sub(1))]
    }

    pub fn record(&mut self, value: f64) {
        let at = self.timeline.partition_point(|v| *v < value);
        self.timeline.insert(at, value);
        self.positioned.insert(bits(value));
    }

    #[cfg(test)]
    fn with_timeline(timeline: Vec<f64>, total_slots: usize) -> Self {
        Self {
            timeline,
            positioned: HashSet::new(),
            total_slots,
        }
    }
}

fn bits(value: f64) -> u64 {
    // 0.0 and -0.0 compare equal, so they share a key.
    if value == 0.0 { 0 } else { value.to_bits() }
}
