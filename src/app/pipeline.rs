//! Shared "evaluate" pipeline logic used by the CLI front-end.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! simulate -> ECDF (simulated + observed) -> join -> loss
//!
//! Parameter searches can call `run_evaluation` repeatedly with the same
//! observed table and grid.

use tracing::info;

use crate::domain::{EcdfRow, EventRecord, SimConfig, SimParams, SimulationOutput};
use crate::ecdf::compute_ecdf;
use crate::error::AppError;
use crate::loss::{LossReport, ThreadLoss, compare, loss_by_thread};
use crate::sim::simulate;

/// All computed outputs of a single evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationOutput {
    pub simulation: SimulationOutput,
    pub sim_ecdf: Vec<EcdfRow>,
    pub obs_ecdf: Vec<EcdfRow>,
    pub loss: LossReport,
    pub thread_losses: Vec<ThreadLoss>,
}

/// Simulate, estimate both ECDF tables, and score them.
pub fn run_evaluation(
    observed: &[EventRecord],
    params: &SimParams,
    config: &SimConfig,
    grid: &[f64],
) -> Result<EvaluationOutput, AppError> {
    // 1) Simulate the selected threads.
    let simulation = simulate(observed, params, config)?;

    // 2) ECDF on both sides, same grid.
    let sim_ecdf = compute_ecdf(&simulation.simulated, grid)?;
    let obs_ecdf = compute_ecdf(&simulation.observed, grid)?;

    // 3) Join and score.
    let loss = compare(&sim_ecdf, &obs_ecdf);
    let thread_losses = loss_by_thread(&sim_ecdf, &obs_ecdf);

    info!(
        loss = loss.loss,
        joined = loss.joined_rows,
        threads = simulation.threads.len(),
        "evaluation finished"
    );

    Ok(EvaluationOutput {
        simulation,
        sim_ecdf,
        obs_ecdf,
        loss,
        thread_losses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ModelKind, test_params};
    use crate::ecdf::linear_grid;
    use crate::sim::observed_fixture;

    #[test]
    fn evaluation_runs_for_both_models() {
        let observed = observed_fixture(&[("P1", 6), ("P2", 9), ("P3", 4)]);
        let grid = linear_grid(0.0, 1.0, 21).unwrap();
        for model in [ModelKind::M1, ModelKind::M2] {
            let config = SimConfig {
                model,
                min_users: 3,
                max_users: Some(40),
                ..SimConfig::default()
            };
            let run = run_evaluation(&observed, &test_params(), &config, &grid).unwrap();
            assert!(run.loss.loss.is_finite() && run.loss.loss >= 0.0);
            assert_eq!(run.obs_ecdf.len(), 3 * grid.len());
            assert!(run.loss.joined_rows <= 3 * grid.len());
            let per_thread: f64 = run.thread_losses.iter().map(|t| t.loss).sum();
            assert!((per_thread - run.loss.loss).abs() < 1e-9);
        }
    }

    #[test]
    fn subsampling_limits_coverage() {
        let observed = observed_fixture(&[("P1", 6), ("P2", 9), ("P3", 4), ("P4", 2)]);
        let grid = linear_grid(0.0, 1.0, 11).unwrap();
        let config = SimConfig {
            num_threads: Some(2),
            min_users: 2,
            max_users: Some(40),
            ..SimConfig::default()
        };
        let run = run_evaluation(&observed, &test_params(), &config, &grid).unwrap();
        assert_eq!(run.obs_ecdf.len(), 2 * grid.len());
        assert!(run.loss.joined_rows <= 2 * grid.len());
    }

    #[test]
    fn identical_tables_score_zero() {
        let observed = observed_fixture(&[("P1", 6), ("P2", 3)]);
        let grid = linear_grid(0.0, 1.0, 11).unwrap();
        let ecdf = compute_ecdf(&observed, &grid).unwrap();
        assert_eq!(compare(&ecdf, &ecdf).loss, 0.0);
    }
}
