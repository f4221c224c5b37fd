//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs logging
//! - dispatches to the subcommand handlers
//!
//! Reports go to stdout, logs to stderr.

use std::io::Write;

use chrono::Utc;
use clap::Parser;
use tracing::info;

use crate::cli::{Command, EcdfArgs, EvaluateArgs, FitArgs, GridArgs, LossArgs, SimArgs, SimulateArgs};
use crate::domain::{EventRecord, SimConfig, SimParams};
use crate::error::AppError;
use crate::io::RunReport;

pub mod pipeline;

/// Entry point for the `convsim` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is fine; flags and the process environment still apply.
    dotenvy::dotenv().ok();

    let cli = crate::cli::Cli::parse();
    crate::logging::init_logging(cli.log_level, cli.log_format);

    match cli.command {
        Command::Simulate(args) => handle_simulate(args),
        Command::Ecdf(args) => handle_ecdf(args),
        Command::Loss(args) => handle_loss(args),
        Command::Evaluate(args) => handle_evaluate(args),
        Command::Fit(args) => handle_fit(args),
    }
}

/// Observed records, parameters, and config shared by simulating commands.
struct SimInputs {
    observed: Vec<EventRecord>,
    params: SimParams,
    config: SimConfig,
}

fn load_sim_inputs(args: &SimArgs) -> Result<SimInputs, AppError> {
    let params = crate::io::read_params_json(&args.params)?;
    let observed = crate::io::load_records(&args.observed)?.records;
    Ok(SimInputs {
        observed,
        params,
        config: args.to_config(),
    })
}

fn resolve_grid(args: &GridArgs) -> Result<Vec<f64>, AppError> {
    match &args.grid {
        Some(text) => crate::ecdf::parse_grid(text),
        None => crate::ecdf::linear_grid(args.grid_start, args.grid_end, args.grid_steps),
    }
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let inputs = load_sim_inputs(&args.sim)?;
    let sim = crate::sim::simulate(&inputs.observed, &inputs.params, &inputs.config)?;

    println!(
        "{}",
        crate::report::format_simulation_summary(&sim, &inputs.params, &inputs.config)
    );

    if let Some(path) = &args.out {
        crate::io::write_records_csv(path, &sim.simulated)?;
        info!(path = %path.display(), rows = sim.simulated.len(), "simulated records written");
    }
    if let Some(path) = &args.out_observed {
        crate::io::write_records_csv(path, &sim.observed)?;
        info!(path = %path.display(), rows = sim.observed.len(), "observed subset written");
    }

    Ok(())
}

fn handle_ecdf(args: EcdfArgs) -> Result<(), AppError> {
    let grid = resolve_grid(&args.grid)?;
    let records = crate::io::load_records(&args.records)?.records;
    let rows = crate::ecdf::compute_ecdf(&records, &grid)?;

    match &args.out {
        Some(path) => {
            crate::io::write_ecdf_csv(path, &rows)?;
            info!(path = %path.display(), rows = rows.len(), "ECDF table written");
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            crate::io::write_ecdf(&mut lock, &rows)?;
            lock.flush()
                .map_err(|e| AppError::config(format!("Failed to flush stdout: {e}")))?;
        }
    }

    Ok(())
}

fn handle_loss(args: LossArgs) -> Result<(), AppError> {
    let simulated = crate::io::read_ecdf_csv(&args.simulated)?;
    let observed = crate::io::read_ecdf_csv(&args.observed)?;
    let report = crate::loss::compare(&simulated, &observed);

    println!(
        "Loss: {:.6} (joined={} | unmatched simulated={} | unmatched observed={})",
        report.loss, report.joined_rows, report.unmatched_simulated, report.unmatched_observed
    );
    Ok(())
}

fn handle_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let grid = resolve_grid(&args.grid)?;
    let inputs = load_sim_inputs(&args.sim)?;
    let run = pipeline::run_evaluation(&inputs.observed, &inputs.params, &inputs.config, &grid)?;

    println!(
        "{}",
        crate::report::format_evaluation(&run, &inputs.params, &inputs.config, args.top)
    );

    if let Some(path) = &args.sim_ecdf {
        crate::io::write_ecdf_csv(path, &run.sim_ecdf)?;
    }
    if let Some(path) = &args.obs_ecdf {
        crate::io::write_ecdf_csv(path, &run.obs_ecdf)?;
    }
    if let Some(path) = &args.report {
        let report = RunReport {
            tool: format!("convsim {}", env!("CARGO_PKG_VERSION")),
            generated_at: Utc::now(),
            params: inputs.params,
            config: inputs.config.clone(),
            grid,
            threads: run.simulation.threads.len(),
            simulated_events: run.simulation.simulated.len(),
            observed_events: run.simulation.observed.len(),
            loss: run.loss,
        };
        crate::io::write_report_json(path, &report)?;
        info!(path = %path.display(), "run report written");
    }

    Ok(())
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let records = crate::io::load_records(&args.observed)?.records;
    let fit = crate::fit::fit_observed(&records, args.min_users)?;

    println!("{}", crate::report::format_observed_fit(&fit));

    if let Some(path) = &args.out {
        crate::io::write_fit_json(path, &fit)?;
    }
    if let (Some(base), Some(out)) = (&args.base_params, &args.params_out) {
        let base = crate::io::read_params_json(base)?;
        let updated = fit.apply_to(&base)?;
        crate::io::write_params_json(out, &updated)?;
        info!(path = %out.display(), "updated parameter bundle written");
    }

    Ok(())
}
