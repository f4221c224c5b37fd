//! Parameter bundle and run report JSON files.
//!
//! The bundle is a flat JSON object keyed by the parameter names
//! (`gamma`, `a`, `b`, ..., `kscale`). Validation happens during
//! deserialization, so a file that loads is safe to simulate with.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{SimConfig, SimParams};
use crate::error::AppError;
use crate::fit::ObservedFit;
use crate::loss::LossReport;

/// Summary of an `evaluate` run, written as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub params: SimParams,
    pub config: SimConfig,
    pub grid: Vec<f64>,
    pub threads: usize,
    pub simulated_events: usize,
    pub observed_events: usize,
    pub loss: LossReport,
}

/// Read a parameter bundle.
pub fn read_params_json(path: &Path) -> Result<SimParams, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open parameter JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::config(format!("Invalid parameter JSON: {e}")))
}

/// Write a parameter bundle.
pub fn write_params_json(path: &Path, params: &SimParams) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create parameter JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, params)
        .map_err(|e| AppError::config(format!("Failed to write parameter JSON: {e}")))
}

/// Write a run report.
pub fn write_report_json(path: &Path, report: &RunReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create report JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::config(format!("Failed to write report JSON: {e}")))
}

/// Write the result of `fit`.
pub fn write_fit_json(path: &Path, fit: &ObservedFit) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create fit JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, fit).map_err(|e| AppError::config(format!("Failed to write fit JSON: {e}")))
}
