//! Time grids for ECDF evaluation.
//!
//! The estimator accepts any caller-supplied grid as long as it is non-empty,
//! finite, and strictly increasing. Duplicate grid values would produce
//! duplicate `(post_id, grid value)` keys and break the loss join.

use crate::error::AppError;

/// Generate `steps` evenly spaced points between `start` and `end` (inclusive).
pub fn linear_grid(start: f64, end: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(start.is_finite() && end.is_finite() && end > start) {
        return Err(AppError::config(format!(
            "Invalid grid range: start={start}, end={end} (must be finite and end>start)."
        )));
    }
    if steps < 2 {
        return Err(AppError::config("Grid steps must be >= 2."));
    }

    let step = (end - start) / (steps as f64 - 1.0);
    let mut out = Vec::with_capacity(steps);
    for i in 0..steps - 1 {
        out.push(start + step * i as f64);
    }
    out.push(end);
    Ok(out)
}

/// Parse a comma-separated list of grid values (e.g. `0.1,0.25,0.5`).
pub fn parse_grid(text: &str) -> Result<Vec<f64>, AppError> {
    let grid = text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .map_err(|e| AppError::config(format!("Invalid grid value '{s}': {e}")))
        })
        .collect::<Result<Vec<f64>, AppError>>()?;
    validate_grid(&grid)?;
    Ok(grid)
}

pub fn validate_grid(grid: &[f64]) -> Result<(), AppError> {
    if grid.is_empty() {
        return Err(AppError::config("Time grid is empty."));
    }
    if let Some(bad) = grid.iter().find(|v| !v.is_finite()) {
        return Err(AppError::config(format!("Time grid contains non-finite value {bad}.")));
    }
    if let Some(w) = grid.windows(2).find(|w| w[1] <= w[0]) {
        return Err(AppError::config(format!(
            "Time grid must be strictly increasing ({} is followed by {}).",
            w[0], w[1]
        )));
    }
    Ok(())
}
