//! Four-parameter Beta estimation by the method of moments.
//!
//! Non-positive values are dropped first. When every remaining value lies in
//! `(0, 1)` the support is fixed to the unit interval (`loc = 0`, `scale = 1`);
//! otherwise it spans the sample range, padded on both sides so no value sits
//! exactly on the boundary. Shapes then follow from the mean `m` and variance
//! `v` of the rescaled sample:
//!
//! `a = m * (m(1-m)/v - 1)`, `b = (1-m) * (m(1-m)/v - 1)`.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

const RANGE_PAD: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaFit {
    pub a: f64,
    pub b: f64,
    pub loc: f64,
    pub scale: f64,
}

pub fn fit_beta(data: &[f64]) -> Result<BetaFit, AppError> {
    let values: Vec<f64> = data.iter().copied().filter(|x| x.is_finite() && *x > 0.0).collect();
    if values.len() < 2 {
        return Err(AppError::data(format!(
            "Beta fit needs at least 2 positive values (got {}).",
            values.len()
        )));
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (loc, scale) = if max < 1.0 {
        (0.0, 1.0)
    } else {
        let range = max - min;
        if range <= 0.0 {
            return Err(AppError::data("Beta fit needs values with non-zero spread."));
        }
        (min - RANGE_PAD * range, range * (1.0 + 2.0 * RANGE_PAD))
    };

    let n = values.len() as f64;
    let unit: Vec<f64> = values.iter().map(|x| (x - loc) / scale).collect();
    let mean = unit.iter().sum::<f64>() / n;
    let var = unit.iter().map(|u| (u - mean).powi(2)).sum::<f64>() / n;

    let bound = mean * (1.0 - mean);
    if !(var > 0.0 && var < bound) {
        return Err(AppError::data(format!(
            "Beta fit failed: variance {var:.3e} outside (0, {bound:.3e})."
        )));
    }

    let common = bound / var - 1.0;
    Ok(BetaFit {
        a: mean * common,
        b: (1.0 - mean) * common,
        loc,
        scale,
    })
}
