//! Discrete power-law exponent estimation.
//!
//! Uses the continuous approximation to the discrete maximum-likelihood
//! estimator (Clauset, Shalizi & Newman 2009, eq. 3.7):
//!
//! `gamma = 1 + n / Σ ln(x_i / (xmin - 1/2))`, over all `x_i >= xmin`.
//!
//! The approximation is good for `xmin` of roughly 6 and above; below that it
//! underestimates the exponent.

use crate::error::AppError;

/// Estimate the exponent `gamma` of the tail `x >= xmin`.
pub fn fit_power_law(data: &[f64], xmin: f64) -> Result<f64, AppError> {
    if !(xmin.is_finite() && xmin > 0.5) {
        return Err(AppError::config(format!(
            "Power-law xmin={xmin} must be finite and > 0.5."
        )));
    }

    let shifted = xmin - 0.5;
    let mut n = 0usize;
    let mut log_sum = 0.0;
    for &x in data.iter().filter(|x| x.is_finite() && **x >= xmin) {
        n += 1;
        log_sum += (x / shifted).ln();
    }

    if n == 0 {
        return Err(AppError::data(format!("No observations at or above xmin={xmin}.")));
    }
    if !(log_sum > 0.0) {
        return Err(AppError::data("Power-law tail is degenerate (zero log-sum)."));
    }

    Ok(1.0 + n as f64 / log_sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::sample_user_count;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn closed_form_on_small_sample() {
        // ln(2) + ln(4) + ln(8) = 6 ln 2.
        let gamma = fit_power_law(&[1.0, 2.0, 4.0], 1.0).unwrap();
        assert!((gamma - (1.0 + 0.5 / std::f64::consts::LN_2)).abs() < 1e-12);
    }

    #[test]
    fn values_below_xmin_are_ignored() {
        let with_noise = fit_power_law(&[0.2, 3.0, 1.0, 2.0, 4.0], 1.0).unwrap();
        let clean = fit_power_law(&[3.0, 1.0, 2.0, 4.0], 1.0).unwrap();
        assert_eq!(with_noise, clean);
    }

    #[test]
    fn recovers_exponent_of_sampled_user_counts() {
        let mut rng = StdRng::seed_from_u64(99);
        let counts: Vec<f64> = sample_user_count(&mut rng, 2.5, 50, 20_000)
            .unwrap()
            .into_iter()
            .map(|c| c as f64)
            .collect();
        let gamma = fit_power_law(&counts, 50.0).unwrap();
        assert!((gamma - 2.5).abs() < 0.15, "gamma={gamma}");
    }

    #[test]
    fn rejects_degenerate_inputs() {
        assert!(fit_power_law(&[1.0, 2.0], 0.5).is_err());
        assert!(fit_power_law(&[1.0, 2.0], 10.0).is_err());
        assert!(fit_power_law(&[], 1.0).is_err());
    }
}
