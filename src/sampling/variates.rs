//! Parametric families behind the thread simulators.
//!
//! Every family validates its parameters on construction and fails with a
//! config error; nothing is clamped into range silently.
//!
//! | family            | used for                          |
//! |-------------------|-----------------------------------|
//! | `PowerLaw`        | users per thread                  |
//! | `Beta4`           | first comment time, rank quantile |
//! | `ZeroInflatedExp` | extra comments per user           |
//! | `Burr3`           | gaps between comments             |

use rand::Rng;
use rand::distributions::Bernoulli;
use rand_distr::{Beta, Distribution, Exp};

use crate::error::AppError;

/// Pareto-type power law with scale `min` and tail index `gamma - 1`.
#[derive(Debug, Clone, Copy)]
pub struct PowerLaw {
    min: f64,
    inv_tail: f64,
}

impl PowerLaw {
    pub fn new(gamma: f64, min: f64) -> Result<Self, AppError> {
        if !(gamma.is_finite() && gamma > 1.0) {
            return Err(AppError::config(format!(
                "Power-law exponent gamma={gamma} must be finite and > 1."
            )));
        }
        if !(min.is_finite() && min > 0.0) {
            return Err(AppError::config(format!(
                "Power-law scale {min} must be finite and > 0."
            )));
        }
        Ok(Self {
            min,
            inv_tail: 1.0 / (gamma - 1.0),
        })
    }
}

impl Distribution<f64> for PowerLaw {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        // `1 - U` lies in (0, 1]; the floor only guards against a zero from
        // a generator that can return exactly 1.0.
        let u: f64 = rng.r#gen();
        let tail = (1.0 - u).max(f64::MIN_POSITIVE);
        self.min * tail.powf(-self.inv_tail)
    }
}

/// Four-parameter Beta: `loc + scale * Beta(a, b)`.
#[derive(Debug, Clone)]
pub struct Beta4 {
    inner: Beta<f64>,
    loc: f64,
    scale: f64,
}

impl Beta4 {
    pub fn new(a: f64, b: f64, loc: f64, scale: f64) -> Result<Self, AppError> {
        if !(a.is_finite() && a > 0.0 && b.is_finite() && b > 0.0) {
            return Err(AppError::config(format!(
                "Beta shapes a={a}, b={b} must be finite and > 0."
            )));
        }
        if !(scale.is_finite() && scale > 0.0 && loc.is_finite()) {
            return Err(AppError::config(format!(
                "Beta loc={loc}, scale={scale} must be finite with scale > 0."
            )));
        }
        let inner = Beta::new(a, b).map_err(|e| AppError::config(format!("Beta distribution error: {e}")))?;
        Ok(Self { inner, loc, scale })
    }
}

impl Distribution<f64> for Beta4 {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.loc + self.scale * self.inner.sample(rng)
    }
}

/// Zero-inflated, rounded exponential count.
///
/// With probability `alpha` the draw is 0; otherwise it is an exponential
/// with rate `lambda` rounded to the nearest integer.
#[derive(Debug, Clone)]
pub struct ZeroInflatedExp {
    inflate: Bernoulli,
    count: Exp<f64>,
}

impl ZeroInflatedExp {
    pub fn new(alpha: f64, lambda: f64) -> Result<Self, AppError> {
        if !(alpha.is_finite() && (0.0..=1.0).contains(&alpha)) {
            return Err(AppError::config(format!(
                "Zero-inflation probability alpha={alpha} must lie in [0, 1]."
            )));
        }
        if !(lambda.is_finite() && lambda > 0.0) {
            return Err(AppError::config(format!(
                "Exponential rate lambda={lambda} must be finite and > 0."
            )));
        }
        let inflate = Bernoulli::new(alpha)
            .map_err(|e| AppError::config(format!("Bernoulli distribution error: {e}")))?;
        let count = Exp::new(lambda)
            .map_err(|e| AppError::config(format!("Exponential distribution error: {e}")))?;
        Ok(Self { inflate, count })
    }
}

impl Distribution<u32> for ZeroInflatedExp {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        if self.inflate.sample(rng) {
            return 0;
        }
        // Float-to-int casts saturate, so a huge draw becomes u32::MAX.
        self.count.sample(rng).round().max(0.0) as u32
    }
}

/// Burr type III duration law, shifted by `loc` and stretched by `scale`.
///
/// CDF of the standard form: `F(x) = (1 + x^-c)^-d` for `x > 0`.
#[derive(Debug, Clone, Copy)]
pub struct Burr3 {
    c: f64,
    d: f64,
    loc: f64,
    scale: f64,
}

impl Burr3 {
    pub fn new(c: f64, d: f64, loc: f64, scale: f64) -> Result<Self, AppError> {
        if !(c.is_finite() && c > 0.0 && d.is_finite() && d > 0.0) {
            return Err(AppError::config(format!(
                "Burr shapes c={c}, d={d} must be finite and > 0."
            )));
        }
        if !(scale.is_finite() && scale > 0.0 && loc.is_finite()) {
            return Err(AppError::config(format!(
                "Burr loc={loc}, scale={scale} must be finite with scale > 0."
            )));
        }
        Ok(Self { c, d, loc, scale })
    }

    /// Inverse CDF of the standard form.
    fn quantile(&self, u: f64) -> f64 {
        (u.powf(-1.0 / self.d) - 1.0).powf(-1.0 / self.c)
    }
}

impl Distribution<f64> for Burr3 {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u: f64 = rng.r#gen();
        self.loc + self.scale * self.quantile(u)
    }
}

/// Draw `n` user counts, each rounded and never below `min_users`.
pub fn sample_user_count<R: Rng + ?Sized>(
    rng: &mut R,
    gamma: f64,
    min_users: usize,
    n: usize,
) -> Result<Vec<usize>, AppError> {
    let law = PowerLaw::new(gamma, min_users as f64)?;
    Ok((0..n)
        .map(|_| (law.sample(rng).round() as usize).max(min_users))
        .collect())
}

/// Draw `n` first-comment times.
pub fn sample_initial_time<R: Rng + ?Sized>(
    rng: &mut R,
    a: f64,
    b: f64,
    loc: f64,
    scale: f64,
    n: usize,
) -> Result<Vec<f64>, AppError> {
    let law = Beta4::new(a, b, loc, scale)?;
    Ok(law.sample_iter(rng).take(n).collect())
}

/// Draw `n` raw extra-comment counts (callers add 1 per user).
pub fn sample_comment_count<R: Rng + ?Sized>(
    rng: &mut R,
    alpha: f64,
    lambda: f64,
    n: usize,
) -> Result<Vec<u32>, AppError> {
    let law = ZeroInflatedExp::new(alpha, lambda)?;
    Ok(law.sample_iter(rng).take(n).collect())
}

/// Draw `n` inter-comment gaps.
pub fn sample_duration<R: Rng + ?Sized>(
    rng: &mut R,
    c: f64,
    d: f64,
    l: f64,
    s: f64,
    n: usize,
) -> Result<Vec<f64>, AppError> {
    let law = Burr3::new(c, d, l, s)?;
    Ok(law.sample_iter(rng).take(n).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn user_counts_respect_floor() {
        let mut rng = StdRng::seed_from_u64(7);
        let counts = sample_user_count(&mut rng, 2.2, 5, 2_000).unwrap();
        assert_eq!(counts.len(), 2_000);
        assert!(counts.iter().all(|&c| c >= 5));
    }

    #[test]
    fn user_counts_decay_in_the_tail() {
        let mut rng = StdRng::seed_from_u64(11);
        let counts = sample_user_count(&mut rng, 2.5, 10, 20_000).unwrap();
        let near = counts.iter().filter(|&&c| (10..20).contains(&c)).count();
        let mid = counts.iter().filter(|&&c| (20..30).contains(&c)).count();
        let far = counts.iter().filter(|&&c| (30..40).contains(&c)).count();
        assert!(near > mid, "near={near} mid={mid}");
        assert!(mid > far, "mid={mid} far={far}");
    }

    #[test]
    fn full_inflation_yields_zero_counts() {
        let mut rng = StdRng::seed_from_u64(3);
        let counts = sample_comment_count(&mut rng, 1.0, 0.1, 500).unwrap();
        assert!(counts.iter().all(|&c| c == 0));
    }

    #[test]
    fn no_inflation_tracks_exponential_mean() {
        let mut rng = StdRng::seed_from_u64(5);
        let counts = sample_comment_count(&mut rng, 0.0, 0.25, 20_000).unwrap();
        let mean = counts.iter().map(|&c| c as f64).sum::<f64>() / counts.len() as f64;
        // Rounding an Exp(0.25) keeps the mean close to 4.
        assert!((mean - 4.0).abs() < 0.25, "mean={mean}");
    }

    #[test]
    fn initial_times_stay_in_support() {
        let mut rng = StdRng::seed_from_u64(9);
        let times = sample_initial_time(&mut rng, 0.5, 3.0, 0.1, 0.5, 1_000).unwrap();
        assert!(times.iter().all(|&t| (0.1..=0.6).contains(&t)));
    }

    #[test]
    fn burr_median_matches_closed_form() {
        // Median of the standard Burr III is (2^(1/d) - 1)^(-1/c).
        let (c, d) = (2.0, 1.5);
        let mut rng = StdRng::seed_from_u64(13);
        let mut draws = sample_duration(&mut rng, c, d, 0.0, 1.0, 20_001).unwrap();
        draws.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let median = draws[draws.len() / 2];
        let expected = (2f64.powf(1.0 / d) - 1.0).powf(-1.0 / c);
        assert!((median - expected).abs() / expected < 0.05, "median={median} expected={expected}");
    }

    #[test]
    fn durations_are_shifted_by_location() {
        let mut rng = StdRng::seed_from_u64(17);
        let draws = sample_duration(&mut rng, 1.0, 1.0, 0.3, 0.01, 200).unwrap();
        assert!(draws.iter().all(|&x| x >= 0.3));
    }

    #[test]
    fn zero_length_batches_are_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(sample_duration(&mut rng, 1.0, 1.0, 0.0, 1.0, 0).unwrap().is_empty());
    }

    #[test]
    fn invalid_parameters_fail_fast() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = sample_duration(&mut rng, 0.0, 1.0, 0.0, 1.0, 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(sample_initial_time(&mut rng, 1.0, 1.0, 0.0, 0.0, 3).is_err());
        assert!(sample_user_count(&mut rng, 1.0, 1, 3).is_err());
        assert!(sample_comment_count(&mut rng, 1.5, 1.0, 3).is_err());
        assert!(sample_comment_count(&mut rng, 0.5, -1.0, 3).is_err());
    }
}
