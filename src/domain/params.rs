//! The simulation parameter bundle.
//!
//! Parameters are grouped by the role they play in the generative model:
//!
//! - `gamma`: power-law exponent of the per-thread user count
//! - `a, b, loc, scale`: Beta law of each user's first comment time
//! - `alpha, lambda`: zero-inflated exponential law of extra comments per user
//! - `c, d, l, s`: Burr law of the gaps between a user's comments
//! - `cf, df, lf, sf`: Burr law of a user's final gap
//! - `ka, kb, kloc, kscale`: Beta law of the positioning rank quantile (M2)
//!
//! A `SimParams` value obtained through deserialization has already been
//! validated; hand-built values are validated again by the simulators.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Unvalidated bundle, exactly as it appears in a parameter JSON file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawParams {
    pub gamma: f64,
    pub a: f64,
    pub b: f64,
    pub loc: f64,
    pub scale: f64,
    pub alpha: f64,
    pub lambda: f64,
    pub c: f64,
    pub d: f64,
    pub l: f64,
    pub s: f64,
    pub cf: f64,
    pub df: f64,
    pub lf: f64,
    pub sf: f64,
    pub ka: f64,
    pub kb: f64,
    pub kloc: f64,
    pub kscale: f64,
}

/// Validated parameter bundle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawParams", into = "RawParams")]
pub struct SimParams {
    pub gamma: f64,
    pub a: f64,
    pub b: f64,
    pub loc: f64,
    pub scale: f64,
    pub alpha: f64,
    pub lambda: f64,
    pub c: f64,
    pub d: f64,
    pub l: f64,
    pub s: f64,
    pub cf: f64,
    pub df: f64,
    pub lf: f64,
    pub sf: f64,
    pub ka: f64,
    pub kb: f64,
    pub kloc: f64,
    pub kscale: f64,
}

impl SimParams {
    pub fn new(raw: RawParams) -> Result<Self, AppError> {
        let params = Self {
            gamma: raw.gamma,
            a: raw.a,
            b: raw.b,
            loc: raw.loc,
            scale: raw.scale,
            alpha: raw.alpha,
            lambda: raw.lambda,
            c: raw.c,
            d: raw.d,
            l: raw.l,
            s: raw.s,
            cf: raw.cf,
            df: raw.df,
            lf: raw.lf,
            sf: raw.sf,
            ka: raw.ka,
            kb: raw.kb,
            kloc: raw.kloc,
            kscale: raw.kscale,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check every family constraint; the first violation is reported.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.gamma.is_finite() && self.gamma > 1.0) {
            return Err(AppError::config(format!(
                "Invalid parameter gamma={} (must be finite and > 1).",
                self.gamma
            )));
        }
        if !(self.alpha.is_finite() && (0.0..=1.0).contains(&self.alpha)) {
            return Err(AppError::config(format!(
                "Invalid parameter alpha={} (must lie in [0, 1]).",
                self.alpha
            )));
        }

        let positive = [
            ("a", self.a),
            ("b", self.b),
            ("scale", self.scale),
            ("lambda", self.lambda),
            ("c", self.c),
            ("d", self.d),
            ("s", self.s),
            ("cf", self.cf),
            ("df", self.df),
            ("sf", self.sf),
            ("ka", self.ka),
            ("kb", self.kb),
            ("kscale", self.kscale),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(AppError::config(format!(
                    "Invalid parameter {name}={value} (must be finite and > 0)."
                )));
            }
        }

        let finite = [("loc", self.loc), ("l", self.l), ("lf", self.lf), ("kloc", self.kloc)];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(AppError::config(format!(
                    "Invalid parameter {name}={value} (must be finite)."
                )));
            }
        }

        Ok(())
    }
}

impl TryFrom<RawParams> for SimParams {
    type Error = AppError;

    fn try_from(raw: RawParams) -> Result<Self, Self::Error> {
        SimParams::new(raw)
    }
}

impl From<SimParams> for RawParams {
    fn from(p: SimParams) -> Self {
        RawParams {
            gamma: p.gamma,
            a: p.a,
            b: p.b,
            loc: p.loc,
            scale: p.scale,
            alpha: p.alpha,
            lambda: p.lambda,
            c: p.c,
            d: p.d,
            l: p.l,
            s: p.s,
            cf: p.cf,
            df: p.df,
            lf: p.lf,
            sf: p.sf,
            ka: p.ka,
            kb: p.kb,
            kloc: p.kloc,
            kscale: p.kscale,
        }
    }
}

#[cfg(test)]
pub(crate) fn test_params() -> SimParams {
    SimParams {
        gamma: 2.5,
        a: 0.6,
        b: 4.0,
        loc: 0.0,
        scale: 1.0,
        alpha: 0.4,
        lambda: 0.8,
        c: 1.5,
        d: 0.5,
        l: 0.0,
        s: 0.02,
        cf: 1.2,
        df: 0.6,
        lf: 0.0,
        sf: 0.05,
        ka: 1.0,
        kb: 5.0,
        kloc: 0.0,
        kscale: 0.2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn valid_bundle_passes() {
        assert!(test_params().validate().is_ok());
    }

    #[test]
    fn gamma_at_one_is_rejected() {
        let mut p = test_params();
        p.gamma = 1.0;
        let err = p.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.message().contains("gamma"));
    }

    #[test]
    fn non_positive_shape_is_rejected() {
        let mut p = test_params();
        p.kb = 0.0;
        let err = p.validate().unwrap_err();
        assert!(err.message().contains("kb"));
    }

    #[test]
    fn deserialization_validates() {
        let json = r#"{
            "gamma": 2.0, "a": 1.0, "b": 1.0, "loc": 0.0, "scale": -1.0,
            "alpha": 0.5, "lambda": 1.0, "c": 1.0, "d": 1.0, "l": 0.0, "s": 1.0,
            "cf": 1.0, "df": 1.0, "lf": 0.0, "sf": 1.0,
            "ka": 1.0, "kb": 1.0, "kloc": 0.0, "kscale": 1.0
        }"#;
        let err = serde_json::from_str::<SimParams>(json).unwrap_err();
        assert!(err.to_string().contains("scale"));
    }

    #[test]
    fn json_uses_bundle_names() {
        let json = serde_json::to_value(test_params()).unwrap();
        assert_eq!(json["lambda"], 0.8);
        assert_eq!(json["kscale"], 0.2);
        let back: SimParams = serde_json::from_value(json).unwrap();
        assert_eq!(back, test_params());
    }
}
