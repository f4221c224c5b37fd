//! Parameter estimation from an observed dataset.
//!
//! Responsibilities:
//!
//! - extract fitting inputs from observed records (`observed`)
//! - power-law exponent of users per thread (`power_law`)
//! - four-parameter Beta of first comment times (`beta`)

pub mod beta;
pub mod observed;
pub mod power_law;

pub use beta::*;
pub use observed::*;
pub use power_law::*;
