//! Empirical CDF tables.
//!
//! - time grid construction and validation (`grid`)
//! - per-thread share-of-comments estimation (`estimator`)

pub mod estimator;
pub mod grid;

pub use estimator::*;
pub use grid::*;
