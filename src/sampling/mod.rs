//! Random variate generation for the generative thread model.
//!
//! - parametric families as `rand_distr::Distribution` impls (`variates`)
//! - batch draws sized explicitly by the caller (`sample_*` functions)

pub mod variates;

pub use variates::*;
