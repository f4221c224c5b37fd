//! Terminal reporting for simulation and evaluation runs.

pub mod format;

pub use format::*;
