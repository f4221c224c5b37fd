//! `convsim` library crate.
//!
//! The binary (`convsim`) is a thin wrapper around this library so that:
//!
//! - simulation and estimation are testable without spawning processes
//! - a parameter search can call the evaluation pipeline directly

pub mod app;
pub mod cli;
pub mod domain;
pub mod ecdf;
pub mod error;
pub mod fit;
pub mod io;
pub mod logging;
pub mod loss;
pub mod report;
pub mod sampling;
pub mod sim;
