//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the validated parameter bundle (`SimParams`)
//! - event and ECDF records shared by simulation, estimation, and IO
//! - run configuration (`SimConfig`, `ModelKind`)

pub mod params;
pub mod types;

pub use params::*;
pub use types::*;
