//! Input/output helpers.
//!
//! - CSV ingest of observed or simulated records (`ingest`)
//! - record and ECDF CSV exports (`export`)
//! - parameter bundle and run report JSON (`params`)

pub mod export;
pub mod ingest;
pub mod params;

pub use export::*;
pub use ingest::*;
pub use params::*;
