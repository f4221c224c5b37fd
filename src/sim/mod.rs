//! Thread simulation.
//!
//! Responsibilities:
//!
//! - choose which observed threads to simulate (`threads`)
//! - generate independent per-user timelines (`baseline`, model M1)
//! - interleave per-user skeletons through the positioning engine
//!   (`advanced` + `positioning`, model M2)
//!
//! Threads are simulated in parallel; each one owns an RNG seeded from the run
//! seed and its `post_id`, so output does not depend on scheduling.

pub mod advanced;
pub mod baseline;
pub mod positioning;
pub mod threads;

pub use advanced::simulate_thread_m2;
pub use baseline::simulate_thread_m1;
pub use positioning::{PositioningEngine, PositioningOutcome, Slot};
pub use threads::*;
