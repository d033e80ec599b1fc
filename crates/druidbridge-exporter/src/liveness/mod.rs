//! Series liveness: last-seen tracking and periodic eviction.
//!
//! Every series written to the store has a last-seen entry here. The sweep
//! removes entries older than the TTL together with their store series.

pub mod sweeper;
pub mod tracker;

pub use sweeper::SweepHandle;
pub use tracker::{LivenessTracker, SweepReport};
