//! Host resolution for the `host` label.
//!
//! Reverse DNS behind a TTL cache. Lookups go through the `ReverseLookup`
//! trait so tests can count and script them.

pub mod dns;

pub use dns::{HostResolver, ReverseLookup, SystemLookup};
