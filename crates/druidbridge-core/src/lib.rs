//! druidbridge core: transport-agnostic types shared by the exporter.
//!
//! This crate defines the emitter wire format, host token parsing, the
//! dimension schema and series identity, and the error surface. It carries
//! no runtime or HTTP dependencies so it can be reused by tooling and tests.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed emitter input surfaces as `BridgeError` or degrades to empty
//! values, never as a crash.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;
pub mod schema;
pub mod series;

/// Shared result type.
pub use error::{BridgeError, Result};
pub use schema::{MetricKind, MetricSchema, SchemaRegistry};
pub use series::{LabelSet, SeriesKey};
