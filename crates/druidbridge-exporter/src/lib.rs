//! druidbridge exporter library entry.
//!
//! This crate wires the dimension schema, metric store, host resolver,
//! liveness tracker, ingestion handler, and Druid API collector into an HTTP
//! service. It is consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod collector;
pub mod config;
pub mod ingest;
pub mod liveness;
pub mod obs;
pub mod ops;
pub mod resolve;
pub mod router;
pub mod store;
pub mod telemetry;
