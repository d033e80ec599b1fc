//! Emitter ingestion: batch decoding, per-record routing, and the HTTP route.

pub mod handler;
pub mod http;

pub use handler::{IngestReport, Ingestor};
