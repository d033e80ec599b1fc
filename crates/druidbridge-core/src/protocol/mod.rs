//! Emitter wire formats.
//!
//! - Emitted batches: JSON arrays of loosely typed metric events.
//! - Host tokens: `address[:port]` strings carried in the `host` field.
//!
//! All parsers are panic-free: a malformed batch is reported as
//! `BridgeError`, and malformed fields inside a well-formed batch degrade to
//! empty strings or zero instead of failing the record.

pub mod emitted;
pub mod host;
