//! Top-level facade crate for druidbridge.
//!
//! Re-exports core types and the exporter library so users can depend on a single crate.

pub mod core {
    pub use druidbridge_core::*;
}

pub mod exporter {
    pub use druidbridge_exporter::*;
}
