//! Shared error type across druidbridge crates.

use thiserror::Error;

/// Stable error codes, used in logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Malformed input from the emitter.
    BadRequest,
    /// Dimension schema rejected at load time.
    InvalidSchema,
    /// Exporter configuration rejected.
    Config,
    /// Upstream Druid API failure.
    Upstream,
    /// Internal error.
    Internal,
}

impl ClientCode {
    /// String representation used in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::InvalidSchema => "INVALID_SCHEMA",
            ClientCode::Config => "CONFIG",
            ClientCode::Upstream => "UPSTREAM",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Unified error type used by core and exporter.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    #[error("config: {0}")]
    Config(String),
    #[error("upstream: {0}")]
    Upstream(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Map the error to its stable code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            BridgeError::BadRequest(_) => ClientCode::BadRequest,
            BridgeError::InvalidSchema(_) => ClientCode::InvalidSchema,
            BridgeError::Config(_) => ClientCode::Config,
            BridgeError::Upstream(_) => ClientCode::Upstream,
            BridgeError::Internal(_) => ClientCode::Internal,
        }
    }
}
