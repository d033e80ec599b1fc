//! Exporter config loader (strict parsing) and command-line overrides.

pub mod cli;
pub mod schema;

use std::fs;
use std::io::ErrorKind;

use druidbridge_core::error::{BridgeError, Result};

pub use cli::Cli;
pub use schema::{DruidSection, ExporterConfig, ExporterSection, LogFormat, LogSection};

pub fn load_from_file(path: &str) -> Result<ExporterConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| BridgeError::Config(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

/// Like `load_from_file`, but a missing file yields the defaults.
pub fn load_optional(path: &str) -> Result<ExporterConfig> {
    match fs::read_to_string(path) {
        Ok(s) => load_from_str(&s),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(%path, "config file not found, using defaults");
            Ok(ExporterConfig::default())
        }
        Err(e) => Err(BridgeError::Config(format!("read config failed ({path}): {e}"))),
    }
}

pub fn load_from_str(s: &str) -> Result<ExporterConfig> {
    let cfg: ExporterConfig = serde_yaml::from_str(s)
        .map_err(|e| BridgeError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
