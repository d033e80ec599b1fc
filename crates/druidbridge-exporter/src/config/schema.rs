use std::net::SocketAddr;

use serde::Deserialize;
use druidbridge_core::error::{BridgeError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub exporter: ExporterSection,

    #[serde(default)]
    pub log: LogSection,

    #[serde(default)]
    pub druid: Option<DruidSection>,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            exporter: ExporterSection::default(),
            log: LogSection::default(),
            druid: None,
        }
    }
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(BridgeError::Config(format!("unsupported config version {}", self.version)));
        }

        self.exporter.validate()?;
        if let Some(druid) = &self.druid {
            druid.validate()?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Idle minutes before a series is evicted; also the sweep period.
    #[serde(default = "default_metrics_cleanup_ttl_minutes")]
    pub metrics_cleanup_ttl_minutes: u64,

    #[serde(default = "default_dimension_file_path")]
    pub dimension_file_path: String,

    #[serde(default = "default_dns_cache_ttl_secs")]
    pub dns_cache_ttl_secs: u64,
}

impl Default for ExporterSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            metrics_cleanup_ttl_minutes: default_metrics_cleanup_ttl_minutes(),
            dimension_file_path: default_dimension_file_path(),
            dns_cache_ttl_secs: default_dns_cache_ttl_secs(),
        }
    }
}

impl ExporterSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !(1..=24 * 60).contains(&self.metrics_cleanup_ttl_minutes) {
            return Err(BridgeError::Config(
                "exporter.metrics_cleanup_ttl_minutes must be between 1 and 1440".into(),
            ));
        }
        if self.dns_cache_ttl_secs == 0 {
            return Err(BridgeError::Config("exporter.dns_cache_ttl_secs must be at least 1".into()));
        }
        if self.dimension_file_path.is_empty() {
            return Err(BridgeError::Config("exporter.dimension_file_path must not be empty".into()));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| BridgeError::Config(format!("exporter.listen must be a valid SocketAddr: {e}")))
    }
}

fn default_version() -> u32 {
    1
}
fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_metrics_cleanup_ttl_minutes() -> u64 {
    5
}
fn default_dimension_file_path() -> String {
    "dimensionMap.json".into()
}
fn default_dns_cache_ttl_secs() -> u64 {
    300
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSection {
    /// `tracing` filter directive, e.g. `info` or `druidbridge_exporter=debug`.
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

/// Druid API collector. Absent section disables it.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DruidSection {
    /// Router or coordinator base URL.
    pub uri: String,

    #[serde(default = "default_stuck_task_threshold_minutes")]
    pub stuck_task_threshold_minutes: f64,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl DruidSection {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            stuck_task_threshold_minutes: default_stuck_task_threshold_minutes(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.uri.starts_with("http://") || self.uri.starts_with("https://")) {
            return Err(BridgeError::Config("druid.uri must be an http(s) URL".into()));
        }
        if !self.stuck_task_threshold_minutes.is_finite() || self.stuck_task_threshold_minutes < 0.0 {
            return Err(BridgeError::Config(
                "druid.stuck_task_threshold_minutes must be a non-negative number".into(),
            ));
        }
        if !(100..=60000).contains(&self.request_timeout_ms) {
            return Err(BridgeError::Config(
                "druid.request_timeout_ms must be between 100 and 60000".into(),
            ));
        }
        Ok(())
    }
}

fn default_stuck_task_threshold_minutes() -> f64 {
    90.0
}
fn default_request_timeout_ms() -> u64 {
    5000
}
