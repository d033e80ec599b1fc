use clap::Parser;

use druidbridge_core::error::Result;

use super::schema::{DruidSection, ExporterConfig, LogFormat};

/// Command line. Every flag falls back to an environment variable and, when
/// set, overrides the config file.
#[derive(Debug, Default, Parser)]
#[command(name = "druidbridge", version, about = "Bridges the Druid HTTP emitter into Prometheus metrics")]
pub struct Cli {
    /// YAML config file; a missing file means defaults.
    #[arg(long, env = "DRUIDBRIDGE_CONFIG", default_value = "druidbridge.yaml")]
    pub config: String,

    /// Port to listen on (binds 0.0.0.0).
    #[arg(short = 'p', long, env = "PORT")]
    pub port: Option<u16>,

    /// Log filter directive.
    #[arg(short = 'l', long = "log-level", env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    #[arg(short = 'f', long = "log-format", env = "LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,

    /// Minutes a series may go unreported before eviction.
    #[arg(long = "metrics-cleanup-ttl", env = "METRICS_CLEANUP_TTL")]
    pub metrics_cleanup_ttl: Option<u64>,

    /// Dimension document (JSON).
    #[arg(long = "dimension-file-path", env = "DIMENSION_FILE_PATH")]
    pub dimension_file_path: Option<String>,

    /// Druid router or coordinator URL; enables the API collector.
    #[arg(short = 'd', long = "druid-uri", env = "DRUID_URL")]
    pub druid_uri: Option<String>,

    #[arg(long = "druid-stuck-task-threshold-minutes", env = "DRUID_STUCK_TASK_THRESHOLD_MINUTES")]
    pub druid_stuck_task_threshold_minutes: Option<f64>,
}

impl Cli {
    /// Apply overrides on top of a loaded config and re-validate.
    pub fn apply(&self, mut cfg: ExporterConfig) -> Result<ExporterConfig> {
        if let Some(port) = self.port {
            cfg.exporter.listen = format!("0.0.0.0:{port}");
        }
        if let Some(level) = &self.log_level {
            cfg.log.level = level.clone();
        }
        if let Some(format) = self.log_format {
            cfg.log.format = format;
        }
        if let Some(ttl) = self.metrics_cleanup_ttl {
            cfg.exporter.metrics_cleanup_ttl_minutes = ttl;
        }
        if let Some(path) = &self.dimension_file_path {
            cfg.exporter.dimension_file_path = path.clone();
        }
        if let Some(uri) = &self.druid_uri {
            match cfg.druid.as_mut() {
                Some(d) => d.uri = uri.clone(),
                None => cfg.druid = Some(DruidSection::new(uri.clone())),
            }
        }
        if let (Some(threshold), Some(d)) = (self.druid_stuck_task_threshold_minutes, cfg.druid.as_mut()) {
            d.stuck_task_threshold_minutes = threshold;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}
