//! Logging setup.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{LogFormat, LogSection};

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init(log: &LogSection) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt().with_env_filter(filter);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.with_ansi(false).init(),
    }
}
