#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use druidbridge_exporter::config::{self, Cli, LogFormat};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
exporter:
  listen: "0.0.0.0:8080"
  metrics_cleanup_ttl: 5 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "CONFIG");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.exporter.listen, "0.0.0.0:8080");
    assert_eq!(cfg.exporter.metrics_cleanup_ttl_minutes, 5);
    assert_eq!(cfg.exporter.dimension_file_path, "dimensionMap.json");
    assert_eq!(cfg.log.format, LogFormat::Text);
    assert!(cfg.druid.is_none());
}

#[test]
fn ok_full_config() {
    let ok = r#"
version: 1
exporter:
  listen: "127.0.0.1:9100"
  metrics_cleanup_ttl_minutes: 10
  dimension_file_path: "/etc/druidbridge/dimensions.json"
  dns_cache_ttl_secs: 60
log:
  level: "druidbridge_exporter=debug"
  format: json
druid:
  uri: "http://druid-router:8888"
  stuck_task_threshold_minutes: 30
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.exporter.metrics_cleanup_ttl_minutes, 10);
    assert_eq!(cfg.log.format, LogFormat::Json);
    let druid = cfg.druid.expect("druid section");
    assert_eq!(druid.uri, "http://druid-router:8888");
    assert_eq!(druid.stuck_task_threshold_minutes, 30.0);
    assert_eq!(druid.request_timeout_ms, 5000);
}

#[test]
fn zero_ttl_is_rejected() {
    let bad = r#"
version: 1
exporter:
  metrics_cleanup_ttl_minutes: 0
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "CONFIG");
}

#[test]
fn unsupported_version_is_rejected() {
    assert!(config::load_from_str("version: 2\n").is_err());
}

#[test]
fn bad_druid_uri_is_rejected() {
    let bad = r#"
version: 1
druid:
  uri: "druid-router:8888"
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn cli_overrides_file_values() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    let cli = Cli {
        port: Some(9000),
        metrics_cleanup_ttl: Some(15),
        dimension_file_path: Some("dims.json".into()),
        druid_uri: Some("http://router:8888".into()),
        log_format: Some(LogFormat::Json),
        ..Cli::default()
    };
    let cfg = cli.apply(cfg).expect("valid overrides");
    assert_eq!(cfg.exporter.listen, "0.0.0.0:9000");
    assert_eq!(cfg.exporter.metrics_cleanup_ttl_minutes, 15);
    assert_eq!(cfg.exporter.dimension_file_path, "dims.json");
    assert_eq!(cfg.log.format, LogFormat::Json);
    assert_eq!(cfg.druid.expect("druid enabled").uri, "http://router:8888");
}

#[test]
fn cli_overrides_are_validated() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    let cli = Cli {
        metrics_cleanup_ttl: Some(0),
        ..Cli::default()
    };
    assert!(cli.apply(cfg).is_err());
}

#[test]
fn missing_file_means_defaults() {
    let cfg = config::load_optional("/nonexistent/druidbridge.yaml").expect("defaults");
    assert_eq!(cfg.exporter.metrics_cleanup_ttl_minutes, 5);
}
