#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use druidbridge_core::{MetricKind, SchemaRegistry};

#[test]
fn loads_gauges_and_histograms() {
    let doc = r#"
{
  "query/time": {"dimensions": ["dataSource", "type"], "includeAsHistogram": true, "buckets": [10, 50, 100]},
  "jvm/mem/used": {"dimensions": ["memKind"]},
  "segment/count": {"dimensions": ["dataSource", "tier"], "includeAsHistogram": false}
}
"#;
    let reg = SchemaRegistry::from_json(doc).expect("must parse");
    assert_eq!(reg.len(), 3);

    let q = reg.lookup("query/time").unwrap();
    assert_eq!(q.kind, MetricKind::Histogram);
    assert_eq!(q.buckets, vec![10.0, 50.0, 100.0]);
    assert_eq!(q.dimensions, vec!["dataSource", "type"]);

    let mem = reg.lookup("jvm/mem/used").unwrap();
    assert_eq!(mem.kind, MetricKind::Gauge);
    assert!(mem.buckets.is_empty());

    assert!(reg.lookup("query/bytes").is_none());
}

#[test]
fn rejects_unsorted_buckets() {
    let doc = r#"{"query/time": {"dimensions": [], "includeAsHistogram": true, "buckets": [100, 10]}}"#;
    let err = SchemaRegistry::from_json(doc).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "INVALID_SCHEMA");
}

#[test]
fn rejects_fixed_label_as_dimension() {
    let doc = r#"{"query/time": {"dimensions": ["host"]}}"#;
    let err = SchemaRegistry::from_json(doc).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "INVALID_SCHEMA");
}

#[test]
fn rejects_duplicate_dimension() {
    let doc = r#"{"query/time": {"dimensions": ["dataSource", "dataSource"]}}"#;
    assert!(SchemaRegistry::from_json(doc).is_err());
}

#[test]
fn rejects_non_object_document() {
    let err = SchemaRegistry::from_json("[]").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "INVALID_SCHEMA");
}
