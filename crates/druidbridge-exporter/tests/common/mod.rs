//! Shared fixtures for exporter integration tests.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use druidbridge_core::protocol::emitted::EmittedRecord;
use druidbridge_core::{LabelSet, SchemaRegistry};
use druidbridge_exporter::app_state::AppState;
use druidbridge_exporter::config::ExporterConfig;
use druidbridge_exporter::resolve::ReverseLookup;

/// Reverse lookup answering from a fixed table; unknown addresses fail.
pub struct TableLookup {
    names: HashMap<String, String>,
    calls: AtomicUsize,
}

impl TableLookup {
    pub fn new(names: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            names: names.iter().map(|(a, n)| (a.to_string(), n.to_string())).collect(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReverseLookup for TableLookup {
    async fn lookup(&self, address: &str) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.names.get(address).cloned()
    }
}

pub const GAUGE_SCHEMA: &str = r#"{"query/time": {"dimensions": ["dataSource"], "includeAsHistogram": false}}"#;

pub const HISTOGRAM_SCHEMA: &str =
    r#"{"query/time": {"dimensions": ["dataSource"], "includeAsHistogram": true, "buckets": [10, 50, 100]}}"#;

pub fn state(schema: &str, ttl_minutes: u64, lookup: Arc<TableLookup>) -> AppState {
    let mut cfg = ExporterConfig::default();
    cfg.exporter.metrics_cleanup_ttl_minutes = ttl_minutes;
    let schema = SchemaRegistry::from_json(schema).expect("valid schema");
    AppState::with_lookup(cfg, schema, lookup).expect("state builds")
}

pub fn records(v: serde_json::Value) -> Vec<EmittedRecord> {
    serde_json::from_value(v).expect("records decode")
}

pub fn labels(pairs: &[(&str, &str)]) -> LabelSet {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}
