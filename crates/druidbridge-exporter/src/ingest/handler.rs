use std::sync::Arc;

use druidbridge_core::error::Result;
use druidbridge_core::protocol::emitted::{decode_batch, EmittedRecord};
use druidbridge_core::series::{HOST_LABEL, SERVICE_LABEL};
use druidbridge_core::{LabelSet, MetricKind, MetricSchema, SchemaRegistry};

use crate::liveness::LivenessTracker;
use crate::obs::ExporterMetrics;
use crate::resolve::HostResolver;
use crate::store::MetricStore;

/// Per-batch tallies.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    pub stored: usize,
    pub unknown_metric: usize,
    pub value_parse_failures: usize,
}

/// Routes emitted records into the store and keeps liveness in step.
pub struct Ingestor {
    schema: Arc<SchemaRegistry>,
    store: Arc<MetricStore>,
    tracker: Arc<LivenessTracker>,
    resolver: Arc<HostResolver>,
    metrics: Arc<ExporterMetrics>,
}

impl Ingestor {
    pub fn new(
        schema: Arc<SchemaRegistry>,
        store: Arc<MetricStore>,
        tracker: Arc<LivenessTracker>,
        resolver: Arc<HostResolver>,
        metrics: Arc<ExporterMetrics>,
    ) -> Self {
        Self {
            schema,
            store,
            tracker,
            resolver,
            metrics,
        }
    }

    /// Decode a raw body and ingest it. A body that does not decode is dropped
    /// whole; nothing is written.
    pub async fn ingest_body(&self, body: &[u8]) -> Result<IngestReport> {
        let batch = match decode_batch(body) {
            Ok(b) => b,
            Err(e) => {
                self.metrics.ingest_batches.inc(&[("outcome", "decode_error")]);
                return Err(e);
            }
        };
        self.metrics.ingest_batches.inc(&[("outcome", "ok")]);
        Ok(self.ingest(&batch).await)
    }

    /// Process records independently; one bad record never affects another.
    pub async fn ingest(&self, batch: &[EmittedRecord]) -> IngestReport {
        let mut report = IngestReport::default();
        for (i, record) in batch.iter().enumerate() {
            if i == 0 {
                tracing::trace!(?record, "first record of batch");
            }
            self.ingest_record(record, &mut report).await;
        }
        report
    }

    async fn ingest_record(&self, record: &EmittedRecord, report: &mut IngestReport) {
        let metric = record.metric();
        let Some(schema) = self.schema.lookup(&metric) else {
            self.metrics.ingest_records.inc(&[("outcome", "unknown_metric")]);
            report.unknown_metric += 1;
            return;
        };

        let value = match record.value() {
            Some(v) => v,
            None => {
                tracing::debug!(%metric, "value is not numeric, recording 0");
                self.metrics.value_parse_failures.inc(&[]);
                report.value_parse_failures += 1;
                0.0
            }
        };

        let host = self.resolver.resolve(&record.host()).await;
        let labels = build_labels(schema, record, host);

        // Touch first: a concurrent sweep then either sees the fresh
        // timestamp, or has already evicted and our write recreates the series.
        self.tracker.touch(&metric, &labels);
        match schema.kind {
            MetricKind::Gauge => self.store.set_gauge(&metric, &labels, value),
            MetricKind::Histogram => self.store.observe_histogram(&metric, &labels, value),
        }

        self.metrics.ingest_records.inc(&[("outcome", "stored")]);
        report.stored += 1;
    }
}

/// Fixed `host`/`service` labels plus every schema dimension, `""` when absent.
pub fn build_labels(schema: &MetricSchema, record: &EmittedRecord, host: String) -> LabelSet {
    let mut labels = LabelSet::new();
    labels.insert(HOST_LABEL, host);
    labels.insert(SERVICE_LABEL, record.service());
    for d in &schema.dimensions {
        labels.insert(d.as_str(), record.field(d));
    }
    labels
}
