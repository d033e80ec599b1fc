//! In-process metrics.
//!
//! `metrics` holds the labeled vectors used both by the emitted-metric store
//! and by the exporter's own counters below, rendered by the `/metrics`
//! handler.

pub mod metrics;

use std::fmt::Write;

pub use metrics::{CounterVec, GaugeVec, HistogramSnapshot, HistogramVec};

/// Counters describing the exporter itself.
#[derive(Default)]
pub struct ExporterMetrics {
    pub ingest_batches: CounterVec,
    pub ingest_records: CounterVec,
    pub value_parse_failures: CounterVec,
    pub series_evicted: CounterVec,
    pub sweep_skipped_keys: CounterVec,
    pub dns_lookups: CounterVec,
}

impl ExporterMetrics {
    /// Render all counters plus the active series gauge.
    pub fn render(&self, active_series: usize, out: &mut String) {
        self.ingest_batches.render(
            "druidbridge_ingest_batches_total",
            "Emitter batches received, by outcome.",
            out,
        );
        self.ingest_records.render(
            "druidbridge_ingest_records_total",
            "Emitted records processed, by outcome.",
            out,
        );
        self.value_parse_failures.render(
            "druidbridge_ingest_value_parse_failures_total",
            "Records whose value was not numeric and was recorded as 0.",
            out,
        );
        self.series_evicted.render(
            "druidbridge_series_evicted_total",
            "Series removed by the liveness sweep.",
            out,
        );
        self.sweep_skipped_keys.render(
            "druidbridge_sweep_skipped_keys_total",
            "Tracked keys the sweep could not map to a schema.",
            out,
        );
        self.dns_lookups.render(
            "druidbridge_dns_lookups_total",
            "Host resolutions, by result.",
            out,
        );
        let _ = writeln!(out, "# TYPE druidbridge_series_active gauge\ndruidbridge_series_active {active_series}");
    }
}
