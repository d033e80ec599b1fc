//! Store of emitted series: one gauge or histogram family per configured metric.
//!
//! Families are created up front from the schema, so the maps of families are
//! immutable and only the per-family series maps see concurrent writes. The
//! store trusts its caller for metric names: an unknown name is a no-op.

use std::collections::HashMap;
use std::sync::Arc;

use druidbridge_core::{LabelSet, MetricKind, SchemaRegistry};

use crate::obs::{GaugeVec, HistogramSnapshot, HistogramVec};

struct Family<V> {
    exposition_name: String,
    vec: V,
}

pub struct MetricStore {
    schema: Arc<SchemaRegistry>,
    gauges: HashMap<String, Family<GaugeVec>>,
    histograms: HashMap<String, Family<HistogramVec>>,
}

impl MetricStore {
    pub fn new(schema: Arc<SchemaRegistry>) -> Self {
        let mut gauges = HashMap::new();
        let mut histograms = HashMap::new();
        for s in schema.iter() {
            let exposition_name = s.exposition_name();
            match s.kind {
                MetricKind::Gauge => {
                    gauges.insert(
                        s.name.clone(),
                        Family { exposition_name, vec: GaugeVec::default() },
                    );
                }
                MetricKind::Histogram => {
                    histograms.insert(
                        s.name.clone(),
                        Family { exposition_name, vec: HistogramVec::with_buckets(s.buckets.clone()) },
                    );
                }
            }
        }
        Self { schema, gauges, histograms }
    }

    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    /// Upsert the current value of a gauge series.
    pub fn set_gauge(&self, metric: &str, labels: &LabelSet, value: f64) {
        if let Some(f) = self.gauges.get(metric) {
            f.vec.set(labels, value);
        }
    }

    /// Record one observation, creating the series on first use.
    pub fn observe_histogram(&self, metric: &str, labels: &LabelSet, value: f64) {
        if let Some(f) = self.histograms.get(metric) {
            f.vec.observe(labels, value);
        }
    }

    /// Remove a series from whichever family the schema assigns the metric to.
    /// Idempotent; returns whether a series was removed.
    pub fn delete(&self, metric: &str, labels: &LabelSet) -> bool {
        let Some(schema) = self.schema.lookup(metric) else { return false };
        match schema.kind {
            MetricKind::Gauge => self.gauges.get(metric).is_some_and(|f| f.vec.remove(labels)),
            MetricKind::Histogram => self.histograms.get(metric).is_some_and(|f| f.vec.remove(labels)),
        }
    }

    pub fn gauge(&self, metric: &str, labels: &LabelSet) -> Option<f64> {
        self.gauges.get(metric)?.vec.get(labels)
    }

    pub fn histogram(&self, metric: &str, labels: &LabelSet) -> Option<HistogramSnapshot> {
        self.histograms.get(metric)?.vec.snapshot(labels)
    }

    pub fn contains(&self, metric: &str, labels: &LabelSet) -> bool {
        self.gauge(metric, labels).is_some() || self.histogram(metric, labels).is_some()
    }

    /// Number of live series across all families.
    pub fn series_count(&self) -> usize {
        self.gauges.values().map(|f| f.vec.len()).sum::<usize>()
            + self.histograms.values().map(|f| f.vec.len()).sum::<usize>()
    }

    /// Render every family in metric-name order.
    pub fn render(&self, out: &mut String) {
        for s in self.schema.iter() {
            match s.kind {
                MetricKind::Gauge => {
                    if let Some(f) = self.gauges.get(&s.name) {
                        f.vec.render(&f.exposition_name, out);
                    }
                }
                MetricKind::Histogram => {
                    if let Some(f) = self.histograms.get(&s.name) {
                        f.vec.render(&f.exposition_name, out);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MetricStore {
        let doc = r#"{
            "query/time": {"dimensions": ["dataSource"]},
            "query/bytes": {"dimensions": [], "includeAsHistogram": true, "buckets": [10, 50, 100]}
        }"#;
        let schema = SchemaRegistry::from_json(doc).expect("valid schema");
        MetricStore::new(Arc::new(schema))
    }

    fn labels() -> LabelSet {
        [("dataSource", ""), ("host", "h:8082"), ("service", "druid/broker")]
            .into_iter()
            .collect()
    }

    #[test]
    fn routes_by_kind() {
        let s = store();
        s.set_gauge("query/time", &labels(), 42.5);
        s.observe_histogram("query/bytes", &labels(), 5.0);
        assert_eq!(s.gauge("query/time", &labels()), Some(42.5));
        assert_eq!(s.histogram("query/bytes", &labels()).map(|h| h.count), Some(1));
        // wrong family for the metric is a no-op
        s.set_gauge("query/bytes", &labels(), 1.0);
        assert_eq!(s.gauge("query/bytes", &labels()), None);
        assert_eq!(s.series_count(), 2);
    }

    #[test]
    fn delete_is_idempotent() {
        let s = store();
        assert!(!s.delete("query/time", &labels()));
        s.set_gauge("query/time", &labels(), 1.0);
        assert!(s.delete("query/time", &labels()));
        assert!(!s.delete("query/time", &labels()));
        assert!(!s.delete("unknown/metric", &labels()));
        assert_eq!(s.series_count(), 0);
    }

    #[test]
    fn render_uses_exposition_names() {
        let s = store();
        s.set_gauge("query/time", &labels(), 42.5);
        let mut out = String::new();
        s.render(&mut out);
        assert!(out.contains(
            r#"druid_emitted_query_time{dataSource="",host="h:8082",service="druid/broker"} 42.5"#
        ));
        assert!(out.contains("# TYPE druid_emitted_query_bytes histogram"));
    }
}
