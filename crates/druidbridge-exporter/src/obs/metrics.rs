//! Labeled metric vectors with Prometheus text rendering.
//!
//! Counter/gauge/histogram vectors keyed by `LabelSet`, backed by `DashMap`
//! so concurrent writers only contend on a shard. Values are atomics; gauges
//! and histogram sums store `f64` bits. Rendering sorts series by label set to
//! keep output deterministic.

use std::borrow::Cow;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use druidbridge_core::LabelSet;

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Dimension names come from operators; fold anything outside
/// `[a-zA-Z_][a-zA-Z0-9_]*` to `_`.
fn sanitize_label_name(name: &str) -> Cow<'_, str> {
    let valid = name.chars().enumerate().all(|(i, c)| {
        c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit())
    });
    if valid && !name.is_empty() {
        return Cow::Borrowed(name);
    }
    let mut out: String = name
        .chars()
        .map(|c| if c == '_' || c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if out.chars().next().map_or(true, |c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    Cow::Owned(out)
}

/// Format a sample value the way the exposition format expects.
pub(crate) fn fmt_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}

fn label_str(labels: &LabelSet) -> String {
    labels
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", sanitize_label_name(k), escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

fn braces(label_str: &str) -> String {
    if label_str.is_empty() {
        String::new()
    } else {
        format!("{{{label_str}}}")
    }
}

fn label_set(labels: &[(&str, &str)]) -> LabelSet {
    labels.iter().map(|(k, v)| (*k, *v)).collect()
}

fn add_f64(cell: &AtomicU64, v: f64) {
    let _ = cell.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
        Some((f64::from_bits(bits) + v).to_bits())
    });
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<LabelSet, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let counter = self
            .map
            .entry(label_set(labels))
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_set(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self, name: &str, help: &str, out: &mut String) {
        let _ = writeln!(out, "# HELP {name} {help}");
        let _ = writeln!(out, "# TYPE {name} counter");
        let mut rows: Vec<(LabelSet, u64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        for (labels, val) in rows {
            let _ = writeln!(out, "{}{} {}", name, braces(&label_str(&labels)), val);
        }
    }
}

/// Last-write-wins float gauges.
#[derive(Default)]
pub struct GaugeVec {
    map: DashMap<LabelSet, AtomicU64>,
}

impl GaugeVec {
    /// Upsert the series value.
    pub fn set(&self, labels: &LabelSet, v: f64) {
        if let Some(g) = self.map.get(labels) {
            g.store(v.to_bits(), Ordering::Relaxed);
            return;
        }
        self.map
            .entry(labels.clone())
            .or_insert_with(|| AtomicU64::new(0))
            .store(v.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self, labels: &LabelSet) -> Option<f64> {
        self.map
            .get(labels)
            .map(|g| f64::from_bits(g.load(Ordering::Relaxed)))
    }

    /// Remove the series. Returns whether it existed.
    pub fn remove(&self, labels: &LabelSet) -> bool {
        self.map.remove(labels).is_some()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {name} gauge");
        let mut rows: Vec<(LabelSet, f64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), f64::from_bits(r.value().load(Ordering::Relaxed))))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        for (labels, val) in rows {
            let _ = writeln!(out, "{}{} {}", name, braces(&label_str(&labels)), fmt_float(val));
        }
    }
}

struct AtomicHistogram {
    count: AtomicU64,
    sum: AtomicU64,
    buckets: Box<[AtomicU64]>,
}

impl AtomicHistogram {
    fn new(len: usize) -> Self {
        Self {
            count: AtomicU64::new(0),
            sum: AtomicU64::new(0f64.to_bits()),
            buckets: (0..len).map(|_| AtomicU64::new(0)).collect(),
        }
    }
}

/// Point-in-time copy of one histogram series.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    /// (upper bound, cumulative count), without the `+Inf` bucket.
    pub buckets: Vec<(f64, u64)>,
    pub count: u64,
    pub sum: f64,
}

/// Histograms sharing one set of bucket bounds.
pub struct HistogramVec {
    bounds: Arc<[f64]>,
    map: DashMap<LabelSet, AtomicHistogram>,
}

impl HistogramVec {
    /// `bounds` must be strictly increasing (enforced at schema load).
    pub fn with_buckets(bounds: Vec<f64>) -> Self {
        Self {
            bounds: bounds.into(),
            map: DashMap::new(),
        }
    }

    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    /// Observe a value and increment cumulative buckets.
    pub fn observe(&self, labels: &LabelSet, v: f64) {
        let len = self.bounds.len();
        let hist = match self.map.get(labels) {
            Some(h) => h,
            None => self
                .map
                .entry(labels.clone())
                .or_insert_with(|| AtomicHistogram::new(len))
                .downgrade(),
        };

        hist.count.fetch_add(1, Ordering::Relaxed);
        add_f64(&hist.sum, v);

        // Cumulative buckets: every bound at or above the value.
        for (i, &b) in self.bounds.iter().enumerate() {
            if v <= b {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn snapshot(&self, labels: &LabelSet) -> Option<HistogramSnapshot> {
        self.map.get(labels).map(|h| self.snapshot_of(&h))
    }

    fn snapshot_of(&self, h: &AtomicHistogram) -> HistogramSnapshot {
        HistogramSnapshot {
            buckets: self
                .bounds
                .iter()
                .zip(h.buckets.iter())
                .map(|(&le, c)| (le, c.load(Ordering::Relaxed)))
                .collect(),
            count: h.count.load(Ordering::Relaxed),
            sum: f64::from_bits(h.sum.load(Ordering::Relaxed)),
        }
    }

    /// Remove the series. Returns whether it existed.
    pub fn remove(&self, labels: &LabelSet) -> bool {
        self.map.remove(labels).is_some()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {name} histogram");
        let mut rows: Vec<(LabelSet, HistogramSnapshot)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), self.snapshot_of(r.value())))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        for (labels, snap) in rows {
            let label_str = label_str(&labels);
            let prefix = if label_str.is_empty() { String::new() } else { format!("{label_str},") };

            for (le, count) in &snap.buckets {
                let _ = writeln!(out, "{}_bucket{{{}le=\"{}\"}} {}", name, prefix, fmt_float(*le), count);
            }
            let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, snap.count);
            let _ = writeln!(out, "{}_sum{} {}", name, braces(&label_str), fmt_float(snap.sum));
            let _ = writeln!(out, "{}_count{} {}", name, braces(&label_str), snap.count);
        }
    }
}
