use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::time::{Duration, Instant};

use druidbridge_core::{LabelSet, SeriesKey};

use crate::liveness::SweepHandle;
use crate::obs::ExporterMetrics;
use crate::store::MetricStore;

/// Outcome of one sweep pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub evicted: usize,
    pub skipped: usize,
}

/// SeriesKey -> last seen.
///
/// State per key: absent -> tracked (first touch) -> absent (sweep).
/// Timestamps only move forward.
pub struct LivenessTracker {
    seen: DashMap<SeriesKey, Instant>,
    store: Arc<MetricStore>,
    ttl: Duration,
    metrics: Arc<ExporterMetrics>,
}

impl LivenessTracker {
    pub fn new(store: Arc<MetricStore>, ttl: Duration, metrics: Arc<ExporterMetrics>) -> Self {
        Self {
            seen: DashMap::new(),
            store,
            ttl,
            metrics,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mark the series as seen now.
    pub fn touch(&self, metric: &str, labels: &LabelSet) {
        let now = Instant::now();
        self.seen
            .entry(SeriesKey::new(metric, labels.clone()))
            .and_modify(|t| {
                if now > *t {
                    *t = now;
                }
            })
            .or_insert(now);
    }

    pub fn last_seen(&self, metric: &str, labels: &LabelSet) -> Option<Instant> {
        self.seen
            .get(&SeriesKey::new(metric, labels.clone()))
            .map(|t| *t.value())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Evict every series last seen before `now - ttl`.
    pub fn sweep(&self) -> SweepReport {
        match Instant::now().checked_sub(self.ttl) {
            Some(cutoff) => self.sweep_before(cutoff),
            None => SweepReport::default(),
        }
    }

    pub fn sweep_before(&self, cutoff: Instant) -> SweepReport {
        let mut report = SweepReport::default();

        for key in self.stale_keys(cutoff) {
            let well_formed = self
                .store
                .schema()
                .lookup(&key.metric)
                .is_some_and(|s| s.is_well_formed(&key.labels));
            if !well_formed {
                tracing::warn!(metric = %key.metric, labels = ?key.labels, "skipping tracked key without a matching schema");
                self.metrics.sweep_skipped_keys.inc(&[]);
                report.skipped += 1;
                continue;
            }

            if self.evict_if_stale(&key, cutoff) {
                report.evicted += 1;
            }
        }

        if report.evicted > 0 {
            self.metrics.series_evicted.add(&[], report.evicted as u64);
        }
        tracing::debug!(
            evicted = report.evicted,
            skipped = report.skipped,
            tracked = self.seen.len(),
            "liveness sweep finished"
        );
        report
    }

    /// Snapshot of keys that looked stale at read time.
    fn stale_keys(&self, cutoff: Instant) -> Vec<SeriesKey> {
        self.seen
            .iter()
            .filter(|r| *r.value() < cutoff)
            .map(|r| r.key().clone())
            .collect()
    }

    /// Re-check under the entry lock and evict. A touch that landed after the
    /// snapshot moved the timestamp past the cutoff, so it wins.
    fn evict_if_stale(&self, key: &SeriesKey, cutoff: Instant) -> bool {
        match self.seen.entry(key.clone()) {
            Entry::Occupied(e) if *e.get() < cutoff => {
                // Store delete happens while the entry lock is held, so a
                // concurrent ingest either re-touches before (no eviction) or
                // after (series recreated by its store write).
                self.store.delete(&key.metric, &key.labels);
                e.remove();
                true
            }
            _ => false,
        }
    }

    /// Start the periodic sweep; period equals the TTL.
    pub fn spawn_sweeper(self: &Arc<Self>) -> SweepHandle {
        let tracker = Arc::clone(self);
        SweepHandle::spawn("liveness", self.ttl, move || {
            tracker.sweep();
        })
    }
}
