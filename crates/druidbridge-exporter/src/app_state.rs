//! Shared application state for the druidbridge exporter.
//!
//! Built once at startup from the config and the dimension schema; every
//! component is constructed here and handed its collaborators explicitly.
//! Background tasks are not started here, see `AppState::start_background`.

use std::sync::Arc;

use tokio::time::Duration;

use druidbridge_core::error::{BridgeError, Result};
use druidbridge_core::SchemaRegistry;

use crate::collector::DruidCollector;
use crate::config::ExporterConfig;
use crate::ingest::Ingestor;
use crate::liveness::{LivenessTracker, SweepHandle};
use crate::obs::ExporterMetrics;
use crate::resolve::{HostResolver, ReverseLookup, SystemLookup};
use crate::store::MetricStore;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ExporterConfig,
    store: Arc<MetricStore>,
    tracker: Arc<LivenessTracker>,
    resolver: Arc<HostResolver>,
    ingestor: Ingestor,
    metrics: Arc<ExporterMetrics>,
    collector: Option<DruidCollector>,
}

impl AppState {
    /// Build state with the system reverse resolver.
    pub fn new(cfg: ExporterConfig, schema: SchemaRegistry) -> Result<Self> {
        Self::with_lookup(cfg, schema, Arc::new(SystemLookup))
    }

    pub fn with_lookup(
        cfg: ExporterConfig,
        schema: SchemaRegistry,
        lookup: Arc<dyn ReverseLookup>,
    ) -> Result<Self> {
        let schema = Arc::new(schema);
        let metrics = Arc::new(ExporterMetrics::default());

        let store = Arc::new(MetricStore::new(Arc::clone(&schema)));
        let ttl = Duration::from_secs(cfg.exporter.metrics_cleanup_ttl_minutes * 60);
        let tracker = Arc::new(LivenessTracker::new(Arc::clone(&store), ttl, Arc::clone(&metrics)));
        let resolver = Arc::new(HostResolver::new(
            lookup,
            Duration::from_secs(cfg.exporter.dns_cache_ttl_secs),
            Arc::clone(&metrics),
        ));
        let ingestor = Ingestor::new(
            Arc::clone(&schema),
            Arc::clone(&store),
            Arc::clone(&tracker),
            Arc::clone(&resolver),
            Arc::clone(&metrics),
        );

        let collector = match &cfg.druid {
            Some(d) => Some(DruidCollector::new(d)?),
            None => None,
        };

        if schema.is_empty() {
            tracing::warn!("dimension schema is empty, every emitted record will be discarded");
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                store,
                tracker,
                resolver,
                ingestor,
                metrics,
                collector,
            }),
        })
    }

    /// Start the liveness sweep and the DNS cache purge.
    pub fn start_background(&self) -> Vec<SweepHandle> {
        let resolver = Arc::clone(&self.inner.resolver);
        let dns_period = Duration::from_secs(self.inner.cfg.exporter.dns_cache_ttl_secs * 2);
        vec![
            self.inner.tracker.spawn_sweeper(),
            SweepHandle::spawn("dns-cache", dns_period, move || {
                let purged = resolver.purge_expired();
                tracing::debug!(purged, "dns cache purge finished");
            }),
        ]
    }

    pub fn cfg(&self) -> &ExporterConfig {
        &self.inner.cfg
    }

    pub fn store(&self) -> &MetricStore {
        &self.inner.store
    }

    pub fn tracker(&self) -> Arc<LivenessTracker> {
        Arc::clone(&self.inner.tracker)
    }

    pub fn ingestor(&self) -> &Ingestor {
        &self.inner.ingestor
    }

    pub fn metrics(&self) -> &ExporterMetrics {
        &self.inner.metrics
    }

    pub fn collector(&self) -> Option<&DruidCollector> {
        self.inner.collector.as_ref()
    }
}

/// Read and validate the dimension document named in the config.
pub fn load_schema(cfg: &ExporterConfig) -> Result<SchemaRegistry> {
    let path = &cfg.exporter.dimension_file_path;
    let doc = std::fs::read_to_string(path)
        .map_err(|e| BridgeError::Config(format!("read dimension file failed ({path}): {e}")))?;
    let schema = SchemaRegistry::from_json(&doc)?;
    tracing::info!(%path, metrics = schema.len(), "dimension schema loaded");
    Ok(schema)
}
