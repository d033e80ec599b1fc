//! Dimension schema: which emitted metrics are exported, and how.
//!
//! Loaded once at startup from the dimension document and read-only after
//! that, so a `SchemaRegistry` can be shared behind an `Arc` without locking.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;

use crate::error::{BridgeError, Result};
use crate::series::{LabelSet, HOST_LABEL, SERVICE_LABEL};

/// Buckets used when a histogram entry does not configure its own.
pub const DEFAULT_BUCKETS: [f64; 11] = [0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Prefix of every exported emitter metric.
pub const EMITTED_PREFIX: &str = "druid_emitted_";

/// One entry of the dimension document, as written by operators.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DimensionSpec {
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default, rename = "includeAsHistogram")]
    pub include_as_histogram: bool,
    #[serde(default)]
    pub buckets: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Histogram,
}

/// Validated per-metric schema.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSchema {
    pub name: String,
    pub dimensions: Vec<String>,
    pub kind: MetricKind,
    /// Upper bounds, strictly increasing. Empty for gauges.
    pub buckets: Vec<f64>,
}

impl MetricSchema {
    fn from_spec(name: &str, spec: DimensionSpec) -> Result<Self> {
        let mut seen = HashSet::new();
        for d in &spec.dimensions {
            if d == HOST_LABEL || d == SERVICE_LABEL {
                return Err(BridgeError::InvalidSchema(format!(
                    "{name}: dimension `{d}` collides with a fixed label"
                )));
            }
            if d.is_empty() {
                return Err(BridgeError::InvalidSchema(format!("{name}: empty dimension name")));
            }
            if !seen.insert(d.as_str()) {
                return Err(BridgeError::InvalidSchema(format!("{name}: duplicate dimension `{d}`")));
            }
        }

        let (kind, buckets) = if spec.include_as_histogram {
            let buckets = match spec.buckets {
                Some(b) if !b.is_empty() => b,
                _ => DEFAULT_BUCKETS.to_vec(),
            };
            if buckets.iter().any(|b| !b.is_finite()) {
                return Err(BridgeError::InvalidSchema(format!("{name}: buckets must be finite")));
            }
            if buckets.windows(2).any(|w| w[0] >= w[1]) {
                return Err(BridgeError::InvalidSchema(format!(
                    "{name}: buckets must be strictly increasing"
                )));
            }
            (MetricKind::Histogram, buckets)
        } else {
            (MetricKind::Gauge, Vec::new())
        };

        Ok(Self {
            name: name.to_string(),
            dimensions: spec.dimensions,
            kind,
            buckets,
        })
    }

    /// Name in the exposition output: `druid_emitted_` + name with `/` and `-`
    /// folded to `_`.
    pub fn exposition_name(&self) -> String {
        format!("{EMITTED_PREFIX}{}", self.name.replace(['/', '-'], "_"))
    }

    /// True if the label set carries exactly the labels this schema produces.
    pub fn is_well_formed(&self, labels: &LabelSet) -> bool {
        labels.len() == self.dimensions.len() + 2
            && labels.contains(HOST_LABEL)
            && labels.contains(SERVICE_LABEL)
            && self.dimensions.iter().all(|d| labels.contains(d))
    }
}

/// Metric name -> schema.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, MetricSchema>,
}

impl SchemaRegistry {
    /// Parse and validate a dimension document (JSON object keyed by metric).
    pub fn from_json(doc: &str) -> Result<Self> {
        let map: BTreeMap<String, DimensionSpec> = serde_json::from_str(doc)
            .map_err(|e| BridgeError::InvalidSchema(format!("invalid dimension document: {e}")))?;
        Self::from_dimension_map(map)
    }

    pub fn from_dimension_map<I>(map: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, DimensionSpec)>,
    {
        let mut schemas = BTreeMap::new();
        for (name, spec) in map {
            let schema = MetricSchema::from_spec(&name, spec)?;
            schemas.insert(name, schema);
        }
        Ok(Self { schemas })
    }

    pub fn lookup(&self, metric: &str) -> Option<&MetricSchema> {
        self.schemas.get(metric)
    }

    /// Schemas in metric-name order.
    pub fn iter(&self) -> impl Iterator<Item = &MetricSchema> {
        self.schemas.values()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
