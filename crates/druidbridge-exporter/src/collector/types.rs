//! Druid REST API response shapes. Only the fields the collector reads are
//! modeled; everything defaults so partial responses still decode.

use serde::Deserialize;
use serde_json::Value;

/// `GET /druid/coordinator/v1/datasources?simple`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DataSource {
    pub name: String,
    pub properties: DataSourceProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DataSourceProperties {
    pub segments: SegmentSummary,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SegmentSummary {
    pub count: u64,
    pub size: u64,
    pub replicated_size: u64,
}

/// `GET /druid/indexer/v1/workers`
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkerStatus {
    pub worker: Worker,
    pub curr_capacity_used: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Worker {
    pub ip: String,
    pub capacity: u64,
    pub version: String,
}

/// `GET /druid/indexer/v1/tasks`
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(rename = "type")]
    pub task_type: String,
    pub created_time: String,
    pub status: String,
    pub data_source: String,
    /// Milliseconds; `0` while the task is still running.
    pub duration: f64,
}

/// `GET /druid/indexer/v1/supervisor?full`
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Supervisor {
    pub id: String,
    pub healthy: Value,
    pub detailed_state: Value,
}

/// Row of the datasource row-count SQL query.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DataSourceRows {
    pub datasource: String,
    pub source: String,
    pub total_rows: u64,
}

/// Render a loosely typed JSON value as a label string.
pub fn value_label(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
