//! Druid API collector.
//!
//! On each scrape, polls the Druid router/coordinator REST API and renders
//! cluster-state gauges. Each endpoint is independent: a failure is logged and
//! its section is left out, the scrape itself never fails.
//!
//! Task durations are the one stateful family: every scrape observes the
//! duration of every listed task into a histogram that lives as long as the
//! collector.

pub mod types;

use std::fmt::Write;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use druidbridge_core::error::{BridgeError, Result};
use druidbridge_core::LabelSet;

use crate::config::DruidSection;
use crate::obs::{GaugeVec, HistogramVec};

use types::{value_label, DataSource, DataSourceRows, Supervisor, Task, WorkerStatus};

const HEALTH_PATH: &str = "/status/health";
const DATASOURCES_PATH: &str = "/druid/coordinator/v1/datasources?simple";
const WORKERS_PATH: &str = "/druid/indexer/v1/workers";
const TASKS_PATH: &str = "/druid/indexer/v1/tasks";
const SUPERVISORS_PATH: &str = "/druid/indexer/v1/supervisor?full";
const SQL_PATH: &str = "/druid/v2/sql";

const TASK_COUNT_PATHS: [(&str, &str); 4] = [
    ("druid_running_tasks", "/druid/indexer/v1/runningTasks"),
    ("druid_waiting_tasks", "/druid/indexer/v1/waitingTasks"),
    ("druid_completed_tasks", "/druid/indexer/v1/completeTasks"),
    ("druid_pending_tasks", "/druid/indexer/v1/pendingTasks"),
];

const TASK_DURATION_BUCKETS: [f64; 7] = [100.0, 500.0, 1000.0, 10000.0, 60000.0, 600000.0, 3600000.0];

const TOTAL_ROWS_SQL: &str = "SELECT datasource, 'segments' AS source, SUM(num_rows) AS total_rows \
     FROM sys.segments WHERE is_active = 1 GROUP BY datasource";

pub struct DruidCollector {
    client: Client,
    base: String,
    stuck_task_threshold_minutes: f64,
    task_durations: HistogramVec,
}

impl DruidCollector {
    pub fn new(cfg: &DruidSection) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .build()
            .map_err(|e| BridgeError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base: cfg.uri.trim_end_matches('/').to_string(),
            stuck_task_threshold_minutes: cfg.stuck_task_threshold_minutes,
            task_durations: HistogramVec::with_buckets(TASK_DURATION_BUCKETS.to_vec()),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base, path);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| BridgeError::Upstream(format!("GET {path}: {e}")))?;
        resp.json::<T>()
            .await
            .map_err(|e| BridgeError::Upstream(format!("decode {path}: {e}")))
    }

    async fn sql<T: DeserializeOwned>(&self, query: &str) -> Result<T> {
        let url = format!("{}{}", self.base, SQL_PATH);
        let resp = self
            .client
            .post(&url)
            .json(&json!({ "query": query }))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| BridgeError::Upstream(format!("POST {SQL_PATH}: {e}")))?;
        resp.json::<T>()
            .await
            .map_err(|e| BridgeError::Upstream(format!("decode {SQL_PATH}: {e}")))
    }

    /// Poll every endpoint and render the results.
    pub async fn collect(&self, out: &mut String) {
        let (health, datasources, workers, tasks, supervisors, rows, task_counts) = tokio::join!(
            self.get_json::<Value>(HEALTH_PATH),
            self.get_json::<Vec<DataSource>>(DATASOURCES_PATH),
            self.get_json::<Vec<WorkerStatus>>(WORKERS_PATH),
            self.get_json::<Vec<Task>>(TASKS_PATH),
            self.get_json::<Vec<Supervisor>>(SUPERVISORS_PATH),
            self.sql::<Vec<DataSourceRows>>(TOTAL_ROWS_SQL),
            join_all(TASK_COUNT_PATHS.iter().map(|(_, p)| self.get_json::<Vec<Value>>(p))),
        );

        render_health(ok_or_log(health, "health").as_ref(), out);
        if let Some(ds) = ok_or_log(datasources, "datasources") {
            render_datasources(&ds, out);
        }
        for ((name, _), counted) in TASK_COUNT_PATHS.iter().zip(task_counts) {
            if let Some(list) = ok_or_log(counted, name) {
                let _ = writeln!(out, "# TYPE {name} gauge\n{name} {}", list.len());
            }
        }
        if let Some(w) = ok_or_log(workers, "workers") {
            render_workers(&w, out);
        }
        if let Some(t) = ok_or_log(tasks, "tasks") {
            observe_task_durations(&self.task_durations, &t);
            render_stuck_tasks(&t, self.stuck_task_threshold_minutes, Utc::now(), out);
        }
        self.task_durations.render("druid_task_duration_ms", out);
        if let Some(s) = ok_or_log(supervisors, "supervisors") {
            render_supervisors(&s, out);
        }
        if let Some(r) = ok_or_log(rows, "datasource rows") {
            render_total_rows(&r, out);
        }
    }
}

fn ok_or_log<T>(res: Result<T>, what: &str) -> Option<T> {
    match res {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::error!(section = %what, error = %e, code = e.client_code().as_str(), "druid api collection failed");
            None
        }
    }
}

fn labels(pairs: &[(&str, &str)]) -> LabelSet {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

fn render_health(health: Option<&Value>, out: &mut String) {
    let healthy = matches!(health, Some(Value::Bool(true)));
    let g = GaugeVec::default();
    g.set(&labels(&[("druid", "health")]), if healthy { 1.0 } else { 0.0 });
    g.render("druid_health_status", out);
}

fn render_datasources(datasources: &[DataSource], out: &mut String) {
    let present = GaugeVec::default();
    let count = GaugeVec::default();
    let size = GaugeVec::default();
    let replicated = GaugeVec::default();

    for ds in datasources {
        present.set(&labels(&[("datasource", &ds.name)]), 1.0);
        let l = labels(&[("datasource_name", &ds.name)]);
        let seg = &ds.properties.segments;
        if seg.count != 0 {
            count.set(&l, seg.count as f64);
        }
        if seg.size != 0 {
            size.set(&l, seg.size as f64);
        }
        if seg.replicated_size != 0 {
            replicated.set(&l, seg.replicated_size as f64);
        }
    }

    present.render("druid_datasource", out);
    count.render("druid_segment_count", out);
    size.render("druid_segment_size", out);
    replicated.render("druid_segment_replicated_size", out);
}

fn render_workers(workers: &[WorkerStatus], out: &mut String) {
    let max = GaugeVec::default();
    let used = GaugeVec::default();
    for w in workers {
        let l = labels(&[("version", &w.worker.version), ("ip", &w.worker.ip)]);
        max.set(&l, w.worker.capacity as f64);
        used.set(&l, w.curr_capacity_used as f64);
    }
    max.render("druid_workers_capacity_max", out);
    used.render("druid_workers_capacity_used", out);
}

fn render_stuck_tasks(tasks: &[Task], threshold_minutes: f64, now: DateTime<Utc>, out: &mut String) {
    let stuck = GaugeVec::default();
    for t in tasks.iter().filter(|t| t.status == "RUNNING") {
        let started = match DateTime::parse_from_rfc3339(&t.created_time) {
            Ok(ts) => ts.with_timezone(&Utc),
            Err(e) => {
                tracing::warn!(task_id = %t.id, created_time = %t.created_time, error = %e, "unable to parse task start time");
                continue;
            }
        };
        let runtime_minutes = (now - started).num_milliseconds() as f64 / 60_000.0;
        if runtime_minutes >= threshold_minutes {
            stuck.set(
                &labels(&[("datasource", &t.data_source), ("task_type", &t.task_type), ("task_id", &t.id)]),
                runtime_minutes,
            );
        }
    }
    stuck.render("druid_task_stuck_runtime_ms", out);
}

fn observe_task_durations(hist: &HistogramVec, tasks: &[Task]) {
    for t in tasks {
        hist.observe(
            &labels(&[("datasource", &t.data_source), ("status", &t.status), ("task_type", &t.task_type)]),
            t.duration,
        );
    }
}

fn render_supervisors(supervisors: &[Supervisor], out: &mut String) {
    let g = GaugeVec::default();
    for s in supervisors {
        let healthy = value_label(&s.healthy);
        let state = value_label(&s.detailed_state);
        g.set(
            &labels(&[("supervisor_name", &s.id), ("healthy", &healthy), ("state", &state)]),
            1.0,
        );
    }
    g.render("druid_supervisors", out);
}

fn render_total_rows(rows: &[DataSourceRows], out: &mut String) {
    let g = GaugeVec::default();
    for r in rows {
        g.set(&labels(&[("datasource_name", &r.datasource), ("source", &r.source)]), r.total_rows as f64);
    }
    g.render("druid_datasource_total_rows", out);
}
