//! `POST /druid`: the Druid HTTP emitter target.
//!
//! Always answers 200 with an empty body. Bodies that are not JSON, or that
//! do not decode as a batch, are dropped and logged server-side.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
};
use bytes::Bytes;

use crate::app_state::AppState;

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

pub async fn druid_emitter(State(app): State<AppState>, headers: HeaderMap, body: Bytes) -> StatusCode {
    if !is_json(&headers) {
        app.metrics()
            .ingest_batches
            .inc(&[("outcome", "ignored_content_type")]);
        tracing::debug!("ignoring emitter request without application/json content type");
        return StatusCode::OK;
    }

    match app.ingestor().ingest_body(&body).await {
        Ok(report) if report.stored + report.unknown_metric == 0 => {
            tracing::debug!("emitter batch is empty, ignoring");
        }
        Ok(report) => {
            tracing::info!(
                stored = report.stored,
                unknown_metric = report.unknown_metric,
                value_parse_failures = report.value_parse_failures,
                "collected data from druid emitter"
            );
        }
        Err(e) => {
            tracing::error!(error = %e, code = e.client_code().as_str(), bytes = body.len(), "error decoding JSON sent by druid");
        }
    }
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn content_type_parameters_are_ignored() {
        let mut h = HeaderMap::new();
        h.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8"));
        assert!(is_json(&h));
        h.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        assert!(!is_json(&h));
        assert!(!is_json(&HeaderMap::new()));
    }
}
