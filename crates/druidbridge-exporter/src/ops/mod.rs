//! Operational HTTP endpoints.
//!
//! - `/`        : landing page
//! - `/healthz` : liveness
//! - `/metrics` : Prometheus text format

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::app_state::AppState;

const INDEX_HTML: &str = r#"<html>
<head><title>Druid Exporter</title></head>
<body>
<h1>Druid Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
</body>
</html>"#;

pub async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let mut body = String::new();
    state.store().render(&mut body);
    state.metrics().render(state.store().series_count(), &mut body);
    if let Some(collector) = state.collector() {
        collector.collect(&mut body).await;
    }

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}
