//! Axum router wiring.
//!
//! `/druid` receives emitter batches; the rest are operational endpoints.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, ingest, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ops::index))
        // emitter batches have no size cap
        .route(
            "/druid",
            post(ingest::http::druid_emitter).layer(DefaultBodyLimit::disable()),
        )
        .route("/metrics", get(ops::metrics))
        .route("/healthz", get(ops::healthz))
        .with_state(state)
}
