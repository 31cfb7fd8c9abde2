use std::time::Instant;

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when the store and the alert stream both answer, else `degraded`.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Round trip of the database ping, absent when it failed.
    pub db_latency_ms: Option<u64>,
    /// Newest alert stream entry id (`"0"` on an empty stream), absent when
    /// the stream could not be read.
    pub alert_stream_head: Option<String>,
}

/// GET /health -- database reachability and the alert stream head.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let started = Instant::now();
    let db_latency_ms = clima_db::health_check(&state.pool)
        .await
        .ok()
        .map(|()| started.elapsed().as_millis() as u64);

    let alert_stream_head = match state.stream().latest().await {
        Ok(id) => Some(id.to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not read the alert stream");
            None
        }
    };

    let db_healthy = db_latency_ms.is_some();
    let status = if db_healthy && alert_stream_head.is_some() {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        db_latency_ms,
        alert_stream_head,
    })
}

/// Mount the health route at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
