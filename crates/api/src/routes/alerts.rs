use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::{alerts, stream};
use crate::state::AppState;

/// Routes mounted at `/alerts`.
///
/// ```text
/// GET   /                     -> list_alerts
/// GET   /active               -> list_active
/// GET   /stream               -> read_stream (long poll)
/// GET   /{id}                 -> get_alert
/// PATCH /{id}/acknowledge     -> acknowledge
/// PATCH /{id}/resolve         -> resolve
/// PATCH /{id}/status          -> update_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(alerts::list_alerts))
        .route("/active", get(alerts::list_active))
        .route("/stream", get(stream::read_stream))
        .route("/{id}", get(alerts::get_alert))
        .route("/{id}/acknowledge", patch(alerts::acknowledge))
        .route("/{id}/resolve", patch(alerts::resolve))
        .route("/{id}/status", patch(alerts::update_status))
}

/// The SSE feed. Kept apart so it escapes the request timeout.
///
/// ```text
/// GET   /alerts/stream/live   -> live_feed
/// ```
pub fn live_router() -> Router<AppState> {
    Router::new().route("/alerts/stream/live", get(stream::live_feed))
}
