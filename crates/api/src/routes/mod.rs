pub mod alert_rules;
pub mod alerts;
pub mod health;
pub mod measurements;
pub mod sensors;

use std::time::Duration;

use axum::http::StatusCode;
use axum::Router;
use tower_http::timeout::TimeoutLayer;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /sensors/{id}/measurements                      ingest a reading (POST)
/// /sensors/{id}/health-check                      raise failure alert if failed (POST)
///
/// /measurements/sensor/{id}                       by sensor (?start&end)
/// /measurements/location                          by location (?country&city&start&end)
/// /measurements/stats                             location stats (?country&city&start&end)
/// /measurements/count                             global count (?start&end)
///
/// /alerts                                         list (?status&sensor_id&skip&limit)
/// /alerts/active                                  active alerts (?skip&limit)
/// /alerts/{id}                                    get
/// /alerts/{id}/acknowledge                        acknowledge (PATCH)
/// /alerts/{id}/resolve                            resolve (PATCH)
/// /alerts/{id}/status                             transition (PATCH)
/// /alerts/stream                                  one long-poll read (?after&count)
/// /alerts/stream/live                             SSE feed (Last-Event-ID or ?after)
///
/// /alert-rules                                    list, create
/// /alert-rules/active                             active rules, highest priority first
/// /alert-rules/summary                            counts by status and scope
/// /alert-rules/{id}                               get, update (PUT), delete
/// /alert-rules/{id}/activate                      activate (PATCH)
/// /alert-rules/{id}/deactivate                    deactivate (PATCH)
/// ```
///
/// Every route runs under the request timeout except the SSE feed, which
/// stays open until the client leaves or the server shuts down.
pub fn api_routes(request_timeout: Duration) -> Router<AppState> {
    let timed = Router::new()
        .nest("/sensors", sensors::router())
        .nest("/measurements", measurements::router())
        .nest("/alerts", alerts::router())
        .nest("/alert-rules", alert_rules::router())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ));

    Router::new()
        .merge(timed)
        .merge(alerts::live_router())
}
