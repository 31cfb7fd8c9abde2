use axum::routing::get;
use axum::Router;

use crate::handlers::measurements;
use crate::state::AppState;

/// Routes mounted at `/measurements`.
///
/// ```text
/// GET /sensor/{id}      -> by_sensor
/// GET /location         -> by_location
/// GET /stats            -> stats
/// GET /count            -> count
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sensor/{id}", get(measurements::by_sensor))
        .route("/location", get(measurements::by_location))
        .route("/stats", get(measurements::stats))
        .route("/count", get(measurements::count))
}
