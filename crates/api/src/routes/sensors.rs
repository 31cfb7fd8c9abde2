use axum::routing::post;
use axum::Router;

use crate::handlers::measurements;
use crate::state::AppState;

/// Routes mounted at `/sensors`.
///
/// ```text
/// POST /{id}/measurements     -> register_measurement
/// POST /{id}/health-check     -> check_sensor_health
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}/measurements",
            post(measurements::register_measurement),
        )
        .route(
            "/{id}/health-check",
            post(measurements::check_sensor_health),
        )
}
