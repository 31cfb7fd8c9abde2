//! Handlers for measurement ingestion and range queries.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use clima_core::measurement::{LocatedMeasurement, Reading};
use clima_core::stats::LocationStats;
use clima_core::types::DbId;
use clima_db::models::alert::Alert;
use clima_pipeline::IngestionResult;
use serde::Serialize;

use crate::error::AppResult;
use crate::query::{LocationWindowParams, TimeWindowParams};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

/// POST /sensors/{id}/measurements
///
/// Store a reading and evaluate it. Responds with the stored values and
/// every alert the reading raised.
pub async fn register_measurement(
    State(state): State<AppState>,
    Path(sensor_id): Path<DbId>,
    Json(reading): Json<Reading>,
) -> AppResult<(StatusCode, Json<DataResponse<IngestionResult>>)> {
    let result = state
        .ingestor
        .register_measurement(sensor_id, reading)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: result })))
}

/// POST /sensors/{id}/health-check
///
/// Returns the raised `sensorFailure` alert, or `null` for a healthy sensor.
pub async fn check_sensor_health(
    State(state): State<AppState>,
    Path(sensor_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Option<Alert>>>> {
    let alert = state.ingestor.check_sensor_health(sensor_id).await?;
    Ok(Json(DataResponse { data: alert }))
}

/// GET /measurements/sensor/{id}
pub async fn by_sensor(
    State(state): State<AppState>,
    Path(sensor_id): Path<DbId>,
    Query(window): Query<TimeWindowParams>,
) -> AppResult<Json<DataResponse<Vec<LocatedMeasurement>>>> {
    let rows = state
        .measurements
        .by_sensor(sensor_id, window.start, window.end)
        .await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /measurements/location
pub async fn by_location(
    State(state): State<AppState>,
    Query(params): Query<LocationWindowParams>,
) -> AppResult<Json<DataResponse<Vec<LocatedMeasurement>>>> {
    let rows = state
        .measurements
        .by_location(&params.country, &params.city, params.start, params.end)
        .await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /measurements/stats
pub async fn stats(
    State(state): State<AppState>,
    Query(params): Query<LocationWindowParams>,
) -> AppResult<Json<DataResponse<LocationStats>>> {
    let stats = state
        .measurements
        .stats(&params.country, &params.city, params.start, params.end)
        .await?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /measurements/count
pub async fn count(
    State(state): State<AppState>,
    Query(window): Query<TimeWindowParams>,
) -> AppResult<Json<DataResponse<CountResponse>>> {
    let count = state.measurements.count(window.start, window.end).await?;
    Ok(Json(DataResponse {
        data: CountResponse { count },
    }))
}
