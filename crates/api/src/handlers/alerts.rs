//! Handlers for alert queries and status transitions.

use axum::extract::{Path, Query, State};
use axum::Json;
use clima_core::alert::AlertStatus;
use clima_core::types::DbId;
use clima_db::models::alert::{Alert, AlertFilter};
use serde::Deserialize;

use crate::error::AppResult;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PATCH /alerts/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AlertStatus,
}

/// GET /alerts
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(filter): Query<AlertFilter>,
) -> AppResult<Json<DataResponse<Vec<Alert>>>> {
    let alerts = state.alerts.list(&filter).await?;
    Ok(Json(DataResponse { data: alerts }))
}

/// GET /alerts/active
pub async fn list_active(
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Alert>>>> {
    let alerts = state.alerts.list_active(page.skip, page.limit).await?;
    Ok(Json(DataResponse { data: alerts }))
}

/// GET /alerts/{id}
pub async fn get_alert(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Alert>>> {
    let alert = state.alerts.get(id).await?;
    Ok(Json(DataResponse { data: alert }))
}

/// PATCH /alerts/{id}/acknowledge
pub async fn acknowledge(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Alert>>> {
    let alert = state.alerts.acknowledge(id).await?;
    Ok(Json(DataResponse { data: alert }))
}

/// PATCH /alerts/{id}/resolve
pub async fn resolve(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Alert>>> {
    let alert = state.alerts.resolve(id).await?;
    Ok(Json(DataResponse { data: alert }))
}

/// PATCH /alerts/{id}/status
///
/// Illegal transitions (anything out of `resolved`, backwards moves) are
/// answered with 409.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStatusRequest>,
) -> AppResult<Json<DataResponse<Alert>>> {
    let alert = state.alerts.update_status(id, input.status).await?;
    Ok(Json(DataResponse { data: alert }))
}
