//! Handlers for alert-rule records.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use clima_core::error::CoreError;
use clima_core::rules::{RuleDefinition, RuleStatus, RuleUpdate};
use clima_core::types::DbId;
use clima_db::models::alert_rule::{AlertRuleRow, RuleFilter, RuleSummary};
use clima_db::repositories::AlertRuleRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /alert-rules
///
/// The definition is checked against every rule invariant before it is
/// stored; the table constraints repeat the same checks.
pub async fn create_rule(
    State(state): State<AppState>,
    Json(input): Json<RuleDefinition>,
) -> AppResult<(StatusCode, Json<DataResponse<AlertRuleRow>>)> {
    input.validate()?;
    let rule = AlertRuleRepo::create(&state.pool, &input).await?;
    tracing::info!(rule_id = rule.id, name = %rule.name, scope = %rule.scope, "Alert rule created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: rule })))
}

/// GET /alert-rules
pub async fn list_rules(
    State(state): State<AppState>,
    Query(filter): Query<RuleFilter>,
) -> AppResult<Json<DataResponse<Vec<AlertRuleRow>>>> {
    if let Some(status) = &filter.status {
        status.parse::<RuleStatus>()?;
    }
    let rules = AlertRuleRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: rules }))
}

/// GET /alert-rules/active
pub async fn list_active(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<AlertRuleRow>>>> {
    let rules = AlertRuleRepo::list_active(&state.pool).await?;
    Ok(Json(DataResponse { data: rules }))
}

/// GET /alert-rules/summary
pub async fn summary(State(state): State<AppState>) -> AppResult<Json<DataResponse<RuleSummary>>> {
    let summary = AlertRuleRepo::summary(&state.pool).await?;
    Ok(Json(DataResponse { data: summary }))
}

/// GET /alert-rules/{id}
pub async fn get_rule(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AlertRuleRow>>> {
    let rule = AlertRuleRepo::get_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: rule }))
}

/// PUT /alert-rules/{id}
///
/// Only the fields present in the body change. The merged rule must pass
/// the same checks as a new one.
pub async fn update_rule(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RuleUpdate>,
) -> AppResult<Json<DataResponse<AlertRuleRow>>> {
    let current = AlertRuleRepo::get_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let merged = input.apply(current.definition()?)?;

    let rule = AlertRuleRepo::update(&state.pool, id, &merged)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(rule_id = id, name = %rule.name, "Alert rule updated");
    Ok(Json(DataResponse { data: rule }))
}

/// DELETE /alert-rules/{id}
///
/// Alerts already raised by the rule keep their copy of its name and
/// priority; their `rule_id` is cleared.
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !AlertRuleRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(rule_id = id, "Alert rule deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /alert-rules/{id}/activate
pub async fn activate(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AlertRuleRow>>> {
    set_status(&state, id, RuleStatus::Active).await
}

/// PATCH /alert-rules/{id}/deactivate
pub async fn deactivate(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AlertRuleRow>>> {
    set_status(&state, id, RuleStatus::Inactive).await
}

async fn set_status(
    state: &AppState,
    id: DbId,
    status: RuleStatus,
) -> AppResult<Json<DataResponse<AlertRuleRow>>> {
    let rule = AlertRuleRepo::set_status(&state.pool, id, status)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(rule_id = id, status = %status, "Alert rule status changed");
    Ok(Json(DataResponse { data: rule }))
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "AlertRule",
        id,
    })
}
