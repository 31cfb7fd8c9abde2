//! Alert-rule rows, filters, and the summary view.

use clima_core::error::CoreError;
use clima_core::rules::{AlertRule, RuleDefinition};
use clima_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::alert::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};

/// A row from the `alert_rules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AlertRuleRow {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub humidity_min: Option<f64>,
    pub humidity_max: Option<f64>,
    pub scope: String,
    pub country: String,
    pub city: Option<String>,
    pub region: Option<String>,
    pub valid_from: Option<Timestamp>,
    pub valid_to: Option<Timestamp>,
    pub status: String,
    pub priority: i16,
    pub owner_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AlertRuleRow {
    /// The stored definition, with scope and status parsed.
    pub fn definition(&self) -> Result<RuleDefinition, CoreError> {
        Ok(RuleDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            temp_min: self.temp_min,
            temp_max: self.temp_max,
            humidity_min: self.humidity_min,
            humidity_max: self.humidity_max,
            scope: self.scope.parse()?,
            country: self.country.clone(),
            city: self.city.clone(),
            region: self.region.clone(),
            valid_from: self.valid_from,
            valid_to: self.valid_to,
            status: self.status.parse()?,
            priority: self.priority,
            owner_id: self.owner_id,
        })
    }
}

impl TryFrom<AlertRuleRow> for AlertRule {
    type Error = CoreError;

    fn try_from(row: AlertRuleRow) -> Result<Self, Self::Error> {
        AlertRule::new(row.id, row.definition()?)
    }
}

/// Filters for listing rules.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleFilter {
    pub status: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl RuleFilter {
    pub fn page(&self) -> (i64, i64) {
        let skip = self.skip.unwrap_or(0).max(0);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT);
        (skip, limit)
    }
}

/// Rule counts for the rule-management overview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleSummary {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    pub by_scope: Vec<ScopeCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct ScopeCount {
    pub scope: String,
    pub count: i64,
}
