//! Repository for the `alert_rules` table.
//!
//! Callers validate a [`RuleDefinition`] before writing it; the table's
//! CHECK constraints enforce the same invariants as a backstop.

use clima_core::rules::{RuleDefinition, RuleStatus};
use clima_core::types::DbId;
use sqlx::PgPool;

use crate::models::alert_rule::{AlertRuleRow, RuleFilter, RuleSummary, ScopeCount};

/// Column list for `alert_rules` queries.
const COLUMNS: &str = "\
    id, name, description, temp_min, temp_max, humidity_min, humidity_max, \
    scope, country, city, region, valid_from, valid_to, status, priority, \
    owner_id, created_at, updated_at";

/// Column list for INSERT (excludes auto-generated columns).
const INSERT_COLUMNS: &str = "\
    name, description, temp_min, temp_max, humidity_min, humidity_max, \
    scope, country, city, region, valid_from, valid_to, status, priority, owner_id";

pub struct AlertRuleRepo;

impl AlertRuleRepo {
    pub async fn create(
        pool: &PgPool,
        def: &RuleDefinition,
    ) -> Result<AlertRuleRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO alert_rules ({INSERT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AlertRuleRow>(&query)
            .bind(def.name.trim())
            .bind(&def.description)
            .bind(def.temp_min)
            .bind(def.temp_max)
            .bind(def.humidity_min)
            .bind(def.humidity_max)
            .bind(def.scope.as_str())
            .bind(def.country.trim())
            .bind(def.city.as_deref().map(str::trim))
            .bind(def.region.as_deref().map(str::trim))
            .bind(def.valid_from)
            .bind(def.valid_to)
            .bind(def.status.as_str())
            .bind(def.priority)
            .bind(def.owner_id)
            .fetch_one(pool)
            .await
    }

    pub async fn get_by_id(pool: &PgPool, id: DbId) -> Result<Option<AlertRuleRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM alert_rules WHERE id = $1");
        sqlx::query_as::<_, AlertRuleRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List rules, highest priority first.
    pub async fn list(pool: &PgPool, filter: &RuleFilter) -> Result<Vec<AlertRuleRow>, sqlx::Error> {
        let (skip, limit) = filter.page();
        let query = format!(
            "SELECT {COLUMNS} FROM alert_rules \
             WHERE ($1::TEXT IS NULL OR status = $1) \
               AND ($2::TEXT IS NULL OR lower(btrim(country)) = lower(btrim($2))) \
               AND ($3::TEXT IS NULL OR lower(btrim(city)) = lower(btrim($3))) \
             ORDER BY priority DESC, id \
             OFFSET $4 LIMIT $5"
        );
        sqlx::query_as::<_, AlertRuleRow>(&query)
            .bind(&filter.status)
            .bind(&filter.country)
            .bind(&filter.city)
            .bind(skip)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Every active rule, highest priority first.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<AlertRuleRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alert_rules \
             WHERE status = 'active' \
             ORDER BY priority DESC, id"
        );
        sqlx::query_as::<_, AlertRuleRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Active rules for a country: the candidate set the rule engine narrows
    /// down by scope and validity window.
    pub async fn list_candidates(
        pool: &PgPool,
        country: &str,
    ) -> Result<Vec<AlertRuleRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alert_rules \
             WHERE status = 'active' AND lower(btrim(country)) = lower(btrim($1)) \
             ORDER BY priority DESC, id"
        );
        sqlx::query_as::<_, AlertRuleRow>(&query)
            .bind(country)
            .fetch_all(pool)
            .await
    }

    /// Replace a rule's definition. `def` must already be the validated
    /// merge of the stored rule and the change (see `RuleUpdate::apply`).
    /// The owner is never changed. Returns `None` if the rule does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        def: &RuleDefinition,
    ) -> Result<Option<AlertRuleRow>, sqlx::Error> {
        let query = format!(
            "UPDATE alert_rules SET \
                name = $2, description = $3, temp_min = $4, temp_max = $5, \
                humidity_min = $6, humidity_max = $7, scope = $8, country = $9, \
                city = $10, region = $11, valid_from = $12, valid_to = $13, \
                status = $14, priority = $15, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AlertRuleRow>(&query)
            .bind(id)
            .bind(def.name.trim())
            .bind(&def.description)
            .bind(def.temp_min)
            .bind(def.temp_max)
            .bind(def.humidity_min)
            .bind(def.humidity_max)
            .bind(def.scope.as_str())
            .bind(def.country.trim())
            .bind(def.city.as_deref().map(str::trim))
            .bind(def.region.as_deref().map(str::trim))
            .bind(def.valid_from)
            .bind(def.valid_to)
            .bind(def.status.as_str())
            .bind(def.priority)
            .fetch_optional(pool)
            .await
    }

    /// Activate or deactivate a rule. Returns `None` if it does not exist.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: RuleStatus,
    ) -> Result<Option<AlertRuleRow>, sqlx::Error> {
        let query = format!(
            "UPDATE alert_rules SET status = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AlertRuleRow>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Delete a rule by ID. Returns true if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM alert_rules WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn summary(pool: &PgPool) -> Result<RuleSummary, sqlx::Error> {
        let (total, active): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE status = 'active') FROM alert_rules",
        )
        .fetch_one(pool)
        .await?;

        let by_scope = sqlx::query_as::<_, ScopeCount>(
            "SELECT scope, COUNT(*) AS count FROM alert_rules GROUP BY scope ORDER BY scope",
        )
        .fetch_all(pool)
        .await?;

        Ok(RuleSummary {
            total,
            active,
            inactive: total - active,
            by_scope,
        })
    }
}
