//! Repository for the `alerts` table.

use clima_core::alert::{AlertStatus, NewAlert};
use clima_core::types::DbId;
use sqlx::PgPool;

use crate::models::alert::{Alert, AlertFilter};

/// Column list for `alerts` queries.
const COLUMNS: &str = "\
    id, kind, sensor_id, raised_at, description, status, \
    value, threshold, rule_id, rule_name, priority, \
    created_at, updated_at";

/// Provides persistence for raised alerts. Alerts are never deleted here.
pub struct AlertRepo;

impl AlertRepo {
    /// Insert a new alert. The initial status is always `active`.
    pub async fn create(pool: &PgPool, alert: &NewAlert) -> Result<Alert, sqlx::Error> {
        let query = format!(
            "INSERT INTO alerts \
                (kind, sensor_id, raised_at, description, status, \
                 value, threshold, rule_id, rule_name, priority) \
             VALUES ($1, $2, $3, $4, 'active', $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(alert.kind.as_str())
            .bind(alert.sensor_id)
            .bind(alert.timestamp)
            .bind(&alert.description)
            .bind(alert.value)
            .bind(alert.threshold)
            .bind(alert.rule_id)
            .bind(&alert.rule_name)
            .bind(alert.priority)
            .fetch_one(pool)
            .await
    }

    pub async fn get_by_id(pool: &PgPool, id: DbId) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM alerts WHERE id = $1");
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List alerts, newest first, optionally filtered by status and sensor.
    pub async fn list(pool: &PgPool, filter: &AlertFilter) -> Result<Vec<Alert>, sqlx::Error> {
        let (skip, limit) = filter.page();
        let query = format!(
            "SELECT {COLUMNS} FROM alerts \
             WHERE ($1::TEXT IS NULL OR status = $1) \
               AND ($2::BIGINT IS NULL OR sensor_id = $2) \
             ORDER BY raised_at DESC, id DESC \
             OFFSET $3 LIMIT $4"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(filter.status.map(AlertStatus::as_str))
            .bind(filter.sensor_id)
            .bind(skip)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Move an alert from `from` to `to`.
    ///
    /// The update only applies while the stored status still equals `from`,
    /// so concurrent transitions cannot both succeed. Returns `None` when
    /// the alert is missing or its status changed underneath the caller.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        from: AlertStatus,
        to: AlertStatus,
    ) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!(
            "UPDATE alerts SET status = $3, updated_at = NOW() \
             WHERE id = $1 AND status = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .fetch_optional(pool)
            .await
    }
}
