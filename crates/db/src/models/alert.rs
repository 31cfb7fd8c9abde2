//! Alert rows and list filters.

use clima_core::alert::{AlertKind, AlertStatus};
use clima_core::error::CoreError;
use clima_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Default page size for alert listings.
pub const DEFAULT_LIST_LIMIT: i64 = 100;
/// Largest page size accepted for alert listings.
pub const MAX_LIST_LIMIT: i64 = 500;

/// A persisted alert. `kind` and `status` hold the wire strings of
/// [`AlertKind`] and [`AlertStatus`].
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Alert {
    pub id: DbId,
    pub kind: String,
    pub sensor_id: Option<DbId>,
    pub raised_at: Timestamp,
    pub description: String,
    pub status: String,
    pub value: Option<f64>,
    pub threshold: Option<f64>,
    pub rule_id: Option<DbId>,
    pub rule_name: Option<String>,
    pub priority: Option<i16>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Alert {
    pub fn kind(&self) -> Result<AlertKind, CoreError> {
        self.kind.parse()
    }

    pub fn status(&self) -> Result<AlertStatus, CoreError> {
        self.status.parse()
    }
}

/// Filters for listing alerts, newest first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertFilter {
    pub status: Option<AlertStatus>,
    pub sensor_id: Option<DbId>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl AlertFilter {
    /// `(offset, limit)` clamped to sane values.
    pub fn page(&self) -> (i64, i64) {
        let skip = self.skip.unwrap_or(0).max(0);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT);
        (skip, limit)
    }
}
