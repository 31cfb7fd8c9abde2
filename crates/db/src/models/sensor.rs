//! Sensor rows.

use clima_core::error::CoreError;
use clima_core::sensor::Sensor;
use clima_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `sensors` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SensorRow {
    pub id: DbId,
    pub name: String,
    pub country: String,
    pub city: String,
    pub region: Option<String>,
    pub status: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<SensorRow> for Sensor {
    type Error = CoreError;

    fn try_from(row: SensorRow) -> Result<Self, Self::Error> {
        Ok(Sensor {
            id: row.id,
            name: row.name,
            country: row.country,
            city: row.city,
            region: row.region,
            status: row.status.parse()?,
            latitude: row.latitude,
            longitude: row.longitude,
        })
    }
}

/// DTO for registering a sensor.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSensor {
    pub name: String,
    pub country: String,
    pub city: String,
    pub region: Option<String>,
    /// Defaults to `active` when omitted.
    pub status: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}
