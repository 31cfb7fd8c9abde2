//! Rows of the three measurement layouts.

use clima_core::measurement::{LocatedMeasurement, Measurement};
use clima_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from `measurements_by_sensor`.
#[derive(Debug, Clone, FromRow)]
pub struct SensorMeasurementRow {
    pub sensor_id: DbId,
    pub ts: Timestamp,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

impl From<SensorMeasurementRow> for Measurement {
    fn from(row: SensorMeasurementRow) -> Self {
        Measurement {
            sensor_id: row.sensor_id,
            timestamp: row.ts,
            temperature: row.temperature,
            humidity: row.humidity,
        }
    }
}

/// A row from `measurements_by_location`.
#[derive(Debug, Clone, FromRow)]
pub struct LocationMeasurementRow {
    pub country: String,
    pub city: String,
    pub sensor_id: DbId,
    pub ts: Timestamp,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

impl From<LocationMeasurementRow> for LocatedMeasurement {
    fn from(row: LocationMeasurementRow) -> Self {
        LocatedMeasurement {
            country: row.country,
            city: row.city,
            measurement: Measurement {
                sensor_id: row.sensor_id,
                timestamp: row.ts,
                temperature: row.temperature,
                humidity: row.humidity,
            },
        }
    }
}
