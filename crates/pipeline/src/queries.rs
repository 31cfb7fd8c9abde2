//! Read side of the time-series store, with the default query window.

use chrono::Utc;
use clima_core::error::CoreError;
use clima_core::measurement::LocatedMeasurement;
use clima_core::partition::TimeRange;
use clima_core::sensor::Sensor;
use clima_core::stats::LocationStats;
use clima_core::types::{DbId, Timestamp};
use clima_db::repositories::{MeasurementRepo, SensorRepo};
use clima_db::DbPool;

use crate::error::PipelineError;

/// Range reads over stored measurements.
///
/// Missing bounds default to the 24 hours before now; `start > end` is a
/// validation error.
#[derive(Clone)]
pub struct MeasurementQueries {
    pool: DbPool,
}

impl MeasurementQueries {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Measurements of one sensor, annotated with its location.
    pub async fn by_sensor(
        &self,
        sensor_id: DbId,
        start: Option<Timestamp>,
        end: Option<Timestamp>,
    ) -> Result<Vec<LocatedMeasurement>, PipelineError> {
        let range = TimeRange::resolve(start, end, Utc::now())?;
        let sensor: Sensor = SensorRepo::get_by_id(&self.pool, sensor_id)
            .await?
            .ok_or_else(|| PipelineError::not_found("sensor", sensor_id))?
            .try_into()?;

        let rows = MeasurementRepo::get_by_sensor(&self.pool, sensor_id, &range).await?;
        Ok(rows
            .into_iter()
            .map(|measurement| LocatedMeasurement {
                country: sensor.country.clone(),
                city: sensor.city.clone(),
                measurement,
            })
            .collect())
    }

    pub async fn by_location(
        &self,
        country: &str,
        city: &str,
        start: Option<Timestamp>,
        end: Option<Timestamp>,
    ) -> Result<Vec<LocatedMeasurement>, PipelineError> {
        require_location(country, city)?;
        let range = TimeRange::resolve(start, end, Utc::now())?;
        Ok(MeasurementRepo::get_by_location(&self.pool, country, city, &range).await?)
    }

    pub async fn stats(
        &self,
        country: &str,
        city: &str,
        start: Option<Timestamp>,
        end: Option<Timestamp>,
    ) -> Result<LocationStats, PipelineError> {
        require_location(country, city)?;
        let range = TimeRange::resolve(start, end, Utc::now())?;
        Ok(MeasurementRepo::stats_by_location(&self.pool, country, city, &range).await?)
    }

    /// Measurements across all locations, from the by-date layout.
    pub async fn count(
        &self,
        start: Option<Timestamp>,
        end: Option<Timestamp>,
    ) -> Result<i64, PipelineError> {
        let range = TimeRange::resolve(start, end, Utc::now())?;
        Ok(MeasurementRepo::count_by_date(&self.pool, &range).await?)
    }
}

fn require_location(country: &str, city: &str) -> Result<(), CoreError> {
    if country.trim().is_empty() || city.trim().is_empty() {
        return Err(CoreError::Validation(
            "country and city are required".to_string(),
        ));
    }
    Ok(())
}
