//! PostgreSQL adapters for the pipeline ports.

use async_trait::async_trait;
use clima_core::measurement::Measurement;
use clima_core::rules::AlertRule;
use clima_core::sensor::{Location, Sensor};
use clima_core::types::DbId;
use clima_db::repositories::{AlertRuleRepo, MeasurementRepo, SensorRepo};
use clima_db::DbPool;

use crate::error::PipelineError;
use crate::ports::{MeasurementSink, RuleSource, SensorDirectory};

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

pub struct PgSensorDirectory {
    pool: DbPool,
}

impl PgSensorDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SensorDirectory for PgSensorDirectory {
    async fn get_sensor(&self, id: DbId) -> Result<Option<Sensor>, PipelineError> {
        match SensorRepo::get_by_id(&self.pool, id).await? {
            Some(row) => Ok(Some(Sensor::try_from(row)?)),
            None => Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// Measurements
// ---------------------------------------------------------------------------

pub struct PgMeasurementSink {
    pool: DbPool,
}

impl PgMeasurementSink {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MeasurementSink for PgMeasurementSink {
    async fn write(
        &self,
        country: &str,
        city: &str,
        measurement: &Measurement,
    ) -> Result<(), PipelineError> {
        MeasurementRepo::write(&self.pool, country, city, measurement).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

pub struct PgRuleSource {
    pool: DbPool,
}

impl PgRuleSource {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RuleSource for PgRuleSource {
    async fn candidate_rules(&self, location: &Location) -> Result<Vec<AlertRule>, PipelineError> {
        if location.country.trim().is_empty() {
            return Ok(Vec::new());
        }

        let rows = AlertRuleRepo::list_candidates(&self.pool, &location.country).await?;
        let mut rules = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id;
            match AlertRule::try_from(row) {
                Ok(rule) => rules.push(rule),
                Err(e) => tracing::warn!(rule_id = id, error = %e, "Skipping malformed alert rule"),
            }
        }
        Ok(rules)
    }
}
