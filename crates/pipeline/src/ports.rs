//! Storage ports used by the ingestion pipeline.
//!
//! Each trait covers exactly what the pipeline needs from one collaborator.
//! Production adapters live in [`crate::postgres`]; tests substitute
//! in-memory implementations.

use async_trait::async_trait;
use clima_core::alert::NewAlert;
use clima_core::measurement::Measurement;
use clima_core::rules::AlertRule;
use clima_core::sensor::{Location, Sensor};
use clima_core::types::DbId;
use clima_db::models::alert::Alert;

use crate::error::PipelineError;

/// Read-only view of registered sensors.
#[async_trait]
pub trait SensorDirectory: Send + Sync {
    async fn get_sensor(&self, id: DbId) -> Result<Option<Sensor>, PipelineError>;
}

/// Durable measurement storage.
#[async_trait]
pub trait MeasurementSink: Send + Sync {
    /// Write to every layout; partial writes are reported, not hidden.
    async fn write(
        &self,
        country: &str,
        city: &str,
        measurement: &Measurement,
    ) -> Result<(), PipelineError>;
}

/// Source of rule configuration.
#[async_trait]
pub trait RuleSource: Send + Sync {
    /// Active rules that may apply to `location`. Exact scope and validity
    /// filtering is left to the rule engine.
    async fn candidate_rules(&self, location: &Location) -> Result<Vec<AlertRule>, PipelineError>;
}

/// Where raised alerts go.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn raise(&self, alert: &NewAlert) -> Result<Alert, PipelineError>;
}
