//! Measurement ingestion orchestration.
//!
//! ```text
//! register_measurement
//!   ├─ validate reading + sensor status
//!   ├─ MeasurementSink::write          (fan-out, errors propagate)
//!   ├─ ThresholdEvaluator::check ─┐
//!   ├─ RuleEngine::evaluate ──────┤   (independent, both may fire)
//!   └─ AlertSink::raise  ◄────────┘   (failures logged, write kept)
//! ```

use std::sync::Arc;

use chrono::Utc;
use clima_core::alert::NewAlert;
use clima_core::error::CoreError;
use clima_core::measurement::{Measurement, Reading};
use clima_core::rules::{RuleEngine, RuleInput};
use clima_core::thresholds::{sensor_health, ThresholdConfig, ThresholdEvaluator};
use clima_core::types::{DbId, Timestamp};
use clima_db::models::alert::Alert;
use serde::Serialize;

use crate::error::PipelineError;
use crate::ports::{AlertSink, MeasurementSink, RuleSource, SensorDirectory};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// One rule-attributed alert raised by an ingested measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggeredAlert {
    pub rule_name: String,
    pub priority: i16,
    #[serde(rename = "alertID")]
    pub alert_id: DbId,
}

/// Outcome of a successful ingestion.
///
/// `triggered_alerts` lists rule hits in priority order. Alerts from the
/// static threshold envelope are reported separately in
/// `threshold_alert_ids`. `failed_alerts` counts alerts that could not be
/// raised; the measurement itself is stored regardless.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionResult {
    #[serde(rename = "sensorID")]
    pub sensor_id: DbId,
    pub timestamp: Timestamp,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub triggered_alerts: Vec<TriggeredAlert>,
    #[serde(rename = "thresholdAlertIDs")]
    pub threshold_alert_ids: Vec<DbId>,
    pub failed_alerts: usize,
}

// ---------------------------------------------------------------------------
// MeasurementIngestor
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct MeasurementIngestor {
    sensors: Arc<dyn SensorDirectory>,
    measurements: Arc<dyn MeasurementSink>,
    rules: Arc<dyn RuleSource>,
    alerts: Arc<dyn AlertSink>,
    thresholds: ThresholdEvaluator,
}

impl MeasurementIngestor {
    pub fn new(
        sensors: Arc<dyn SensorDirectory>,
        measurements: Arc<dyn MeasurementSink>,
        rules: Arc<dyn RuleSource>,
        alerts: Arc<dyn AlertSink>,
        thresholds: ThresholdConfig,
    ) -> Self {
        Self {
            sensors,
            measurements,
            rules,
            alerts,
            thresholds: ThresholdEvaluator::new(thresholds),
        }
    }

    /// Ingest a reading stamped with the current time.
    pub async fn register_measurement(
        &self,
        sensor_id: DbId,
        reading: Reading,
    ) -> Result<IngestionResult, PipelineError> {
        self.ingest_at(sensor_id, reading, Utc::now()).await
    }

    /// Ingest a reading taken at `at`.
    ///
    /// Fails with a validation error for an unknown or non-active sensor
    /// or an empty/out-of-range reading, and with the storage error when
    /// the write fails. Once the write succeeds the call succeeds.
    pub async fn ingest_at(
        &self,
        sensor_id: DbId,
        reading: Reading,
        at: Timestamp,
    ) -> Result<IngestionResult, PipelineError> {
        reading.validate_reading()?;

        let sensor = self
            .sensors
            .get_sensor(sensor_id)
            .await?
            .ok_or_else(|| CoreError::Validation(format!("Sensor {sensor_id} not found")))?;
        sensor.ensure_accepts_measurements()?;

        let measurement = Measurement::new(sensor_id, at, reading);
        self.measurements
            .write(&sensor.country, &sensor.city, &measurement)
            .await?;

        tracing::debug!(
            sensor_id,
            timestamp = %at,
            temperature = ?measurement.temperature,
            humidity = ?measurement.humidity,
            "Measurement stored",
        );

        let mut result = IngestionResult {
            sensor_id,
            timestamp: at,
            temperature: measurement.temperature,
            humidity: measurement.humidity,
            triggered_alerts: Vec::new(),
            threshold_alert_ids: Vec::new(),
            failed_alerts: 0,
        };

        for draft in self
            .thresholds
            .check(&sensor, measurement.temperature, measurement.humidity, at)
        {
            if let Some(alert) = self.raise(&draft, &mut result).await {
                result.threshold_alert_ids.push(alert.id);
            }
        }

        let location = sensor.location();
        let rules = match self.rules.candidate_rules(&location).await {
            Ok(rules) => rules,
            Err(e) => {
                tracing::error!(sensor_id, error = %e, "Failed to load alert rules");
                result.failed_alerts += 1;
                Vec::new()
            }
        };

        let engine = RuleEngine::new(rules);
        let hits = engine.evaluate(RuleInput {
            sensor_id,
            location: &location,
            temperature: measurement.temperature,
            humidity: measurement.humidity,
            at,
        });

        for hit in hits {
            if let Some(alert) = self.raise(&hit.alert, &mut result).await {
                result.triggered_alerts.push(TriggeredAlert {
                    rule_name: hit.rule_name,
                    priority: hit.priority,
                    alert_id: alert.id,
                });
            }
        }

        if !result.triggered_alerts.is_empty() || !result.threshold_alert_ids.is_empty() {
            tracing::info!(
                sensor_id,
                rule_alerts = result.triggered_alerts.len(),
                threshold_alerts = result.threshold_alert_ids.len(),
                "Measurement raised alerts",
            );
        }

        Ok(result)
    }

    /// Raise a `sensorFailure` alert when the sensor reports `failed`.
    pub async fn check_sensor_health(&self, sensor_id: DbId) -> Result<Option<Alert>, PipelineError> {
        let sensor = self
            .sensors
            .get_sensor(sensor_id)
            .await?
            .ok_or_else(|| PipelineError::not_found("sensor", sensor_id))?;

        match sensor_health(&sensor, Utc::now()) {
            Some(draft) => Ok(Some(self.alerts.raise(&draft).await?)),
            None => Ok(None),
        }
    }

    async fn raise(&self, draft: &NewAlert, result: &mut IngestionResult) -> Option<Alert> {
        match self.alerts.raise(draft).await {
            Ok(alert) => Some(alert),
            Err(e) => {
                tracing::error!(
                    sensor_id = result.sensor_id,
                    rule_id = ?draft.rule_id,
                    error = %e,
                    "Failed to raise alert for stored measurement",
                );
                result.failed_alerts += 1;
                None
            }
        }
    }
}
