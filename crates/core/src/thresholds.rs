//! Deployment-wide safety thresholds for temperature and humidity.
//!
//! The envelope is handed in as a [`ThresholdConfig`] value at
//! construction and never read from process state. This check runs on every
//! measurement independently of the configurable alert rules.

use serde::{Deserialize, Serialize};

use crate::alert::{AlertKind, NewAlert};
use crate::error::CoreError;
use crate::sensor::{Sensor, SensorStatus};
use crate::types::Timestamp;

/// Static min/max envelope applied to every measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity_min: f64,
    pub humidity_max: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            temp_min: -50.0,
            temp_max: 60.0,
            humidity_min: 0.0,
            humidity_max: 100.0,
        }
    }
}

impl ThresholdConfig {
    /// Reject envelopes whose minimum exceeds their maximum.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.temp_min > self.temp_max {
            return Err(CoreError::Validation(format!(
                "temp_min ({}) must not exceed temp_max ({})",
                self.temp_min, self.temp_max
            )));
        }
        if self.humidity_min > self.humidity_max {
            return Err(CoreError::Validation(format!(
                "humidity_min ({}) must not exceed humidity_max ({})",
                self.humidity_min, self.humidity_max
            )));
        }
        Ok(())
    }
}

/// Stateless checker of single measurements against a [`ThresholdConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdEvaluator {
    config: ThresholdConfig,
}

impl ThresholdEvaluator {
    pub fn new(config: ThresholdConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Compare each present value against the envelope.
    ///
    /// Every crossed boundary yields one `threshold` alert carrying the
    /// measured value and the crossed boundary. Boundaries are exclusive:
    /// a value equal to a bound does not alert.
    pub fn check(
        &self,
        sensor: &Sensor,
        temperature: Option<f64>,
        humidity: Option<f64>,
        at: Timestamp,
    ) -> Vec<NewAlert> {
        let place = format!("{}, {}", sensor.city, sensor.country);
        let mut alerts = Vec::new();

        if let Some(t) = temperature {
            if t < self.config.temp_min {
                alerts.push(
                    NewAlert::new(
                        AlertKind::Threshold,
                        at,
                        format!("Temperature too low detected in {place}"),
                    )
                    .with_sensor(sensor.id)
                    .with_value(t, Some(self.config.temp_min)),
                );
            }
            if t > self.config.temp_max {
                alerts.push(
                    NewAlert::new(
                        AlertKind::Threshold,
                        at,
                        format!("Temperature too high detected in {place}"),
                    )
                    .with_sensor(sensor.id)
                    .with_value(t, Some(self.config.temp_max)),
                );
            }
        }

        if let Some(h) = humidity {
            if h < self.config.humidity_min {
                alerts.push(
                    NewAlert::new(
                        AlertKind::Threshold,
                        at,
                        format!("Humidity too low detected in {place}"),
                    )
                    .with_sensor(sensor.id)
                    .with_value(h, Some(self.config.humidity_min)),
                );
            }
            if h > self.config.humidity_max {
                alerts.push(
                    NewAlert::new(
                        AlertKind::Threshold,
                        at,
                        format!("Humidity too high detected in {place}"),
                    )
                    .with_sensor(sensor.id)
                    .with_value(h, Some(self.config.humidity_max)),
                );
            }
        }

        alerts
    }
}

/// A `sensorFailure` alert for a sensor whose status is `failed`.
pub fn sensor_health(sensor: &Sensor, at: Timestamp) -> Option<NewAlert> {
    if sensor.status != SensorStatus::Failed {
        return None;
    }
    Some(
        NewAlert::new(
            AlertKind::SensorFailure,
            at,
            format!(
                "Sensor {} in {}, {} reports failure",
                sensor.name, sensor.city, sensor.country
            ),
        )
        .with_sensor(sensor.id),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
