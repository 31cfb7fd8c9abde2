//! Measurement types shared by ingestion, storage and alerting.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Lowest accepted temperature reading, in degrees Celsius.
pub const TEMPERATURE_MIN: f64 = -100.0;
/// Highest accepted temperature reading, in degrees Celsius.
pub const TEMPERATURE_MAX: f64 = 100.0;
/// Lowest accepted relative humidity, in percent.
pub const HUMIDITY_MIN: f64 = 0.0;
/// Highest accepted relative humidity, in percent.
pub const HUMIDITY_MAX: f64 = 100.0;

/// Raw values reported by a sensor, before they become a [`Measurement`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Reading {
    #[validate(range(min = TEMPERATURE_MIN, max = TEMPERATURE_MAX))]
    pub temperature: Option<f64>,
    #[validate(range(min = HUMIDITY_MIN, max = HUMIDITY_MAX))]
    pub humidity: Option<f64>,
}

impl Reading {
    pub fn new(temperature: Option<f64>, humidity: Option<f64>) -> Self {
        Self {
            temperature,
            humidity,
        }
    }

    /// Check that at least one value is present and every present value is
    /// a finite number inside its accepted range.
    pub fn validate_reading(&self) -> Result<(), CoreError> {
        if self.temperature.is_none() && self.humidity.is_none() {
            return Err(CoreError::Validation(
                "A measurement needs a temperature or a humidity value".to_string(),
            ));
        }
        for (name, value) in [("temperature", self.temperature), ("humidity", self.humidity)] {
            if value.is_some_and(|v| !v.is_finite()) {
                return Err(CoreError::Validation(format!(
                    "{name} must be a finite number"
                )));
            }
        }
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))
    }
}

/// One immutable, stored sensor measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub sensor_id: DbId,
    pub timestamp: Timestamp,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

impl Measurement {
    pub fn new(sensor_id: DbId, timestamp: Timestamp, reading: Reading) -> Self {
        Self {
            sensor_id,
            timestamp,
            temperature: reading.temperature,
            humidity: reading.humidity,
        }
    }

    pub fn reading(&self) -> Reading {
        Reading::new(self.temperature, self.humidity)
    }
}

/// A measurement annotated with the location it was recorded at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocatedMeasurement {
    pub country: String,
    pub city: String,
    #[serde(flatten)]
    pub measurement: Measurement,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_reading() {
        let err = Reading::default().validate_reading().unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn accepts_single_value() {
        assert!(Reading::new(Some(21.5), None).validate_reading().is_ok());
        assert!(Reading::new(None, Some(40.0)).validate_reading().is_ok());
    }

    #[test]
    fn accepts_range_boundaries() {
        assert!(Reading::new(Some(TEMPERATURE_MIN), Some(HUMIDITY_MIN))
            .validate_reading()
            .is_ok());
        assert!(Reading::new(Some(TEMPERATURE_MAX), Some(HUMIDITY_MAX))
            .validate_reading()
            .is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(Reading::new(Some(100.5), None).validate_reading().is_err());
        assert!(Reading::new(None, Some(-0.1)).validate_reading().is_err());
        assert!(Reading::new(Some(20.0), Some(101.0))
            .validate_reading()
            .is_err());
    }

    #[test]
    fn rejects_values_just_past_the_limits() {
        for reading in [
            Reading::new(Some(TEMPERATURE_MIN - 0.01), None),
            Reading::new(Some(TEMPERATURE_MAX + 0.01), None),
            Reading::new(None, Some(HUMIDITY_MIN - 0.01)),
            Reading::new(None, Some(HUMIDITY_MAX + 0.01)),
        ] {
            assert!(reading.validate().is_err(), "{reading:?}");
        }
    }

    #[test]
    fn rejects_nan() {
        assert!(Reading::new(Some(f64::NAN), None)
            .validate_reading()
            .is_err());
    }
}
