//! Sensor descriptors as seen by the measurement pipeline.
//!
//! Sensors are managed elsewhere; the pipeline only needs the status gate
//! and the location fields used as storage and rule partition keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Operational status of a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorStatus {
    Active,
    Inactive,
    Failed,
}

impl SensorStatus {
    /// Database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            SensorStatus::Active => "active",
            SensorStatus::Inactive => "inactive",
            SensorStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for SensorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SensorStatus::Active),
            "inactive" => Ok(SensorStatus::Inactive),
            "failed" => Ok(SensorStatus::Failed),
            other => Err(CoreError::Validation(format!(
                "Unknown sensor status '{other}'"
            ))),
        }
    }
}

/// A validated sensor descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sensor {
    pub id: DbId,
    pub name: String,
    pub country: String,
    pub city: String,
    pub region: Option<String>,
    pub status: SensorStatus,
    pub latitude: f64,
    pub longitude: f64,
}

impl Sensor {
    /// Reject measurements from sensors that are not `active`.
    pub fn ensure_accepts_measurements(&self) -> Result<(), CoreError> {
        if self.status != SensorStatus::Active {
            return Err(CoreError::Validation(format!(
                "Sensor {} is not active (status: {})",
                self.id, self.status
            )));
        }
        Ok(())
    }

    /// The sensor's location as used for rule matching.
    pub fn location(&self) -> Location {
        Location {
            country: self.country.clone(),
            city: Some(self.city.clone()),
            region: self.region.clone(),
        }
    }
}

/// A geographic position at the granularity alert rules understand.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub country: String,
    pub city: Option<String>,
    pub region: Option<String>,
}

/// Normalise a location component for comparison and partition keys.
///
/// Comparison is case-insensitive and ignores surrounding whitespace.
pub fn location_key(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Case-insensitive, trimmed equality of two location components.
pub fn same_place(a: &str, b: &str) -> bool {
    location_key(a) == location_key(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor(status: SensorStatus) -> Sensor {
        Sensor {
            id: 7,
            name: "roof-01".into(),
            country: "Argentina".into(),
            city: "Córdoba".into(),
            region: None,
            status,
            latitude: -31.42,
            longitude: -64.18,
        }
    }

    #[test]
    fn only_active_sensors_accept_measurements() {
        assert!(sensor(SensorStatus::Active)
            .ensure_accepts_measurements()
            .is_ok());
        assert!(sensor(SensorStatus::Inactive)
            .ensure_accepts_measurements()
            .is_err());
        assert!(sensor(SensorStatus::Failed)
            .ensure_accepts_measurements()
            .is_err());
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            SensorStatus::Active,
            SensorStatus::Inactive,
            SensorStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<SensorStatus>().unwrap(), status);
        }
        assert!("broken".parse::<SensorStatus>().is_err());
    }

    #[test]
    fn same_place_ignores_case_and_whitespace() {
        assert!(same_place("  CÓRDOBA ", "córdoba"));
        assert!(!same_place("Córdoba", "Rosario"));
    }
}
