//! Alert kinds, the alert status machine, and the draft record produced by
//! the evaluators before an alert is persisted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// What raised an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertKind {
    /// A sensor reported itself as failed.
    SensorFailure,
    /// A climate condition flagged outside the threshold machinery.
    Climate,
    /// A measured value crossed a threshold (static or rule-based).
    Threshold,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::SensorFailure => "sensorFailure",
            AlertKind::Climate => "climate",
            AlertKind::Threshold => "threshold",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sensorFailure" => Ok(AlertKind::SensorFailure),
            "climate" => Ok(AlertKind::Climate),
            "threshold" => Ok(AlertKind::Threshold),
            other => Err(CoreError::Validation(format!("Unknown alert kind '{other}'"))),
        }
    }
}

/// Lifecycle status of an alert.
///
/// ```text
/// active ──► acknowledged ──► resolved
///    └──────────────────────────▲
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
}

impl AlertStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertStatus::Active => "active",
            AlertStatus::Acknowledged => "acknowledged",
            AlertStatus::Resolved => "resolved",
        }
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: AlertStatus) -> bool {
        matches!(
            (self, next),
            (AlertStatus::Active, AlertStatus::Acknowledged)
                | (AlertStatus::Active, AlertStatus::Resolved)
                | (AlertStatus::Acknowledged, AlertStatus::Resolved)
        )
    }

    /// Validate a transition, returning the new status.
    pub fn transition_to(self, next: AlertStatus) -> Result<AlertStatus, CoreError> {
        if !self.can_transition_to(next) {
            return Err(CoreError::Conflict(format!(
                "Cannot move alert from {self} to {next}"
            )));
        }
        Ok(next)
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AlertStatus::Active),
            "acknowledged" => Ok(AlertStatus::Acknowledged),
            "resolved" => Ok(AlertStatus::Resolved),
            other => Err(CoreError::Validation(format!(
                "Unknown alert status '{other}'"
            ))),
        }
    }
}

/// An alert that has been raised but not yet persisted.
///
/// The store assigns the id and forces the initial status to `active`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAlert {
    pub kind: AlertKind,
    pub sensor_id: Option<DbId>,
    pub timestamp: Timestamp,
    pub description: String,
    /// The measured value that triggered the alert.
    pub value: Option<f64>,
    /// The crossed boundary, when a single one applies.
    pub threshold: Option<f64>,
    pub rule_id: Option<DbId>,
    pub rule_name: Option<String>,
    pub priority: Option<i16>,
}

impl NewAlert {
    /// Start a draft with only the required fields set.
    pub fn new(kind: AlertKind, timestamp: Timestamp, description: impl Into<String>) -> Self {
        Self {
            kind,
            sensor_id: None,
            timestamp,
            description: description.into(),
            value: None,
            threshold: None,
            rule_id: None,
            rule_name: None,
            priority: None,
        }
    }

    pub fn with_sensor(mut self, sensor_id: DbId) -> Self {
        self.sensor_id = Some(sensor_id);
        self
    }

    pub fn with_value(mut self, value: f64, threshold: Option<f64>) -> Self {
        self.value = Some(value);
        self.threshold = threshold;
        self
    }

    pub fn with_rule(mut self, rule_id: DbId, rule_name: impl Into<String>, priority: i16) -> Self {
        self.rule_id = Some(rule_id);
        self.rule_name = Some(rule_name.into());
        self.priority = Some(priority);
        self
    }
}
