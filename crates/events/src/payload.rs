//! Wire format of a stream entry.

use clima_core::types::{DbId, Timestamp};
use clima_db::models::alert::Alert;
use serde::{Deserialize, Serialize};

/// The alert snapshot stored in each stream entry.
///
/// Field names are part of the wire contract consumed by external
/// subscribers; `timestamp` serializes as an ISO-8601 string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertPayload {
    pub id: DbId,
    pub kind: String,
    #[serde(rename = "sensorID")]
    pub sensor_id: Option<DbId>,
    pub timestamp: Timestamp,
    pub description: String,
    pub status: String,
    pub value: Option<f64>,
    pub threshold: Option<f64>,
    #[serde(rename = "ruleID")]
    pub rule_id: Option<DbId>,
    #[serde(rename = "ruleName")]
    pub rule_name: Option<String>,
    pub priority: Option<i16>,
}

impl From<&Alert> for AlertPayload {
    fn from(alert: &Alert) -> Self {
        Self {
            id: alert.id,
            kind: alert.kind.clone(),
            sensor_id: alert.sensor_id,
            timestamp: alert.raised_at,
            description: alert.description.clone(),
            status: alert.status.clone(),
            value: alert.value,
            threshold: alert.threshold,
            rule_id: alert.rule_id,
            rule_name: alert.rule_name.clone(),
            priority: alert.priority,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn alert() -> Alert {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap();
        Alert {
            id: 9,
            kind: "threshold".into(),
            sensor_id: Some(3),
            raised_at: at,
            description: "Heat - Extreme heat".into(),
            status: "active".into(),
            value: Some(41.2),
            threshold: None,
            rule_id: Some(5),
            rule_name: Some("Heat".into()),
            priority: Some(4),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn wire_field_names() {
        let json = serde_json::to_value(AlertPayload::from(&alert())).unwrap();
        assert_eq!(json["id"], 9);
        assert_eq!(json["sensorID"], 3);
        assert_eq!(json["ruleID"], 5);
        assert_eq!(json["ruleName"], "Heat");
        assert_eq!(json["priority"], 4);
        assert_eq!(json["value"], 41.2);
        assert!(json["threshold"].is_null());
        assert_eq!(json["timestamp"], "2024-01-15T14:30:00Z");
    }

    #[test]
    fn decodes_what_it_encodes() {
        let payload = AlertPayload::from(&alert());
        let json = serde_json::to_value(&payload).unwrap();
        let back: AlertPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back, payload);
    }
}
