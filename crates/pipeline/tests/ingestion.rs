//! Ingestion pipeline tests against in-memory ports.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use clima_core::alert::{AlertKind, NewAlert};
use clima_core::error::CoreError;
use clima_core::measurement::{Measurement, Reading};
use clima_core::rules::{AlertRule, RuleDefinition, RuleScope, RuleStatus};
use clima_core::sensor::{same_place, Location, Sensor, SensorStatus};
use clima_core::thresholds::ThresholdConfig;
use clima_core::types::{DbId, Timestamp};
use clima_db::models::alert::Alert;
use clima_db::StoreError;
use clima_pipeline::ports::{AlertSink, MeasurementSink, RuleSource, SensorDirectory};
use clima_pipeline::{MeasurementIngestor, PipelineError};

// ---------------------------------------------------------------------------
// In-memory ports
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Sensors(HashMap<DbId, Sensor>);

#[async_trait]
impl SensorDirectory for Sensors {
    async fn get_sensor(&self, id: DbId) -> Result<Option<Sensor>, PipelineError> {
        Ok(self.0.get(&id).cloned())
    }
}

#[derive(Default)]
struct Measurements {
    rows: Mutex<Vec<(String, String, Measurement)>>,
    fail: bool,
}

#[async_trait]
impl MeasurementSink for Measurements {
    async fn write(
        &self,
        country: &str,
        city: &str,
        measurement: &Measurement,
    ) -> Result<(), PipelineError> {
        if self.fail {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut).into());
        }
        self.rows
            .lock()
            .unwrap()
            .push((country.to_string(), city.to_string(), measurement.clone()));
        Ok(())
    }
}

#[derive(Default)]
struct Rules(Vec<AlertRule>);

#[async_trait]
impl RuleSource for Rules {
    async fn candidate_rules(&self, location: &Location) -> Result<Vec<AlertRule>, PipelineError> {
        Ok(self
            .0
            .iter()
            .filter(|r| {
                r.status() == RuleStatus::Active
                    && same_place(&r.definition().country, &location.country)
            })
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct Alerts {
    raised: Mutex<Vec<Alert>>,
    fail: bool,
}

impl Alerts {
    fn raised(&self) -> Vec<Alert> {
        self.raised.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertSink for Alerts {
    async fn raise(&self, draft: &NewAlert) -> Result<Alert, PipelineError> {
        if self.fail {
            return Err(CoreError::Internal("alert store down".into()).into());
        }
        let mut raised = self.raised.lock().unwrap();
        let alert = Alert {
            id: raised.len() as DbId + 1,
            kind: draft.kind.as_str().to_string(),
            sensor_id: draft.sensor_id,
            raised_at: draft.timestamp,
            description: draft.description.clone(),
            status: "active".to_string(),
            value: draft.value,
            threshold: draft.threshold,
            rule_id: draft.rule_id,
            rule_name: draft.rule_name.clone(),
            priority: draft.priority,
            created_at: draft.timestamp,
            updated_at: draft.timestamp,
        };
        raised.push(alert.clone());
        Ok(alert)
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const CORDOBA_SENSOR: DbId = 1;
const IDLE_SENSOR: DbId = 2;
const BROKEN_SENSOR: DbId = 3;

fn sensor(id: DbId, status: SensorStatus) -> Sensor {
    Sensor {
        id,
        name: format!("CBA-{id:02}"),
        country: "Argentina".into(),
        city: "Córdoba".into(),
        region: Some("Centro".into()),
        status,
        latitude: -31.42,
        longitude: -64.18,
    }
}

fn rule(id: DbId, name: &str, priority: i16, temp_max: f64) -> AlertRule {
    AlertRule::new(
        id,
        RuleDefinition {
            name: name.into(),
            description: "Heat warning".into(),
            temp_min: None,
            temp_max: Some(temp_max),
            humidity_min: None,
            humidity_max: None,
            scope: RuleScope::City,
            country: "Argentina".into(),
            city: Some("Córdoba".into()),
            region: None,
            valid_from: None,
            valid_to: None,
            status: RuleStatus::Active,
            priority,
            owner_id: None,
        },
    )
    .unwrap()
}

fn noon() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
}

struct Harness {
    ingestor: MeasurementIngestor,
    measurements: Arc<Measurements>,
    alerts: Arc<Alerts>,
}

fn harness_with(rules: Vec<AlertRule>, measurements: Measurements, alerts: Alerts) -> Harness {
    let sensors = Sensors(HashMap::from([
        (CORDOBA_SENSOR, sensor(CORDOBA_SENSOR, SensorStatus::Active)),
        (IDLE_SENSOR, sensor(IDLE_SENSOR, SensorStatus::Inactive)),
        (BROKEN_SENSOR, sensor(BROKEN_SENSOR, SensorStatus::Failed)),
    ]));
    let measurements = Arc::new(measurements);
    let alerts = Arc::new(alerts);
    let ingestor = MeasurementIngestor::new(
        Arc::new(sensors),
        measurements.clone(),
        Arc::new(Rules(rules)),
        alerts.clone(),
        ThresholdConfig::default(),
    );
    Harness {
        ingestor,
        measurements,
        alerts,
    }
}

fn harness(rules: Vec<AlertRule>) -> Harness {
    harness_with(rules, Measurements::default(), Alerts::default())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cordoba_heat_rule_raises_one_attributed_alert() {
    let h = harness(vec![rule(10, "Córdoba heat", 4, 35.0)]);

    let result = h
        .ingestor
        .ingest_at(CORDOBA_SENSOR, Reading::new(Some(41.2), None), noon())
        .await
        .unwrap();

    assert_eq!(result.sensor_id, CORDOBA_SENSOR);
    assert_eq!(result.temperature, Some(41.2));
    assert_eq!(result.triggered_alerts.len(), 1);
    assert_eq!(result.triggered_alerts[0].rule_name, "Córdoba heat");
    assert_eq!(result.triggered_alerts[0].priority, 4);
    assert!(result.threshold_alert_ids.is_empty());

    let raised = h.alerts.raised();
    assert_eq!(raised.len(), 1);
    let alert = &raised[0];
    assert_eq!(alert.id, result.triggered_alerts[0].alert_id);
    assert_eq!(alert.kind, "threshold");
    assert_eq!(alert.rule_id, Some(10));
    assert_eq!(alert.priority, Some(4));
    assert_eq!(alert.value, Some(41.2));
    assert_eq!(alert.threshold, None);
    assert!(alert
        .description
        .starts_with("Córdoba heat - Heat warning. Location: Córdoba, Argentina."));

    let rows = h.measurements.rows.lock().unwrap().clone();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0, "Argentina");
    assert_eq!(rows[0].2.timestamp, noon());
}

#[tokio::test]
async fn overlapping_rules_each_fire_in_priority_order() {
    let h = harness(vec![
        rule(1, "Mild", 2, 30.0),
        rule(2, "Severe", 5, 38.0),
        rule(3, "Extreme", 3, 45.0),
    ]);

    let result = h
        .ingestor
        .ingest_at(CORDOBA_SENSOR, Reading::new(Some(40.0), None), noon())
        .await
        .unwrap();

    let names: Vec<_> = result
        .triggered_alerts
        .iter()
        .map(|t| t.rule_name.as_str())
        .collect();
    assert_eq!(names, vec!["Severe", "Mild"]);

    let ids: Vec<_> = result.triggered_alerts.iter().map(|t| t.alert_id).collect();
    assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn static_envelope_fires_alongside_rules() {
    let h = harness(vec![rule(1, "Heat", 4, 35.0)]);

    let result = h
        .ingestor
        .ingest_at(CORDOBA_SENSOR, Reading::new(Some(65.0), None), noon())
        .await
        .unwrap();

    assert_eq!(result.triggered_alerts.len(), 1);
    assert_eq!(result.threshold_alert_ids.len(), 1);

    let legacy = h
        .alerts
        .raised()
        .into_iter()
        .find(|a| a.rule_id.is_none())
        .unwrap();
    assert_eq!(legacy.threshold, Some(60.0));
    assert_eq!(legacy.value, Some(65.0));
    assert_eq!(legacy.description, "Temperature too high detected in Córdoba, Argentina");
}

#[tokio::test]
async fn value_on_the_boundary_does_not_fire() {
    let h = harness(vec![rule(1, "Heat", 4, 40.0)]);

    let result = h
        .ingestor
        .ingest_at(CORDOBA_SENSOR, Reading::new(Some(40.0), Some(50.0)), noon())
        .await
        .unwrap();

    assert!(result.triggered_alerts.is_empty());
    assert!(h.alerts.raised().is_empty());
    assert_eq!(h.measurements.rows.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_reading_is_rejected_before_any_write() {
    let h = harness(vec![]);

    let err = h
        .ingestor
        .ingest_at(CORDOBA_SENSOR, Reading::default(), noon())
        .await
        .unwrap_err();

    assert_matches!(err, PipelineError::Core(CoreError::Validation(_)));
    assert!(h.measurements.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn out_of_range_reading_is_rejected() {
    let h = harness(vec![]);

    let err = h
        .ingestor
        .ingest_at(CORDOBA_SENSOR, Reading::new(None, Some(140.0)), noon())
        .await
        .unwrap_err();

    assert_matches!(err, PipelineError::Core(CoreError::Validation(_)));
}

#[tokio::test]
async fn unknown_and_inactive_sensors_are_rejected() {
    let h = harness(vec![]);

    for id in [99, IDLE_SENSOR, BROKEN_SENSOR] {
        let err = h
            .ingestor
            .ingest_at(id, Reading::new(Some(20.0), None), noon())
            .await
            .unwrap_err();
        assert_matches!(err, PipelineError::Core(CoreError::Validation(_)));
    }
    assert!(h.measurements.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn storage_failure_propagates() {
    let h = harness_with(
        vec![rule(1, "Heat", 4, 35.0)],
        Measurements {
            fail: true,
            ..Default::default()
        },
        Alerts::default(),
    );

    let err = h
        .ingestor
        .ingest_at(CORDOBA_SENSOR, Reading::new(Some(41.0), None), noon())
        .await
        .unwrap_err();

    assert_matches!(err, PipelineError::Store(StoreError::Database(_)));
    assert!(h.alerts.raised().is_empty());
}

#[tokio::test]
async fn alert_failures_do_not_fail_a_stored_measurement() {
    let h = harness_with(
        vec![rule(1, "Heat", 4, 35.0)],
        Measurements::default(),
        Alerts {
            fail: true,
            ..Default::default()
        },
    );

    let result = h
        .ingestor
        .ingest_at(CORDOBA_SENSOR, Reading::new(Some(70.0), None), noon())
        .await
        .unwrap();

    assert!(result.triggered_alerts.is_empty());
    assert_eq!(result.failed_alerts, 2);
    assert_eq!(h.measurements.rows.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn health_check_raises_only_for_failed_sensors() {
    let h = harness(vec![]);

    let alert = h
        .ingestor
        .check_sensor_health(BROKEN_SENSOR)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(alert.kind, AlertKind::SensorFailure.as_str());
    assert_eq!(alert.sensor_id, Some(BROKEN_SENSOR));

    assert!(h
        .ingestor
        .check_sensor_health(CORDOBA_SENSOR)
        .await
        .unwrap()
        .is_none());

    let err = h.ingestor.check_sensor_health(404).await.unwrap_err();
    assert_matches!(err, PipelineError::Core(CoreError::NotFound { entity: "sensor", .. }));
}

#[tokio::test]
async fn result_serializes_with_wire_names() {
    let h = harness(vec![rule(10, "Heat", 4, 35.0)]);

    let result = h
        .ingestor
        .ingest_at(CORDOBA_SENSOR, Reading::new(Some(41.2), None), noon())
        .await
        .unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["sensorID"], CORDOBA_SENSOR);
    assert_eq!(json["triggeredAlerts"][0]["ruleName"], "Heat");
    assert_eq!(json["triggeredAlerts"][0]["priority"], 4);
    assert!(json["triggeredAlerts"][0]["alertID"].is_number());
    assert!(json["humidity"].is_null());
}
