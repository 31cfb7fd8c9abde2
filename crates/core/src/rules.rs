//! Location-scoped, time-bounded alert rules and the engine that matches
//! measurements against them.
//!
//! Rules are loaded by the caller and handed to [`RuleEngine`]; the engine
//! never mutates them. Matching is pure and cannot fail: a location that
//! resolves to nothing simply has no applicable rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::alert::{AlertKind, NewAlert};
use crate::error::CoreError;
use crate::sensor::{same_place, Location};
use crate::types::{DbId, Timestamp};

/// Lowest rule priority.
pub const PRIORITY_MIN: i16 = 1;
/// Highest rule priority.
pub const PRIORITY_MAX: i16 = 5;

// ---------------------------------------------------------------------------
// Scope / status
// ---------------------------------------------------------------------------

/// Geographic granularity a rule applies at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleScope {
    City,
    Region,
    Country,
}

impl RuleScope {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleScope::City => "city",
            RuleScope::Region => "region",
            RuleScope::Country => "country",
        }
    }
}

impl fmt::Display for RuleScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleScope {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "city" => Ok(RuleScope::City),
            "region" => Ok(RuleScope::Region),
            "country" => Ok(RuleScope::Country),
            other => Err(CoreError::Validation(format!("Unknown rule scope '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    #[default]
    Active,
    Inactive,
}

impl RuleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleStatus::Active => "active",
            RuleStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(RuleStatus::Active),
            "inactive" => Ok(RuleStatus::Inactive),
            other => Err(CoreError::Validation(format!("Unknown rule status '{other}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Rule definition
// ---------------------------------------------------------------------------

/// Unvalidated rule fields, as submitted by the rule-management surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub humidity_min: Option<f64>,
    pub humidity_max: Option<f64>,
    pub scope: RuleScope,
    pub country: String,
    pub city: Option<String>,
    pub region: Option<String>,
    pub valid_from: Option<Timestamp>,
    pub valid_to: Option<Timestamp>,
    #[serde(default)]
    pub status: RuleStatus,
    pub priority: i16,
    pub owner_id: Option<DbId>,
}

impl RuleDefinition {
    /// Check every rule invariant.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation("Rule name is required".to_string()));
        }
        if self.country.trim().is_empty() {
            return Err(CoreError::Validation("Rule country is required".to_string()));
        }

        let bounds = [
            ("temp_min", self.temp_min),
            ("temp_max", self.temp_max),
            ("humidity_min", self.humidity_min),
            ("humidity_max", self.humidity_max),
        ];
        if bounds.iter().all(|(_, b)| b.is_none()) {
            return Err(CoreError::Validation(
                "At least one temperature or humidity bound must be set".to_string(),
            ));
        }
        if let Some((name, _)) = bounds
            .iter()
            .find(|(_, b)| b.is_some_and(|v| !v.is_finite()))
        {
            return Err(CoreError::Validation(format!("{name} must be a finite number")));
        }
        check_pair("temp", self.temp_min, self.temp_max)?;
        check_pair("humidity", self.humidity_min, self.humidity_max)?;

        match self.scope {
            RuleScope::City if is_blank(&self.city) => {
                return Err(CoreError::Validation(
                    "A city-scoped rule requires a city".to_string(),
                ));
            }
            RuleScope::Region if is_blank(&self.region) => {
                return Err(CoreError::Validation(
                    "A region-scoped rule requires a region".to_string(),
                ));
            }
            _ => {}
        }

        if let (Some(from), Some(to)) = (self.valid_from, self.valid_to) {
            if from > to {
                return Err(CoreError::Validation(format!(
                    "valid_from ({from}) must not be after valid_to ({to})"
                )));
            }
        }

        if !(PRIORITY_MIN..=PRIORITY_MAX).contains(&self.priority) {
            return Err(CoreError::Validation(format!(
                "priority must be between {PRIORITY_MIN} and {PRIORITY_MAX}, got {}",
                self.priority
            )));
        }

        Ok(())
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn check_pair(metric: &str, min: Option<f64>, max: Option<f64>) -> Result<(), CoreError> {
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(CoreError::Validation(format!(
                "{metric}_min ({min}) must not exceed {metric}_max ({max})"
            )));
        }
    }
    Ok(())
}

/// Partial change to a stored rule. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RuleUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub humidity_min: Option<f64>,
    pub humidity_max: Option<f64>,
    pub scope: Option<RuleScope>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub valid_from: Option<Timestamp>,
    pub valid_to: Option<Timestamp>,
    pub status: Option<RuleStatus>,
    pub priority: Option<i16>,
}

impl RuleUpdate {
    /// Merge onto `current` and check the result against every rule
    /// invariant, so a change that is fine on its own cannot break the rule.
    pub fn apply(self, current: RuleDefinition) -> Result<RuleDefinition, CoreError> {
        let merged = RuleDefinition {
            name: self.name.unwrap_or(current.name),
            description: self.description.unwrap_or(current.description),
            temp_min: self.temp_min.or(current.temp_min),
            temp_max: self.temp_max.or(current.temp_max),
            humidity_min: self.humidity_min.or(current.humidity_min),
            humidity_max: self.humidity_max.or(current.humidity_max),
            scope: self.scope.unwrap_or(current.scope),
            country: self.country.unwrap_or(current.country),
            city: self.city.or(current.city),
            region: self.region.or(current.region),
            valid_from: self.valid_from.or(current.valid_from),
            valid_to: self.valid_to.or(current.valid_to),
            status: self.status.unwrap_or(current.status),
            priority: self.priority.unwrap_or(current.priority),
            owner_id: current.owner_id,
        };
        merged.validate()?;
        Ok(merged)
    }
}

/// A stored, validated alert rule.
///
/// Only constructible through [`AlertRule::new`], so every instance
/// satisfies the rule invariants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRule {
    id: DbId,
    #[serde(flatten)]
    definition: RuleDefinition,
}

impl AlertRule {
    pub fn new(id: DbId, definition: RuleDefinition) -> Result<Self, CoreError> {
        definition.validate()?;
        Ok(Self { id, definition })
    }

    pub fn id(&self) -> DbId {
        self.id
    }

    pub fn definition(&self) -> &RuleDefinition {
        &self.definition
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn priority(&self) -> i16 {
        self.definition.priority
    }

    pub fn status(&self) -> RuleStatus {
        self.definition.status
    }

    pub fn scope(&self) -> RuleScope {
        self.definition.scope
    }

    /// Whether this rule's scope covers `location`.
    pub fn matches_location(&self, location: &Location) -> bool {
        let def = &self.definition;
        if location.country.trim().is_empty() || !same_place(&def.country, &location.country) {
            return false;
        }
        match def.scope {
            RuleScope::Country => true,
            RuleScope::City => both_match(def.city.as_deref(), location.city.as_deref()),
            RuleScope::Region => both_match(def.region.as_deref(), location.region.as_deref()),
        }
    }

    /// The place this rule covers, as named in its alerts: `"<city>, <country>"`,
    /// `"<region>, <country>"` or `"<country>"` depending on scope.
    pub fn location_label(&self) -> String {
        let def = &self.definition;
        let country = def.country.trim();
        let local = match def.scope {
            RuleScope::City => def.city.as_deref(),
            RuleScope::Region => def.region.as_deref(),
            RuleScope::Country => None,
        };
        match local.map(str::trim) {
            Some(place) => format!("{place}, {country}"),
            None => country.to_string(),
        }
    }

    /// Whether `at` falls inside the rule's (inclusive) validity window.
    pub fn is_valid_at(&self, at: Timestamp) -> bool {
        let def = &self.definition;
        def.valid_from.map_or(true, |from| from <= at) && def.valid_to.map_or(true, |to| to >= at)
    }

    /// Every configured bound crossed by the given values.
    pub fn violations(&self, temperature: Option<f64>, humidity: Option<f64>) -> Vec<Violation> {
        let def = &self.definition;
        let mut out = Vec::new();
        if let Some(value) = temperature {
            push_violations(&mut out, Metric::Temperature, value, def.temp_min, def.temp_max);
        }
        if let Some(value) = humidity {
            push_violations(&mut out, Metric::Humidity, value, def.humidity_min, def.humidity_max);
        }
        out
    }
}

fn both_match(rule_value: Option<&str>, actual: Option<&str>) -> bool {
    match (rule_value, actual) {
        (Some(r), Some(a)) => !a.trim().is_empty() && same_place(r, a),
        _ => false,
    }
}

fn push_violations(
    out: &mut Vec<Violation>,
    metric: Metric,
    value: f64,
    min: Option<f64>,
    max: Option<f64>,
) {
    if let Some(bound) = min.filter(|&b| value < b) {
        out.push(Violation {
            metric,
            direction: Direction::Below,
            value,
            bound,
        });
    }
    if let Some(bound) = max.filter(|&b| value > b) {
        out.push(Violation {
            metric,
            direction: Direction::Above,
            value,
            bound,
        });
    }
}

// ---------------------------------------------------------------------------
// Violations and hits
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Temperature,
    Humidity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Below,
    Above,
}

/// One crossed bound of one rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Violation {
    pub metric: Metric,
    pub direction: Direction,
    pub value: f64,
    pub bound: f64,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (label, unit) = match self.metric {
            Metric::Temperature => ("Temperature", "°C"),
            Metric::Humidity => ("Humidity", "%"),
        };
        let relation = match self.direction {
            Direction::Below => "below minimum",
            Direction::Above => "above maximum",
        };
        write!(
            f,
            "{label} {}{unit} {relation} {}{unit}",
            self.value, self.bound
        )
    }
}

/// A rule found to be violated by a measurement, with the alert it raises.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleHit {
    pub rule_id: DbId,
    pub rule_name: String,
    pub priority: i16,
    pub violations: Vec<Violation>,
    pub alert: NewAlert,
}

/// The measurement-side input of a rule evaluation.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub sensor_id: DbId,
    pub location: &'a Location,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub at: Timestamp,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Matches measurements against a fixed set of rules.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    /// Sorted by priority descending, then id ascending.
    rules: Vec<AlertRule>,
}

impl RuleEngine {
    pub fn new(mut rules: Vec<AlertRule>) -> Self {
        rules.sort_by(|a, b| b.priority().cmp(&a.priority()).then(a.id.cmp(&b.id)));
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Active rules covering `location` and valid at `at`, highest priority first.
    pub fn applicable_rules(&self, location: &Location, at: Timestamp) -> Vec<&AlertRule> {
        self.rules
            .iter()
            .filter(|r| r.status() == RuleStatus::Active)
            .filter(|r| r.matches_location(location))
            .filter(|r| r.is_valid_at(at))
            .collect()
    }

    /// Evaluate a measurement against every applicable rule.
    ///
    /// Each violated rule yields exactly one hit, however many of its bounds
    /// were crossed. Rules are independent: there is no short-circuiting and
    /// no de-duplication, and hits keep the order of [`applicable_rules`].
    ///
    /// The alert's `value` is the measured temperature when present, else
    /// the humidity, whichever metric crossed the bound.
    ///
    /// [`applicable_rules`]: RuleEngine::applicable_rules
    pub fn evaluate(&self, input: RuleInput<'_>) -> Vec<RuleHit> {
        let reported = input.temperature.or(input.humidity);
        self.applicable_rules(input.location, input.at)
            .into_iter()
            .filter_map(|rule| {
                let violations = rule.violations(input.temperature, input.humidity);
                if violations.is_empty() {
                    return None;
                }
                let value = reported.unwrap_or(violations[0].value);
                let details = violations
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" | ");
                let def = rule.definition();
                let description = format!(
                    "{} - {}. Location: {}. {details}",
                    def.name,
                    def.description,
                    rule.location_label()
                );
                let alert = NewAlert::new(AlertKind::Threshold, input.at, description)
                    .with_sensor(input.sensor_id)
                    .with_value(value, None)
                    .with_rule(rule.id(), def.name.clone(), def.priority);
                Some(RuleHit {
                    rule_id: rule.id(),
                    rule_name: def.name.clone(),
                    priority: def.priority,
                    violations,
                    alert,
                })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
