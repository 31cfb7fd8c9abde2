//! Location statistics computed by scanning stored measurements.
//!
//! There is no pre-aggregation: stats are folded over whatever the
//! by-location layout returns for the requested range.

use serde::Serialize;

use crate::measurement::Measurement;

/// Min / max / mean of one metric. All fields are `None` when no
/// measurement in the set carried the metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
}

impl MetricStats {
    /// Fold the present values of a metric.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut n = 0usize;

        for v in values {
            min = min.min(v);
            max = max.max(v);
            sum += v;
            n += 1;
        }

        if n == 0 {
            return Self::default();
        }

        Self {
            min: Some(min),
            max: Some(max),
            avg: Some(sum / n as f64),
        }
    }
}

/// Aggregate view of one location over a time range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationStats {
    pub country: String,
    pub city: String,
    /// Number of measurements scanned, including ones missing a metric.
    pub count: usize,
    pub temperature: MetricStats,
    pub humidity: MetricStats,
}

/// Summarise the measurements recorded at a location.
pub fn summarize(country: &str, city: &str, measurements: &[Measurement]) -> LocationStats {
    LocationStats {
        country: country.to_string(),
        city: city.to_string(),
        count: measurements.len(),
        temperature: MetricStats::from_values(measurements.iter().filter_map(|m| m.temperature)),
        humidity: MetricStats::from_values(measurements.iter().filter_map(|m| m.humidity)),
    }
}
