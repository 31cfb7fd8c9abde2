//! Calendar-day partitioning for the measurement layouts.
//!
//! Every physical measurement layout shares one partition-key component:
//! the UTC calendar day of the measurement, rendered as `YYYYMMDD`. A range
//! query therefore decomposes into one partition lookup per day it spans.

use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Default width of a range query when the caller gives no start.
pub const DEFAULT_QUERY_WINDOW_HOURS: i64 = 24;

/// Widest range a single query may cover. Bounds the partition fan-out.
pub const MAX_QUERY_SPAN_DAYS: i64 = 366;

/// The physical layouts a measurement is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Partitioned by `(sensor_id, date_partition)`.
    BySensor,
    /// Partitioned by `(country, city, date_partition)`.
    ByLocation,
    /// Partitioned by `date_partition` only.
    ByDate,
}

impl Layout {
    /// All layouts, in write order.
    pub const ALL: [Layout; 3] = [Layout::BySensor, Layout::ByLocation, Layout::ByDate];

    /// Backing table name.
    pub fn table(self) -> &'static str {
        match self {
            Layout::BySensor => "measurements_by_sensor",
            Layout::ByLocation => "measurements_by_location",
            Layout::ByDate => "measurements_by_date",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// Partition key (`YYYYMMDD`) of the day containing `ts`.
pub fn date_partition(ts: Timestamp) -> String {
    day_key(ts.date_naive())
}

fn day_key(day: NaiveDate) -> String {
    day.format("%Y%m%d").to_string()
}

/// Partition keys of every calendar day touched by `[start, end]`, oldest first.
///
/// Returns an empty list when `start > end`.
pub fn day_partitions(start: Timestamp, end: Timestamp) -> Vec<String> {
    let last = end.date_naive();
    let mut day = start.date_naive();
    let mut keys = Vec::new();
    while day <= last {
        keys.push(day_key(day));
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    keys
}

/// A validated, inclusive time range for measurement queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeRange {
    /// Build a range, rejecting `start > end` and spans wider than
    /// [`MAX_QUERY_SPAN_DAYS`].
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::Validation(format!(
                "start ({start}) must not be after end ({end})"
            )));
        }
        if end - start > Duration::days(MAX_QUERY_SPAN_DAYS) {
            return Err(CoreError::Validation(format!(
                "A query may span at most {MAX_QUERY_SPAN_DAYS} days"
            )));
        }
        Ok(Self { start, end })
    }

    /// Fill in missing bounds: `end` defaults to `now`, `start` to
    /// [`DEFAULT_QUERY_WINDOW_HOURS`] before `end`.
    pub fn resolve(
        start: Option<Timestamp>,
        end: Option<Timestamp>,
        now: Timestamp,
    ) -> Result<Self, CoreError> {
        let end = end.unwrap_or(now);
        let start = start.unwrap_or(end - Duration::hours(DEFAULT_QUERY_WINDOW_HOURS));
        Self::new(start, end)
    }

    /// Day partitions covered by this range.
    pub fn partitions(&self) -> Vec<String> {
        day_partitions(self.start, self.end)
    }

    pub fn contains(&self, ts: Timestamp) -> bool {
        self.start <= ts && ts <= self.end
    }
}
