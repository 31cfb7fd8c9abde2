//! Time-series storage for measurements.
//!
//! One logical write fans out to three tables that share the day partition
//! key, each serving one read pattern without a secondary index:
//!
//! | Table                      | Partition key                          |
//! |----------------------------|----------------------------------------|
//! | `measurements_by_sensor`   | `(sensor_id, date_partition)`          |
//! | `measurements_by_location` | `(country_key, city_key, date_partition)` |
//! | `measurements_by_date`     | `(date_partition)`                     |
//!
//! The three inserts are independent: there is no cross-table transaction.
//! Inserts ignore key conflicts, so retrying a failed or partial write is
//! safe and never duplicates rows.

use clima_core::measurement::{LocatedMeasurement, Measurement};
use clima_core::partition::{date_partition, Layout, TimeRange};
use clima_core::sensor::location_key;
use clima_core::stats::{summarize, LocationStats};
use clima_core::types::DbId;
use sqlx::PgPool;

use crate::error::StoreError;
use crate::models::measurement::{LocationMeasurementRow, SensorMeasurementRow};

/// Provides fan-out writes and day-partitioned range reads.
pub struct MeasurementRepo;

impl MeasurementRepo {
    /// Write one measurement to all three layouts.
    ///
    /// Fails with [`StoreError::Database`] when nothing was written and
    /// [`StoreError::PartialFanout`] when at least one layout already holds
    /// the row.
    pub async fn write(
        pool: &PgPool,
        country: &str,
        city: &str,
        measurement: &Measurement,
    ) -> Result<(), StoreError> {
        let partition = date_partition(measurement.timestamp);
        let mut written = Vec::with_capacity(Layout::ALL.len());

        for layout in Layout::ALL {
            let result = match layout {
                Layout::BySensor => {
                    sqlx::query(
                        "INSERT INTO measurements_by_sensor \
                            (sensor_id, date_partition, ts, temperature, humidity) \
                         VALUES ($1, $2, $3, $4, $5) \
                         ON CONFLICT DO NOTHING",
                    )
                    .bind(measurement.sensor_id)
                    .bind(&partition)
                    .bind(measurement.timestamp)
                    .bind(measurement.temperature)
                    .bind(measurement.humidity)
                    .execute(pool)
                    .await
                }
                Layout::ByLocation => {
                    sqlx::query(
                        "INSERT INTO measurements_by_location \
                            (country_key, city_key, date_partition, ts, sensor_id, \
                             country, city, temperature, humidity) \
                         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
                         ON CONFLICT DO NOTHING",
                    )
                    .bind(location_key(country))
                    .bind(location_key(city))
                    .bind(&partition)
                    .bind(measurement.timestamp)
                    .bind(measurement.sensor_id)
                    .bind(country)
                    .bind(city)
                    .bind(measurement.temperature)
                    .bind(measurement.humidity)
                    .execute(pool)
                    .await
                }
                Layout::ByDate => {
                    sqlx::query(
                        "INSERT INTO measurements_by_date \
                            (date_partition, ts, sensor_id, country, city, temperature, humidity) \
                         VALUES ($1, $2, $3, $4, $5, $6, $7) \
                         ON CONFLICT DO NOTHING",
                    )
                    .bind(&partition)
                    .bind(measurement.timestamp)
                    .bind(measurement.sensor_id)
                    .bind(country)
                    .bind(city)
                    .bind(measurement.temperature)
                    .bind(measurement.humidity)
                    .execute(pool)
                    .await
                }
            };

            if let Err(source) = result {
                if written.is_empty() {
                    return Err(StoreError::Database(source));
                }
                tracing::error!(
                    sensor_id = measurement.sensor_id,
                    partition = %partition,
                    failed = %layout,
                    written = ?written,
                    error = %source,
                    "Measurement fan-out partially failed"
                );
                return Err(StoreError::PartialFanout {
                    written,
                    failed: layout,
                    source,
                });
            }
            written.push(layout);
        }

        Ok(())
    }

    /// Measurements of one sensor within `range`.
    ///
    /// Reads one partition per calendar day, oldest day first; rows within
    /// a day are newest first.
    pub async fn get_by_sensor(
        pool: &PgPool,
        sensor_id: DbId,
        range: &TimeRange,
    ) -> Result<Vec<Measurement>, StoreError> {
        let mut out = Vec::new();
        for partition in range.partitions() {
            let rows = sqlx::query_as::<_, SensorMeasurementRow>(
                "SELECT sensor_id, ts, temperature, humidity \
                 FROM measurements_by_sensor \
                 WHERE sensor_id = $1 AND date_partition = $2 \
                   AND ts >= $3 AND ts <= $4 \
                 ORDER BY ts DESC",
            )
            .bind(sensor_id)
            .bind(&partition)
            .bind(range.start)
            .bind(range.end)
            .fetch_all(pool)
            .await?;
            out.extend(rows.into_iter().map(Measurement::from));
        }
        Ok(out)
    }

    /// Measurements recorded at a location within `range`, with the same
    /// day-by-day ordering as [`get_by_sensor`](Self::get_by_sensor).
    pub async fn get_by_location(
        pool: &PgPool,
        country: &str,
        city: &str,
        range: &TimeRange,
    ) -> Result<Vec<LocatedMeasurement>, StoreError> {
        let country_key = location_key(country);
        let city_key = location_key(city);
        let mut out = Vec::new();
        for partition in range.partitions() {
            let rows = sqlx::query_as::<_, LocationMeasurementRow>(
                "SELECT country, city, sensor_id, ts, temperature, humidity \
                 FROM measurements_by_location \
                 WHERE country_key = $1 AND city_key = $2 AND date_partition = $3 \
                   AND ts >= $4 AND ts <= $5 \
                 ORDER BY ts DESC",
            )
            .bind(&country_key)
            .bind(&city_key)
            .bind(&partition)
            .bind(range.start)
            .bind(range.end)
            .fetch_all(pool)
            .await?;
            out.extend(rows.into_iter().map(LocatedMeasurement::from));
        }
        Ok(out)
    }

    /// Count, min, max and mean per metric for a location, computed by
    /// scanning [`get_by_location`](Self::get_by_location).
    pub async fn stats_by_location(
        pool: &PgPool,
        country: &str,
        city: &str,
        range: &TimeRange,
    ) -> Result<LocationStats, StoreError> {
        let measurements: Vec<Measurement> = Self::get_by_location(pool, country, city, range)
            .await?
            .into_iter()
            .map(|m| m.measurement)
            .collect();
        Ok(summarize(country, city, &measurements))
    }

    /// Number of measurements across all locations within `range`.
    ///
    /// Uses only the by-date layout.
    pub async fn count_by_date(pool: &PgPool, range: &TimeRange) -> Result<i64, StoreError> {
        let mut total = 0;
        for partition in range.partitions() {
            let (count,): (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM measurements_by_date \
                 WHERE date_partition = $1 AND ts >= $2 AND ts <= $3",
            )
            .bind(&partition)
            .bind(range.start)
            .bind(range.end)
            .fetch_one(pool)
            .await?;
            total += count;
        }
        Ok(total)
    }
}
