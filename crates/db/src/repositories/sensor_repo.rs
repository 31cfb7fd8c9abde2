//! Repository for the `sensors` table.
//!
//! Sensor management belongs to another surface; the pipeline only reads
//! descriptors. `create` and `set_status` exist for seeding and operator
//! tooling.

use clima_core::sensor::SensorStatus;
use clima_core::types::DbId;
use sqlx::PgPool;

use crate::models::sensor::{CreateSensor, SensorRow};

/// Column list for `sensors` queries.
const COLUMNS: &str = "\
    id, name, country, city, region, status, latitude, longitude, \
    created_at, updated_at";

pub struct SensorRepo;

impl SensorRepo {
    /// Register a sensor. Status defaults to `active`.
    pub async fn create(pool: &PgPool, dto: &CreateSensor) -> Result<SensorRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO sensors (name, country, city, region, status, latitude, longitude) \
             VALUES ($1, $2, $3, $4, COALESCE($5, 'active'), $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SensorRow>(&query)
            .bind(&dto.name)
            .bind(&dto.country)
            .bind(&dto.city)
            .bind(&dto.region)
            .bind(&dto.status)
            .bind(dto.latitude)
            .bind(dto.longitude)
            .fetch_one(pool)
            .await
    }

    pub async fn get_by_id(pool: &PgPool, id: DbId) -> Result<Option<SensorRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sensors WHERE id = $1");
        sqlx::query_as::<_, SensorRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Change a sensor's status. Returns `None` if the sensor does not exist.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: SensorStatus,
    ) -> Result<Option<SensorRow>, sqlx::Error> {
        let query = format!(
            "UPDATE sensors SET status = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SensorRow>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }
}
