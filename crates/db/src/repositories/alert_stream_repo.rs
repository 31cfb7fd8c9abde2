//! Repository for the append-only `alert_stream` log.

use sqlx::PgPool;

use crate::models::stream::StreamEntryRow;

/// Arbitrary application-wide key for the append advisory lock.
const APPEND_LOCK_KEY: i64 = 0x636c_696d_615f_7374;

pub struct AlertStreamRepo;

impl AlertStreamRepo {
    /// Append a payload and return its entry id.
    ///
    /// Appends are serialised under a transaction-scoped advisory lock so
    /// that ids become visible in increasing order: a reader that has seen
    /// entry `n` can never later observe a new entry `< n`.
    pub async fn append(pool: &PgPool, payload: &serde_json::Value) -> Result<i64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(APPEND_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let (entry_id,): (i64,) =
            sqlx::query_as("INSERT INTO alert_stream (payload) VALUES ($1) RETURNING entry_id")
                .bind(payload)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;
        Ok(entry_id)
    }

    /// Up to `count` entries with `entry_id > after`, oldest first.
    pub async fn read_after(
        pool: &PgPool,
        after: i64,
        count: i64,
    ) -> Result<Vec<StreamEntryRow>, sqlx::Error> {
        sqlx::query_as::<_, StreamEntryRow>(
            "SELECT entry_id, payload, appended_at FROM alert_stream \
             WHERE entry_id > $1 \
             ORDER BY entry_id \
             LIMIT $2",
        )
        .bind(after)
        .bind(count)
        .fetch_all(pool)
        .await
    }

    /// Highest entry id in the log, or `0` when it is empty.
    pub async fn latest_entry_id(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (latest,): (i64,) =
            sqlx::query_as("SELECT COALESCE(MAX(entry_id), 0)::BIGINT FROM alert_stream")
                .fetch_one(pool)
                .await?;
        Ok(latest)
    }
}
