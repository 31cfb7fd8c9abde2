//! Rows of the `alert_stream` log.

use clima_core::types::Timestamp;
use sqlx::FromRow;

/// One appended stream entry. `payload` is the serialized alert.
#[derive(Debug, Clone, FromRow)]
pub struct StreamEntryRow {
    pub entry_id: i64,
    pub payload: serde_json::Value,
    pub appended_at: Timestamp,
}
