//! Append-only alert stream with long-poll reads.
//!
//! Entries live in the `alert_stream` table and are never mutated or
//! removed. Consumers hold only an [`EntryId`] cursor. A read returns the
//! entries strictly after the cursor in id order, waiting up to the
//! configured block timeout when none are available yet.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clima_db::models::alert::Alert;
use clima_db::models::stream::StreamEntryRow;
use clima_db::repositories::AlertStreamRepo;
use clima_db::DbPool;
use serde::Serialize;
use tokio::sync::Notify;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::cursor::EntryId;
use crate::error::StreamError;
use crate::payload::AlertPayload;

/// Largest batch a single read may return.
pub const MAX_READ_COUNT: usize = 100;

// ---------------------------------------------------------------------------
// StreamEntry
// ---------------------------------------------------------------------------

/// One immutable entry of the alert stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamEntry {
    pub entry_id: EntryId,
    pub alert: AlertPayload,
}

impl TryFrom<StreamEntryRow> for StreamEntry {
    type Error = StreamError;

    fn try_from(row: StreamEntryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            entry_id: EntryId::new(row.entry_id),
            alert: serde_json::from_value(row.payload)?,
        })
    }
}

// ---------------------------------------------------------------------------
// StreamSource
// ---------------------------------------------------------------------------

/// Anything a delivery loop can read entries from.
#[async_trait]
pub trait StreamSource: Send + Sync {
    /// Up to `count` entries with ids strictly greater than `after`, in id
    /// order. May wait a bounded time before returning an empty batch.
    async fn read(
        &self,
        count: usize,
        after: EntryId,
        cancel: &CancellationToken,
    ) -> Result<Vec<StreamEntry>, StreamError>;
}

// ---------------------------------------------------------------------------
// AlertStream
// ---------------------------------------------------------------------------

/// Timing of the bounded wait inside [`AlertStream::read`].
#[derive(Debug, Clone, Copy)]
pub struct StreamConfig {
    /// Longest a read waits for new entries before returning empty.
    pub block_timeout: Duration,
    /// How often the log is re-checked while waiting. Appends made by this
    /// process wake waiting readers immediately; the interval covers
    /// appends made by other processes.
    pub poll_interval: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            block_timeout: Duration::from_millis(1000),
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Durable alert log. Cheap to clone; clones share the wake-up signal.
#[derive(Clone)]
pub struct AlertStream {
    pool: DbPool,
    notify: Arc<Notify>,
    config: StreamConfig,
}

impl AlertStream {
    pub fn new(pool: DbPool, config: StreamConfig) -> Self {
        Self {
            pool,
            notify: Arc::new(Notify::new()),
            config,
        }
    }

    pub fn config(&self) -> StreamConfig {
        self.config
    }

    /// Append a snapshot of `alert` and wake any waiting readers.
    pub async fn publish(&self, alert: &Alert) -> Result<EntryId, StreamError> {
        let payload = serde_json::to_value(AlertPayload::from(alert))?;
        let entry_id = EntryId::new(AlertStreamRepo::append(&self.pool, &payload).await?);
        self.notify.notify_waiters();

        tracing::debug!(alert_id = alert.id, entry_id = %entry_id, "Alert published to stream");
        Ok(entry_id)
    }

    /// Read up to `count` entries after the cursor.
    ///
    /// Returns as soon as at least one entry is available. When none are,
    /// waits up to `block_timeout` and then returns an empty batch. Fails
    /// with [`StreamError::Cancelled`] if `cancel` fires while waiting.
    pub async fn read(
        &self,
        count: usize,
        after: EntryId,
        cancel: &CancellationToken,
    ) -> Result<Vec<StreamEntry>, StreamError> {
        let count = count.clamp(1, MAX_READ_COUNT);
        let deadline = Instant::now() + self.config.block_timeout;

        loop {
            // Register for wake-ups before querying so an append landing
            // between the query and the wait is not missed.
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let entries = self.fetch(count, after).await?;
            if !entries.is_empty() {
                return Ok(entries);
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(Vec::new());
            }
            let wait = self.config.poll_interval.min(deadline - now);

            tokio::select! {
                _ = cancel.cancelled() => return Err(StreamError::Cancelled),
                _ = &mut notified => {}
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }

    /// Id of the newest entry, or [`EntryId::START`] for an empty log.
    pub async fn latest(&self) -> Result<EntryId, StreamError> {
        Ok(EntryId::new(AlertStreamRepo::latest_entry_id(&self.pool).await?))
    }

    async fn fetch(&self, count: usize, after: EntryId) -> Result<Vec<StreamEntry>, StreamError> {
        let rows = AlertStreamRepo::read_after(&self.pool, after.get(), count as i64).await?;
        rows.into_iter().map(StreamEntry::try_from).collect()
    }
}

#[async_trait]
impl StreamSource for AlertStream {
    async fn read(
        &self,
        count: usize,
        after: EntryId,
        cancel: &CancellationToken,
    ) -> Result<Vec<StreamEntry>, StreamError> {
        AlertStream::read(self, count, after, cancel).await
    }
}
