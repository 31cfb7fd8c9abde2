//! Real-time delivery loop.
//!
//! [`AlertFeed`] keeps one subscriber fed from a cursor: read a batch after
//! `last_seen`, forward every entry, advance `last_seen`, repeat. A failed
//! read is logged and retried after a back-off; it never ends the
//! subscription. The loop stops when the subscriber's receiver is dropped
//! or the cancellation token fires.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::cursor::EntryId;
use crate::error::StreamError;
use crate::stream::{StreamEntry, StreamSource};

/// Entries requested per read.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Back-off after a failed read.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
pub struct FeedConfig {
    pub batch_size: usize,
    pub retry_delay: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

// ---------------------------------------------------------------------------
// AlertFeed
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AlertFeed {
    source: Arc<dyn StreamSource>,
    config: FeedConfig,
}

impl AlertFeed {
    pub fn new(source: Arc<dyn StreamSource>, config: FeedConfig) -> Self {
        Self { source, config }
    }

    /// Run the loop starting after `from`.
    ///
    /// Returns the cursor of the last entry handed to `tx`, so a caller can
    /// resume from it later.
    pub async fn run(
        &self,
        from: EntryId,
        tx: mpsc::Sender<StreamEntry>,
        cancel: CancellationToken,
    ) -> EntryId {
        let mut last_seen = from;

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let batch = tokio::select! {
                _ = tx.closed() => break,
                result = self.source.read(self.config.batch_size, last_seen, &cancel) => result,
            };

            match batch {
                Ok(entries) => {
                    for entry in entries {
                        let entry_id = entry.entry_id;
                        tokio::select! {
                            _ = cancel.cancelled() => return last_seen,
                            sent = tx.send(entry) => {
                                if sent.is_err() {
                                    return last_seen;
                                }
                            }
                        }
                        last_seen = entry_id;
                    }
                }
                Err(StreamError::Cancelled) => break,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        last_seen = %last_seen,
                        retry_in_ms = self.config.retry_delay.as_millis() as u64,
                        "Alert stream read failed, retrying",
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tx.closed() => break,
                        _ = tokio::time::sleep(self.config.retry_delay) => {}
                    }
                }
            }
        }

        tracing::debug!(last_seen = %last_seen, "Alert feed stopped");
        last_seen
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
