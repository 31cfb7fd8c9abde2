//! Storage error taxonomy.

use clima_core::partition::Layout;

/// Failure of a measurement storage operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A partition read or write failed before anything was written.
    #[error("Storage error: {0}")]
    Database(#[from] sqlx::Error),

    /// Some, but not all, of the fan-out writes succeeded. The layouts in
    /// `written` hold the row; `failed` and any later layouts do not. The
    /// whole write is safe to retry.
    #[error("Partial fan-out: wrote {written:?}, failed on {failed}: {source}")]
    PartialFanout {
        written: Vec<Layout>,
        failed: Layout,
        #[source]
        source: sqlx::Error,
    },
}

impl StoreError {
    pub fn is_partial(&self) -> bool {
        matches!(self, StoreError::PartialFanout { .. })
    }
}
