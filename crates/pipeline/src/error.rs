use clima_core::error::CoreError;
use clima_db::StoreError;
use clima_events::StreamError;

/// Failure of a pipeline operation. Nothing is swallowed: each layer's
/// error is carried unchanged to the caller.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Stream(#[from] StreamError),
}

impl From<sqlx::Error> for PipelineError {
    fn from(err: sqlx::Error) -> Self {
        PipelineError::Store(StoreError::Database(err))
    }
}

impl PipelineError {
    pub fn not_found(entity: &'static str, id: clima_core::types::DbId) -> Self {
        PipelineError::Core(CoreError::NotFound { entity, id })
    }
}
