/// Errors raised while appending to or reading from the alert stream.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("Stream storage error: {0}")]
    Database(#[from] sqlx::Error),

    /// The caller's cancellation token fired during a blocking read.
    #[error("Stream read cancelled")]
    Cancelled,

    /// An entry payload could not be encoded or decoded.
    #[error("Malformed stream payload: {0}")]
    Payload(#[from] serde_json::Error),
}
