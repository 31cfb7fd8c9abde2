//! Measurement ingestion and alerting pipeline.
//!
//! [`MeasurementIngestor`] orchestrates one measurement end to end:
//! validate, write the fan-out, run the threshold safety net and the rule
//! engine, then raise every resulting alert through the [`AlertStore`]
//! (persist, then publish to the stream).
//!
//! Storage is reached through the async ports in [`ports`]; [`postgres`]
//! holds the production adapters.

pub mod alert_store;
pub mod error;
pub mod ingestor;
pub mod ports;
pub mod postgres;
pub mod queries;

pub use alert_store::AlertStore;
pub use error::PipelineError;
pub use ingestor::{IngestionResult, MeasurementIngestor, TriggeredAlert};
pub use queries::MeasurementQueries;
