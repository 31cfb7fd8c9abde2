use std::sync::Arc;

use clima_events::AlertStream;
use clima_pipeline::postgres::{PgMeasurementSink, PgRuleSource, PgSensorDirectory};
use clima_pipeline::{AlertStore, MeasurementIngestor, MeasurementQueries};
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is an `Arc`, a pool, or a handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: clima_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Ingestion pipeline wired to the Postgres adapters.
    pub ingestor: MeasurementIngestor,
    /// Alert records and status transitions.
    pub alerts: AlertStore,
    /// Measurement range reads.
    pub measurements: MeasurementQueries,
    /// Cancelled on shutdown; live alert feeds run on child tokens.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Wire the pipeline against `pool`.
    pub fn new(pool: clima_db::DbPool, config: ServerConfig) -> Self {
        let stream = AlertStream::new(pool.clone(), config.stream());
        let alerts = AlertStore::new(pool.clone(), stream);

        let ingestor = MeasurementIngestor::new(
            Arc::new(PgSensorDirectory::new(pool.clone())),
            Arc::new(PgMeasurementSink::new(pool.clone())),
            Arc::new(PgRuleSource::new(pool.clone())),
            Arc::new(alerts.clone()),
            config.thresholds,
        );

        Self {
            measurements: MeasurementQueries::new(pool.clone()),
            pool,
            config: Arc::new(config),
            ingestor,
            alerts,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn stream(&self) -> &AlertStream {
        self.alerts.stream()
    }
}
