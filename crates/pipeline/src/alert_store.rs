//! Durable alert records and their status machine.
//!
//! Creating an alert persists it with status `active` and then appends a
//! snapshot to the [`AlertStream`]. Status changes are validated against
//! the core transition table and applied as a compare-and-set, so two
//! concurrent updates cannot both move the same alert.

use async_trait::async_trait;
use clima_core::alert::{AlertStatus, NewAlert};
use clima_core::error::CoreError;
use clima_core::types::DbId;
use clima_db::models::alert::{Alert, AlertFilter};
use clima_db::repositories::AlertRepo;
use clima_db::DbPool;
use clima_events::AlertStream;

use crate::error::PipelineError;
use crate::ports::AlertSink;

#[derive(Clone)]
pub struct AlertStore {
    pool: DbPool,
    stream: AlertStream,
}

impl AlertStore {
    pub fn new(pool: DbPool, stream: AlertStream) -> Self {
        Self { pool, stream }
    }

    pub fn stream(&self) -> &AlertStream {
        &self.stream
    }

    /// Persist `alert` as `active`, then publish it.
    ///
    /// A publish failure is returned to the caller; the persisted row is
    /// kept and stays visible through the query operations.
    pub async fn create(&self, alert: &NewAlert) -> Result<Alert, PipelineError> {
        let created = AlertRepo::create(&self.pool, alert).await?;

        if let Err(e) = self.stream.publish(&created).await {
            tracing::error!(
                alert_id = created.id,
                error = %e,
                "Alert persisted but could not be published",
            );
            return Err(e.into());
        }

        tracing::info!(
            alert_id = created.id,
            kind = %created.kind,
            sensor_id = ?created.sensor_id,
            rule_id = ?created.rule_id,
            "Alert raised",
        );
        Ok(created)
    }

    pub async fn get(&self, id: DbId) -> Result<Alert, PipelineError> {
        AlertRepo::get_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| PipelineError::not_found("alert", id))
    }

    /// Alerts matching `filter`, newest first.
    pub async fn list(&self, filter: &AlertFilter) -> Result<Vec<Alert>, PipelineError> {
        Ok(AlertRepo::list(&self.pool, filter).await?)
    }

    pub async fn list_active(
        &self,
        skip: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<Alert>, PipelineError> {
        let filter = AlertFilter {
            status: Some(AlertStatus::Active),
            sensor_id: None,
            skip,
            limit,
        };
        self.list(&filter).await
    }

    /// Move an alert to `next`.
    ///
    /// Fails with `NotFound` for an unknown id and `Conflict` for a
    /// transition the status machine does not allow, including one made
    /// illegal by a concurrent update.
    pub async fn update_status(&self, id: DbId, next: AlertStatus) -> Result<Alert, PipelineError> {
        let current = self.get(id).await?;
        let from = current.status()?;
        from.transition_to(next)?;

        match AlertRepo::update_status(&self.pool, id, from, next).await? {
            Some(updated) => {
                tracing::info!(alert_id = id, from = %from, to = %next, "Alert status changed");
                Ok(updated)
            }
            None => {
                // Lost a race: report against the status that won.
                let now = self.get(id).await?.status()?;
                Err(CoreError::Conflict(format!("Cannot move alert from {now} to {next}")).into())
            }
        }
    }

    pub async fn acknowledge(&self, id: DbId) -> Result<Alert, PipelineError> {
        self.update_status(id, AlertStatus::Acknowledged).await
    }

    pub async fn resolve(&self, id: DbId) -> Result<Alert, PipelineError> {
        self.update_status(id, AlertStatus::Resolved).await
    }
}

#[async_trait]
impl AlertSink for AlertStore {
    async fn raise(&self, alert: &NewAlert) -> Result<Alert, PipelineError> {
        self.create(alert).await
    }
}
