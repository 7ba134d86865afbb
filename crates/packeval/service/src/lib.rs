//! Packeval session service
//!
//! The service is the boundary front ends talk to. It constructs records,
//! drives them through the engine, and keeps each session's last committed
//! checkpoint so a parked evaluation can be resumed with feedback or
//! retried after a collaborator failure.

#![deny(unsafe_code)]

pub mod api;
pub mod config;
pub mod error;
pub mod report;
pub mod sessions;
pub mod snapshot;

pub use config::ServiceConfig;
pub use error::{ApiError, ApiResult, ServiceError, ServiceResult};
pub use snapshot::{EvaluationSnapshot, SessionStatus, SessionSummary};

use packeval_engine::{DriverConfig, DriverError, EvaluationDriver, StepRegistry};
use packeval_types::{
    EvaluationError, EvaluationId, EvaluationRecord, EvaluationResult, UserFeedback,
};
use sessions::SessionStore;
use std::sync::Arc;

/// The session boundary for evaluation front ends
pub struct EvaluationService {
    driver: EvaluationDriver,
    sessions: SessionStore,
}

impl EvaluationService {
    /// Create a service over a validated registry
    pub fn new(registry: Arc<StepRegistry>) -> EvaluationResult<Self> {
        Self::with_driver_config(registry, DriverConfig::default())
    }

    pub fn with_driver_config(
        registry: Arc<StepRegistry>,
        driver_config: DriverConfig,
    ) -> EvaluationResult<Self> {
        Ok(Self {
            driver: EvaluationDriver::with_config(registry, driver_config)?,
            sessions: SessionStore::new(),
        })
    }

    /// Start a new evaluation session and drive it until its first
    /// suspension (normally the feedback checkpoint) or completion.
    pub async fn start(
        &self,
        concept: impl Into<String>,
        concept_images: Vec<String>,
    ) -> ServiceResult<EvaluationSnapshot> {
        let record = EvaluationRecord::new(concept, concept_images);
        tracing::info!(evaluation_id = %record.id, "evaluation started");

        // The initial record is checkpointed before the first step runs,
        // so even a first-step failure leaves a retryable session.
        self.sessions.upsert(record.clone()).await;
        self.settle(self.driver.run(record).await).await
    }

    /// Attach feedback to a parked session and continue driving it.
    ///
    /// Idempotent on completed sessions: the snapshot is returned
    /// unchanged and no step executes.
    pub async fn resume(
        &self,
        id: &EvaluationId,
        feedback: UserFeedback,
    ) -> ServiceResult<EvaluationSnapshot> {
        let record = self.fetch(id).await?;
        if record.is_complete() {
            return Ok(EvaluationSnapshot::of(&record));
        }
        self.settle(self.driver.resume(record, feedback).await).await
    }

    /// Re-drive a session from its checkpoint after a retryable failure
    pub async fn retry(&self, id: &EvaluationId) -> ServiceResult<EvaluationSnapshot> {
        let record = self.fetch(id).await?;
        self.settle(self.driver.run(record).await).await
    }

    /// The session's current snapshot
    pub async fn snapshot(&self, id: &EvaluationId) -> ServiceResult<EvaluationSnapshot> {
        Ok(EvaluationSnapshot::of(&self.fetch(id).await?))
    }

    /// Summaries of all sessions, newest first
    pub async fn list(&self) -> Vec<SessionSummary> {
        let mut summaries: Vec<SessionSummary> = self
            .sessions
            .list()
            .await
            .iter()
            .map(SessionSummary::of)
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        summaries
    }

    /// The session's formatted report
    pub async fn report(&self, id: &EvaluationId) -> ServiceResult<String> {
        Ok(report::format_report(&self.fetch(id).await?))
    }

    /// Drop a session
    pub async fn abandon(&self, id: &EvaluationId) -> ServiceResult<()> {
        self.sessions
            .remove(id)
            .await
            .map(|_| ())
            .ok_or_else(|| ServiceError::NotFound(id.clone()))
    }

    async fn fetch(&self, id: &EvaluationId) -> ServiceResult<EvaluationRecord> {
        self.sessions
            .get(id)
            .await
            .ok_or_else(|| ServiceError::NotFound(id.clone()))
    }

    /// Commit a driver outcome to the store.
    ///
    /// Success stores the new checkpoint. A retryable or out-of-order halt
    /// keeps the prior checkpoint; an unrecoverable halt (unknown step or
    /// configuration error) aborts the session entirely.
    async fn settle(
        &self,
        outcome: Result<EvaluationRecord, DriverError>,
    ) -> ServiceResult<EvaluationSnapshot> {
        match outcome {
            Ok(record) => {
                self.sessions.upsert(record.clone()).await;
                Ok(EvaluationSnapshot::of(&record))
            }
            Err(err) => {
                let id = err.record.id.clone();
                let retryable = err.is_retryable();
                let resumable =
                    retryable || matches!(err.source, EvaluationError::MissingFeedback);

                if resumable {
                    self.sessions.upsert(err.record.clone()).await;
                } else {
                    self.sessions.remove(&id).await;
                    tracing::error!(
                        evaluation_id = %id,
                        step = %err.step,
                        "session aborted: {}",
                        err.source
                    );
                }

                Err(ServiceError::Halted {
                    id,
                    step: err.step,
                    reason: err.source.to_string(),
                    retryable,
                })
            }
        }
    }
}
