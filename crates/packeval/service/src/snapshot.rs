//! Snapshot representation of an evaluation session
//!
//! The snapshot carries every record field plus the message log, verbatim.
//! It is both the API response payload and the persisted checkpoint a
//! front end holds while the session waits for human feedback.

use chrono::{DateTime, Utc};
use packeval_types::{EvaluationId, EvaluationRecord, Step};
use serde::{Deserialize, Serialize};

/// Coarse session state derived from the record's control fields
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Parked at a retryable checkpoint (a collaborator call failed)
    Running,
    /// Parked at the feedback step, waiting on the caller
    AwaitingFeedback,
    /// The terminal step has run
    Completed,
}

impl SessionStatus {
    pub fn of(record: &EvaluationRecord) -> Self {
        if record.is_complete() {
            SessionStatus::Completed
        } else if record.is_awaiting_feedback() {
            SessionStatus::AwaitingFeedback
        } else {
            SessionStatus::Running
        }
    }
}

/// Serializable view of one session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvaluationSnapshot {
    pub status: SessionStatus,
    pub current_step: Step,
    /// The full record, message log included
    pub record: EvaluationRecord,
}

impl EvaluationSnapshot {
    pub fn of(record: &EvaluationRecord) -> Self {
        Self {
            status: SessionStatus::of(record),
            current_step: record.current_step(),
            record: record.clone(),
        }
    }
}

/// One row in a session listing
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: EvaluationId,
    pub status: SessionStatus,
    pub current_step: Step,
    /// Final score, present once completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feasibility_score: Option<u8>,
    pub updated_at: DateTime<Utc>,
}

impl SessionSummary {
    pub fn of(record: &EvaluationRecord) -> Self {
        Self {
            id: record.id.clone(),
            status: SessionStatus::of(record),
            current_step: record.current_step(),
            feasibility_score: record.final_evaluation.as_ref().map(|e| e.feasibility_score),
            updated_at: record.updated_at,
        }
    }
}
