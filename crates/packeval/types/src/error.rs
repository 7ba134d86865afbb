//! Error taxonomy for the evaluation workflow
//!
//! Configuration and unknown-step errors are unrecoverable and abort the
//! session. Collaborator errors are surfaced but leave the record at its
//! prior checkpoint, so the caller may retry the same step. No error is
//! silently swallowed or auto-corrected by the router.

use crate::step::{Step, Transition};
use thiserror::Error;

/// Failure of an external reasoning or retrieval collaborator.
///
/// Always retryable: the step that issued the call commits nothing, so
/// re-invoking the loop retries from the unchanged checkpoint.
#[derive(Clone, Debug, Error)]
pub enum CollaboratorError {
    /// The transport to the collaborator failed
    #[error("collaborator transport failed: {0}")]
    Transport(String),

    /// The call exceeded its configured deadline
    #[error("collaborator call exceeded its {0}s deadline")]
    DeadlineExceeded(u64),

    /// The collaborator returned output that does not match the step's schema
    #[error("collaborator returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors raised by the orchestration core
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// The registry or transition table is malformed. Fatal, never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The record's current step has no registered handler. The record is
    /// corrupted or forged; the session is not resumable.
    #[error("no handler registered for step '{0}'")]
    UnknownStep(Step),

    /// A handler declared a next step outside its allowed set. Fatal at the
    /// offending transition, never silently corrected.
    #[error("illegal transition from '{from}' to '{to}'")]
    IllegalTransition { from: Step, to: Transition },

    /// Feedback processing was entered with no feedback recorded; the caller
    /// resumed out of order.
    #[error("feedback processing entered without user feedback")]
    MissingFeedback,

    /// An external collaborator failed; the session remains resumable.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

impl EvaluationError {
    /// Whether re-invoking the loop from the prior checkpoint may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, EvaluationError::Collaborator(_))
    }
}

/// Result alias for orchestration operations
pub type EvaluationResult<T> = Result<T, EvaluationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_collaborator_errors_retry() {
        assert!(EvaluationError::Collaborator(CollaboratorError::Transport("down".into()))
            .is_retryable());
        assert!(!EvaluationError::Configuration("bad table".into()).is_retryable());
        assert!(!EvaluationError::UnknownStep(Step::Reflection).is_retryable());
        assert!(!EvaluationError::MissingFeedback.is_retryable());
        assert!(!EvaluationError::IllegalTransition {
            from: Step::Operations,
            to: Transition::Complete,
        }
        .is_retryable());
    }

    #[test]
    fn test_display_names_use_step_identifiers() {
        let err = EvaluationError::IllegalTransition {
            from: Step::TechnicalFeasibility,
            to: Transition::Goto(Step::FinalScore),
        };
        assert_eq!(
            err.to_string(),
            "illegal transition from 'technical_feasibility' to 'final_score'"
        );
    }
}
