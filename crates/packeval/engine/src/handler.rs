//! The step handler contract
//!
//! A handler consumes the current record and produces its replacement. It
//! may perform at most one call to a reasoning collaborator and/or a
//! retrieval collaborator; the orchestrator never inspects those calls,
//! only the fields the handler writes back into the record.
//!
//! A step either fully commits its update or is considered not to have
//! happened: on error the driver discards the handler's partial work and
//! keeps the prior record as the checkpoint.

use async_trait::async_trait;
use packeval_types::{EvaluationRecord, EvaluationResult};

/// A unit of work in the evaluation graph
#[async_trait]
pub trait StepHandler: Send + Sync {
    /// Execute the step against the current record and return its
    /// replacement, with the next step declared via
    /// [`EvaluationRecord::route_to`] (or the record completed).
    async fn handle(&self, record: EvaluationRecord) -> EvaluationResult<EvaluationRecord>;
}
