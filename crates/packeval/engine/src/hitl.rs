//! Human feedback gate: the suspend/resume checkpoint of the graph
//!
//! The gate is a pair of steps. `human_feedback` parks the record with a
//! feedback request and self-routes; the driver interprets the park as a
//! suspension point, so the self-transition is never re-executed until the
//! caller resumes. `process_feedback` consumes the supplied feedback and
//! routes the graph forward (accept) or back to re-decomposition (reject),
//! clearing the feedback in both branches so the same feedback object can
//! never be reprocessed on a later pass.

use crate::handler::StepHandler;
use async_trait::async_trait;
use packeval_types::{Component, EvaluationError, EvaluationRecord, EvaluationResult, Step};

/// Renders the component breakdown for human review
fn feedback_request(components: &[Component]) -> String {
    let summary = components
        .iter()
        .map(|c| {
            format!(
                "- Component: {}\n  Material: {}\n  Function: {}\n  Requirements: {}",
                c.name,
                c.material,
                c.function,
                c.requirements.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Please review the component breakdown:\n\n{}\n\n\
         Are the component identifications and material assumptions correct? \
         Reply with is_correct, feedback notes, and any suggested changes.",
        summary
    )
}

/// The `human_feedback` step: parks the record until feedback arrives
pub struct HumanFeedbackGate;

#[async_trait]
impl StepHandler for HumanFeedbackGate {
    async fn handle(&self, mut record: EvaluationRecord) -> EvaluationResult<EvaluationRecord> {
        if record.feedback().is_none() {
            record.add_message("human_feedback", feedback_request(&record.components));
            record.park_for_feedback();
            record.route_to(Step::HumanFeedback);
            tracing::info!(evaluation_id = %record.id, "feedback requested");
        } else {
            record.unpark();
            record.route_to(Step::ProcessFeedback);
        }
        Ok(record)
    }
}

/// The `process_feedback` step: routes on the feedback's verdict
pub struct FeedbackProcessor;

#[async_trait]
impl StepHandler for FeedbackProcessor {
    async fn handle(&self, mut record: EvaluationRecord) -> EvaluationResult<EvaluationRecord> {
        // Clearing before returning is the loop-breaking invariant.
        let feedback = record
            .take_feedback()
            .ok_or(EvaluationError::MissingFeedback)?;

        if feedback.is_correct {
            record.add_message(
                "feedback_processor",
                "Components confirmed correct. Proceeding to technical feasibility.",
            );
            record.route_to(Step::TechnicalFeasibility);
        } else {
            record.add_message(
                "feedback_processor",
                format!(
                    "Adjusting components based on feedback: {}",
                    feedback.suggested_changes.join(", ")
                ),
            );
            record.route_to(Step::ConceptBreaker);
        }

        Ok(record)
    }
}
