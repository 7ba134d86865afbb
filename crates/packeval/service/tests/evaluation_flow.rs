//! End-to-end evaluation flows over scripted collaborators
//!
//! These tests drive the full step graph through the session service:
//! image skip, the feedback checkpoint in both branches, the bounded
//! reflection cycle, and retry after a collaborator failure.

use packeval_agents::{
    standard_registry, AgentOptions, NoopRetrieval, ScriptedReasoning, ScriptedRetrieval,
    RetrievedPassage,
};
use packeval_service::{EvaluationService, ServiceError, SessionStatus};
use packeval_types::{
    CollaboratorError, Component, ReflectionNotes, Step, UserFeedback,
};
use std::sync::Arc;

fn service_with(reasoning: Arc<ScriptedReasoning>) -> EvaluationService {
    let registry = standard_registry(
        reasoning,
        Some(Arc::new(NoopRetrieval)),
        &AgentOptions::default(),
    );
    EvaluationService::new(Arc::new(registry)).unwrap()
}

#[tokio::test]
async fn full_flow_with_images() {
    let reasoning = Arc::new(ScriptedReasoning::new());
    let service = service_with(reasoning.clone());

    let parked = service
        .start(
            "insulated fish box",
            vec!["https://example.com/concept.png".into()],
        )
        .await
        .unwrap();

    // Runs image analysis, breaks down the concept, then parks for review.
    assert_eq!(parked.status, SessionStatus::AwaitingFeedback);
    assert_eq!(parked.current_step, Step::HumanFeedback);
    assert!(parked.record.image_analysis.is_some());
    assert!(!parked.record.components.is_empty());
    assert_eq!(
        reasoning.calls(),
        vec!["analyze_images", "break_down_concept"]
    );

    let finished = service
        .resume(&parked.record.id, UserFeedback::accept())
        .await
        .unwrap();

    assert_eq!(finished.status, SessionStatus::Completed);
    assert_eq!(finished.current_step, Step::FinalScore);
    let evaluation = finished.record.final_evaluation.as_ref().unwrap();
    assert!((1..=10).contains(&evaluation.feasibility_score));
    assert_eq!(
        reasoning.calls(),
        vec![
            "analyze_images",
            "break_down_concept",
            "assess_technical",
            "assess_operations",
            "reflect",
            "final_evaluation",
        ]
    );
}

#[tokio::test]
async fn image_analysis_skipped_without_images() {
    let reasoning = Arc::new(ScriptedReasoning::new());
    let service = service_with(reasoning.clone());

    let parked = service.start("plain sleeve", vec![]).await.unwrap();

    assert!(parked.record.image_analysis.is_none());
    // The step is never entered, not entered-and-short-circuited.
    assert_eq!(reasoning.calls().first(), Some(&"break_down_concept"));
}

#[tokio::test]
async fn rejected_feedback_rederives_components() {
    let reasoning = Arc::new(
        ScriptedReasoning::new()
            .with_components(vec![Component::new("pouch", "LDPE", "containment")])
            .with_components(vec![
                Component::new("pouch", "mono-PE", "containment"),
                Component::new("spout", "HDPE", "dispensing"),
            ]),
    );
    let service = service_with(reasoning.clone());

    let parked = service.start("spouted pouch", vec![]).await.unwrap();
    let id = parked.record.id.clone();
    assert_eq!(parked.record.components.len(), 1);

    // Reject: back to the concept breaker, then park for review again.
    let reparked = service
        .resume(
            &id,
            UserFeedback::reject(vec!["material should be mono-PE".into()]),
        )
        .await
        .unwrap();

    assert_eq!(reparked.status, SessionStatus::AwaitingFeedback);
    assert_eq!(reparked.record.components.len(), 2);
    assert_eq!(reparked.record.components[0].material, "mono-PE");
    // The consumed feedback never survives processing.
    assert!(reparked.record.feedback().is_none());

    // Accept on the second pass and run to completion.
    let finished = service.resume(&id, UserFeedback::accept()).await.unwrap();
    assert_eq!(finished.status, SessionStatus::Completed);
    assert!(finished.record.feedback().is_none());
}

#[tokio::test]
async fn reflection_cycle_is_bounded() {
    // The collaborator insists on iteration forever; the guard must force
    // the final score after the third reflection entry.
    let restless = ReflectionNotes {
        requires_iteration: true,
        questions: vec!["are the barrier layers sufficient?".into()],
        ..ReflectionNotes::default()
    };
    let reasoning = Arc::new(
        ScriptedReasoning::new()
            .with_reflection(restless.clone())
            .with_reflection(restless.clone())
            .with_reflection(restless),
    );
    let service = service_with(reasoning.clone());

    let parked = service.start("barrier carton", vec![]).await.unwrap();
    let finished = service
        .resume(&parked.record.id, UserFeedback::accept())
        .await
        .unwrap();

    assert_eq!(finished.status, SessionStatus::Completed);
    assert_eq!(finished.record.reflection_count(), 3);

    // Two live reflections; the third entry hits the ceiling and never
    // consults the collaborator.
    let reflect_calls = reasoning
        .calls()
        .into_iter()
        .filter(|c| *c == "reflect")
        .count();
    assert_eq!(reflect_calls, 2);

    // Open questions always re-run technical feasibility first.
    let technical_calls = reasoning
        .calls()
        .into_iter()
        .filter(|c| *c == "assess_technical")
        .count();
    assert_eq!(technical_calls, 3);
}

#[tokio::test]
async fn collaborator_failure_is_retryable() {
    let reasoning = Arc::new(ScriptedReasoning::new().with_technical_failure(
        CollaboratorError::DeadlineExceeded(300),
    ));
    let service = service_with(reasoning.clone());

    let parked = service.start("laminated tube", vec![]).await.unwrap();
    let id = parked.record.id.clone();

    let err = service
        .resume(&id, UserFeedback::accept())
        .await
        .unwrap_err();
    match err {
        ServiceError::Halted {
            step, retryable, ..
        } => {
            assert_eq!(step, Step::TechnicalFeasibility);
            assert!(retryable);
        }
        other => panic!("unexpected error: {other}"),
    }

    // The failed step committed nothing.
    let checkpoint = service.snapshot(&id).await.unwrap();
    assert_eq!(checkpoint.current_step, Step::TechnicalFeasibility);
    assert!(checkpoint.record.technical_assessment.is_none());
    // Feedback was already consumed before the failing step.
    assert!(checkpoint.record.feedback().is_none());

    // Retrying from the unchanged checkpoint completes the evaluation.
    let finished = service.retry(&id).await.unwrap();
    assert_eq!(finished.status, SessionStatus::Completed);
    assert!(finished.record.technical_assessment.is_some());
}

#[tokio::test]
async fn assessment_steps_query_the_knowledge_base() {
    let retrieval = Arc::new(ScriptedRetrieval::new(vec![RetrievedPassage::new(
        "thermoforming line, PP and PET trays",
        0.88,
    )]));
    let registry = standard_registry(
        Arc::new(ScriptedReasoning::new()),
        Some(retrieval.clone()),
        &AgentOptions::default(),
    );
    let service = EvaluationService::new(Arc::new(registry)).unwrap();

    let parked = service.start("thermoformed tray", vec![]).await.unwrap();
    service
        .resume(&parked.record.id, UserFeedback::accept())
        .await
        .unwrap();

    // One query from technical feasibility, one from operations.
    assert_eq!(retrieval.queries().len(), 2);
}
