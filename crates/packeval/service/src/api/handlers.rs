//! API handlers for evaluation sessions

use crate::api::state::AppState;
use crate::error::{ApiError, ApiResult};
use crate::snapshot::{EvaluationSnapshot, SessionSummary};
use axum::{
    extract::{Path, State},
    Json,
};
use packeval_types::{EvaluationId, UserFeedback};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub version: String,
    pub uptime: String,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime: state.uptime(),
    })
}

/// Request body for starting an evaluation
#[derive(Debug, Deserialize)]
pub struct StartEvaluationRequest {
    /// The packaging concept to evaluate
    pub concept: String,
    /// Optional concept image references (URLs or base64)
    #[serde(default)]
    pub concept_images: Vec<String>,
}

/// Start a new evaluation and run it to its first suspension point
pub async fn start_evaluation(
    State(state): State<AppState>,
    Json(request): Json<StartEvaluationRequest>,
) -> ApiResult<Json<EvaluationSnapshot>> {
    if request.concept.trim().is_empty() {
        return Err(ApiError::BadRequest("concept must not be empty".into()));
    }

    let snapshot = state
        .service
        .start(request.concept, request.concept_images)
        .await?;
    Ok(Json(snapshot))
}

/// List all sessions
pub async fn list_evaluations(State(state): State<AppState>) -> Json<Vec<SessionSummary>> {
    Json(state.service.list().await)
}

/// Fetch one session's snapshot
pub async fn get_evaluation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<EvaluationSnapshot>> {
    let snapshot = state.service.snapshot(&EvaluationId::new(id)).await?;
    Ok(Json(snapshot))
}

/// Request body for submitting feedback
#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    /// Whether the component and material assumptions are correct
    pub is_correct: bool,
    #[serde(default)]
    pub feedback_notes: Vec<String>,
    #[serde(default)]
    pub suggested_changes: Vec<String>,
}

impl From<FeedbackRequest> for UserFeedback {
    fn from(request: FeedbackRequest) -> Self {
        UserFeedback {
            is_correct: request.is_correct,
            feedback_notes: request.feedback_notes,
            suggested_changes: request.suggested_changes,
        }
    }
}

/// Attach feedback to a parked session and continue it
pub async fn submit_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<FeedbackRequest>,
) -> ApiResult<Json<EvaluationSnapshot>> {
    let snapshot = state
        .service
        .resume(&EvaluationId::new(id), request.into())
        .await?;
    Ok(Json(snapshot))
}

/// Re-drive a session from its checkpoint after a collaborator failure
pub async fn retry_evaluation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<EvaluationSnapshot>> {
    let snapshot = state.service.retry(&EvaluationId::new(id)).await?;
    Ok(Json(snapshot))
}

/// Fetch the formatted report for a session
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<String> {
    let report = state.service.report(&EvaluationId::new(id)).await?;
    Ok(report)
}

/// Abandon a session
pub async fn delete_evaluation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    state.service.abandon(&EvaluationId::new(id)).await?;
    Ok(Json(serde_json::json!({ "status": "deleted" })))
}
