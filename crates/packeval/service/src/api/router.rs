//! API router configuration

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/evaluations", get(handlers::list_evaluations))
        .route("/evaluations", post(handlers::start_evaluation))
        .route("/evaluations/:id", get(handlers::get_evaluation))
        .route("/evaluations/:id", delete(handlers::delete_evaluation))
        .route("/evaluations/:id/feedback", post(handlers::submit_feedback))
        .route("/evaluations/:id/retry", post(handlers::retry_evaluation))
        .route("/evaluations/:id/report", get(handlers::get_report));

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
