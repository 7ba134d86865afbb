//! Application state for API handlers

use crate::EvaluationService;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The session service
    pub service: Arc<EvaluationService>,

    /// Daemon version
    pub version: String,

    /// Daemon start time
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(service: Arc<EvaluationService>) -> Self {
        Self {
            service,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
        }
    }

    /// Human-readable uptime
    pub fn uptime(&self) -> String {
        let elapsed = chrono::Utc::now().signed_duration_since(self.started_at);
        format!("{}s", elapsed.num_seconds().max(0))
    }
}
