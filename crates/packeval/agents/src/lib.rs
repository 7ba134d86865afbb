//! Packeval step handlers and collaborator adapters
//!
//! This crate supplies the reasoning-backed handlers for the evaluation
//! graph and the collaborator contracts they call through:
//!
//! - [`ReasoningClient`] — structured-artifact reasoning calls
//! - [`RetrievalClient`] — ranked search over the manufacturing knowledge base
//! - [`HttpReasoningClient`] — OpenAI-compatible HTTP implementation
//! - [`ScriptedReasoning`] / [`ScriptedRetrieval`] — deterministic doubles
//! - [`standard_registry`] — wires the full step graph for one session
//!
//! Collaborators are explicit dependencies passed in at session
//! construction, never ambient globals.

#![deny(unsafe_code)]

pub mod http;
pub mod prompts;
pub mod reasoning;
pub mod retrieval;
pub mod scripted;
pub mod steps;

pub use http::{HttpReasoningClient, ReasoningConfig};
pub use reasoning::ReasoningClient;
pub use retrieval::{NoopRetrieval, RetrievalClient, RetrievedPassage};
pub use scripted::{ScriptedReasoning, ScriptedRetrieval};
pub use steps::{
    ConceptBreakerStep, FinalScoreStep, ImageAnalysisStep, OperationsStep, ReflectionStep,
    RetrievalBinding, TechnicalFeasibilityStep, DEFAULT_RETRIEVAL_LIMIT,
};

use packeval_engine::{FeedbackProcessor, HumanFeedbackGate, StepRegistry};
use packeval_types::Step;
use std::sync::Arc;

/// Per-agent wiring options
#[derive(Clone, Copy, Debug)]
pub struct AgentOptions {
    /// Whether technical feasibility consults the knowledge base
    pub technical_use_rag: bool,
    /// Whether operations consults the knowledge base
    pub operations_use_rag: bool,
    /// Passages requested per retrieval call
    pub retrieval_limit: usize,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            technical_use_rag: true,
            operations_use_rag: true,
            retrieval_limit: DEFAULT_RETRIEVAL_LIMIT,
        }
    }
}

/// Build the standard evaluation registry for one session.
///
/// All eight steps are registered: the HITL gate pair from the engine and
/// the six reasoning-backed handlers sharing the given collaborators.
pub fn standard_registry(
    reasoning: Arc<dyn ReasoningClient>,
    retrieval: Option<Arc<dyn RetrievalClient>>,
    options: &AgentOptions,
) -> StepRegistry {
    let binding = retrieval.map(|client| {
        RetrievalBinding::new(client).with_limit(options.retrieval_limit)
    });

    let mut technical = TechnicalFeasibilityStep::new(reasoning.clone());
    if options.technical_use_rag {
        if let Some(binding) = &binding {
            technical = technical.with_retrieval(binding.clone());
        }
    }

    let mut operations = OperationsStep::new(reasoning.clone());
    if options.operations_use_rag {
        if let Some(binding) = &binding {
            operations = operations.with_retrieval(binding.clone());
        }
    }

    let mut registry = StepRegistry::new();
    registry.register(
        Step::ImageAnalyzer,
        Arc::new(ImageAnalysisStep::new(reasoning.clone())),
    );
    registry.register(
        Step::ConceptBreaker,
        Arc::new(ConceptBreakerStep::new(reasoning.clone())),
    );
    registry.register(Step::HumanFeedback, Arc::new(HumanFeedbackGate));
    registry.register(Step::ProcessFeedback, Arc::new(FeedbackProcessor));
    registry.register(Step::TechnicalFeasibility, Arc::new(technical));
    registry.register(Step::Operations, Arc::new(operations));
    registry.register(
        Step::Reflection,
        Arc::new(ReflectionStep::new(reasoning.clone())),
    );
    registry.register(Step::FinalScore, Arc::new(FinalScoreStep::new(reasoning)));
    registry
}
