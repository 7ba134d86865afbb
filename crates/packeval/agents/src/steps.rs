//! Reasoning-backed step handlers
//!
//! Each handler performs at most one reasoning call and at most one
//! retrieval call, writes the resulting artifact into the record, appends
//! its narrative message, and declares its next step. Handlers never touch
//! the registry or the driver; routing legality is validated outside.

use async_trait::async_trait;
use packeval_engine::{ReflectionGuard, StepHandler};
use packeval_types::{EvaluationRecord, EvaluationResult, Step};
use std::sync::Arc;

use crate::prompts;
use crate::reasoning::ReasoningClient;
use crate::retrieval::{RetrievalClient, RetrievedPassage};

/// How many knowledge-base passages an assessment step requests
pub const DEFAULT_RETRIEVAL_LIMIT: usize = 5;

/// Retrieval wiring for the assessment steps
#[derive(Clone)]
pub struct RetrievalBinding {
    client: Arc<dyn RetrievalClient>,
    limit: usize,
}

impl RetrievalBinding {
    pub fn new(client: Arc<dyn RetrievalClient>) -> Self {
        Self {
            client,
            limit: DEFAULT_RETRIEVAL_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    async fn lookup(&self, query: &str) -> EvaluationResult<Vec<RetrievedPassage>> {
        Ok(self.client.search(query, self.limit).await?)
    }
}

// ── Image analysis ───────────────────────────────────────────────────

/// Analyzes the supplied concept images
pub struct ImageAnalysisStep {
    reasoning: Arc<dyn ReasoningClient>,
}

impl ImageAnalysisStep {
    pub fn new(reasoning: Arc<dyn ReasoningClient>) -> Self {
        Self { reasoning }
    }
}

#[async_trait]
impl StepHandler for ImageAnalysisStep {
    async fn handle(&self, mut record: EvaluationRecord) -> EvaluationResult<EvaluationRecord> {
        // Records without images never enter this step; guard anyway so a
        // hand-built record cannot trigger a pointless collaborator call.
        if record.concept_images.is_empty() {
            record.route_to(Step::ConceptBreaker);
            return Ok(record);
        }

        let analysis = self
            .reasoning
            .analyze_images(&record.concept, &record.concept_images)
            .await?;

        record.add_message(
            "image_analyzer",
            format!(
                "Image analysis complete. Identified {} components. {}",
                analysis.identified_components.len(),
                analysis.analysis_summary
            ),
        );
        record.image_analysis = Some(analysis);
        record.route_to(Step::ConceptBreaker);
        Ok(record)
    }
}

// ── Concept breakdown ────────────────────────────────────────────────

/// Breaks the concept into components; re-derives after rejected feedback
pub struct ConceptBreakerStep {
    reasoning: Arc<dyn ReasoningClient>,
}

impl ConceptBreakerStep {
    pub fn new(reasoning: Arc<dyn ReasoningClient>) -> Self {
        Self { reasoning }
    }
}

#[async_trait]
impl StepHandler for ConceptBreakerStep {
    async fn handle(&self, mut record: EvaluationRecord) -> EvaluationResult<EvaluationRecord> {
        let image_summary = record
            .image_analysis
            .as_ref()
            .map(|a| a.analysis_summary.as_str());

        let components = self
            .reasoning
            .break_down_concept(&record.concept, image_summary)
            .await?;

        record.add_message(
            "concept_breaker",
            format!(
                "Concept breakdown complete. Identified {} components.",
                components.len()
            ),
        );
        record.components = components;
        record.route_to(Step::HumanFeedback);
        Ok(record)
    }
}

// ── Technical feasibility ────────────────────────────────────────────

/// Assesses per-component technical feasibility
pub struct TechnicalFeasibilityStep {
    reasoning: Arc<dyn ReasoningClient>,
    retrieval: Option<RetrievalBinding>,
}

impl TechnicalFeasibilityStep {
    pub fn new(reasoning: Arc<dyn ReasoningClient>) -> Self {
        Self {
            reasoning,
            retrieval: None,
        }
    }

    pub fn with_retrieval(mut self, retrieval: RetrievalBinding) -> Self {
        self.retrieval = Some(retrieval);
        self
    }
}

#[async_trait]
impl StepHandler for TechnicalFeasibilityStep {
    async fn handle(&self, mut record: EvaluationRecord) -> EvaluationResult<EvaluationRecord> {
        let references = match &self.retrieval {
            Some(binding) => {
                let query = format!(
                    "manufacturing feasibility of: {}",
                    prompts::components_block(&record.components)
                );
                binding.lookup(&query).await?
            }
            None => Vec::new(),
        };

        let assessment = self
            .reasoning
            .assess_technical(&record.components, &references)
            .await?;

        record.add_message(
            "technical_feasibility",
            format!(
                "Technical feasibility assessment complete. Overall feasibility: {}",
                assessment.overall_feasible
            ),
        );
        record.technical_assessment = Some(assessment);
        record.route_to(Step::Operations);
        Ok(record)
    }
}

// ── Operations ───────────────────────────────────────────────────────

/// Assesses supply-chain and production impact
pub struct OperationsStep {
    reasoning: Arc<dyn ReasoningClient>,
    retrieval: Option<RetrievalBinding>,
}

impl OperationsStep {
    pub fn new(reasoning: Arc<dyn ReasoningClient>) -> Self {
        Self {
            reasoning,
            retrieval: None,
        }
    }

    pub fn with_retrieval(mut self, retrieval: RetrievalBinding) -> Self {
        self.retrieval = Some(retrieval);
        self
    }
}

#[async_trait]
impl StepHandler for OperationsStep {
    async fn handle(&self, mut record: EvaluationRecord) -> EvaluationResult<EvaluationRecord> {
        let references = match &self.retrieval {
            Some(binding) => {
                let query = format!(
                    "production and supply chain requirements for: {}",
                    prompts::components_block(&record.components)
                );
                binding.lookup(&query).await?
            }
            None => Vec::new(),
        };

        let technical_summary = record
            .technical_assessment
            .as_ref()
            .map(|a| a.technical_summary.as_str());

        let assessment = self
            .reasoning
            .assess_operations(&record.components, technical_summary, &references)
            .await?;

        record.add_message(
            "operations",
            format!(
                "Operational impact assessment complete. Overall feasibility: {}",
                assessment.overall_feasible
            ),
        );
        record.operational_assessment = Some(assessment);
        record.route_to(Step::Reflection);
        Ok(record)
    }
}

// ── Reflection ───────────────────────────────────────────────────────

/// Reviews the assessments, bounded by the reflection guard
pub struct ReflectionStep {
    reasoning: Arc<dyn ReasoningClient>,
    guard: ReflectionGuard,
}

impl ReflectionStep {
    pub fn new(reasoning: Arc<dyn ReasoningClient>) -> Self {
        Self {
            reasoning,
            guard: ReflectionGuard::new(),
        }
    }

    pub fn with_guard(mut self, guard: ReflectionGuard) -> Self {
        self.guard = guard;
        self
    }
}

#[async_trait]
impl StepHandler for ReflectionStep {
    async fn handle(&self, mut record: EvaluationRecord) -> EvaluationResult<EvaluationRecord> {
        // Counted before any collaborator call: the liveness bound holds
        // even if the reasoning backend never converges.
        let counter = record.enter_reflection();

        if self.guard.at_ceiling(counter) {
            record.add_message(
                "reflection",
                format!(
                    "Maximum number of reflections reached ({}). Moving to final evaluation.",
                    self.guard.ceiling()
                ),
            );
            record.route_to(Step::FinalScore);
            return Ok(record);
        }

        let technical_summary = record
            .technical_assessment
            .as_ref()
            .map(|a| a.technical_summary.clone())
            .unwrap_or_else(|| "No technical assessment available".into());
        let operational_summary = record
            .operational_assessment
            .as_ref()
            .map(|a| a.operational_summary.clone())
            .unwrap_or_else(|| "No operational assessment available".into());

        let notes = self
            .reasoning
            .reflect(&technical_summary, &operational_summary)
            .await?;

        record.add_message(
            "reflection",
            format!(
                "Reflection {}/{} complete. Requires iteration: {}",
                counter,
                self.guard.ceiling(),
                notes.requires_iteration
            ),
        );

        let next = self.guard.route(counter, &notes);
        record.reflection_notes = Some(notes);
        record.route_to(next);
        Ok(record)
    }
}

// ── Final score ──────────────────────────────────────────────────────

/// Produces the final evaluation and completes the record
pub struct FinalScoreStep {
    reasoning: Arc<dyn ReasoningClient>,
}

impl FinalScoreStep {
    pub fn new(reasoning: Arc<dyn ReasoningClient>) -> Self {
        Self { reasoning }
    }
}

#[async_trait]
impl StepHandler for FinalScoreStep {
    async fn handle(&self, mut record: EvaluationRecord) -> EvaluationResult<EvaluationRecord> {
        let technical_summary = record
            .technical_assessment
            .as_ref()
            .map(|a| a.technical_summary.clone())
            .unwrap_or_else(|| "No technical assessment available".into());
        let operational_summary = record
            .operational_assessment
            .as_ref()
            .map(|a| a.operational_summary.clone())
            .unwrap_or_else(|| "No operational assessment available".into());
        let reflection_summary = record
            .reflection_notes
            .as_ref()
            .map(|n| n.reflection_summary.clone())
            .unwrap_or_else(|| "No reflection notes available".into());

        let evaluation = self
            .reasoning
            .final_evaluation(&technical_summary, &operational_summary, &reflection_summary)
            .await?;

        record.add_message(
            "final_score",
            format!(
                "Final evaluation complete. Score: {}/10. Go decision: {}",
                evaluation.feasibility_score, evaluation.go_decision
            ),
        );
        record.final_evaluation = Some(evaluation);
        record.complete();
        Ok(record)
    }
}
