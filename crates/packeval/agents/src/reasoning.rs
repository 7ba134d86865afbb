//! The reasoning collaborator contract
//!
//! A reasoning client receives formatted context and returns a structured
//! artifact matching the calling step's schema. The orchestrator never
//! inspects these calls; transport, prompting, and parsing are entirely
//! the client's concern, which is what lets a scripted double stand in for
//! a live model per session.

use async_trait::async_trait;
use packeval_types::{
    CollaboratorError, Component, FinalEvaluation, ImageAnalysis, OperationalAssessment,
    ReflectionNotes, TechnicalAssessment,
};

use crate::retrieval::RetrievedPassage;

/// Structured-artifact reasoning calls, one per assessment schema
#[async_trait]
pub trait ReasoningClient: Send + Sync {
    /// Analyze the concept images against the concept description
    async fn analyze_images(
        &self,
        concept: &str,
        images: &[String],
    ) -> Result<ImageAnalysis, CollaboratorError>;

    /// Break the concept down into components
    async fn break_down_concept(
        &self,
        concept: &str,
        image_summary: Option<&str>,
    ) -> Result<Vec<Component>, CollaboratorError>;

    /// Assess per-component technical feasibility
    async fn assess_technical(
        &self,
        components: &[Component],
        references: &[RetrievedPassage],
    ) -> Result<TechnicalAssessment, CollaboratorError>;

    /// Assess operational impact
    async fn assess_operations(
        &self,
        components: &[Component],
        technical_summary: Option<&str>,
        references: &[RetrievedPassage],
    ) -> Result<OperationalAssessment, CollaboratorError>;

    /// Review the assessments for blind spots and open questions
    async fn reflect(
        &self,
        technical_summary: &str,
        operational_summary: &str,
    ) -> Result<ReflectionNotes, CollaboratorError>;

    /// Produce the final score and recommendations
    async fn final_evaluation(
        &self,
        technical_summary: &str,
        operational_summary: &str,
        reflection_summary: &str,
    ) -> Result<FinalEvaluation, CollaboratorError>;
}
