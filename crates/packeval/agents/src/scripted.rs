//! Deterministic collaborator doubles
//!
//! `ScriptedReasoning` replays queued artifacts (or canned defaults once a
//! queue runs dry) and records which calls were made, so orchestration
//! tests can assert on call order and inject failures without a live
//! backend. Collaborators are injected per session, which is exactly what
//! makes these doubles substitutable.

use async_trait::async_trait;
use packeval_types::{
    CollaboratorError, Component, ComponentAssessment, FinalEvaluation, ImageAnalysis,
    OperationalAssessment, ReflectionNotes, TechnicalAssessment,
};
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::reasoning::ReasoningClient;
use crate::retrieval::{RetrievalClient, RetrievedPassage};

#[derive(Default)]
struct Script {
    image_analyses: VecDeque<Result<ImageAnalysis, CollaboratorError>>,
    component_lists: VecDeque<Result<Vec<Component>, CollaboratorError>>,
    technical: VecDeque<Result<TechnicalAssessment, CollaboratorError>>,
    operational: VecDeque<Result<OperationalAssessment, CollaboratorError>>,
    reflections: VecDeque<Result<ReflectionNotes, CollaboratorError>>,
    finals: VecDeque<Result<FinalEvaluation, CollaboratorError>>,
    calls: Vec<&'static str>,
}

/// Queue-backed reasoning double with canned defaults
#[derive(Default)]
pub struct ScriptedReasoning {
    state: Mutex<Script>,
}

impl ScriptedReasoning {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image_analysis(self, analysis: ImageAnalysis) -> Self {
        self.state.lock().unwrap().image_analyses.push_back(Ok(analysis));
        self
    }

    pub fn with_components(self, components: Vec<Component>) -> Self {
        self.state.lock().unwrap().component_lists.push_back(Ok(components));
        self
    }

    pub fn with_technical(self, assessment: TechnicalAssessment) -> Self {
        self.state.lock().unwrap().technical.push_back(Ok(assessment));
        self
    }

    pub fn with_technical_failure(self, error: CollaboratorError) -> Self {
        self.state.lock().unwrap().technical.push_back(Err(error));
        self
    }

    pub fn with_operational(self, assessment: OperationalAssessment) -> Self {
        self.state.lock().unwrap().operational.push_back(Ok(assessment));
        self
    }

    pub fn with_reflection(self, notes: ReflectionNotes) -> Self {
        self.state.lock().unwrap().reflections.push_back(Ok(notes));
        self
    }

    pub fn with_final(self, evaluation: FinalEvaluation) -> Self {
        self.state.lock().unwrap().finals.push_back(Ok(evaluation));
        self
    }

    /// The reasoning calls made so far, in order
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record_call(&self, name: &'static str) {
        self.state.lock().unwrap().calls.push(name);
    }

    fn default_components() -> Vec<Component> {
        vec![
            Component::new("outer shell", "corrugated board", "protection")
                .with_requirement("stacking strength"),
            Component::new("liner", "kraft paper", "cushioning"),
        ]
    }

    fn default_technical() -> TechnicalAssessment {
        TechnicalAssessment {
            overall_feasible: true,
            component_assessments: vec![ComponentAssessment {
                component_name: "outer shell".into(),
                feasible: true,
                notes: "standard converting".into(),
                challenges: vec![],
                technical_score: 0.9,
            }],
            technical_summary: "Feasible with standard processes".into(),
        }
    }

    fn default_operational() -> OperationalAssessment {
        OperationalAssessment {
            supply_chain_impact: "Low".into(),
            production_changes_needed: vec![],
            cost_impact: "Neutral".into(),
            overall_feasible: true,
            operational_summary: "No significant operational impact".into(),
        }
    }

    fn default_final() -> FinalEvaluation {
        FinalEvaluation {
            feasibility_score: 7,
            feasibility_summary: "Feasible".into(),
            expert_rationale: "Standard materials and processes".into(),
            key_strengths: vec!["simple construction".into()],
            key_challenges: vec![],
            improvement_recommendations: vec![],
            go_decision: true,
            action_items: vec!["run pilot batch".into()],
            executive_summary: "Proceed".into(),
        }
    }
}

#[async_trait]
impl ReasoningClient for ScriptedReasoning {
    async fn analyze_images(
        &self,
        _concept: &str,
        _images: &[String],
    ) -> Result<ImageAnalysis, CollaboratorError> {
        self.record_call("analyze_images");
        self.state
            .lock()
            .unwrap()
            .image_analyses
            .pop_front()
            .unwrap_or_else(|| {
                Ok(ImageAnalysis {
                    identified_components: vec!["outer shell".into()],
                    analysis_summary: "A rectangular shipper".into(),
                    ..ImageAnalysis::default()
                })
            })
    }

    async fn break_down_concept(
        &self,
        _concept: &str,
        _image_summary: Option<&str>,
    ) -> Result<Vec<Component>, CollaboratorError> {
        self.record_call("break_down_concept");
        self.state
            .lock()
            .unwrap()
            .component_lists
            .pop_front()
            .unwrap_or_else(|| Ok(Self::default_components()))
    }

    async fn assess_technical(
        &self,
        _components: &[Component],
        _references: &[RetrievedPassage],
    ) -> Result<TechnicalAssessment, CollaboratorError> {
        self.record_call("assess_technical");
        self.state
            .lock()
            .unwrap()
            .technical
            .pop_front()
            .unwrap_or_else(|| Ok(Self::default_technical()))
    }

    async fn assess_operations(
        &self,
        _components: &[Component],
        _technical_summary: Option<&str>,
        _references: &[RetrievedPassage],
    ) -> Result<OperationalAssessment, CollaboratorError> {
        self.record_call("assess_operations");
        self.state
            .lock()
            .unwrap()
            .operational
            .pop_front()
            .unwrap_or_else(|| Ok(Self::default_operational()))
    }

    async fn reflect(
        &self,
        _technical_summary: &str,
        _operational_summary: &str,
    ) -> Result<ReflectionNotes, CollaboratorError> {
        self.record_call("reflect");
        self.state
            .lock()
            .unwrap()
            .reflections
            .pop_front()
            .unwrap_or_else(|| {
                Ok(ReflectionNotes {
                    requires_iteration: false,
                    assessment_approved: true,
                    reflection_summary: "Assessments consistent".into(),
                    ..ReflectionNotes::default()
                })
            })
    }

    async fn final_evaluation(
        &self,
        _technical_summary: &str,
        _operational_summary: &str,
        _reflection_summary: &str,
    ) -> Result<FinalEvaluation, CollaboratorError> {
        self.record_call("final_evaluation");
        self.state
            .lock()
            .unwrap()
            .finals
            .pop_front()
            .unwrap_or_else(|| Ok(Self::default_final()))
    }
}

/// Retrieval double returning a fixed passage list
#[derive(Default)]
pub struct ScriptedRetrieval {
    passages: Vec<RetrievedPassage>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedRetrieval {
    pub fn new(passages: Vec<RetrievedPassage>) -> Self {
        Self {
            passages,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// The queries issued so far
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl RetrievalClient for ScriptedRetrieval {
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RetrievedPassage>, CollaboratorError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.passages.iter().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queue_then_default() {
        let scripted = ScriptedReasoning::new()
            .with_components(vec![Component::new("only one", "PE", "sealing")]);

        let first = scripted.break_down_concept("c", None).await.unwrap();
        assert_eq!(first.len(), 1);

        // Queue exhausted: canned default takes over.
        let second = scripted.break_down_concept("c", None).await.unwrap();
        assert_eq!(second.len(), 2);

        assert_eq!(scripted.calls(), vec!["break_down_concept", "break_down_concept"]);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let scripted = ScriptedReasoning::new()
            .with_technical_failure(CollaboratorError::Transport("down".into()))
            .with_technical(TechnicalAssessment::default());

        assert!(scripted.assess_technical(&[], &[]).await.is_err());
        assert!(scripted.assess_technical(&[], &[]).await.is_ok());
    }

    #[tokio::test]
    async fn test_retrieval_records_queries() {
        let retrieval = ScriptedRetrieval::new(vec![RetrievedPassage::new("laminator", 0.7)]);
        let passages = retrieval.search("lamination", 3).await.unwrap();
        assert_eq!(passages.len(), 1);
        assert_eq!(retrieval.queries(), vec!["lamination".to_string()]);
    }
}
