//! Assessment artifacts produced by the evaluation steps
//!
//! Each artifact is the structured output of one step's reasoning call.
//! Artifacts are optional on the record until produced and are overwritten
//! whole on re-derivation, never patched field by field.

use serde::{Deserialize, Serialize};

// ── Concept decomposition ────────────────────────────────────────────

/// A component of the packaging concept
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Name of the component
    pub name: String,
    /// Material the component is made of
    pub material: String,
    /// Primary function of the component
    pub function: String,
    /// Requirements the component must fulfill
    pub requirements: Vec<String>,
}

impl Component {
    pub fn new(
        name: impl Into<String>,
        material: impl Into<String>,
        function: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            material: material.into(),
            function: function.into(),
            requirements: Vec::new(),
        }
    }

    pub fn with_requirement(mut self, requirement: impl Into<String>) -> Self {
        self.requirements.push(requirement.into());
        self
    }
}

// ── Image analysis ───────────────────────────────────────────────────

/// Visual analysis of the supplied concept images
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysis {
    /// Key observations from the concept images
    pub observations: Vec<String>,
    /// Components identified visually
    pub identified_components: Vec<String>,
    /// Materials that appear to be used
    pub materials_detected: Vec<String>,
    /// Notable design features
    pub design_features: Vec<String>,
    /// Summary of the analysis findings
    pub analysis_summary: String,
}

// ── Technical feasibility ────────────────────────────────────────────

/// Assessment of a single component's technical feasibility
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentAssessment {
    /// Name of the component being assessed
    pub component_name: String,
    /// Whether the component is technically feasible
    pub feasible: bool,
    /// Detailed assessment notes
    pub notes: String,
    /// Technical challenges identified
    pub challenges: Vec<String>,
    /// Feasibility score in [0.0, 1.0]
    pub technical_score: f64,
}

/// Technical feasibility assessment across all components
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalAssessment {
    /// Whether the concept is technically feasible overall
    pub overall_feasible: bool,
    /// Per-component assessments
    pub component_assessments: Vec<ComponentAssessment>,
    /// Summary of technical feasibility
    pub technical_summary: String,
}

impl TechnicalAssessment {
    /// Look up the assessment for a named component
    pub fn for_component(&self, name: &str) -> Option<&ComponentAssessment> {
        self.component_assessments
            .iter()
            .find(|a| a.component_name == name)
    }

    /// Components judged infeasible
    pub fn infeasible_components(&self) -> Vec<&ComponentAssessment> {
        self.component_assessments
            .iter()
            .filter(|a| !a.feasible)
            .collect()
    }
}

// ── Operational impact ───────────────────────────────────────────────

/// Operational impact assessment
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationalAssessment {
    /// Impact on the supply chain (Low/Medium/High)
    pub supply_chain_impact: String,
    /// Changes needed to production processes
    pub production_changes_needed: Vec<String>,
    /// Estimated cost impact
    pub cost_impact: String,
    /// Whether the concept is operationally feasible
    pub overall_feasible: bool,
    /// Summary of operational impact
    pub operational_summary: String,
}

// ── Reflection ───────────────────────────────────────────────────────

/// Self-review of the technical and operational assessments
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReflectionNotes {
    /// Blind spots identified in the assessments
    pub blind_spots: Vec<String>,
    /// Open questions raised during reflection
    pub questions: Vec<String>,
    /// Whether further iteration is required
    pub requires_iteration: bool,
    /// Summary of reflection insights
    pub reflection_summary: String,
    /// Whether the assessments are approved as they stand
    pub assessment_approved: bool,
}

impl ReflectionNotes {
    /// Whether the reflection raised any open questions
    pub fn has_open_questions(&self) -> bool {
        !self.questions.is_empty()
    }
}

// ── Final evaluation ─────────────────────────────────────────────────

/// A specific recommendation for improving feasibility
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImprovementRecommendation {
    /// The area of the concept to improve
    pub area: String,
    /// The specific improvement recommendation
    pub recommendation: String,
}

/// Final evaluation, score, and recommendations
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinalEvaluation {
    /// Overall feasibility score (1-10, 10 being most feasible)
    pub feasibility_score: u8,
    /// Summary of overall feasibility
    pub feasibility_summary: String,
    /// Expert rationale behind the score
    pub expert_rationale: String,
    /// Key strengths of the concept
    pub key_strengths: Vec<String>,
    /// Key challenges or barriers
    pub key_challenges: Vec<String>,
    /// Specific recommendations for improvement
    pub improvement_recommendations: Vec<ImprovementRecommendation>,
    /// Whether to proceed with the concept
    pub go_decision: bool,
    /// Recommended next steps
    pub action_items: Vec<String>,
    /// Brief executive summary
    pub executive_summary: String,
}

// ── Human feedback ───────────────────────────────────────────────────

/// Human feedback on the component and material assumptions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserFeedback {
    /// Whether the component and material assumptions are correct
    pub is_correct: bool,
    /// Specific feedback notes
    pub feedback_notes: Vec<String>,
    /// Suggested changes to components or materials
    pub suggested_changes: Vec<String>,
}

impl UserFeedback {
    /// Feedback confirming the breakdown with no changes
    pub fn accept() -> Self {
        Self {
            is_correct: true,
            feedback_notes: Vec::new(),
            suggested_changes: Vec::new(),
        }
    }

    /// Feedback rejecting the breakdown with suggested changes
    pub fn reject(changes: Vec<String>) -> Self {
        Self {
            is_correct: false,
            feedback_notes: Vec::new(),
            suggested_changes: changes,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.feedback_notes.push(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_builder() {
        let component = Component::new("lid", "recycled PET", "closure")
            .with_requirement("airtight seal")
            .with_requirement("child safe");
        assert_eq!(component.requirements.len(), 2);
    }

    #[test]
    fn test_technical_assessment_lookup() {
        let assessment = TechnicalAssessment {
            overall_feasible: false,
            component_assessments: vec![
                ComponentAssessment {
                    component_name: "tray".into(),
                    feasible: true,
                    notes: String::new(),
                    challenges: vec![],
                    technical_score: 0.9,
                },
                ComponentAssessment {
                    component_name: "film".into(),
                    feasible: false,
                    notes: "no supplier for this gauge".into(),
                    challenges: vec!["material sourcing".into()],
                    technical_score: 0.3,
                },
            ],
            technical_summary: String::new(),
        };

        assert!(assessment.for_component("tray").unwrap().feasible);
        assert!(assessment.for_component("missing").is_none());
        assert_eq!(assessment.infeasible_components().len(), 1);
    }

    #[test]
    fn test_reflection_open_questions() {
        let mut notes = ReflectionNotes::default();
        assert!(!notes.has_open_questions());
        notes.questions.push("what about moisture barriers?".into());
        assert!(notes.has_open_questions());
    }

    #[test]
    fn test_feedback_constructors() {
        let accept = UserFeedback::accept();
        assert!(accept.is_correct);
        assert!(accept.suggested_changes.is_empty());

        let reject = UserFeedback::reject(vec!["lid should be aluminium".into()])
            .with_note("material assumption wrong");
        assert!(!reject.is_correct);
        assert_eq!(reject.suggested_changes.len(), 1);
        assert_eq!(reject.feedback_notes.len(), 1);
    }
}
