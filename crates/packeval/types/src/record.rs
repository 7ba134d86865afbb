//! The evaluation record: the single state aggregate for one session
//!
//! A record is owned exclusively by one evaluation session and is never
//! shared across sessions. Each step execution consumes the current record
//! and produces its replacement; the driver loop holds the single
//! authoritative owner between steps.
//!
//! Control fields are private: handlers mutate them only through the
//! transition contract methods below, so no handler can bypass the
//! routing or suspension rules by poking fields directly.

use crate::artifact::{
    Component, FinalEvaluation, ImageAnalysis, OperationalAssessment, ReflectionNotes,
    TechnicalAssessment, UserFeedback,
};
use crate::step::Step;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Identifier ───────────────────────────────────────────────────────

/// Unique identifier for an evaluation session
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvaluationId(pub String);

impl EvaluationId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn short(&self) -> &str {
        &self.0[..8.min(self.0.len())]
    }
}

impl std::fmt::Display for EvaluationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Message log ──────────────────────────────────────────────────────

/// One entry in the append-only narrative log
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    /// Which actor produced the message
    pub agent: String,
    /// Narrative output of the step
    pub content: String,
    /// When the message was appended
    pub timestamp: DateTime<Utc>,
}

// ── Evaluation record ────────────────────────────────────────────────

/// The state aggregate for one packaging-concept assessment session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Unique session identifier
    pub id: EvaluationId,
    /// The packaging concept under evaluation
    pub concept: String,
    /// Concept image references (URLs or base64), possibly empty
    pub concept_images: Vec<String>,

    /// Visual analysis, produced only when images were supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_analysis: Option<ImageAnalysis>,
    /// Component breakdown, re-derived after rejected feedback
    pub components: Vec<Component>,
    /// Technical feasibility assessment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_assessment: Option<TechnicalAssessment>,
    /// Operational impact assessment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operational_assessment: Option<OperationalAssessment>,
    /// Reflection notes from the latest self-review
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection_notes: Option<ReflectionNotes>,
    /// Final evaluation, present once the terminal step has run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_evaluation: Option<FinalEvaluation>,

    // Control fields. Mutated only through the methods below.
    current_step: Step,
    process_complete: bool,
    awaiting_human_input: bool,
    reflection_counter: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_feedback: Option<UserFeedback>,

    messages: Vec<AgentMessage>,

    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// When the record was last replaced
    pub updated_at: DateTime<Utc>,
}

impl EvaluationRecord {
    /// Create the record for a new session.
    ///
    /// The entry step is `image_analyzer` when images were supplied, else
    /// `concept_breaker`: image analysis is skipped entirely, not executed
    /// and short-circuited.
    pub fn new(concept: impl Into<String>, concept_images: Vec<String>) -> Self {
        let now = Utc::now();
        let current_step = Step::entry_for(!concept_images.is_empty());
        Self {
            id: EvaluationId::generate(),
            concept: concept.into(),
            concept_images,
            image_analysis: None,
            components: Vec::new(),
            technical_assessment: None,
            operational_assessment: None,
            reflection_notes: None,
            final_evaluation: None,
            current_step,
            process_complete: false,
            awaiting_human_input: false,
            reflection_counter: 0,
            user_feedback: None,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    // ── Control-field queries ────────────────────────────────────────

    /// The step the record is currently parked at
    pub fn current_step(&self) -> Step {
        self.current_step
    }

    /// Whether the terminal step has run. Monotonic: once true, no further
    /// transitions occur.
    pub fn is_complete(&self) -> bool {
        self.process_complete
    }

    /// Whether the record is parked at the feedback step with no feedback
    /// recorded
    pub fn is_awaiting_feedback(&self) -> bool {
        self.awaiting_human_input
    }

    /// How many times the reflection step has been entered
    pub fn reflection_count(&self) -> u32 {
        self.reflection_counter
    }

    /// The pending feedback, if any
    pub fn feedback(&self) -> Option<&UserFeedback> {
        self.user_feedback.as_ref()
    }

    /// The append-only narrative log
    pub fn messages(&self) -> &[AgentMessage] {
        &self.messages
    }

    // ── Transition contract ──────────────────────────────────────────

    /// Declare the step this record should continue at.
    ///
    /// The router validates the declaration against the executing step's
    /// allowed-next set before the driver commits the record.
    pub fn route_to(&mut self, step: Step) {
        self.current_step = step;
        self.touch();
    }

    /// Mark the evaluation finished. Set only by the terminal step.
    pub fn complete(&mut self) {
        self.process_complete = true;
        self.touch();
    }

    /// Park the record awaiting human feedback. The driver suspends at the
    /// next step boundary and returns the record as a resumable checkpoint.
    pub fn park_for_feedback(&mut self) {
        debug_assert!(self.user_feedback.is_none());
        self.awaiting_human_input = true;
        self.touch();
    }

    /// Clear the feedback wait once feedback has been observed
    pub fn unpark(&mut self) {
        self.awaiting_human_input = false;
        self.touch();
    }

    /// Attach feedback supplied out of band by the caller
    pub fn attach_feedback(&mut self, feedback: UserFeedback) {
        self.user_feedback = Some(feedback);
        self.touch();
    }

    /// Consume the pending feedback.
    ///
    /// Clearing here is the loop-breaking invariant: the same feedback
    /// object is never reprocessed on a later pass through the graph.
    pub fn take_feedback(&mut self) -> Option<UserFeedback> {
        self.touch();
        self.user_feedback.take()
    }

    /// Count a reflection entry and return the new counter value.
    /// The counter is monotonic non-decreasing.
    pub fn enter_reflection(&mut self) -> u32 {
        self.reflection_counter += 1;
        self.touch();
        self.reflection_counter
    }

    // ── Message log ──────────────────────────────────────────────────

    /// Append one entry to the narrative log. Entries are never removed
    /// or reordered.
    pub fn add_message(&mut self, agent: impl Into<String>, content: impl Into<String>) {
        self.messages.push(AgentMessage {
            agent: agent.into(),
            content: content.into(),
            timestamp: Utc::now(),
        });
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record() -> EvaluationRecord {
        EvaluationRecord::new("compostable coffee pod", vec![])
    }

    #[test]
    fn test_entry_step_without_images() {
        let record = make_record();
        assert_eq!(record.current_step(), Step::ConceptBreaker);
        assert!(!record.is_complete());
        assert!(!record.is_awaiting_feedback());
        assert_eq!(record.reflection_count(), 0);
    }

    #[test]
    fn test_entry_step_with_images() {
        let record = EvaluationRecord::new("concept", vec!["data:image/png;base64,...".into()]);
        assert_eq!(record.current_step(), Step::ImageAnalyzer);
    }

    #[test]
    fn test_messages_append_in_order() {
        let mut record = make_record();
        record.add_message("concept_breaker", "first");
        record.add_message("human_feedback", "second");

        let agents: Vec<&str> = record.messages().iter().map(|m| m.agent.as_str()).collect();
        assert_eq!(agents, vec!["concept_breaker", "human_feedback"]);
    }

    #[test]
    fn test_feedback_attach_and_take() {
        let mut record = make_record();
        assert!(record.feedback().is_none());

        record.attach_feedback(UserFeedback::accept());
        assert!(record.feedback().is_some());

        let taken = record.take_feedback();
        assert!(taken.is_some());
        assert!(record.feedback().is_none());
        assert!(record.take_feedback().is_none());
    }

    #[test]
    fn test_reflection_counter_monotonic() {
        let mut record = make_record();
        assert_eq!(record.enter_reflection(), 1);
        assert_eq!(record.enter_reflection(), 2);
        assert_eq!(record.enter_reflection(), 3);
        assert_eq!(record.reflection_count(), 3);
    }

    #[test]
    fn test_park_and_unpark() {
        let mut record = make_record();
        record.route_to(Step::HumanFeedback);
        record.park_for_feedback();
        assert!(record.is_awaiting_feedback());

        record.unpark();
        assert!(!record.is_awaiting_feedback());
    }

    #[test]
    fn test_checkpoint_roundtrip() {
        // The record is the persisted checkpoint for HITL resumption, so a
        // serialized record must restore with its control fields intact.
        let mut record = make_record();
        record.components.push(Component::new("sleeve", "kraft board", "insulation"));
        record.route_to(Step::HumanFeedback);
        record.park_for_feedback();
        record.add_message("human_feedback", "please review");

        let json = serde_json::to_string(&record).unwrap();
        let restored: EvaluationRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.id, record.id);
        assert_eq!(restored.current_step(), Step::HumanFeedback);
        assert!(restored.is_awaiting_feedback());
        assert_eq!(restored.messages().len(), 1);
        assert_eq!(restored.components.len(), 1);
    }
}
