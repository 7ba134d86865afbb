//! The evaluation step set and its transition table
//!
//! Steps form a closed graph: each step declares the set of steps it may
//! legally hand off to. The table is fixed at compile time and validated
//! again when a registry is built, so a handler declaring a next step
//! outside its allowed set is caught at the offending transition.

use serde::{Deserialize, Serialize};

/// A named unit of work in the evaluation graph
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Visual analysis of the supplied concept images
    ImageAnalyzer,
    /// Decomposition of the concept into components
    ConceptBreaker,
    /// Human review checkpoint for the component breakdown
    HumanFeedback,
    /// Routing on the received feedback (accept / reject)
    ProcessFeedback,
    /// Per-component technical feasibility assessment
    TechnicalFeasibility,
    /// Supply-chain and production impact assessment
    Operations,
    /// Self-review of the assessments (bounded by the reflection guard)
    Reflection,
    /// Final scoring and recommendations — the terminal step
    FinalScore,
}

/// Where a step hands off to after executing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Continue at the given step
    Goto(Step),
    /// The evaluation is finished; no further transitions occur
    Complete,
}

impl Step {
    /// Every step in the graph, in execution order
    pub const ALL: [Step; 8] = [
        Step::ImageAnalyzer,
        Step::ConceptBreaker,
        Step::HumanFeedback,
        Step::ProcessFeedback,
        Step::TechnicalFeasibility,
        Step::Operations,
        Step::Reflection,
        Step::FinalScore,
    ];

    /// The entry step for a new record.
    ///
    /// Image analysis is skipped entirely when no images were supplied,
    /// not executed and short-circuited.
    pub fn entry_for(has_images: bool) -> Step {
        if has_images {
            Step::ImageAnalyzer
        } else {
            Step::ConceptBreaker
        }
    }

    /// Both possible entry steps, used for reachability checks
    pub fn entry_points() -> [Step; 2] {
        [Step::ImageAnalyzer, Step::ConceptBreaker]
    }

    /// The closed set of transitions this step may declare
    pub fn allowed_next(self) -> &'static [Transition] {
        match self {
            Step::ImageAnalyzer => &[Transition::Goto(Step::ConceptBreaker)],
            Step::ConceptBreaker => &[Transition::Goto(Step::HumanFeedback)],
            // Self-loop while no feedback is recorded; the driver suspends
            // before the self-transition is ever re-executed.
            Step::HumanFeedback => &[
                Transition::Goto(Step::HumanFeedback),
                Transition::Goto(Step::ProcessFeedback),
            ],
            Step::ProcessFeedback => &[
                Transition::Goto(Step::ConceptBreaker),
                Transition::Goto(Step::TechnicalFeasibility),
            ],
            Step::TechnicalFeasibility => &[Transition::Goto(Step::Operations)],
            Step::Operations => &[Transition::Goto(Step::Reflection)],
            Step::Reflection => &[
                Transition::Goto(Step::TechnicalFeasibility),
                Transition::Goto(Step::Operations),
                Transition::Goto(Step::FinalScore),
            ],
            Step::FinalScore => &[Transition::Complete],
        }
    }

    /// Stable identifier used in logs, messages, and serialized records
    pub fn as_str(self) -> &'static str {
        match self {
            Step::ImageAnalyzer => "image_analyzer",
            Step::ConceptBreaker => "concept_breaker",
            Step::HumanFeedback => "human_feedback",
            Step::ProcessFeedback => "process_feedback",
            Step::TechnicalFeasibility => "technical_feasibility",
            Step::Operations => "operations",
            Step::Reflection => "reflection",
            Step::FinalScore => "final_score",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transition::Goto(step) => write!(f, "{}", step),
            Transition::Complete => write!(f, "complete"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_entry_selection() {
        assert_eq!(Step::entry_for(true), Step::ImageAnalyzer);
        assert_eq!(Step::entry_for(false), Step::ConceptBreaker);
    }

    #[test]
    fn test_transition_table_is_closed() {
        // Every allowed-next target is itself a member of the step set.
        let all: HashSet<Step> = Step::ALL.into_iter().collect();
        for step in Step::ALL {
            for transition in step.allowed_next() {
                if let Transition::Goto(target) = transition {
                    assert!(all.contains(target), "{} -> {} leaves the graph", step, target);
                }
            }
        }
    }

    #[test]
    fn test_only_final_score_terminates() {
        for step in Step::ALL {
            let terminates = step.allowed_next().contains(&Transition::Complete);
            assert_eq!(terminates, step == Step::FinalScore);
        }
    }

    #[test]
    fn test_every_step_reachable_from_entry() {
        let mut visited = HashSet::new();
        let mut queue = vec![Step::ImageAnalyzer];
        while let Some(step) = queue.pop() {
            if visited.insert(step) {
                for transition in step.allowed_next() {
                    if let Transition::Goto(target) = transition {
                        queue.push(*target);
                    }
                }
            }
        }
        for step in Step::ALL {
            assert!(visited.contains(&step), "{} unreachable", step);
        }
    }

    #[test]
    fn test_feedback_gate_self_loop() {
        let allowed = Step::HumanFeedback.allowed_next();
        assert!(allowed.contains(&Transition::Goto(Step::HumanFeedback)));
        assert!(allowed.contains(&Transition::Goto(Step::ProcessFeedback)));
    }

    #[test]
    fn test_step_serde_names() {
        let json = serde_json::to_string(&Step::TechnicalFeasibility).unwrap();
        assert_eq!(json, "\"technical_feasibility\"");
        assert_eq!(format!("{}", Step::FinalScore), "final_score");
    }
}
