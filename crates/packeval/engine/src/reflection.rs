//! Reflection guard: the counter-bounded gate on re-assessment
//!
//! The reflection step increments the record's counter on every entry,
//! before consulting any collaborator. Once the counter reaches the
//! ceiling the cycle is forced to the final score regardless of how
//! uncertain the assessment collaborator remains: the evaluation must
//! terminate in a bounded number of reassessment cycles.

use packeval_types::{ReflectionNotes, Step};

/// Maximum number of reflection entries before the cycle is forced to end
pub const REFLECTION_CEILING: u32 = 3;

/// The counter-bounded routing policy for the reflection step
#[derive(Clone, Copy, Debug)]
pub struct ReflectionGuard {
    ceiling: u32,
}

impl ReflectionGuard {
    pub fn new() -> Self {
        Self {
            ceiling: REFLECTION_CEILING,
        }
    }

    /// A guard with a non-standard ceiling, for tests
    pub fn with_ceiling(ceiling: u32) -> Self {
        Self { ceiling }
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// Whether the counter has reached the ceiling.
    ///
    /// At the ceiling the step must route to the final score without
    /// consulting the collaborator at all.
    pub fn at_ceiling(&self, counter: u32) -> bool {
        counter >= self.ceiling
    }

    /// Route a below-ceiling reflection outcome.
    ///
    /// Iteration with open questions re-runs technical feasibility;
    /// iteration without questions re-runs operations only. Any open
    /// question always prefers re-running technical feasibility.
    pub fn route(&self, counter: u32, notes: &ReflectionNotes) -> Step {
        if self.at_ceiling(counter) {
            return Step::FinalScore;
        }
        if notes.requires_iteration {
            if notes.has_open_questions() {
                Step::TechnicalFeasibility
            } else {
                Step::Operations
            }
        } else {
            Step::FinalScore
        }
    }
}

impl Default for ReflectionGuard {
    fn default() -> Self {
        Self::new()
    }
}
