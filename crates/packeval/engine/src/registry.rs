//! Step registry: the closed dispatch table of the evaluation graph
//!
//! The registry maps each step to its handler and its allowed-next set.
//! It is validated once at construction: every transition target must be a
//! registered step or the terminal sentinel; registered steps unreachable
//! from an entry point are a configuration warning, not a runtime error.

use crate::handler::StepHandler;
use packeval_types::{EvaluationError, EvaluationResult, Step, Transition};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Registry of step handlers and transitions
#[derive(Clone)]
pub struct StepRegistry {
    handlers: HashMap<Step, Arc<dyn StepHandler>>,
    transitions: HashMap<Step, Vec<Transition>>,
}

impl StepRegistry {
    /// Create an empty registry carrying the standard transition table
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            transitions: Step::ALL
                .into_iter()
                .map(|step| (step, step.allowed_next().to_vec()))
                .collect(),
        }
    }

    /// Create a registry with a custom transition table.
    ///
    /// Only used by tests and diagnostics; production sessions run the
    /// standard table.
    pub fn with_transitions(transitions: HashMap<Step, Vec<Transition>>) -> Self {
        Self {
            handlers: HashMap::new(),
            transitions,
        }
    }

    /// Register the handler for a step, replacing any previous one
    pub fn register(&mut self, step: Step, handler: Arc<dyn StepHandler>) {
        self.handlers.insert(step, handler);
    }

    /// Validate the registry.
    ///
    /// Fails when a transition target has no registered handler, or when a
    /// step in the transition table is itself unregistered. Steps that no
    /// entry point can reach are only warned about.
    pub fn validate(&self) -> EvaluationResult<()> {
        for (step, nexts) in &self.transitions {
            if !self.handlers.contains_key(step) {
                return Err(EvaluationError::Configuration(format!(
                    "step '{}' appears in the transition table but has no handler",
                    step
                )));
            }
            for next in nexts {
                if let Transition::Goto(target) = next {
                    if !self.handlers.contains_key(target) {
                        return Err(EvaluationError::Configuration(format!(
                            "transition '{}' -> '{}' targets an unregistered step",
                            step, target
                        )));
                    }
                }
            }
        }

        let reachable = self.reachable_from_entries();
        for step in self.handlers.keys() {
            if !reachable.contains(step) {
                tracing::warn!(step = %step, "registered step is unreachable from any entry point");
            }
        }

        Ok(())
    }

    /// Resolve the handler for a step. An unknown step means the record is
    /// corrupted or forged; the session is not resumable.
    pub fn handler_for(&self, step: Step) -> EvaluationResult<Arc<dyn StepHandler>> {
        self.handlers
            .get(&step)
            .cloned()
            .ok_or(EvaluationError::UnknownStep(step))
    }

    /// The allowed-next set declared for a step
    pub fn allowed_next(&self, step: Step) -> &[Transition] {
        self.transitions.get(&step).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of registered handlers
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// BFS over the transition table from both entry points
    fn reachable_from_entries(&self) -> HashSet<Step> {
        let mut visited = HashSet::new();
        let mut queue: Vec<Step> = Step::entry_points()
            .into_iter()
            .filter(|s| self.handlers.contains_key(s))
            .collect();

        while let Some(step) = queue.pop() {
            if visited.insert(step) {
                for next in self.allowed_next(step) {
                    if let Transition::Goto(target) = next {
                        if !visited.contains(target) {
                            queue.push(*target);
                        }
                    }
                }
            }
        }

        visited
    }
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::new()
    }
}
