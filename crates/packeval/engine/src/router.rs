//! Router: validates the transition a handler declared
//!
//! The router is a pure function over the registry and the record's
//! control fields. It never corrects a mismatch: a handler declaring a
//! next step outside its allowed set is a fatal configuration error.

use crate::registry::StepRegistry;
use packeval_types::{EvaluationError, EvaluationRecord, EvaluationResult, Step, Transition};

/// Resolves and validates the next transition after a step has run
#[derive(Clone, Copy, Debug, Default)]
pub struct Router;

impl Router {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the transition declared by the handler that just executed
    /// `executed`, validating it against that step's allowed-next set.
    ///
    /// Deterministic: two records identical in their control fields always
    /// resolve to the same transition.
    pub fn resolve(
        &self,
        registry: &StepRegistry,
        executed: Step,
        record: &EvaluationRecord,
    ) -> EvaluationResult<Transition> {
        let declared = if record.is_complete() {
            Transition::Complete
        } else {
            Transition::Goto(record.current_step())
        };

        if registry.allowed_next(executed).contains(&declared) {
            Ok(declared)
        } else {
            Err(EvaluationError::IllegalTransition {
                from: executed,
                to: declared,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::StepHandler;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NoopStep;

    #[async_trait]
    impl StepHandler for NoopStep {
        async fn handle(&self, record: EvaluationRecord) -> EvaluationResult<EvaluationRecord> {
            Ok(record)
        }
    }

    fn registry() -> StepRegistry {
        let mut registry = StepRegistry::new();
        for step in Step::ALL {
            registry.register(step, Arc::new(NoopStep));
        }
        registry
    }

    #[test]
    fn test_accepts_declared_member_of_allowed_set() {
        let registry = registry();
        let mut record = EvaluationRecord::new("concept", vec![]);
        record.route_to(Step::HumanFeedback);

        let transition = Router::new()
            .resolve(&registry, Step::ConceptBreaker, &record)
            .unwrap();
        assert_eq!(transition, Transition::Goto(Step::HumanFeedback));
    }

    #[test]
    fn test_rejects_transition_outside_allowed_set() {
        let registry = registry();
        let mut record = EvaluationRecord::new("concept", vec![]);
        record.route_to(Step::FinalScore);

        let result = Router::new().resolve(&registry, Step::ConceptBreaker, &record);
        assert!(matches!(
            result,
            Err(EvaluationError::IllegalTransition {
                from: Step::ConceptBreaker,
                to: Transition::Goto(Step::FinalScore),
            })
        ));
    }

    #[test]
    fn test_completion_only_from_terminal_step() {
        let registry = registry();
        let mut record = EvaluationRecord::new("concept", vec![]);
        record.complete();

        let transition = Router::new()
            .resolve(&registry, Step::FinalScore, &record)
            .unwrap();
        assert_eq!(transition, Transition::Complete);

        let result = Router::new().resolve(&registry, Step::Operations, &record);
        assert!(matches!(
            result,
            Err(EvaluationError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn test_routing_is_deterministic() {
        let registry = registry();
        let mut record = EvaluationRecord::new("concept", vec![]);
        record.route_to(Step::ProcessFeedback);

        let router = Router::new();
        let first = router
            .resolve(&registry, Step::HumanFeedback, &record)
            .unwrap();
        let second = router
            .resolve(&registry, Step::HumanFeedback, &record)
            .unwrap();
        assert_eq!(first, second);
    }
}
