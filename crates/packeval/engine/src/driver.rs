//! Driver loop: the cooperative scheduler for one evaluation session
//!
//! The driver repeatedly resolves the record's current step, invokes the
//! handler, validates the declared transition, and commits the replacement
//! record. It halts when the record completes or parks awaiting human
//! feedback; both are ordinary returns, not errors. Suspension happens only
//! at step boundaries, never inside a handler.
//!
//! A failed step commits nothing: the error carries the last committed
//! record back to the caller, so a retryable failure can be re-driven from
//! the unchanged checkpoint.

use crate::registry::StepRegistry;
use crate::router::Router;
use packeval_types::{
    EvaluationError, EvaluationRecord, EvaluationResult, Step, Transition, UserFeedback,
};
use std::sync::Arc;
use thiserror::Error;

/// Ceiling on transitions within one driver invocation. A correctly
/// configured graph stays far below this; hitting it means a routing cycle
/// slipped past validation.
pub const DEFAULT_MAX_TRANSITIONS: u32 = 32;

/// Tuning knobs for the driver loop
#[derive(Clone, Copy, Debug)]
pub struct DriverConfig {
    /// Transition ceiling per invocation
    pub max_transitions: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_transitions: DEFAULT_MAX_TRANSITIONS,
        }
    }
}

/// A halted driver run, carrying the last committed record.
///
/// For retryable failures the record is the unchanged checkpoint the caller
/// may re-drive; for fatal failures it documents where the session died.
#[derive(Debug, Error)]
#[error("evaluation halted at step '{step}': {source}")]
pub struct DriverError {
    /// The step whose execution or transition failed
    pub step: Step,
    /// The last committed record
    pub record: EvaluationRecord,
    /// What went wrong
    pub source: EvaluationError,
}

impl DriverError {
    /// Whether re-driving the returned record may succeed
    pub fn is_retryable(&self) -> bool {
        self.source.is_retryable()
    }
}

/// The cooperative scheduler for evaluation sessions
#[derive(Clone)]
pub struct EvaluationDriver {
    registry: Arc<StepRegistry>,
    router: Router,
    config: DriverConfig,
}

impl EvaluationDriver {
    /// Create a driver over a validated registry.
    ///
    /// Registry validation runs here, once, so configuration errors surface
    /// at startup rather than mid-session.
    pub fn new(registry: Arc<StepRegistry>) -> EvaluationResult<Self> {
        Self::with_config(registry, DriverConfig::default())
    }

    pub fn with_config(
        registry: Arc<StepRegistry>,
        config: DriverConfig,
    ) -> EvaluationResult<Self> {
        registry.validate()?;
        Ok(Self {
            registry,
            router: Router::new(),
            config,
        })
    }

    /// Drive the record until it completes or suspends.
    ///
    /// Invoking on an already-complete record is an idempotent no-op: the
    /// record is returned unchanged with no step executed.
    pub async fn run(
        &self,
        mut record: EvaluationRecord,
    ) -> Result<EvaluationRecord, DriverError> {
        if record.is_complete() {
            return Ok(record);
        }

        let mut transitions = 0u32;
        loop {
            let step = record.current_step();

            let handler = match self.registry.handler_for(step) {
                Ok(handler) => handler,
                Err(source) => return Err(DriverError { step, record, source }),
            };

            // The handler works on its own copy; `record` stays the
            // checkpoint until the transition is accepted.
            let updated = match handler.handle(record.clone()).await {
                Ok(updated) => updated,
                Err(source) => {
                    tracing::warn!(
                        evaluation_id = %record.id,
                        step = %step,
                        error = %source,
                        "step failed, record left at prior checkpoint"
                    );
                    return Err(DriverError { step, record, source });
                }
            };

            let transition = match self.router.resolve(&self.registry, step, &updated) {
                Ok(transition) => transition,
                Err(source) => return Err(DriverError { step, record, source }),
            };

            record = updated;
            tracing::debug!(
                evaluation_id = %record.id,
                step = %step,
                next = %transition,
                "step committed"
            );

            // Suspension conditions, in priority order.
            if record.is_complete() {
                tracing::info!(evaluation_id = %record.id, "evaluation complete");
                return Ok(record);
            }
            if record.is_awaiting_feedback() {
                tracing::info!(
                    evaluation_id = %record.id,
                    "evaluation parked awaiting human feedback"
                );
                return Ok(record);
            }

            debug_assert!(matches!(transition, Transition::Goto(_)));

            transitions += 1;
            if transitions >= self.config.max_transitions {
                let source = EvaluationError::Configuration(format!(
                    "exceeded {} transitions in one invocation",
                    self.config.max_transitions
                ));
                return Err(DriverError { step, record, source });
            }
        }
    }

    /// Attach feedback to a suspended record and continue driving it.
    ///
    /// Idempotent when the record is already complete: the feedback is
    /// discarded and the record returned unchanged.
    pub async fn resume(
        &self,
        mut record: EvaluationRecord,
        feedback: UserFeedback,
    ) -> Result<EvaluationRecord, DriverError> {
        if record.is_complete() {
            return Ok(record);
        }
        if !record.is_awaiting_feedback() {
            tracing::warn!(
                evaluation_id = %record.id,
                step = %record.current_step(),
                "resume called on a record that is not awaiting feedback"
            );
        }
        record.attach_feedback(feedback);
        self.run(record).await
    }

    /// The registry this driver dispatches through
    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::StepHandler;
    use async_trait::async_trait;
    use packeval_types::CollaboratorError;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Routes to a fixed next step, counting invocations
    struct RouteStep {
        next: Step,
        calls: AtomicU32,
    }

    impl RouteStep {
        fn new(next: Step) -> Self {
            Self {
                next,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl StepHandler for RouteStep {
        async fn handle(&self, mut record: EvaluationRecord) -> EvaluationResult<EvaluationRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            record.route_to(self.next);
            Ok(record)
        }
    }

    /// Completes the record, counting invocations
    struct TerminalStep {
        calls: AtomicU32,
    }

    impl TerminalStep {
        fn new() -> Self {
            Self {
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl StepHandler for TerminalStep {
        async fn handle(&self, mut record: EvaluationRecord) -> EvaluationResult<EvaluationRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            record.complete();
            Ok(record)
        }
    }

    /// Always fails with a collaborator error
    struct FailingStep;

    #[async_trait]
    impl StepHandler for FailingStep {
        async fn handle(&self, mut record: EvaluationRecord) -> EvaluationResult<EvaluationRecord> {
            // Partial work that must never be committed.
            record.add_message("failing", "this must not survive");
            Err(CollaboratorError::Transport("reasoning backend down".into()).into())
        }
    }

    /// Declares a next step outside its allowed set
    struct RogueStep;

    #[async_trait]
    impl StepHandler for RogueStep {
        async fn handle(&self, mut record: EvaluationRecord) -> EvaluationResult<EvaluationRecord> {
            record.route_to(Step::FinalScore);
            Ok(record)
        }
    }

    fn registry_with(overrides: Vec<(Step, Arc<dyn StepHandler>)>) -> Arc<StepRegistry> {
        let mut registry = StepRegistry::new();
        for step in Step::ALL {
            let next = match step.allowed_next().first() {
                Some(Transition::Goto(next)) => *next,
                _ => step,
            };
            registry.register(step, Arc::new(RouteStep::new(next)));
        }
        registry.register(Step::FinalScore, Arc::new(TerminalStep::new()));
        // Reflection's first allowed edge loops back to technical
        // feasibility, so by default route it forward instead.
        registry.register(Step::Reflection, Arc::new(RouteStep::new(Step::FinalScore)));
        // Human feedback would park; default tests drive straight through.
        registry.register(
            Step::HumanFeedback,
            Arc::new(RouteStep::new(Step::ProcessFeedback)),
        );
        registry.register(
            Step::ProcessFeedback,
            Arc::new(RouteStep::new(Step::TechnicalFeasibility)),
        );
        for (step, handler) in overrides {
            registry.register(step, handler);
        }
        Arc::new(registry)
    }

    #[tokio::test]
    async fn test_runs_to_completion() {
        let driver = EvaluationDriver::new(registry_with(vec![])).unwrap();
        let record = EvaluationRecord::new("concept", vec![]);

        let finished = driver.run(record).await.unwrap();
        assert!(finished.is_complete());
        assert_eq!(finished.current_step(), Step::FinalScore);
    }

    #[tokio::test]
    async fn test_idempotent_completion() {
        let terminal = Arc::new(TerminalStep::new());
        let driver =
            EvaluationDriver::new(registry_with(vec![(Step::FinalScore, terminal.clone() as Arc<dyn StepHandler>)]))
                .unwrap();

        let record = EvaluationRecord::new("concept", vec![]);
        let finished = driver.run(record).await.unwrap();
        assert_eq!(terminal.calls.load(Ordering::SeqCst), 1);

        let again = driver.run(finished.clone()).await.unwrap();
        assert_eq!(again.current_step(), finished.current_step());
        assert_eq!(again.messages().len(), finished.messages().len());
        // No step executed on re-entry.
        assert_eq!(terminal.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_atomic_failure_keeps_checkpoint() {
        let driver = EvaluationDriver::new(registry_with(vec![(
            Step::TechnicalFeasibility,
            Arc::new(FailingStep) as Arc<dyn StepHandler>,
        )]))
        .unwrap();

        let mut record = EvaluationRecord::new("concept", vec![]);
        record.route_to(Step::TechnicalFeasibility);
        let messages_before = record.messages().len();

        let err = driver.run(record).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(err.step, Step::TechnicalFeasibility);
        // The step is considered not to have happened.
        assert_eq!(err.record.current_step(), Step::TechnicalFeasibility);
        assert_eq!(err.record.messages().len(), messages_before);
        assert!(err.record.technical_assessment.is_none());
    }

    #[tokio::test]
    async fn test_illegal_transition_is_fatal() {
        let driver = EvaluationDriver::new(registry_with(vec![(
            Step::ConceptBreaker,
            Arc::new(RogueStep) as Arc<dyn StepHandler>,
        )]))
        .unwrap();

        let record = EvaluationRecord::new("concept", vec![]);
        let err = driver.run(record).await.unwrap_err();
        assert!(!err.is_retryable());
        assert!(matches!(
            err.source,
            EvaluationError::IllegalTransition {
                from: Step::ConceptBreaker,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_transition_ceiling_backstop() {
        // A graph whose handlers legally bounce between reflection and the
        // assessment pair forever. The ceiling converts the cycle into a
        // configuration error instead of an infinite loop.
        let driver = EvaluationDriver::with_config(
            registry_with(vec![
                (
                    Step::TechnicalFeasibility,
                    Arc::new(RouteStep::new(Step::Operations)) as Arc<dyn StepHandler>,
                ),
                (Step::Operations, Arc::new(RouteStep::new(Step::Reflection))),
                (
                    Step::Reflection,
                    Arc::new(RouteStep::new(Step::TechnicalFeasibility)),
                ),
            ]),
            DriverConfig { max_transitions: 8 },
        )
        .unwrap();

        let mut record = EvaluationRecord::new("concept", vec![]);
        record.route_to(Step::TechnicalFeasibility);

        let err = driver.run(record).await.unwrap_err();
        assert!(matches!(err.source, EvaluationError::Configuration(_)));
    }
}
