//! Packeval orchestration core
//!
//! The engine sequences the evaluation steps, routes conditionally between
//! them, enforces the bound on reflective re-assessment, and implements
//! suspend/resume semantics for human feedback.
//!
//! # Key Principle
//!
//! **The engine coordinates, it never reasons.**
//!
//! Handlers may call external reasoning or retrieval collaborators; the
//! engine only validates the fields they write back into the record.
//!
//! # Architecture
//!
//! - [`StepRegistry`] — the closed dispatch table, validated at startup
//! - [`Router`] — validates each declared transition
//! - [`EvaluationDriver`] — the cooperative per-session loop
//! - [`ReflectionGuard`] — the counter-bounded re-assessment gate
//! - [`HumanFeedbackGate`] / [`FeedbackProcessor`] — the HITL suspend point
//!
//! # Example
//!
//! ```rust,ignore
//! let mut registry = StepRegistry::new();
//! registry.register(Step::HumanFeedback, Arc::new(HumanFeedbackGate));
//! registry.register(Step::ProcessFeedback, Arc::new(FeedbackProcessor));
//! // ...reasoning-backed handlers for the remaining steps...
//!
//! let driver = EvaluationDriver::new(Arc::new(registry))?;
//! let parked = driver.run(EvaluationRecord::new(concept, images)).await?;
//! let finished = driver.resume(parked, UserFeedback::accept()).await?;
//! ```

#![deny(unsafe_code)]

pub mod driver;
pub mod handler;
pub mod hitl;
pub mod reflection;
pub mod registry;
pub mod router;

pub use driver::{DriverConfig, DriverError, EvaluationDriver, DEFAULT_MAX_TRANSITIONS};
pub use handler::StepHandler;
pub use hitl::{FeedbackProcessor, HumanFeedbackGate};
pub use reflection::{ReflectionGuard, REFLECTION_CEILING};
pub use registry::StepRegistry;
pub use router::Router;
