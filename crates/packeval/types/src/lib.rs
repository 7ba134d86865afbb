//! Domain types for Packeval
//!
//! This crate defines the data model shared by the orchestration engine,
//! the step handlers, and the session service:
//!
//! - [`EvaluationRecord`] — the state aggregate for one evaluation session
//! - [`Step`] and [`Transition`] — the closed step set and its transition table
//! - Assessment artifacts — structured outputs of the individual steps
//! - [`EvaluationError`] — the error taxonomy of the workflow
//!
//! The record follows value semantics: handlers receive an owned record and
//! return a replacement, and control fields are only reachable through the
//! transition contract methods.

#![deny(unsafe_code)]

pub mod artifact;
pub mod error;
pub mod record;
pub mod step;

pub use artifact::{
    Component, ComponentAssessment, FinalEvaluation, ImageAnalysis, ImprovementRecommendation,
    OperationalAssessment, ReflectionNotes, TechnicalAssessment, UserFeedback,
};
pub use error::{CollaboratorError, EvaluationError, EvaluationResult};
pub use record::{AgentMessage, EvaluationId, EvaluationRecord};
pub use step::{Step, Transition};
