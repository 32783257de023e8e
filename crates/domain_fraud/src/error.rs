//! Fraud domain errors
//!
//! Two layers of failure exist. [`FraudError`] is what a caller of the
//! evaluator sees: the claim could not be evaluated at all. [`ModuleFailure`]
//! is absorbed by the orchestrator and recorded on the module's finding; it
//! never aborts an evaluation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::PortError;

/// Errors surfaced to the caller of an evaluation
#[derive(Debug, Error)]
pub enum FraudError {
    /// The claim is missing required fields or is inconsistent with its policy
    #[error("Claim validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Weights or scores broke an aggregation invariant
    #[error("Aggregation invariant violated: {0}")]
    AggregationInvariantViolation(String),

    /// The engine configuration is unusable
    #[error("Invalid engine configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Policy not found: {0}")]
    PolicyNotFound(String),

    /// A lookup needed to assemble the claim context failed
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] PortError),
}

impl FraudError {
    pub fn validation(message: impl Into<String>) -> Self {
        FraudError::Validation(vec![message.into()])
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        FraudError::AggregationInvariantViolation(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        FraudError::InvalidConfiguration(message.into())
    }

    /// True for failures caused by the claim input rather than the engine
    pub fn is_validation(&self) -> bool {
        matches!(self, FraudError::Validation(_))
    }
}

/// A failure confined to a single analysis module
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModuleFailure {
    /// A collaborator lookup failed
    #[error("{service} unavailable: {message}")]
    CollaboratorUnavailable { service: String, message: String },

    /// The module did not finish inside the evaluation deadline
    #[error("timed out after {budget_ms}ms")]
    ModuleTimeout { budget_ms: u64 },

    /// The module task panicked, was cancelled, or returned an unusable finding
    #[error("aborted: {message}")]
    Aborted { message: String },
}

impl ModuleFailure {
    pub fn unavailable(service: impl Into<String>, message: impl Into<String>) -> Self {
        ModuleFailure::CollaboratorUnavailable {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn aborted(message: impl Into<String>) -> Self {
        ModuleFailure::Aborted {
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ModuleFailure::ModuleTimeout { .. })
    }
}
