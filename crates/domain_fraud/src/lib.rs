//! Claim Fraud Domain
//!
//! This crate scores an insurance claim for fraud risk and renders a
//! decision with traceable reasoning.
//!
//! # Evaluation Pipeline
//!
//! ```text
//! ClaimSubmission + PolicySnapshot + HistorySnapshot
//!     -> ClaimContext (validated, frozen)
//!     -> Orchestrator (five analysis modules, concurrently, under one deadline)
//!     -> RiskAggregator (weighted score, bands, indicator union)
//!     -> DecisionEngine (approve / manual_review / reject)
//! ```
//!
//! Module failures never abort an evaluation: they are recorded on the
//! module's finding and contribute zero. Only invalid claims, invalid
//! configuration and broken aggregation invariants surface as errors.

pub mod adapters;
pub mod aggregator;
pub mod config;
pub mod context;
pub mod deadline;
pub mod decision;
pub mod engine;
pub mod error;
pub mod finding;
pub mod indicator;
pub mod modules;
pub mod orchestrator;
pub mod ports;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::{AggregatedIndicator, RiskAggregator, RiskLevel, RiskScore};
pub use config::{DecisionPolicy, EngineConfig};
pub use context::{
    Claim, ClaimContext, ClaimSubmission, HistorySnapshot, IncidentType, PolicySnapshot,
    PolicyStatus, PriorClaim, VehicleDescriptor,
};
pub use deadline::Deadline;
pub use decision::{Decision, DecisionEngine, DecisionOutcome};
pub use engine::{ClaimEvaluator, Evaluation};
pub use error::{FraudError, ModuleFailure};
pub use finding::{Finding, FindingSet, FindingStatus, ModuleId};
pub use indicator::{FraudIndicator, IndicatorCode, Severity};
pub use modules::{AnalysisModule, Applicability, ModuleRegistry};
pub use orchestrator::Orchestrator;
pub use ports::{ClaimsHistoryService, PolicyService, VehicleValuationService};
