//! Fraud Domain Ports
//!
//! Read-only collaborator contracts the engine depends on. Implementations
//! live outside the engine core: the `adapters` module ships in-memory and
//! catalogue versions, and deployments plug in remote ones.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_fraud::{ClaimEvaluator, EngineConfig};
//!
//! let evaluator = ClaimEvaluator::with_valuation(Arc::new(remote_valuation));
//! let decision = evaluator
//!     .evaluate_with_lookups(submission, &policy_service, &history_service, &config)
//!     .await?;
//! ```

use async_trait::async_trait;
use std::time::Duration;

use core_kernel::{ClaimantId, DateWindow, DomainPort, Money, PortError};

use crate::context::{HistorySnapshot, PolicySnapshot, VehicleDescriptor};

/// Policy lookup
#[async_trait]
pub trait PolicyService: DomainPort {
    /// Fetches the policy snapshot for a policy number
    ///
    /// Returns `PortError::NotFound` when no such policy exists.
    async fn get_policy(&self, policy_number: &str) -> Result<PolicySnapshot, PortError>;
}

/// Vehicle market valuation
#[async_trait]
pub trait VehicleValuationService: DomainPort {
    /// Estimates the current market value of a vehicle
    ///
    /// `timeout` is the time the caller is prepared to wait. Implementations
    /// that call remote systems should pass it on and return
    /// `PortError::Timeout` rather than overrun it.
    async fn estimate_value(
        &self,
        vehicle: &VehicleDescriptor,
        timeout: Duration,
    ) -> Result<Money, PortError>;
}

/// Claims history lookup
#[async_trait]
pub trait ClaimsHistoryService: DomainPort {
    /// Prior claims by the claimant with incidents inside `window`
    async fn get_history(
        &self,
        claimant_id: ClaimantId,
        window: DateWindow,
    ) -> Result<HistorySnapshot, PortError>;
}
