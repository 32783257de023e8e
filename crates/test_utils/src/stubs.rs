//! Collaborator Stubs
//!
//! Deterministic stand-ins for the valuation, policy and history ports.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use core_kernel::{ClaimantId, DateWindow, DomainPort, Money, PortError};
use domain_fraud::{
    ClaimsHistoryService, HistorySnapshot, PolicyService, PolicySnapshot, VehicleDescriptor,
    VehicleValuationService,
};

use crate::fixtures::MoneyFixtures;

/// Returns the same estimate for every vehicle
#[derive(Debug, Clone)]
pub struct FixedValuation {
    value: Money,
    calls: Arc<AtomicUsize>,
}

impl FixedValuation {
    pub fn new(value: Money) -> Self {
        Self {
            value,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn usd(amount: i64) -> Self {
        Self::new(MoneyFixtures::usd(amount))
    }

    /// Number of estimates served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DomainPort for FixedValuation {}

#[async_trait]
impl VehicleValuationService for FixedValuation {
    async fn estimate_value(&self, _: &VehicleDescriptor, _: Duration) -> Result<Money, PortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.value)
    }
}

/// Fails every estimate, either as unavailable or as a reported timeout
#[derive(Debug, Clone, Copy)]
pub struct FailingValuation {
    timeout: bool,
}

impl FailingValuation {
    pub fn unavailable() -> Self {
        Self { timeout: false }
    }

    pub fn timing_out() -> Self {
        Self { timeout: true }
    }
}

impl DomainPort for FailingValuation {}

#[async_trait]
impl VehicleValuationService for FailingValuation {
    async fn estimate_value(&self, _: &VehicleDescriptor, budget: Duration) -> Result<Money, PortError> {
        if self.timeout {
            Err(PortError::timeout("estimate_value", budget.as_millis() as u64))
        } else {
            Err(PortError::unavailable("vehicle-valuation"))
        }
    }
}

/// Sleeps before answering; pair with a paused tokio clock
#[derive(Debug, Clone)]
pub struct SlowValuation {
    delay: Duration,
    value: Money,
}

impl SlowValuation {
    pub fn new(delay: Duration, value: Money) -> Self {
        Self { delay, value }
    }
}

impl DomainPort for SlowValuation {}

#[async_trait]
impl VehicleValuationService for SlowValuation {
    async fn estimate_value(&self, _: &VehicleDescriptor, _: Duration) -> Result<Money, PortError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.value)
    }
}

/// Policy lookup that always fails as unavailable
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailablePolicyService;

impl DomainPort for UnavailablePolicyService {}

#[async_trait]
impl PolicyService for UnavailablePolicyService {
    async fn get_policy(&self, _: &str) -> Result<PolicySnapshot, PortError> {
        Err(PortError::unavailable("policy-admin"))
    }
}

/// History lookup that always fails as unavailable
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableHistoryService;

impl DomainPort for UnavailableHistoryService {}

#[async_trait]
impl ClaimsHistoryService for UnavailableHistoryService {
    async fn get_history(&self, _: ClaimantId, _: DateWindow) -> Result<HistorySnapshot, PortError> {
        Err(PortError::unavailable("claims-history"))
    }
}
