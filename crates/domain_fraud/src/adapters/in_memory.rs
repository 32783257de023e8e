//! Map-backed collaborators
//!
//! Populated once through the builder methods and read-only afterward.

use async_trait::async_trait;
use std::collections::HashMap;

use core_kernel::{ClaimantId, DateWindow, DomainPort, PortError};

use crate::context::{HistorySnapshot, PolicySnapshot, PriorClaim};
use crate::ports::{ClaimsHistoryService, PolicyService};

#[derive(Debug, Clone, Default)]
pub struct InMemoryPolicyService {
    policies: HashMap<String, PolicySnapshot>,
}

impl InMemoryPolicyService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: PolicySnapshot) -> Self {
        self.policies.insert(policy.policy_number.clone(), policy);
        self
    }
}

impl DomainPort for InMemoryPolicyService {}

#[async_trait]
impl PolicyService for InMemoryPolicyService {
    async fn get_policy(&self, policy_number: &str) -> Result<PolicySnapshot, PortError> {
        self.policies
            .get(policy_number)
            .cloned()
            .ok_or_else(|| PortError::not_found("Policy", policy_number))
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryClaimsHistoryService {
    claims: HashMap<ClaimantId, Vec<PriorClaim>>,
}

impl InMemoryClaimsHistoryService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_claim(mut self, claimant_id: ClaimantId, claim: PriorClaim) -> Self {
        self.claims.entry(claimant_id).or_default().push(claim);
        self
    }
}

impl DomainPort for InMemoryClaimsHistoryService {}

#[async_trait]
impl ClaimsHistoryService for InMemoryClaimsHistoryService {
    async fn get_history(
        &self,
        claimant_id: ClaimantId,
        window: DateWindow,
    ) -> Result<HistorySnapshot, PortError> {
        let mut prior_claims: Vec<PriorClaim> = self
            .claims
            .get(&claimant_id)
            .map(|claims| {
                claims
                    .iter()
                    .filter(|c| window.contains(c.incident_date))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        prior_claims.sort_by_key(|c| (c.incident_date, c.claim_id));

        Ok(HistorySnapshot {
            claimant_id,
            window,
            prior_claims,
        })
    }
}
