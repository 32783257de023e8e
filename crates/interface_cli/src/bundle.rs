//! Claim bundle file format
//!
//! A bundle holds everything needed to evaluate one claim offline: the
//! submission, the policy it is filed against and the claimant's prior claims.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use domain_fraud::adapters::{InMemoryClaimsHistoryService, InMemoryPolicyService};
use domain_fraud::{ClaimSubmission, PolicySnapshot, PriorClaim};

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("Cannot read bundle {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed bundle: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimBundle {
    pub submission: ClaimSubmission,
    pub policy: PolicySnapshot,
    #[serde(default)]
    pub prior_claims: Vec<PriorClaim>,
}

impl ClaimBundle {
    pub fn from_json(json: &str) -> Result<Self, BundleError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, BundleError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| BundleError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Policy lookup serving only this bundle's policy
    pub fn policy_service(&self) -> InMemoryPolicyService {
        InMemoryPolicyService::new().with_policy(self.policy.clone())
    }

    /// History lookup serving the prior claims, all attributed to the claimant
    pub fn history_service(&self) -> InMemoryClaimsHistoryService {
        self.prior_claims
            .iter()
            .cloned()
            .fold(InMemoryClaimsHistoryService::new(), |service, claim| {
                service.with_claim(self.submission.claimant_id, claim)
            })
    }
}
