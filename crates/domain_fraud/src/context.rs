//! Claim context
//!
//! The frozen view every analysis module reads: the validated claim, the
//! policy snapshot it was filed against, and the claimant's history snapshot.
//! A [`ClaimContext`] can only be obtained through [`ClaimContext::assemble`],
//! which validates the raw [`ClaimSubmission`] first, and exposes no mutating
//! methods afterward.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{days_between, ClaimId, ClaimantId, DateWindow, Money};

use crate::error::FraudError;
use crate::validation::ClaimValidator;

/// Vehicle involved in the incident
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VehicleDescriptor {
    pub make: String,
    pub model: String,
    pub model_year: i32,
    #[serde(default)]
    pub vin: Option<String>,
}

impl VehicleDescriptor {
    pub fn new(make: impl Into<String>, model: impl Into<String>, model_year: i32) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            model_year,
            vin: None,
        }
    }

    pub fn with_vin(mut self, vin: impl Into<String>) -> Self {
        self.vin = Some(vin.into());
        self
    }
}

/// Type of incident being claimed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentType {
    Collision,
    Theft,
    Vandalism,
    Fire,
    Weather,
    Glass,
    Other,
}

impl IncidentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentType::Collision => "collision",
            IncidentType::Theft => "theft",
            IncidentType::Vandalism => "vandalism",
            IncidentType::Fire => "fire",
            IncidentType::Weather => "weather",
            IncidentType::Glass => "glass",
            IncidentType::Other => "other",
        }
    }
}

/// A claim as received from the intake layer, before validation
///
/// Fields needed by mandatory modules are optional here so that a missing
/// value is reported as a validation failure rather than a parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimSubmission {
    pub claim_id: ClaimId,
    pub claimant_id: ClaimantId,
    #[serde(default)]
    pub policy_number: Option<String>,
    #[serde(default)]
    pub claimed_amount: Option<Money>,
    #[serde(default)]
    pub incident_date: Option<NaiveDate>,
    pub submission_date: NaiveDate,
    pub incident_type: IncidentType,
    #[serde(default)]
    pub incident_description: String,
    /// References to supporting documents (photos, police report, estimates)
    #[serde(default)]
    pub supporting_documents: Vec<String>,
    #[serde(default)]
    pub vehicle: Option<VehicleDescriptor>,
}

/// A validated claim
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Claim {
    pub claim_id: ClaimId,
    pub claimant_id: ClaimantId,
    pub policy_number: String,
    pub claimed_amount: Money,
    pub incident_date: NaiveDate,
    pub submission_date: NaiveDate,
    pub incident_type: IncidentType,
    pub incident_description: String,
    pub supporting_documents: Vec<String>,
    pub vehicle: Option<VehicleDescriptor>,
}

impl Claim {
    /// Days between the incident and the submission (negative for a future-dated incident)
    pub fn filing_latency_days(&self) -> i64 {
        days_between(self.incident_date, self.submission_date)
    }
}

/// Policy status at the time of the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyStatus {
    Active,
    Lapsed,
    Cancelled,
    Expired,
}

/// Read-only view of the policy a claim is filed against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySnapshot {
    pub policy_number: String,
    /// Product code used to select decision-policy overrides
    pub product_code: String,
    pub status: PolicyStatus,
    pub term: DateWindow,
    pub coverage_limit: Money,
    pub deductible: Money,
    /// Vehicle value stated on the policy, if the product records one
    ///
    /// Amount Analysis falls back to it when the claim names no vehicle.
    #[serde(default)]
    pub insured_vehicle_value: Option<Money>,
}

impl PolicySnapshot {
    /// Days from policy inception to `date`
    pub fn days_since_inception(&self, date: NaiveDate) -> i64 {
        days_between(self.term.start, date)
    }

    /// Days from `date` to policy expiration
    pub fn days_until_expiry(&self, date: NaiveDate) -> i64 {
        days_between(date, self.term.end)
    }
}

/// Summary of one earlier claim by the same claimant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorClaim {
    pub claim_id: ClaimId,
    pub incident_date: NaiveDate,
    pub submission_date: NaiveDate,
    pub incident_type: IncidentType,
    pub claimed_amount: Money,
}

impl PriorClaim {
    pub fn filing_latency_days(&self) -> i64 {
        days_between(self.incident_date, self.submission_date)
    }
}

/// The claimant's prior claims within a lookup window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub claimant_id: ClaimantId,
    pub window: DateWindow,
    #[serde(default)]
    pub prior_claims: Vec<PriorClaim>,
}

impl HistorySnapshot {
    pub fn empty(claimant_id: ClaimantId, window: DateWindow) -> Self {
        Self {
            claimant_id,
            window,
            prior_claims: Vec::new(),
        }
    }

    pub fn with_claim(mut self, claim: PriorClaim) -> Self {
        self.prior_claims.push(claim);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.prior_claims.is_empty()
    }

    /// Prior claims whose incident falls inside `window`
    pub fn claims_within(&self, window: DateWindow) -> impl Iterator<Item = &PriorClaim> {
        self.prior_claims
            .iter()
            .filter(move |c| window.contains(c.incident_date))
    }
}

/// Immutable input to one evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimContext {
    claim: Claim,
    policy: PolicySnapshot,
    history: HistorySnapshot,
}

impl ClaimContext {
    /// Validates a submission against its policy and history and freezes the result
    ///
    /// # Errors
    ///
    /// Returns [`FraudError::Validation`] listing every problem found when a
    /// required field is absent or the snapshots do not belong to the claim.
    pub fn assemble(
        submission: ClaimSubmission,
        policy: PolicySnapshot,
        mut history: HistorySnapshot,
    ) -> Result<Self, FraudError> {
        let result = ClaimValidator::validate(&submission, &policy, &history);
        for warning in &result.warnings {
            tracing::debug!(claim_id = %submission.claim_id, %warning, "claim validation warning");
        }
        if !result.is_valid {
            return Err(FraudError::Validation(result.errors));
        }

        let (Some(policy_number), Some(claimed_amount), Some(incident_date)) = (
            submission.policy_number,
            submission.claimed_amount,
            submission.incident_date,
        ) else {
            return Err(FraudError::validation("required claim fields are missing"));
        };

        // A resubmission may already be present in the claimant's history.
        history
            .prior_claims
            .retain(|prior| prior.claim_id != submission.claim_id);

        let claim = Claim {
            claim_id: submission.claim_id,
            claimant_id: submission.claimant_id,
            policy_number: policy_number.trim().to_string(),
            claimed_amount,
            incident_date,
            submission_date: submission.submission_date,
            incident_type: submission.incident_type,
            incident_description: submission.incident_description,
            supporting_documents: submission.supporting_documents,
            vehicle: submission.vehicle,
        };

        Ok(Self {
            claim,
            policy,
            history,
        })
    }

    pub fn claim(&self) -> &Claim {
        &self.claim
    }

    pub fn policy(&self) -> &PolicySnapshot {
        &self.policy
    }

    pub fn history(&self) -> &HistorySnapshot {
        &self.history
    }

    pub fn claim_id(&self) -> ClaimId {
        self.claim.claim_id
    }
}
