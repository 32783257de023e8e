//! Test Data Builders
//!
//! Builders with defaults that produce a clean, approvable claim. Tests set
//! only the fields relevant to what they exercise.

use chrono::NaiveDate;
use core_kernel::{ClaimantId, DateWindow, Money};
use domain_fraud::{
    ClaimSubmission, HistorySnapshot, IncidentType, PolicySnapshot, PolicyStatus, PriorClaim,
    VehicleDescriptor,
};

use crate::fixtures::{IdFixtures, MoneyFixtures, StringFixtures, TemporalFixtures};

/// Builder for claim submissions
#[derive(Debug, Clone)]
pub struct ClaimSubmissionBuilder {
    submission: ClaimSubmission,
}

impl Default for ClaimSubmissionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimSubmissionBuilder {
    /// A 1200 USD collision claim filed three days after the incident
    pub fn new() -> Self {
        Self {
            submission: ClaimSubmission {
                claim_id: IdFixtures::claim_id(),
                claimant_id: IdFixtures::claimant_id(),
                policy_number: Some(StringFixtures::policy_number().to_string()),
                claimed_amount: Some(MoneyFixtures::usd(1_200)),
                incident_date: Some(TemporalFixtures::incident_date()),
                submission_date: TemporalFixtures::submission_date(),
                incident_type: IncidentType::Collision,
                incident_description: StringFixtures::clean_description().to_string(),
                supporting_documents: vec![
                    "photo-front.jpg".to_string(),
                    "police-report.pdf".to_string(),
                ],
                vehicle: Some(StringFixtures::vehicle()),
            },
        }
    }

    pub fn with_amount(mut self, amount: Money) -> Self {
        self.submission.claimed_amount = Some(amount);
        self
    }

    /// Sets a USD amount in whole dollars
    pub fn with_usd(self, amount: i64) -> Self {
        self.with_amount(MoneyFixtures::usd(amount))
    }

    pub fn without_amount(mut self) -> Self {
        self.submission.claimed_amount = None;
        self
    }

    pub fn with_policy_number(mut self, number: impl Into<String>) -> Self {
        self.submission.policy_number = Some(number.into());
        self
    }

    pub fn without_policy_number(mut self) -> Self {
        self.submission.policy_number = None;
        self
    }

    pub fn with_incident_date(mut self, date: NaiveDate) -> Self {
        self.submission.incident_date = Some(date);
        self
    }

    pub fn with_submission_date(mut self, date: NaiveDate) -> Self {
        self.submission.submission_date = date;
        self
    }

    /// Incident and submission on consecutive days, `days` after policy start
    pub fn filed_days_after_inception(self, days: u64) -> Self {
        let submitted = TemporalFixtures::days_after_start(days);
        let incident = if days == 0 {
            submitted
        } else {
            TemporalFixtures::days_after_start(days - 1)
        };
        self.with_incident_date(incident).with_submission_date(submitted)
    }

    pub fn with_incident_type(mut self, incident_type: IncidentType) -> Self {
        self.submission.incident_type = incident_type;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.submission.incident_description = description.into();
        self
    }

    pub fn with_vehicle(mut self, vehicle: VehicleDescriptor) -> Self {
        self.submission.vehicle = Some(vehicle);
        self
    }

    pub fn without_vehicle(mut self) -> Self {
        self.submission.vehicle = None;
        self
    }

    pub fn build(self) -> ClaimSubmission {
        self.submission
    }
}

/// Builder for policy snapshots
#[derive(Debug, Clone)]
pub struct PolicySnapshotBuilder {
    policy: PolicySnapshot,
}

impl Default for PolicySnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicySnapshotBuilder {
    /// Active calendar-2024 policy with a 20000 USD limit
    pub fn new() -> Self {
        Self {
            policy: PolicySnapshot {
                policy_number: StringFixtures::policy_number().to_string(),
                product_code: StringFixtures::product_code().to_string(),
                status: PolicyStatus::Active,
                term: TemporalFixtures::policy_term(),
                coverage_limit: MoneyFixtures::coverage_limit(),
                deductible: MoneyFixtures::deductible(),
                insured_vehicle_value: Some(MoneyFixtures::insured_value()),
            },
        }
    }

    pub fn with_policy_number(mut self, number: impl Into<String>) -> Self {
        self.policy.policy_number = number.into();
        self
    }

    pub fn with_product_code(mut self, code: impl Into<String>) -> Self {
        self.policy.product_code = code.into();
        self
    }

    pub fn with_insured_value(mut self, value: Option<Money>) -> Self {
        self.policy.insured_vehicle_value = value;
        self
    }

    pub fn build(self) -> PolicySnapshot {
        self.policy
    }
}

/// Builder for claims history snapshots
#[derive(Debug, Clone)]
pub struct HistoryBuilder {
    claimant_id: ClaimantId,
    window: DateWindow,
    prior_claims: Vec<PriorClaim>,
}

impl Default for HistoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryBuilder {
    /// Empty history for the fixture claimant over the year before submission
    pub fn new() -> Self {
        Self {
            claimant_id: IdFixtures::claimant_id(),
            window: DateWindow::trailing(TemporalFixtures::submission_date(), 365)
                .expect("valid fixture window"),
            prior_claims: Vec::new(),
        }
    }

    /// Adds a prior claim filed two days after its incident
    pub fn with_prior(mut self, incident_date: NaiveDate, incident_type: IncidentType, amount: Money) -> Self {
        let n = self.prior_claims.len() as u128;
        self.prior_claims.push(PriorClaim {
            claim_id: IdFixtures::prior_claim_id(n),
            incident_date,
            submission_date: incident_date + chrono::Days::new(2),
            incident_type,
            claimed_amount: amount,
        });
        self
    }

    pub fn build(self) -> HistorySnapshot {
        HistorySnapshot {
            claimant_id: self.claimant_id,
            window: self.window,
            prior_claims: self.prior_claims,
        }
    }
}
