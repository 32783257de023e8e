//! Fixtures for unit tests inside this crate

use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;
use uuid::Uuid;

use core_kernel::{ClaimId, ClaimantId, Currency, DateWindow, DomainPort, Money, PortError};

use crate::context::{
    ClaimContext, ClaimSubmission, HistorySnapshot, IncidentType, PolicySnapshot, PolicyStatus,
    PriorClaim, VehicleDescriptor,
};
use crate::ports::VehicleValuationService;

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn usd(amount: i64) -> Money {
    Money::from_major(amount, Currency::USD)
}

/// Collision on Monday 2024-04-01, filed 2024-04-03, against a calendar-2024 policy
pub(crate) fn submission(amount: i64) -> ClaimSubmission {
    ClaimSubmission {
        claim_id: ClaimId::from_uuid(Uuid::from_u128(100)),
        claimant_id: ClaimantId::from_uuid(Uuid::from_u128(1)),
        policy_number: Some("POL-1001".to_string()),
        claimed_amount: Some(usd(amount)),
        incident_date: Some(date(2024, 4, 1)),
        submission_date: date(2024, 4, 3),
        incident_type: IncidentType::Collision,
        incident_description:
            "Rear-ended at a stop light by another driver; police report filed at the scene"
                .to_string(),
        supporting_documents: vec!["photo-1.jpg".to_string(), "police-report.pdf".to_string()],
        vehicle: Some(VehicleDescriptor::new("Toyota", "Camry", 2020)),
    }
}

pub(crate) fn policy(coverage_limit: i64) -> PolicySnapshot {
    PolicySnapshot {
        policy_number: "POL-1001".to_string(),
        product_code: "personal_auto".to_string(),
        status: PolicyStatus::Active,
        term: DateWindow::new(date(2024, 1, 1), date(2024, 12, 31)).unwrap(),
        coverage_limit: usd(coverage_limit),
        deductible: usd(500),
        insured_vehicle_value: Some(usd(20_000)),
    }
}

pub(crate) fn history(submission: &ClaimSubmission) -> HistorySnapshot {
    HistorySnapshot::empty(
        submission.claimant_id,
        DateWindow::trailing(submission.submission_date, 365).unwrap(),
    )
}

/// Prior collision filed two days after the incident
pub(crate) fn prior_claim(y: i32, m: u32, d: u32, amount: i64) -> PriorClaim {
    let incident_date = date(y, m, d);
    PriorClaim {
        claim_id: ClaimId::new_v7(),
        incident_date,
        submission_date: incident_date + chrono::Days::new(2),
        incident_type: IncidentType::Collision,
        claimed_amount: usd(amount),
    }
}

pub(crate) fn prior_claim_filed(incident_date: NaiveDate, submission_date: NaiveDate) -> PriorClaim {
    PriorClaim {
        claim_id: ClaimId::new_v7(),
        incident_date,
        submission_date,
        incident_type: IncidentType::Collision,
        claimed_amount: usd(1_000),
    }
}

pub(crate) fn context(amount: i64) -> ClaimContext {
    context_with(amount, |_, _, _| {})
}

pub(crate) fn context_with(
    amount: i64,
    adjust: impl FnOnce(&mut ClaimSubmission, &mut PolicySnapshot, &mut HistorySnapshot),
) -> ClaimContext {
    let mut sub = submission(amount);
    let mut pol = policy(20_000);
    let mut hist = history(&sub);
    adjust(&mut sub, &mut pol, &mut hist);
    ClaimContext::assemble(sub, pol, hist).unwrap()
}

pub(crate) struct FixedValuation(Money);

impl FixedValuation {
    pub(crate) fn usd(amount: i64) -> Self {
        Self(usd(amount))
    }
}

impl DomainPort for FixedValuation {}

#[async_trait]
impl VehicleValuationService for FixedValuation {
    async fn estimate_value(&self, _: &VehicleDescriptor, _: Duration) -> Result<Money, PortError> {
        Ok(self.0)
    }
}

pub(crate) struct FailingValuation {
    timeout: bool,
}

impl FailingValuation {
    pub(crate) fn unavailable() -> Self {
        Self { timeout: false }
    }

    pub(crate) fn timing_out() -> Self {
        Self { timeout: true }
    }
}

impl DomainPort for FailingValuation {}

#[async_trait]
impl VehicleValuationService for FailingValuation {
    async fn estimate_value(&self, _: &VehicleDescriptor, timeout: Duration) -> Result<Money, PortError> {
        if self.timeout {
            Err(PortError::timeout("estimate_value", timeout.as_millis() as u64))
        } else {
            Err(PortError::unavailable("vehicle-valuation"))
        }
    }
}

pub(crate) struct SlowValuation {
    delay: Duration,
    value: Money,
}

impl SlowValuation {
    pub(crate) fn new(delay: Duration, amount: i64) -> Self {
        Self {
            delay,
            value: usd(amount),
        }
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
