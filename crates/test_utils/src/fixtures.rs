//! Pre-built Test Fixtures
//!
//! Fixed, predictable values. All dates sit inside a calendar-2024 policy
//! term so that a default claim triggers no timing indicator.

use chrono::NaiveDate;
use core_kernel::{ClaimId, ClaimantId, Currency, DateWindow, Money};
use domain_fraud::VehicleDescriptor;
use uuid::Uuid;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn usd(amount: i64) -> Money {
        Money::from_major(amount, Currency::USD)
    }

    /// Coverage limit used by the default policy
    pub fn coverage_limit() -> Money {
        Self::usd(20_000)
    }

    pub fn deductible() -> Money {
        Self::usd(500)
    }

    /// Insured value used by the default policy
    pub fn insured_value() -> Money {
        Self::usd(20_000)
    }
}

/// Fixture for dates
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Panics on an invalid date; fixtures only
    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
    }

    pub fn policy_start() -> NaiveDate {
        Self::date(2024, 1, 1)
    }

    pub fn policy_end() -> NaiveDate {
        Self::date(2024, 12, 31)
    }

    pub fn policy_term() -> DateWindow {
        DateWindow::new(Self::policy_start(), Self::policy_end()).expect("valid fixture term")
    }

    /// A Monday outside every default holiday season
    pub fn incident_date() -> NaiveDate {
        Self::date(2024, 4, 1)
    }

    pub fn submission_date() -> NaiveDate {
        Self::date(2024, 4, 3)
    }

    /// `days` after policy start
    pub fn days_after_start(days: u64) -> NaiveDate {
        Self::policy_start() + chrono::Days::new(days)
    }
}

/// Fixture for deterministic identifiers
pub struct IdFixtures;

impl IdFixtures {
    pub fn claim_id() -> ClaimId {
        ClaimId::from_uuid(Uuid::from_u128(0x1000))
    }

    pub fn claimant_id() -> ClaimantId {
        ClaimantId::from_uuid(Uuid::from_u128(0x2000))
    }

    /// Distinct, stable prior-claim ids
    pub fn prior_claim_id(n: u128) -> ClaimId {
        ClaimId::from_uuid(Uuid::from_u128(0x3000 + n))
    }
}

/// Fixture for strings and descriptors
pub struct StringFixtures;

impl StringFixtures {
    pub fn policy_number() -> &'static str {
        "POL-1001"
    }

    pub fn product_code() -> &'static str {
        "personal_auto"
    }

    /// Specific description with no lexical markers
    pub fn clean_description() -> &'static str {
        "Rear-ended at a stop light by another driver; police report filed at the scene"
    }

    pub fn vehicle() -> VehicleDescriptor {
        VehicleDescriptor::new("Toyota", "Camry", 2020)
    }
}
