//! Fraud indicators
//!
//! An indicator is a named, severity-tagged signal raised by one analysis
//! module. Codes are a closed set so that reasoning, de-duplication and
//! configuration can refer to them without string matching.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the kind of fraud signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorCode {
    /// Claimed amount exceeds the policy coverage limit
    OverLimit,
    /// Claimed amount is a suspiciously round figure
    RoundNumber,
    /// Claimed amount is high relative to the vehicle's value
    ExcessiveRatio,
    /// Claimed amount is extreme in absolute terms
    ExtremelyHighAmount,
    /// Claimed amount is above what is typical for the incident type
    HighForIncidentType,
    /// Minor or vague damage description paired with a high claim
    MinorDamageHighClaim,
    /// Description contains markers associated with staged incidents
    SuspiciousDescription,
    /// Incident in a parking lot, escalating with the claimed amount
    ParkingLotIncident,
    /// Filed shortly after policy inception
    NewPolicyClaim,
    /// Filed shortly before policy expiration
    NearExpiryClaim,
    /// Incident-to-filing latency is an outlier
    DelayedFiling,
    /// Incident predates the policy start
    IncidentBeforeInception,
    /// Incident is dated after the claim was submitted
    FutureIncident,
    /// Incident fell on a Saturday or Sunday
    WeekendIncident,
    /// Incident fell inside a configured holiday season
    HolidaySeasonIncident,
    /// Claimed amount is high relative to the estimated market value
    ValueMismatch,
    /// Too many prior claims in the rolling window
    FrequentClaimant,
    /// Repeated prior claims of the same incident type
    PatternRepeat,
}

impl IndicatorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorCode::OverLimit => "over_limit",
            IndicatorCode::RoundNumber => "round_number",
            IndicatorCode::ExcessiveRatio => "excessive_ratio",
            IndicatorCode::ExtremelyHighAmount => "extremely_high_amount",
            IndicatorCode::HighForIncidentType => "high_for_incident_type",
            IndicatorCode::MinorDamageHighClaim => "minor_damage_high_claim",
            IndicatorCode::SuspiciousDescription => "suspicious_description",
            IndicatorCode::ParkingLotIncident => "parking_lot_incident",
            IndicatorCode::NewPolicyClaim => "new_policy_claim",
            IndicatorCode::NearExpiryClaim => "near_expiry_claim",
            IndicatorCode::DelayedFiling => "delayed_filing",
            IndicatorCode::IncidentBeforeInception => "incident_before_inception",
            IndicatorCode::FutureIncident => "future_incident",
            IndicatorCode::WeekendIncident => "weekend_incident",
            IndicatorCode::HolidaySeasonIncident => "holiday_season_incident",
            IndicatorCode::ValueMismatch => "value_mismatch",
            IndicatorCode::FrequentClaimant => "frequent_claimant",
            IndicatorCode::PatternRepeat => "pattern_repeat",
        }
    }
}

impl fmt::Display for IndicatorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a fraud indicator, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Numeric value used when weighting indicators into a module contribution
    pub fn value(&self) -> f64 {
        match self {
            Severity::Low => 0.25,
            Severity::Medium => 0.5,
            Severity::High => 0.75,
            Severity::Critical => 1.0,
        }
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, Severity::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// A single fraud signal with its explanation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudIndicator {
    pub code: IndicatorCode,
    pub severity: Severity,
    /// Human-readable explanation, used verbatim in decision reasoning
    pub text: String,
}

impl FraudIndicator {
    pub fn new(code: IndicatorCode, severity: Severity, text: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering_and_values() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::High < Severity::Critical);
        assert_eq!(Severity::Critical.value(), 1.0);
        assert!(Severity::Critical.is_critical());
        assert!(!Severity::High.is_critical());
    }

    #[test]
    fn test_code_serializes_snake_case() {
        let json = serde_json::to_string(&IndicatorCode::MinorDamageHighClaim).unwrap();
        assert_eq!(json, "\"minor_damage_high_claim\"");
        assert_eq!(IndicatorCode::MinorDamageHighClaim.to_string(), "minor_damage_high_claim");
    }
}
