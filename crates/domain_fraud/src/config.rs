//! Engine configuration
//!
//! Every threshold, indicator weight, module weight and decision boundary is
//! carried in an explicit [`EngineConfig`] value passed to each evaluation.
//! `Default` gives the illustrative calibration; deployments override it from
//! a file or the environment at the binary edge.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use core_kernel::{Currency, Money};

use crate::aggregator::RiskLevel;
use crate::context::IncidentType;
use crate::error::FraudError;
use crate::finding::ModuleId;
use crate::indicator::Severity;

/// Complete configuration for one evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub modules: ModuleSettings,
    pub aggregation: AggregationConfig,
    pub decision: DecisionConfig,
    /// Shared deadline for all analysis modules
    pub evaluation_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            modules: ModuleSettings::default(),
            aggregation: AggregationConfig::default(),
            decision: DecisionConfig::default(),
            evaluation_timeout_ms: 2_000,
        }
    }
}

impl EngineConfig {
    /// Checks value ranges that would otherwise produce meaningless scores
    ///
    /// Module weight coverage and their sum are checked by the aggregator
    /// against the registered modules.
    pub fn validate(&self) -> Result<(), FraudError> {
        if self.evaluation_timeout_ms == 0 {
            return Err(FraudError::configuration("evaluation_timeout_ms must be positive"));
        }

        self.modules.validate()?;
        self.aggregation.bands.validate()?;
        self.aggregation.severity_floors.validate()?;

        ensure_distinct_keys("aggregation.module_weights", &self.aggregation.module_weights)?;
        ensure_distinct_keys("decision.product_overrides", &self.decision.product_overrides)?;

        for (module, weight) in &self.aggregation.module_weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(FraudError::configuration(format!(
                    "module weight for {} must be a non-negative number, got {}",
                    module, weight
                )));
            }
        }

        self.decision.default_policy.validate("default")?;
        for (product, policy) in &self.decision.product_overrides {
            policy.validate(product)?;
        }
        Ok(())
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.evaluation_timeout_ms = timeout_ms;
        self
    }

    pub fn with_module_weight(mut self, module: &ModuleId, weight: f64) -> Self {
        self.aggregation
            .module_weights
            .insert(module.as_str().to_string(), weight);
        self
    }
}

/// Per-module thresholds and indicator weights
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleSettings {
    pub amount: AmountConfig,
    pub incident: IncidentConfig,
    pub timing: TimingConfig,
    pub vehicle_value: VehicleValueConfig,
    pub history: HistoryConfig,
}

impl ModuleSettings {
    fn validate(&self) -> Result<(), FraudError> {
        let weights = [
            ("amount.over_limit_weight", self.amount.over_limit_weight),
            ("amount.round_number_weight", self.amount.round_number_weight),
            ("amount.excessive_ratio_weight", self.amount.excessive_ratio_weight),
            ("amount.extremely_high_weight", self.amount.extremely_high_weight),
            ("amount.type_threshold_weight", self.amount.type_threshold_weight),
            ("incident.minor_damage_weight", self.incident.minor_damage_weight),
            ("incident.suspicious_weight", self.incident.suspicious_weight),
            ("incident.parking_lot_weight", self.incident.parking_lot_weight),
            ("timing.new_policy_weight", self.timing.new_policy_weight),
            ("timing.near_expiry_weight", self.timing.near_expiry_weight),
            ("timing.delayed_filing_weight", self.timing.delayed_filing_weight),
            ("timing.before_inception_weight", self.timing.before_inception_weight),
            ("timing.future_incident_weight", self.timing.future_incident_weight),
            ("timing.weekend_weight", self.timing.weekend_weight),
            ("timing.holiday_weight", self.timing.holiday_weight),
            ("vehicle_value.weight", self.vehicle_value.weight),
            ("history.frequent_weight", self.history.frequent_weight),
            ("history.pattern_repeat_weight", self.history.pattern_repeat_weight),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(FraudError::configuration(format!(
                    "{} must be a non-negative number, got {}",
                    name, weight
                )));
            }
        }

        if self.amount.round_unit <= Decimal::ZERO {
            return Err(FraudError::configuration("amount.round_unit must be positive"));
        }
        if self.amount.round_tolerance < Decimal::ZERO {
            return Err(FraudError::configuration("amount.round_tolerance must not be negative"));
        }
        if self.amount.excessive_ratio_threshold <= 0.0
            || self.amount.excessive_ratio_critical < self.amount.excessive_ratio_threshold
        {
            return Err(FraudError::configuration(
                "amount excessive ratio thresholds must be positive and ascending",
            ));
        }
        if !self.amount.extremely_high_amount.is_positive() {
            return Err(FraudError::configuration("amount.extremely_high_amount must be positive"));
        }
        if !self.amount.default_type_threshold.is_positive()
            || self.amount.type_thresholds.values().any(|t| !t.is_positive())
        {
            return Err(FraudError::configuration(
                "amount incident type thresholds must be positive",
            ));
        }
        if self.amount.type_threshold_high_multiple < 1.0 {
            return Err(FraudError::configuration(
                "amount.type_threshold_high_multiple must be at least 1",
            ));
        }
        ascending(
            "incident.high_claim_amount",
            &self.incident.high_claim_amount,
            "incident.very_high_claim_amount",
            &self.incident.very_high_claim_amount,
        )?;
        ascending(
            "incident.high_claim_amount",
            &self.incident.high_claim_amount,
            "incident.parking_very_high_amount",
            &self.incident.parking_very_high_amount,
        )?;
        for season in &self.timing.holiday_seasons {
            season.validate()?;
        }
        if self.vehicle_value.mismatch_ratio <= 0.0
            || self.vehicle_value.high_ratio < self.vehicle_value.mismatch_ratio
        {
            return Err(FraudError::configuration(
                "vehicle_value ratios must be positive and ascending",
            ));
        }
        if self.timing.new_policy_critical_days > self.timing.new_policy_days {
            return Err(FraudError::configuration(
                "timing.new_policy_critical_days must not exceed timing.new_policy_days",
            ));
        }
        if self.history.window_days == 0 || self.history.frequent_threshold == 0 {
            return Err(FraudError::configuration(
                "history window and frequency threshold must be positive",
            ));
        }
        Ok(())
    }
}

/// `low` and `high` share a currency and `low < high`
fn ascending(low_name: &str, low: &Money, high_name: &str, high: &Money) -> Result<(), FraudError> {
    match high.exceeds(low) {
        Ok(true) if low.is_positive() => Ok(()),
        Ok(_) => Err(FraudError::configuration(format!(
            "{} must be positive and below {}",
            low_name, high_name
        ))),
        Err(e) => Err(FraudError::configuration(format!(
            "{} and {}: {}",
            low_name, high_name, e
        ))),
    }
}

/// Rejects map keys that differ only in ASCII case
///
/// Product codes and module ids are looked up case-insensitively, so two
/// such keys would be ambiguous.
fn ensure_distinct_keys<V>(section: &str, map: &BTreeMap<String, V>) -> Result<(), FraudError> {
    let keys: Vec<&String> = map.keys().collect();
    for (i, key) in keys.iter().enumerate() {
        if let Some(other) = keys[i + 1..].iter().find(|k| k.eq_ignore_ascii_case(key)) {
            return Err(FraudError::configuration(format!(
                "{} has keys {} and {} that differ only in case",
                section, key, other
            )));
        }
    }
    Ok(())
}

/// Exact key first, then ASCII case-insensitive
///
/// Layered config sources fold key case, so an override written for
/// `Fleet_Plus` can arrive keyed as `fleet_plus`.
fn lookup<'m, V>(map: &'m BTreeMap<String, V>, key: &str) -> Option<&'m V> {
    map.get(key).or_else(|| {
        map.iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
            .map(|(_, value)| value)
    })
}

fn usd(units: i64) -> Money {
    Money::from_major(units, Currency::USD)
}

/// Amount Analysis settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmountConfig {
    pub over_limit_weight: f64,
    /// Unit a round amount is a multiple of
    pub round_unit: Decimal,
    pub round_tolerance: Decimal,
    pub round_number_weight: f64,
    /// Claim-to-historical-mean ratio that escalates a round amount to medium
    pub round_history_ratio: f64,
    /// Claim to estimated vehicle value ratio
    pub excessive_ratio_threshold: f64,
    pub excessive_ratio_critical: f64,
    pub excessive_ratio_weight: f64,
    /// The valuation lookup gives up this long before the module deadline
    pub valuation_reserve_ms: u64,
    /// Amounts above this raise `extremely_high_amount` (critical)
    pub extremely_high_amount: Money,
    pub extremely_high_weight: f64,
    /// Typical ceiling per incident type
    pub type_thresholds: BTreeMap<IncidentType, Money>,
    /// Ceiling for incident types without an entry
    pub default_type_threshold: Money,
    /// Multiple of the ceiling at which `high_for_incident_type` becomes high
    pub type_threshold_high_multiple: f64,
    pub type_threshold_weight: f64,
}

impl AmountConfig {
    pub fn type_threshold(&self, incident_type: IncidentType) -> Money {
        self.type_thresholds
            .get(&incident_type)
            .copied()
            .unwrap_or(self.default_type_threshold)
    }
}

impl Default for AmountConfig {
    fn default() -> Self {
        Self {
            over_limit_weight: 1.0,
            round_unit: dec!(1000),
            round_tolerance: Decimal::ZERO,
            round_number_weight: 0.0,
            round_history_ratio: 3.0,
            excessive_ratio_threshold: 1.5,
            excessive_ratio_critical: 3.0,
            excessive_ratio_weight: 0.6,
            valuation_reserve_ms: 50,
            extremely_high_amount: usd(100_000),
            extremely_high_weight: 1.0,
            type_thresholds: [
                (IncidentType::Collision, usd(15_000)),
                (IncidentType::Theft, usd(25_000)),
                (IncidentType::Vandalism, usd(15_000)),
            ]
            .into_iter()
            .collect(),
            default_type_threshold: usd(25_000),
            type_threshold_high_multiple: 2.0,
            type_threshold_weight: 0.4,
        }
    }
}

/// Incident-Detail Analysis settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncidentConfig {
    /// Descriptions shorter than this are treated as low-information
    pub min_description_words: usize,
    /// Claims at or above this pair badly with a minor-damage description
    pub high_claim_amount: Money,
    pub very_high_claim_amount: Money,
    pub minor_damage_weight: f64,
    pub suspicious_weight: f64,
    /// Parking-lot claims above `high_claim_amount` are medium, above this high
    pub parking_very_high_amount: Money,
    pub parking_lot_weight: f64,
    /// Number of distinct markers that escalates `suspicious_description` to high
    pub markers_for_high: usize,
    /// All-caps words (4+ letters) above this count are one staged-incident marker
    pub max_shouted_words: usize,
    pub minor_damage_phrases: Vec<String>,
    pub suspicious_phrases: Vec<String>,
    pub parking_lot_phrases: Vec<String>,
}

impl Default for IncidentConfig {
    fn default() -> Self {
        let phrases = |list: &[&str]| list.iter().map(|p| p.to_string()).collect();
        Self {
            min_description_words: 6,
            high_claim_amount: usd(5_000),
            very_high_claim_amount: usd(20_000),
            minor_damage_weight: 0.8,
            suspicious_weight: 0.6,
            parking_very_high_amount: usd(15_000),
            parking_lot_weight: 0.4,
            markers_for_high: 2,
            max_shouted_words: 2,
            minor_damage_phrases: phrases(&[
                "minor", "slight", "small", "tap", "bump", "fender bender", "low speed",
                "scrape", "scratch", "dent", "ding", "cosmetic", "superficial",
            ]),
            suspicious_phrases: phrases(&[
                "hit and run", "stolen", "vandalized", "arson", "theft", "broken into",
                "forced entry", "no witnesses", "no police report", "mystery", "unknown",
                "cant remember", "not sure", "maybe", "i think", "i believe", "suspicious",
                "strange", "waved me", "slammed on the brakes", "hit the brakes",
            ]),
            parking_lot_phrases: phrases(&["parking lot", "parking garage", "car park"]),
        }
    }
}

/// Timing Analysis settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Filing within this many days of inception raises `new_policy_claim`
    pub new_policy_days: i64,
    /// Within this many days the indicator is critical
    pub new_policy_critical_days: i64,
    pub near_expiry_days: i64,
    pub delayed_filing_min_days: i64,
    pub delayed_filing_stddev_factor: f64,
    pub new_policy_weight: f64,
    pub near_expiry_weight: f64,
    pub delayed_filing_weight: f64,
    pub before_inception_weight: f64,
    pub future_incident_weight: f64,
    /// Incidents on a Saturday or Sunday raise `weekend_incident`
    pub weekend_weight: f64,
    pub holiday_seasons: Vec<SeasonWindow>,
    pub holiday_weight: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            new_policy_days: 30,
            new_policy_critical_days: 7,
            near_expiry_days: 30,
            delayed_filing_min_days: 30,
            delayed_filing_stddev_factor: 2.0,
            new_policy_weight: 0.6,
            near_expiry_weight: 0.4,
            delayed_filing_weight: 0.4,
            before_inception_weight: 1.0,
            future_incident_weight: 1.0,
            weekend_weight: 0.2,
            holiday_seasons: vec![
                SeasonWindow::new("winter holidays", (12, 15), (1, 5)),
                SeasonWindow::new("summer", (6, 1), (9, 1)),
                SeasonWindow::new("autumn", (10, 15), (11, 15)),
            ],
            holiday_weight: 0.3,
        }
    }
}

/// A recurring stretch of the calendar, bounds inclusive
///
/// A window whose end precedes its start wraps the year end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonWindow {
    pub label: String,
    /// `[month, day]`
    pub start: (u32, u32),
    pub end: (u32, u32),
}

impl SeasonWindow {
    pub fn new(label: impl Into<String>, start: (u32, u32), end: (u32, u32)) -> Self {
        Self {
            label: label.into(),
            start,
            end,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        let day = (date.month(), date.day());
        if self.start <= self.end {
            self.start <= day && day <= self.end
        } else {
            day >= self.start || day <= self.end
        }
    }

    fn validate(&self) -> Result<(), FraudError> {
        // 2024 is a leap year, so 02-29 is accepted
        let valid = |(month, day): (u32, u32)| NaiveDate::from_ymd_opt(2024, month, day).is_some();
        if !valid(self.start) || !valid(self.end) {
            return Err(FraudError::configuration(format!(
                "holiday season {} has an invalid month/day bound",
                self.label
            )));
        }
        Ok(())
    }
}

/// Vehicle-Value Analysis settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleValueConfig {
    /// Claim to estimated value ratio above which `value_mismatch` is medium
    pub mismatch_ratio: f64,
    /// Ratio above which it is high
    pub high_ratio: f64,
    pub weight: f64,
}

impl Default for VehicleValueConfig {
    fn default() -> Self {
        Self {
            mismatch_ratio: 0.8,
            high_ratio: 1.1,
            weight: 1.0,
        }
    }
}

/// Claim-History Analysis settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub window_days: u32,
    /// Prior claims in the window at which `frequent_claimant` is raised
    pub frequent_threshold: usize,
    pub frequent_weight: f64,
    /// Prior claims of the same incident type at which `pattern_repeat` is raised
    pub pattern_repeat_threshold: usize,
    pub pattern_repeat_weight: f64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            window_days: 365,
            frequent_threshold: 3,
            frequent_weight: 0.7,
            pattern_repeat_threshold: 2,
            pattern_repeat_weight: 0.5,
        }
    }
}

/// Risk aggregation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Weight per module id; must cover every registered module and sum to 1.0
    pub module_weights: BTreeMap<String, f64>,
    pub bands: RiskBands,
    pub severity_floors: SeverityFloors,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        let module_weights = [
            (ModuleId::AMOUNT, 0.30),
            (ModuleId::INCIDENT_DETAIL, 0.15),
            (ModuleId::TIMING, 0.20),
            (ModuleId::VEHICLE_VALUE, 0.20),
            (ModuleId::CLAIM_HISTORY, 0.15),
        ]
        .into_iter()
        .map(|(id, weight)| (id.as_str().to_string(), weight))
        .collect();

        Self {
            module_weights,
            bands: RiskBands::default(),
            severity_floors: SeverityFloors::default(),
        }
    }
}

impl AggregationConfig {
    pub fn weight_for(&self, module: &ModuleId) -> Option<f64> {
        lookup(&self.module_weights, module.as_str()).copied()
    }
}

/// Lower bounds of each risk level above `low`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskBands {
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for RiskBands {
    fn default() -> Self {
        Self {
            medium: 0.3,
            high: 0.6,
            critical: 0.85,
        }
    }
}

impl RiskBands {
    /// Level of the band containing `score`
    pub fn level_for(&self, score: f64) -> RiskLevel {
        if score >= self.critical {
            RiskLevel::Critical
        } else if score >= self.high {
            RiskLevel::High
        } else if score >= self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    fn validate(&self) -> Result<(), FraudError> {
        let ordered = 0.0 < self.medium
            && self.medium < self.high
            && self.high < self.critical
            && self.critical <= 1.0;
        if !ordered {
            return Err(FraudError::configuration(format!(
                "risk bands must satisfy 0 < medium < high < critical <= 1, got {}/{}/{}",
                self.medium, self.high, self.critical
            )));
        }
        Ok(())
    }
}

/// Minimum aggregate score implied by the presence of an indicator of a given severity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityFloors {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for SeverityFloors {
    fn default() -> Self {
        Self {
            low: 0.0,
            medium: 0.0,
            high: 0.0,
            critical: 0.6,
        }
    }
}

impl SeverityFloors {
    pub fn floor_for(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
            Severity::Critical => self.critical,
        }
    }

    fn validate(&self) -> Result<(), FraudError> {
        for floor in [self.low, self.medium, self.high, self.critical] {
            if !(0.0..=1.0).contains(&floor) {
                return Err(FraudError::configuration(format!(
                    "severity floors must lie in [0, 1], got {}",
                    floor
                )));
            }
        }
        Ok(())
    }
}

/// Decision settings: a default policy and per-product overrides
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    pub default_policy: DecisionPolicy,
    pub product_overrides: BTreeMap<String, DecisionPolicy>,
}

impl DecisionConfig {
    /// Policy for a product, falling back to the default
    pub fn policy_for(&self, product_code: &str) -> &DecisionPolicy {
        lookup(&self.product_overrides, product_code).unwrap_or(&self.default_policy)
    }
}

/// Thresholds mapping a risk score to an outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionPolicy {
    /// Scores at or above this may be rejected outright
    pub reject_ceiling: f64,
    /// Distinct modules that must have raised indicators for a reject
    pub min_reject_indicators: usize,
    /// Lowest risk level routed to manual review
    pub review_from_level: RiskLevel,
    /// Route any claim with a critical-severity indicator to review
    pub review_on_critical: bool,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            reject_ceiling: 0.9,
            min_reject_indicators: 2,
            review_from_level: RiskLevel::High,
            review_on_critical: true,
        }
    }
}

impl DecisionPolicy {
    fn validate(&self, name: &str) -> Result<(), FraudError> {
        if !(0.0..=1.0).contains(&self.reject_ceiling) {
            return Err(FraudError::configuration(format!(
                "decision policy {}: reject_ceiling must lie in [0, 1], got {}",
                name, self.reject_ceiling
            )));
        }
        if self.min_reject_indicators == 0 {
            return Err(FraudError::configuration(format!(
                "decision policy {}: min_reject_indicators must be at least 1",
                name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        let total: f64 = config.aggregation.module_weights.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_band_levels() {
        let bands = RiskBands::default();
        assert_eq!(bands.level_for(0.0), RiskLevel::Low);
        assert_eq!(bands.level_for(0.29), RiskLevel::Low);
        assert_eq!(bands.level_for(0.3), RiskLevel::Medium);
        assert_eq!(bands.level_for(0.6), RiskLevel::High);
        assert_eq!(bands.level_for(0.85), RiskLevel::Critical);
        assert_eq!(bands.level_for(1.0), RiskLevel::Critical);
    }

    #[test]
    fn test_unordered_bands_rejected() {
        let mut config = EngineConfig::default();
        config.aggregation.bands.high = 0.2;
        assert!(matches!(config.validate(), Err(FraudError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_negative_indicator_weight_rejected() {
        let mut config = EngineConfig::default();
        config.modules.timing.near_expiry_weight = -0.1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timing.near_expiry_weight"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = EngineConfig::default().with_timeout_ms(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_product_override_lookup() {
        let mut config = DecisionConfig::default();
        config.product_overrides.insert(
            "fleet".to_string(),
            DecisionPolicy {
                reject_ceiling: 0.95,
                ..DecisionPolicy::default()
            },
        );
        assert_eq!(config.policy_for("fleet").reject_ceiling, 0.95);
        assert_eq!(config.policy_for("personal_auto").reject_ceiling, 0.9);
    }

    #[test]
    fn test_lookups_ignore_key_case() {
        let mut config = EngineConfig::default();
        config.decision.product_overrides.insert(
            "fleet_plus".to_string(),
            DecisionPolicy {
                reject_ceiling: 0.95,
                ..DecisionPolicy::default()
            },
        );
        config.aggregation.module_weights.insert("document_check".to_string(), 0.1);

        assert_eq!(config.decision.policy_for("Fleet_Plus").reject_ceiling, 0.95);
        assert_eq!(
            config.aggregation.weight_for(&ModuleId::custom("Document_Check")),
            Some(0.1)
        );
    }

    #[test]
    fn test_keys_differing_only_in_case_rejected() {
        let mut config = EngineConfig::default();
        config
            .decision
            .product_overrides
            .insert("Fleet".to_string(), DecisionPolicy::default());
        config
            .decision
            .product_overrides
            .insert("fleet".to_string(), DecisionPolicy::default());

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("differ only in case"));
    }

    #[test]
    fn test_incident_thresholds_must_share_currency() {
        let mut config = EngineConfig::default();
        config.modules.incident.very_high_claim_amount = Money::from_major(20_000, Currency::JPY);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("incident.very_high_claim_amount"));
    }

    #[test]
    fn test_type_threshold_falls_back_to_default() {
        let amount = AmountConfig::default();
        assert_eq!(amount.type_threshold(IncidentType::Collision), usd(15_000));
        assert_eq!(amount.type_threshold(IncidentType::Glass), usd(25_000));
    }

    #[test]
    fn test_season_window_wraps_year_end() {
        let winter = SeasonWindow::new("winter holidays", (12, 15), (1, 5));
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert!(winter.contains(date(2024, 12, 15)));
        assert!(winter.contains(date(2025, 1, 5)));
        assert!(!winter.contains(date(2025, 1, 6)));
        assert!(!winter.contains(date(2024, 12, 14)));

        let summer = SeasonWindow::new("summer", (6, 1), (9, 1));
        assert!(summer.contains(date(2024, 9, 1)));
        assert!(!summer.contains(date(2024, 9, 2)));
    }

    #[test]
    fn test_invalid_season_rejected() {
        let mut config = EngineConfig::default();
        config.modules.timing.holiday_seasons.push(SeasonWindow::new("bad", (2, 30), (3, 1)));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "evaluation_timeout_ms": 500, "modules": { "timing": { "new_policy_days": 14 } } }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.evaluation_timeout_ms, 500);
        assert_eq!(config.modules.timing.new_policy_days, 14);
        assert_eq!(config.modules.timing.near_expiry_days, 30);
        assert_eq!(config.aggregation, AggregationConfig::default());
    }
}
