//! Risk aggregation
//!
//! Reduces a [`FindingSet`] to a single [`RiskScore`]:
//!
//! ```text
//! score = clamp01(max(Σ weight(m) × contribution(m), floor(highest severity present)))
//! ```
//!
//! Failed and skipped modules contribute zero and their weight is not
//! redistributed, so a missing module lowers the achievable score.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::AggregationConfig;
use crate::error::FraudError;
use crate::finding::{FindingSet, ModuleId};
use crate::indicator::{FraudIndicator, IndicatorCode, Severity};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Discrete risk band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// How one module fed into the score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleWeight {
    pub module: ModuleId,
    pub weight: f64,
    pub contribution: f64,
    /// False when the module was skipped or failed
    pub counted: bool,
}

/// A de-duplicated indicator annotated with the module that raised it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedIndicator {
    #[serde(flatten)]
    pub indicator: FraudIndicator,
    pub module: ModuleId,
}

/// Aggregate fraud risk for one claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    /// Final score in [0.0, 1.0]
    pub value: f64,
    pub level: RiskLevel,
    /// Weighted sum before severity floors
    pub weighted_sum: f64,
    pub module_weights: Vec<ModuleWeight>,
    pub indicators: Vec<AggregatedIndicator>,
}

impl RiskScore {
    pub fn has_critical_indicator(&self) -> bool {
        self.indicators
            .iter()
            .any(|i| i.indicator.severity.is_critical())
    }

    pub fn indicator(&self, code: IndicatorCode) -> Option<&AggregatedIndicator> {
        self.indicators.iter().find(|i| i.indicator.code == code)
    }

    /// Number of distinct modules that raised at least one indicator
    pub fn independent_sources(&self) -> usize {
        let mut modules: Vec<&ModuleId> = self.indicators.iter().map(|i| &i.module).collect();
        modules.sort();
        modules.dedup();
        modules.len()
    }
}

pub struct RiskAggregator<'a> {
    config: &'a AggregationConfig,
}

impl<'a> RiskAggregator<'a> {
    pub fn new(config: &'a AggregationConfig) -> Self {
        Self { config }
    }

    /// Verifies that `modules` all have weights and that the weights sum to 1.0
    pub fn check_weights(&self, modules: &[ModuleId]) -> Result<(), FraudError> {
        let mut total = 0.0;
        for module in modules {
            let weight = self.config.weight_for(module).ok_or_else(|| {
                FraudError::invariant(format!("no aggregation weight configured for module {}", module))
            })?;
            if !weight.is_finite() || weight < 0.0 {
                return Err(FraudError::invariant(format!(
                    "weight {} for module {} is not a non-negative number",
                    weight, module
                )));
            }
            total += weight;
        }
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(FraudError::invariant(format!(
                "module weights sum to {} instead of 1.0",
                total
            )));
        }
        Ok(())
    }

    /// Reduces findings to a risk score
    ///
    /// # Errors
    ///
    /// Returns [`FraudError::AggregationInvariantViolation`] when weights are
    /// missing or do not sum to 1.0, or when a contribution or the resulting
    /// score falls outside [0.0, 1.0].
    pub fn aggregate(&self, findings: &FindingSet) -> Result<RiskScore, FraudError> {
        let modules: Vec<ModuleId> = findings.iter().map(|f| f.module.clone()).collect();
        self.check_weights(&modules)?;

        let mut weighted_sum = 0.0;
        let mut module_weights = Vec::with_capacity(findings.len());
        for finding in findings {
            let weight = self.config.weight_for(&finding.module).unwrap_or(0.0);
            let contribution = finding.effective_contribution();
            if !(0.0..=1.0).contains(&contribution) {
                return Err(FraudError::invariant(format!(
                    "module {} reported contribution {} outside [0, 1]",
                    finding.module, contribution
                )));
            }
            weighted_sum += weight * contribution;
            module_weights.push(ModuleWeight {
                module: finding.module.clone(),
                weight,
                contribution,
                counted: finding.status.is_ok(),
            });
        }

        let indicators = dedup_indicators(findings);
        let floor = indicators
            .iter()
            .map(|i| self.config.severity_floors.floor_for(i.indicator.severity))
            .fold(0.0, f64::max);

        let value = weighted_sum.max(floor).clamp(0.0, 1.0);
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(FraudError::invariant(format!("risk score {} outside [0, 1]", value)));
        }

        Ok(RiskScore {
            value,
            level: self.config.bands.level_for(value),
            weighted_sum,
            module_weights,
            indicators,
        })
    }
}

/// Union of indicators across findings, keeping the most severe per code
///
/// First occurrence wins on equal severity, so the result depends only on
/// registry order.
fn dedup_indicators(findings: &FindingSet) -> Vec<AggregatedIndicator> {
    let mut out: Vec<AggregatedIndicator> = Vec::new();
    let mut by_code: HashMap<IndicatorCode, usize> = HashMap::new();

    for finding in findings.iter().filter(|f| f.status.is_ok()) {
        for indicator in &finding.indicators {
            match by_code.get(&indicator.code) {
                Some(&idx) => {
                    if indicator.severity > out[idx].indicator.severity {
                        out[idx] = AggregatedIndicator {
                            indicator: indicator.clone(),
                            module: finding.module.clone(),
                        };
                    }
                }
                None => {
                    by_code.insert(indicator.code, out.len());
                    out.push(AggregatedIndicator {
                        indicator: indicator.clone(),
                        module: finding.module.clone(),
                    });
                }
            }
        }
    }
    out
}

/// Highest severity among aggregated indicators
pub fn max_severity(indicators: &[AggregatedIndicator]) -> Option<Severity> {
    indicators.iter().map(|i| i.indicator.severity).max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModuleFailure;
    use crate::finding::{Finding, FindingBuilder};

    fn finding(module: ModuleId, indicators: &[(IndicatorCode, Severity, f64)]) -> Finding {
        let mut builder = FindingBuilder::new(module);
        for (code, severity, weight) in indicators {
            builder.triggered(FraudIndicator::new(*code, *severity, code.as_str()), *weight);
        }
        builder.finish()
    }

    fn standard(findings: Vec<Finding>) -> FindingSet {
        FindingSet::new(findings)
    }

    fn all_clear() -> Vec<Finding> {
        vec![
            finding(ModuleId::AMOUNT, &[]),
            finding(ModuleId::INCIDENT_DETAIL, &[]),
            finding(ModuleId::TIMING, &[]),
            finding(ModuleId::VEHICLE_VALUE, &[]),
            finding(ModuleId::CLAIM_HISTORY, &[]),
        ]
    }

    #[test]
    fn test_clean_findings_score_zero() {
        let config = AggregationConfig::default();
        let score = RiskAggregator::new(&config).aggregate(&standard(all_clear())).unwrap();
        assert_eq!(score.value, 0.0);
        assert_eq!(score.level, RiskLevel::Low);
        assert_eq!(score.module_weights.len(), 5);
    }

    #[test]
    fn test_weighted_sum() {
        let mut findings = all_clear();
        findings[2] = finding(
            ModuleId::TIMING,
            &[(IndicatorCode::NearExpiryClaim, Severity::Medium, 0.4)],
        );
        findings[4] = finding(
            ModuleId::CLAIM_HISTORY,
            &[(IndicatorCode::FrequentClaimant, Severity::High, 1.0)],
        );
        let config = AggregationConfig::default();
        let score = RiskAggregator::new(&config).aggregate(&standard(findings)).unwrap();
        // 0.20 * 0.2 + 0.15 * 0.75
        assert!((score.value - 0.1525).abs() < 1e-9);
        assert_eq!(score.independent_sources(), 2);
    }

    #[test]
    fn test_critical_floor_lifts_score() {
        let mut findings = all_clear();
        findings[0] = finding(
            ModuleId::AMOUNT,
            &[(IndicatorCode::OverLimit, Severity::Critical, 1.0)],
        );
        let config = AggregationConfig::default();
        let score = RiskAggregator::new(&config).aggregate(&standard(findings)).unwrap();
        assert!((score.weighted_sum - 0.3).abs() < 1e-9);
        assert_eq!(score.value, 0.6);
        assert_eq!(score.level, RiskLevel::High);
        assert!(score.has_critical_indicator());
    }

    #[test]
    fn test_failed_module_weight_not_redistributed() {
        let mut findings = all_clear();
        for f in findings.iter_mut() {
            *f = finding(f.module.clone(), &[(IndicatorCode::PatternRepeat, Severity::Critical, 1.0)]);
        }
        findings[3] = Finding::failed(ModuleId::VEHICLE_VALUE, ModuleFailure::ModuleTimeout { budget_ms: 10 });
        let config = AggregationConfig::default();
        let score = RiskAggregator::new(&config).aggregate(&standard(findings)).unwrap();
        assert!((score.weighted_sum - 0.8).abs() < 1e-9);
        assert!(!score.module_weights[3].counted);
    }

    #[test]
    fn test_dedup_keeps_most_severe() {
        let mut findings = all_clear();
        findings[0] = finding(
            ModuleId::AMOUNT,
            &[(IndicatorCode::ValueMismatch, Severity::Medium, 0.0)],
        );
        findings[3] = finding(
            ModuleId::VEHICLE_VALUE,
            &[(IndicatorCode::ValueMismatch, Severity::High, 1.0)],
        );
        let config = AggregationConfig::default();
        let score = RiskAggregator::new(&config).aggregate(&standard(findings)).unwrap();
        assert_eq!(score.indicators.len(), 1);
        assert_eq!(score.indicators[0].module, ModuleId::VEHICLE_VALUE);
        assert_eq!(max_severity(&score.indicators), Some(Severity::High));
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut config = AggregationConfig::default();
        config.module_weights.insert("amount".to_string(), 0.5);
        let result = RiskAggregator::new(&config).aggregate(&standard(all_clear()));
        assert!(matches!(result, Err(FraudError::AggregationInvariantViolation(_))));
    }

    #[test]
    fn test_missing_weight_is_violation() {
        let mut config = AggregationConfig::default();
        config.module_weights.remove("timing");
        let err = RiskAggregator::new(&config)
            .check_weights(&[ModuleId::AMOUNT, ModuleId::TIMING])
            .unwrap_err();
        assert!(err.to_string().contains("timing"));
    }

    #[test]
    fn test_out_of_range_contribution_is_violation() {
        let mut findings = all_clear();
        findings[1].contribution = 1.5;
        let config = AggregationConfig::default();
        let result = RiskAggregator::new(&config).aggregate(&standard(findings));
        assert!(matches!(result, Err(FraudError::AggregationInvariantViolation(_))));
    }
}
