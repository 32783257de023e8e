//! Decision engine
//!
//! Maps a risk score to an outcome under a [`DecisionPolicy`]. Rules are
//! checked strictest first and boundary values resolve toward the stricter
//! outcome:
//!
//! 1. score ≥ reject ceiling and indicators from at least
//!    `min_reject_indicators` independent modules → `reject`
//! 2. level ≥ `review_from_level`, or any critical indicator → `manual_review`
//! 3. otherwise → `approve`

use serde::{Deserialize, Serialize};

use core_kernel::ClaimId;

use crate::aggregator::{AggregatedIndicator, RiskScore};
use crate::config::DecisionPolicy;
use crate::finding::{FindingSet, FindingStatus, ModuleId};

const NO_INDICATORS: &str = "No fraud indicators detected";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOutcome {
    Approve,
    Reject,
    ManualReview,
}

impl std::fmt::Display for DecisionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DecisionOutcome::Approve => "approve",
            DecisionOutcome::Reject => "reject",
            DecisionOutcome::ManualReview => "manual_review",
        };
        f.write_str(s)
    }
}

/// Per-module status carried on a decision for audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleStatusSummary {
    pub module: ModuleId,
    /// `ok`, `skipped`, `failed` or `timed_out`
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Final disposition of one evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub claim_id: ClaimId,
    pub outcome: DecisionOutcome,
    pub risk_score: RiskScore,
    /// Indicators behind the outcome, most severe first
    pub triggering_indicators: Vec<AggregatedIndicator>,
    pub reasoning: String,
    pub module_statuses: Vec<ModuleStatusSummary>,
}

impl Decision {
    pub fn is_approved(&self) -> bool {
        self.outcome == DecisionOutcome::Approve
    }
}

pub struct DecisionEngine<'a> {
    policy: &'a DecisionPolicy,
}

impl<'a> DecisionEngine<'a> {
    pub fn new(policy: &'a DecisionPolicy) -> Self {
        Self { policy }
    }

    pub fn outcome_for(&self, score: &RiskScore) -> DecisionOutcome {
        if score.value >= self.policy.reject_ceiling
            && score.independent_sources() >= self.policy.min_reject_indicators
        {
            DecisionOutcome::Reject
        } else if score.level >= self.policy.review_from_level
            || (self.policy.review_on_critical && score.has_critical_indicator())
        {
            DecisionOutcome::ManualReview
        } else {
            DecisionOutcome::Approve
        }
    }

    pub fn decide(&self, claim_id: ClaimId, score: RiskScore, findings: &FindingSet) -> Decision {
        let outcome = self.outcome_for(&score);
        let triggering = ordered_indicators(&score, findings);
        let reasoning = reasoning(outcome, &score, &triggering);

        let module_statuses = findings
            .iter()
            .map(|f| ModuleStatusSummary {
                module: f.module.clone(),
                status: f.status.label().to_string(),
                detail: match &f.status {
                    FindingStatus::Ok => None,
                    FindingStatus::Skipped { reason } => Some(reason.clone()),
                    FindingStatus::Failed { failure } => Some(failure.to_string()),
                },
            })
            .collect();

        Decision {
            claim_id,
            outcome,
            risk_score: score,
            triggering_indicators: triggering,
            reasoning,
            module_statuses,
        }
    }
}

/// Severity descending, then registry order, then code
fn ordered_indicators(score: &RiskScore, findings: &FindingSet) -> Vec<AggregatedIndicator> {
    let mut indicators = score.indicators.clone();
    indicators.sort_by(|a, b| {
        b.indicator
            .severity
            .cmp(&a.indicator.severity)
            .then_with(|| {
                let pa = findings.position(&a.module).unwrap_or(usize::MAX);
                let pb = findings.position(&b.module).unwrap_or(usize::MAX);
                pa.cmp(&pb)
            })
            .then_with(|| a.indicator.code.cmp(&b.indicator.code))
    });
    indicators
}

fn reasoning(outcome: DecisionOutcome, score: &RiskScore, indicators: &[AggregatedIndicator]) -> String {
    if indicators.is_empty() {
        return match outcome {
            DecisionOutcome::Approve => NO_INDICATORS.to_string(),
            _ => format!(
                "Risk score {:.2} falls in the {} band without individual indicators",
                score.value, score.level
            ),
        };
    }
    indicators
        .iter()
        .map(|i| i.indicator.text.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::RiskLevel;
    use crate::finding::Finding;
    use crate::indicator::{FraudIndicator, IndicatorCode, Severity};
    use uuid::Uuid;

    fn claim_id() -> ClaimId {
        ClaimId::from_uuid(Uuid::from_u128(7))
    }

    fn indicator(code: IndicatorCode, severity: Severity, module: ModuleId, text: &str) -> AggregatedIndicator {
        AggregatedIndicator {
            indicator: FraudIndicator::new(code, severity, text),
            module,
        }
    }

    fn score(value: f64, level: RiskLevel, indicators: Vec<AggregatedIndicator>) -> RiskScore {
        RiskScore {
            value,
            level,
            weighted_sum: value,
            module_weights: Vec::new(),
            indicators,
        }
    }

    fn findings() -> FindingSet {
        FindingSet::new(vec![
            Finding::skipped(ModuleId::AMOUNT, "n/a"),
            Finding::skipped(ModuleId::TIMING, "n/a"),
            Finding::skipped(ModuleId::CLAIM_HISTORY, "n/a"),
        ])
    }

    #[test]
    fn test_clean_claim_approved() {
        let policy = DecisionPolicy::default();
        let decision = DecisionEngine::new(&policy).decide(
            claim_id(),
            score(0.0, RiskLevel::Low, vec![]),
            &findings(),
        );
        assert_eq!(decision.outcome, DecisionOutcome::Approve);
        assert_eq!(decision.reasoning, NO_INDICATORS);
        assert_eq!(decision.module_statuses.len(), 3);
        assert_eq!(decision.module_statuses[0].status, "skipped");
    }

    #[test]
    fn test_medium_without_critical_approved() {
        let policy = DecisionPolicy::default();
        let s = score(
            0.45,
            RiskLevel::Medium,
            vec![indicator(IndicatorCode::NearExpiryClaim, Severity::Medium, ModuleId::TIMING, "near expiry")],
        );
        assert_eq!(DecisionEngine::new(&policy).outcome_for(&s), DecisionOutcome::Approve);
    }

    #[test]
    fn test_critical_indicator_forces_review() {
        let policy = DecisionPolicy::default();
        let s = score(
            0.2,
            RiskLevel::Low,
            vec![indicator(IndicatorCode::FutureIncident, Severity::Critical, ModuleId::TIMING, "future")],
        );
        assert_eq!(DecisionEngine::new(&policy).outcome_for(&s), DecisionOutcome::ManualReview);
    }

    #[test]
    fn test_high_level_boundary_reviews() {
        let policy = DecisionPolicy::default();
        let s = score(0.6, RiskLevel::High, vec![]);
        let decision = DecisionEngine::new(&policy).decide(claim_id(), s, &findings());
        assert_eq!(decision.outcome, DecisionOutcome::ManualReview);
        assert!(!decision.reasoning.is_empty());
    }

    #[test]
    fn test_reject_requires_independent_sources() {
        let policy = DecisionPolicy::default();
        let single_source = score(
            0.95,
            RiskLevel::Critical,
            vec![
                indicator(IndicatorCode::NewPolicyClaim, Severity::Critical, ModuleId::TIMING, "new"),
                indicator(IndicatorCode::NearExpiryClaim, Severity::Medium, ModuleId::TIMING, "expiry"),
            ],
        );
        assert_eq!(DecisionEngine::new(&policy).outcome_for(&single_source), DecisionOutcome::ManualReview);

        let two_sources = score(
            0.9,
            RiskLevel::Critical,
            vec![
                indicator(IndicatorCode::NewPolicyClaim, Severity::Critical, ModuleId::TIMING, "new"),
                indicator(IndicatorCode::OverLimit, Severity::Critical, ModuleId::AMOUNT, "over"),
            ],
        );
        assert_eq!(DecisionEngine::new(&policy).outcome_for(&two_sources), DecisionOutcome::Reject);
    }

    #[test]
    fn test_reasoning_order() {
        let policy = DecisionPolicy::default();
        let s = score(
            0.7,
            RiskLevel::High,
            vec![
                indicator(IndicatorCode::FrequentClaimant, Severity::Medium, ModuleId::CLAIM_HISTORY, "frequent"),
                indicator(IndicatorCode::RoundNumber, Severity::Low, ModuleId::AMOUNT, "round"),
                indicator(IndicatorCode::NearExpiryClaim, Severity::Medium, ModuleId::TIMING, "expiry"),
                indicator(IndicatorCode::NewPolicyClaim, Severity::Critical, ModuleId::TIMING, "new"),
            ],
        );
        let decision = DecisionEngine::new(&policy).decide(claim_id(), s, &findings());
        assert_eq!(decision.reasoning, "new; expiry; frequent; round");
        assert_eq!(decision.triggering_indicators[0].indicator.code, IndicatorCode::NewPolicyClaim);
    }

    #[test]
    fn test_override_policy_without_critical_review() {
        let policy = DecisionPolicy {
            review_on_critical: false,
            review_from_level: RiskLevel::Critical,
            ..DecisionPolicy::default()
        };
        let s = score(
            0.6,
            RiskLevel::High,
            vec![indicator(IndicatorCode::OverLimit, Severity::Critical, ModuleId::AMOUNT, "over")],
        );
        assert_eq!(DecisionEngine::new(&policy).outcome_for(&s), DecisionOutcome::Approve);
    }
}
