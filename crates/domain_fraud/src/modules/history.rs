//! Claim-History Analysis
//!
//! Reads only the history snapshot handed in with the claim; the engine
//! keeps no claims database of its own.

use async_trait::async_trait;

use core_kernel::DateWindow;

use crate::config::{EngineConfig, HistoryConfig};
use crate::context::{ClaimContext, PriorClaim};
use crate::deadline::Deadline;
use crate::finding::{Finding, FindingBuilder, ModuleId};
use crate::indicator::{FraudIndicator, IndicatorCode, Severity};
use crate::modules::AnalysisModule;

#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimHistoryAnalysis;

#[async_trait]
impl AnalysisModule for ClaimHistoryAnalysis {
    fn id(&self) -> ModuleId {
        ModuleId::CLAIM_HISTORY
    }

    async fn evaluate(&self, ctx: &ClaimContext, config: &EngineConfig, _deadline: Deadline) -> Finding {
        let cfg = &config.modules.history;
        let mut finding = FindingBuilder::new(self.id());

        let window = DateWindow::trailing(ctx.claim().submission_date, cfg.window_days)
            .unwrap_or(ctx.history().window);
        let recent: Vec<&PriorClaim> = ctx.history().claims_within(window).collect();

        check_frequency(&recent, cfg, &mut finding);
        check_pattern(ctx, &recent, cfg, &mut finding);

        finding.finish()
    }
}

fn graded(count: usize, threshold: usize) -> Option<Severity> {
    if count >= threshold.saturating_mul(2) {
        Some(Severity::High)
    } else if count >= threshold {
        Some(Severity::Medium)
    } else {
        None
    }
}

fn check_frequency(recent: &[&PriorClaim], cfg: &HistoryConfig, finding: &mut FindingBuilder) {
    match graded(recent.len(), cfg.frequent_threshold) {
        Some(severity) => {
            finding.triggered(
                FraudIndicator::new(
                    IndicatorCode::FrequentClaimant,
                    severity,
                    format!(
                        "Claimant filed {} prior claims in the last {} days",
                        recent.len(),
                        cfg.window_days
                    ),
                ),
                cfg.frequent_weight,
            );
        }
        None => {
            finding.passed(IndicatorCode::FrequentClaimant);
        }
    }
}

fn check_pattern(
    ctx: &ClaimContext,
    recent: &[&PriorClaim],
    cfg: &HistoryConfig,
    finding: &mut FindingBuilder,
) {
    if cfg.pattern_repeat_threshold == 0 {
        finding.skipped(IndicatorCode::PatternRepeat, "pattern threshold disabled");
        return;
    }

    let incident_type = ctx.claim().incident_type;
    let same_type = recent
        .iter()
        .filter(|c| c.incident_type == incident_type)
        .count();

    match graded(same_type, cfg.pattern_repeat_threshold) {
        Some(severity) => {
            finding.triggered(
                FraudIndicator::new(
                    IndicatorCode::PatternRepeat,
                    severity,
                    format!(
                        "Claimant has {} prior {} claims in the last {} days",
                        same_type,
                        incident_type.as_str(),
                        cfg.window_days
                    ),
                ),
                cfg.pattern_repeat_weight,
            );
        }
        None => {
            finding.passed(IndicatorCode::PatternRepeat);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::IncidentType;
    use crate::testing::{context, context_with, prior_claim};

    async fn run(ctx: &ClaimContext) -> Finding {
        ClaimHistoryAnalysis
            .evaluate(ctx, &EngineConfig::default(), Deadline::after_ms(1_000))
            .await
    }

    #[tokio::test]
    async fn test_no_history_passes() {
        let finding = run(&context(1_200)).await;
        assert!(finding.indicators.is_empty());
        assert_eq!(finding.checks.len(), 2);
    }

    #[tokio::test]
    async fn test_frequent_claimant_and_pattern() {
        let ctx = context_with(1_200, |_sub, _policy, history| {
            history.prior_claims.push(prior_claim(2023, 8, 1, 900));
            history.prior_claims.push(prior_claim(2023, 11, 5, 1_100));
            history.prior_claims.push(prior_claim(2024, 2, 14, 700));
        });
        let finding = run(&ctx).await;

        let codes: Vec<IndicatorCode> = finding.indicators.iter().map(|i| i.code).collect();
        assert_eq!(codes, vec![IndicatorCode::FrequentClaimant, IndicatorCode::PatternRepeat]);
        assert_eq!(finding.indicators[0].severity, Severity::Medium);
        // 0.7 * 0.5 + 0.5 * 0.5
        assert!((finding.contribution - 0.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_claims_outside_window_ignored() {
        let ctx = context_with(1_200, |_sub, _policy, history| {
            history.prior_claims.push(prior_claim(2021, 8, 1, 900));
            history.prior_claims.push(prior_claim(2022, 1, 5, 1_100));
            history.prior_claims.push(prior_claim(2022, 6, 14, 700));
        });
        let finding = run(&ctx).await;
        assert!(finding.indicators.is_empty());
    }

    #[tokio::test]
    async fn test_pattern_requires_same_type() {
        let ctx = context_with(1_200, |_sub, _policy, history| {
            let mut theft = prior_claim(2023, 8, 1, 900);
            theft.incident_type = IncidentType::Theft;
            history.prior_claims.push(theft);
            history.prior_claims.push(prior_claim(2023, 11, 5, 1_100));
        });
        let finding = run(&ctx).await;
        assert!(finding.indicators.is_empty());
    }

    #[test]
    fn test_grading() {
        assert_eq!(graded(2, 3), None);
        assert_eq!(graded(3, 3), Some(Severity::Medium));
        assert_eq!(graded(6, 3), Some(Severity::High));
    }
}
