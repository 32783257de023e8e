//! Amount Analysis
//!
//! - `over_limit`: claimed amount above the policy coverage limit (critical)
//! - `extremely_high_amount`: amount above an absolute ceiling (critical)
//! - `high_for_incident_type`: amount above the typical ceiling for the incident type
//! - `round_number`: amount is an exact multiple of the round unit
//! - `excessive_ratio`: claim to estimated vehicle value ratio above threshold
//!
//! Every sub-check only escalates as the amount rises, so a larger claim
//! against the same vehicle never scores lower.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use core_kernel::Money;

use crate::config::{AmountConfig, EngineConfig};
use crate::context::ClaimContext;
use crate::deadline::Deadline;
use crate::finding::{Finding, FindingBuilder, ModuleId};
use crate::indicator::{FraudIndicator, IndicatorCode, Severity};
use crate::modules::AnalysisModule;
use crate::ports::VehicleValuationService;

pub struct AmountAnalysis {
    valuation: Arc<dyn VehicleValuationService>,
}

impl AmountAnalysis {
    pub fn new(valuation: Arc<dyn VehicleValuationService>) -> Self {
        Self { valuation }
    }

    /// Value the claim is compared against for `excessive_ratio`
    ///
    /// The valuation collaborator is asked whenever the claim names a vehicle;
    /// the policy's insured value only stands in when it does not.
    async fn reference_value(
        &self,
        ctx: &ClaimContext,
        cfg: &AmountConfig,
        deadline: Deadline,
    ) -> Result<ReferenceValue, String> {
        let Some(vehicle) = ctx.claim().vehicle.as_ref() else {
            return ctx
                .policy()
                .insured_vehicle_value
                .map(ReferenceValue::Insured)
                .ok_or_else(|| "claim names no vehicle and the policy carries no insured value".to_string());
        };

        let cutoff = deadline.reserving(Duration::from_millis(cfg.valuation_reserve_ms));
        let lookup = self
            .valuation
            .estimate_value(vehicle, cutoff.saturating_duration_since(Instant::now()));
        match tokio::time::timeout_at(cutoff, lookup).await {
            Ok(Ok(value)) => Ok(ReferenceValue::Estimated(value)),
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "vehicle valuation failed, skipping excessive_ratio");
                Err(format!("vehicle valuation failed: {}", e))
            }
            Err(_) => {
                tracing::debug!("vehicle valuation timed out, skipping excessive_ratio");
                Err("vehicle valuation did not finish in time".to_string())
            }
        }
    }
}

#[async_trait]
impl AnalysisModule for AmountAnalysis {
    fn id(&self) -> ModuleId {
        ModuleId::AMOUNT
    }

    async fn evaluate(&self, ctx: &ClaimContext, config: &EngineConfig, deadline: Deadline) -> Finding {
        let cfg = &config.modules.amount;
        let mut finding = FindingBuilder::new(self.id());

        check_over_limit(ctx, cfg, &mut finding);
        check_extremely_high(ctx, cfg, &mut finding);
        check_incident_type(ctx, cfg, &mut finding);
        check_round_number(ctx, cfg, &mut finding);

        match self.reference_value(ctx, cfg, deadline).await {
            Ok(reference) => check_excessive_ratio(ctx, cfg, reference, &mut finding),
            Err(reason) => {
                finding.skipped(IndicatorCode::ExcessiveRatio, reason);
            }
        }

        finding.finish()
    }
}

#[derive(Debug, Clone, Copy)]
enum ReferenceValue {
    Estimated(Money),
    Insured(Money),
}

impl ReferenceValue {
    fn value(&self) -> Money {
        match self {
            ReferenceValue::Estimated(value) | ReferenceValue::Insured(value) => *value,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ReferenceValue::Estimated(_) => "estimated",
            ReferenceValue::Insured(_) => "insured",
        }
    }
}

fn check_over_limit(ctx: &ClaimContext, cfg: &AmountConfig, finding: &mut FindingBuilder) {
    let amount = ctx.claim().claimed_amount;
    let limit = ctx.policy().coverage_limit;

    match amount.exceeds(&limit) {
        Ok(true) => {
            finding.triggered(
                FraudIndicator::new(
                    IndicatorCode::OverLimit,
                    Severity::Critical,
                    format!(
                        "Claimed amount {} exceeds the policy coverage limit of {}",
                        amount, limit
                    ),
                ),
                cfg.over_limit_weight,
            );
        }
        Ok(false) => {
            finding.passed(IndicatorCode::OverLimit);
        }
        Err(e) => {
            finding.skipped(IndicatorCode::OverLimit, e.to_string());
        }
    }
}

fn check_extremely_high(ctx: &ClaimContext, cfg: &AmountConfig, finding: &mut FindingBuilder) {
    let amount = ctx.claim().claimed_amount;

    match amount.exceeds(&cfg.extremely_high_amount) {
        Ok(true) => {
            finding.triggered(
                FraudIndicator::new(
                    IndicatorCode::ExtremelyHighAmount,
                    Severity::Critical,
                    format!(
                        "Claimed amount {} is above {}, extreme for a single vehicle claim",
                        amount, cfg.extremely_high_amount
                    ),
                ),
                cfg.extremely_high_weight,
            );
        }
        Ok(false) => {
            finding.passed(IndicatorCode::ExtremelyHighAmount);
        }
        Err(e) => {
            finding.skipped(IndicatorCode::ExtremelyHighAmount, e.to_string());
        }
    }
}

fn check_incident_type(ctx: &ClaimContext, cfg: &AmountConfig, finding: &mut FindingBuilder) {
    let claim = ctx.claim();
    let amount = claim.claimed_amount;
    let threshold = cfg.type_threshold(claim.incident_type);

    let ratio = match amount.ratio_to(&threshold) {
        Ok(ratio) => ratio,
        Err(e) => {
            finding.skipped(IndicatorCode::HighForIncidentType, e.to_string());
            return;
        }
    };

    let severity = if ratio > cfg.type_threshold_high_multiple {
        Severity::High
    } else if ratio > 1.0 {
        Severity::Medium
    } else {
        finding.passed(IndicatorCode::HighForIncidentType);
        return;
    };

    finding.triggered(
        FraudIndicator::new(
            IndicatorCode::HighForIncidentType,
            severity,
            format!(
                "Claimed amount {} is above the typical {} for a {} claim",
                amount,
                threshold,
                claim.incident_type.as_str()
            ),
        ),
        cfg.type_threshold_weight,
    );
}

fn check_round_number(ctx: &ClaimContext, cfg: &AmountConfig, finding: &mut FindingBuilder) {
    let amount = ctx.claim().claimed_amount;
    if amount.amount() <= cfg.round_unit || !amount.is_round_multiple(cfg.round_unit, cfg.round_tolerance) {
        finding.passed(IndicatorCode::RoundNumber);
        return;
    }

    let prior_amounts: Vec<f64> = ctx
        .history()
        .prior_claims
        .iter()
        .filter(|c| c.claimed_amount.currency() == amount.currency())
        .map(|c| c.claimed_amount.to_f64())
        .collect();
    let prior_mean = mean(&prior_amounts);

    let (severity, text) = match prior_mean {
        Some(avg) if avg > 0.0 && amount.to_f64() >= cfg.round_history_ratio * avg => (
            Severity::Medium,
            format!(
                "Claimed amount {} is a round figure and {:.1}x the claimant's average prior claim",
                amount,
                amount.to_f64() / avg
            ),
        ),
        _ => (
            Severity::Low,
            format!("Claimed amount {} is a suspiciously round figure", amount),
        ),
    };

    finding.triggered(
        FraudIndicator::new(IndicatorCode::RoundNumber, severity, text),
        cfg.round_number_weight,
    );
}

fn check_excessive_ratio(
    ctx: &ClaimContext,
    cfg: &AmountConfig,
    reference: ReferenceValue,
    finding: &mut FindingBuilder,
) {
    let amount = ctx.claim().claimed_amount;
    let ratio = match amount.ratio_to(&reference.value()) {
        Ok(ratio) => ratio,
        Err(e) => {
            finding.skipped(IndicatorCode::ExcessiveRatio, e.to_string());
            return;
        }
    };

    let severity = if ratio > cfg.excessive_ratio_critical {
        Severity::Critical
    } else if ratio > cfg.excessive_ratio_threshold {
        Severity::High
    } else {
        finding.passed(IndicatorCode::ExcessiveRatio);
        return;
    };

    finding.triggered(
        FraudIndicator::new(
            IndicatorCode::ExcessiveRatio,
            severity,
            format!(
                "Claimed amount is {:.2}x the {} vehicle value of {}",
                ratio,
                reference.label(),
                reference.value()
            ),
        ),
        cfg.excessive_ratio_weight,
    );
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
