//! Timing Analysis
//!
//! Compares the incident and submission dates with the policy term and the
//! claimant's usual filing latency. "Filed" always means the submission date.
//! Weekend and holiday-season checks look at the incident date only.

use async_trait::async_trait;
use chrono::{Datelike, Weekday};

use crate::config::{EngineConfig, TimingConfig};
use crate::context::ClaimContext;
use crate::deadline::Deadline;
use crate::finding::{Finding, FindingBuilder, ModuleId};
use crate::indicator::{FraudIndicator, IndicatorCode, Severity};
use crate::modules::amount::mean;
use crate::modules::AnalysisModule;

#[derive(Debug, Clone, Copy, Default)]
pub struct TimingAnalysis;

#[async_trait]
impl AnalysisModule for TimingAnalysis {
    fn id(&self) -> ModuleId {
        ModuleId::TIMING
    }

    async fn evaluate(&self, ctx: &ClaimContext, config: &EngineConfig, _deadline: Deadline) -> Finding {
        let cfg = &config.modules.timing;
        let mut finding = FindingBuilder::new(self.id());

        check_date_order(ctx, cfg, &mut finding);
        check_policy_term(ctx, cfg, &mut finding);
        check_filing_latency(ctx, cfg, &mut finding);
        check_calendar(ctx, cfg, &mut finding);

        finding.finish()
    }
}

fn check_date_order(ctx: &ClaimContext, cfg: &TimingConfig, finding: &mut FindingBuilder) {
    let claim = ctx.claim();
    let inception = ctx.policy().term.start;

    if claim.incident_date < inception {
        finding.triggered(
            FraudIndicator::new(
                IndicatorCode::IncidentBeforeInception,
                Severity::Critical,
                format!(
                    "Incident on {} predates policy inception on {}",
                    claim.incident_date, inception
                ),
            ),
            cfg.before_inception_weight,
        );
    } else {
        finding.passed(IndicatorCode::IncidentBeforeInception);
    }

    if claim.incident_date > claim.submission_date {
        finding.triggered(
            FraudIndicator::new(
                IndicatorCode::FutureIncident,
                Severity::Critical,
                format!(
                    "Incident dated {} is after the claim submission on {}",
                    claim.incident_date, claim.submission_date
                ),
            ),
            cfg.future_incident_weight,
        );
    } else {
        finding.passed(IndicatorCode::FutureIncident);
    }
}

fn check_policy_term(ctx: &ClaimContext, cfg: &TimingConfig, finding: &mut FindingBuilder) {
    let filed = ctx.claim().submission_date;
    let policy = ctx.policy();

    let since_inception = policy.days_since_inception(filed);
    if (0..=cfg.new_policy_days).contains(&since_inception) {
        let severity = if since_inception <= cfg.new_policy_critical_days {
            Severity::Critical
        } else {
            Severity::High
        };
        finding.triggered(
            FraudIndicator::new(
                IndicatorCode::NewPolicyClaim,
                severity,
                format!(
                    "Claim filed {} days after policy inception on {}",
                    since_inception, policy.term.start
                ),
            ),
            cfg.new_policy_weight,
        );
    } else {
        finding.passed(IndicatorCode::NewPolicyClaim);
    }

    let until_expiry = policy.days_until_expiry(filed);
    if (0..=cfg.near_expiry_days).contains(&until_expiry) {
        finding.triggered(
            FraudIndicator::new(
                IndicatorCode::NearExpiryClaim,
                Severity::Medium,
                format!(
                    "Claim filed {} days before policy expiration on {}",
                    until_expiry, policy.term.end
                ),
            ),
            cfg.near_expiry_weight,
        );
    } else {
        finding.passed(IndicatorCode::NearExpiryClaim);
    }
}

fn check_filing_latency(ctx: &ClaimContext, cfg: &TimingConfig, finding: &mut FindingBuilder) {
    let latency = ctx.claim().filing_latency_days();
    if latency < 0 {
        finding.skipped(IndicatorCode::DelayedFiling, "incident is dated after submission");
        return;
    }

    let prior: Vec<f64> = ctx
        .history()
        .prior_claims
        .iter()
        .map(|c| c.filing_latency_days())
        .filter(|days| *days >= 0)
        .map(|days| days as f64)
        .collect();
    let threshold = latency_threshold(&prior, cfg);

    if latency as f64 > threshold {
        finding.triggered(
            FraudIndicator::new(
                IndicatorCode::DelayedFiling,
                Severity::Medium,
                format!(
                    "Claim filed {} days after the incident, beyond the expected {:.0} days",
                    latency, threshold
                ),
            ),
            cfg.delayed_filing_weight,
        );
    } else {
        finding.passed(IndicatorCode::DelayedFiling);
    }
}

fn check_calendar(ctx: &ClaimContext, cfg: &TimingConfig, finding: &mut FindingBuilder) {
    let incident = ctx.claim().incident_date;

    if matches!(incident.weekday(), Weekday::Sat | Weekday::Sun) {
        finding.triggered(
            FraudIndicator::new(
                IndicatorCode::WeekendIncident,
                Severity::Low,
                format!("Incident on {} fell on a {}", incident, incident.format("%A")),
            ),
            cfg.weekend_weight,
        );
    } else {
        finding.passed(IndicatorCode::WeekendIncident);
    }

    match cfg.holiday_seasons.iter().find(|season| season.contains(incident)) {
        Some(season) => {
            finding.triggered(
                FraudIndicator::new(
                    IndicatorCode::HolidaySeasonIncident,
                    Severity::Low,
                    format!("Incident on {} fell in the {} season", incident, season.label),
                ),
                cfg.holiday_weight,
            );
        }
        None => {
            finding.passed(IndicatorCode::HolidaySeasonIncident);
        }
    }
}

/// `max(min_days, mean + k·stddev)` of prior latencies; two or more priors needed
fn latency_threshold(prior: &[f64], cfg: &TimingConfig) -> f64 {
    let floor = cfg.delayed_filing_min_days as f64;
    if prior.len() < 2 {
        return floor;
    }
    let Some(avg) = mean(prior) else {
        return floor;
    };
    let variance = prior.iter().map(|d| (d - avg).powi(2)).sum::<f64>() / prior.len() as f64;
    floor.max(avg + cfg.delayed_filing_stddev_factor * variance.sqrt())
}
