//! Incident-Detail Analysis
//!
//! Lexical heuristics over the incident description. Phrase lists come from
//! configuration; matching is on whole words after normalization.
//!
//! Amount thresholds are `Money`; a claim in another currency skips the
//! amount-dependent part of a check instead of comparing raw numbers.

use async_trait::async_trait;

use crate::config::{EngineConfig, IncidentConfig};
use crate::context::ClaimContext;
use crate::deadline::Deadline;
use crate::finding::{Finding, FindingBuilder, ModuleId};
use crate::indicator::{FraudIndicator, IndicatorCode, Severity};
use crate::modules::{contains_phrase, normalize_text, AnalysisModule};

#[derive(Debug, Clone, Copy, Default)]
pub struct IncidentDetailAnalysis;

#[async_trait]
impl AnalysisModule for IncidentDetailAnalysis {
    fn id(&self) -> ModuleId {
        ModuleId::INCIDENT_DETAIL
    }

    async fn evaluate(&self, ctx: &ClaimContext, config: &EngineConfig, _deadline: Deadline) -> Finding {
        let cfg = &config.modules.incident;
        let description = ctx.claim().incident_description.as_str();
        let normalized = normalize_text(description);
        let mut finding = FindingBuilder::new(self.id());

        check_minor_damage(ctx, cfg, description, &normalized, &mut finding);
        check_suspicious_markers(cfg, description, &normalized, &mut finding);
        check_parking_lot(ctx, cfg, &normalized, &mut finding);

        finding.finish()
    }
}

fn check_minor_damage(
    ctx: &ClaimContext,
    cfg: &IncidentConfig,
    description: &str,
    normalized: &str,
    finding: &mut FindingBuilder,
) {
    let amount = ctx.claim().claimed_amount;
    match cfg.high_claim_amount.exceeds(&amount) {
        Ok(true) => {
            finding.passed(IndicatorCode::MinorDamageHighClaim);
            return;
        }
        Ok(false) => {}
        Err(e) => {
            finding.skipped(IndicatorCode::MinorDamageHighClaim, e.to_string());
            return;
        }
    }

    let word_count = description.split_whitespace().count();
    let minor_terms: Vec<&str> = cfg
        .minor_damage_phrases
        .iter()
        .map(String::as_str)
        .filter(|phrase| contains_phrase(normalized, phrase))
        .collect();
    let low_information = word_count < cfg.min_description_words;

    if !low_information && minor_terms.is_empty() {
        finding.passed(IndicatorCode::MinorDamageHighClaim);
        return;
    }

    // same currency as high_claim_amount, checked by config validation
    let severity = if matches!(cfg.very_high_claim_amount.exceeds(&amount), Ok(false)) {
        Severity::High
    } else {
        Severity::Medium
    };
    let text = if minor_terms.is_empty() {
        format!(
            "Brief {}-word incident description for a claim of {}",
            word_count, amount
        )
    } else {
        format!(
            "Description suggests minor damage ({}) but {} is claimed",
            minor_terms.join(", "),
            amount
        )
    };

    finding.triggered(
        FraudIndicator::new(IndicatorCode::MinorDamageHighClaim, severity, text),
        cfg.minor_damage_weight,
    );
}

fn check_suspicious_markers(
    cfg: &IncidentConfig,
    description: &str,
    normalized: &str,
    finding: &mut FindingBuilder,
) {
    let mut markers: Vec<String> = cfg
        .suspicious_phrases
        .iter()
        .filter(|phrase| contains_phrase(normalized, phrase))
        .map(|phrase| format!("\"{}\"", phrase))
        .collect();
    markers.dedup();

    if shouted_words(description) > cfg.max_shouted_words {
        markers.push("excessive capitalization".to_string());
    }

    if markers.is_empty() {
        finding.passed(IndicatorCode::SuspiciousDescription);
        return;
    }

    let severity = if markers.len() >= cfg.markers_for_high {
        Severity::High
    } else {
        Severity::Medium
    };

    finding.triggered(
        FraudIndicator::new(
            IndicatorCode::SuspiciousDescription,
            severity,
            format!(
                "Incident description contains staged-incident markers: {}",
                markers.join(", ")
            ),
        ),
        cfg.suspicious_weight,
    );
}

fn check_parking_lot(
    ctx: &ClaimContext,
    cfg: &IncidentConfig,
    normalized: &str,
    finding: &mut FindingBuilder,
) {
    let Some(phrase) = cfg
        .parking_lot_phrases
        .iter()
        .find(|phrase| contains_phrase(normalized, phrase))
    else {
        finding.passed(IndicatorCode::ParkingLotIncident);
        return;
    };

    let amount = ctx.claim().claimed_amount;
    let severity = match (
        amount.exceeds(&cfg.parking_very_high_amount),
        amount.exceeds(&cfg.high_claim_amount),
    ) {
        (Ok(true), _) => Severity::High,
        (_, Ok(true)) => Severity::Medium,
        _ => Severity::Low,
    };
    let text = if severity == Severity::Low {
        format!("Incident reported in a {}", phrase)
    } else {
        format!("Incident reported in a {} with a claim of {}", phrase, amount)
    };

    finding.triggered(
        FraudIndicator::new(IndicatorCode::ParkingLotIncident, severity, text),
        cfg.parking_lot_weight,
    );
}

/// Words of four or more letters written entirely in capitals
fn shouted_words(description: &str) -> usize {
    description
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphabetic()))
        .filter(|word| word.chars().count() >= 4 && word.chars().all(|c| c.is_uppercase()))
        .count()
}
