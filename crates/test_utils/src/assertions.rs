//! Custom Assertion Helpers
//!
//! Assertions over decisions and findings with messages that name the
//! claim state involved.

use domain_fraud::{
    Decision, DecisionOutcome, EngineConfig, FindingSet, IndicatorCode, ModuleId, RiskScore,
    Severity,
};

/// Asserts the score is in [0, 1] and its level matches the configured bands
pub fn assert_score_consistent(score: &RiskScore, config: &EngineConfig) {
    assert!(
        (0.0..=1.0).contains(&score.value),
        "Risk score {} outside [0, 1]",
        score.value
    );
    let expected = config.aggregation.bands.level_for(score.value);
    assert_eq!(
        score.level, expected,
        "Risk score {} labelled {} but bands give {}",
        score.value, score.level, expected
    );
}

pub fn assert_outcome(decision: &Decision, expected: DecisionOutcome) {
    assert_eq!(
        decision.outcome, expected,
        "Expected {} but got {} (score {}, reasoning: {})",
        expected, decision.outcome, decision.risk_score.value, decision.reasoning
    );
}

/// Asserts the decision carries the indicator, optionally at a given severity
pub fn assert_has_indicator(decision: &Decision, code: IndicatorCode, severity: Option<Severity>) {
    let found = decision
        .risk_score
        .indicator(code)
        .unwrap_or_else(|| panic!("Expected indicator {} in: {}", code, decision.reasoning));
    if let Some(expected) = severity {
        assert_eq!(
            found.indicator.severity, expected,
            "Indicator {} has severity {} but expected {}",
            code, found.indicator.severity, expected
        );
    }
}

pub fn assert_lacks_indicator(decision: &Decision, code: IndicatorCode) {
    assert!(
        decision.risk_score.indicator(code).is_none(),
        "Indicator {} unexpectedly present: {}",
        code,
        decision.reasoning
    );
}

/// Asserts a module's finding reports the given status label
/// (`ok`, `skipped`, `timed_out`, `failed`)
pub fn assert_module_status(findings: &FindingSet, module: &ModuleId, label: &str) {
    let finding = findings
        .get(module)
        .unwrap_or_else(|| panic!("No finding for module {}", module.as_str()));
    assert_eq!(
        finding.status.label(),
        label,
        "Module {} has status {:?}",
        module.as_str(),
        finding.status
    );
}

/// Asserts every indicator on the decision is named in its reasoning
pub fn assert_reasoning_covers_indicators(decision: &Decision) {
    for aggregated in &decision.risk_score.indicators {
        assert!(
            decision.reasoning.contains(&aggregated.indicator.text),
            "Reasoning omits {}: {}",
            aggregated.indicator.code,
            decision.reasoning
        );
    }
}
