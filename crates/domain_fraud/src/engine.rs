//! Evaluation entry point
//!
//! [`ClaimEvaluator`] ties the pipeline together:
//!
//! ```text
//! submission ─► validate ─► ClaimContext ─► Orchestrator ─► RiskAggregator ─► DecisionEngine ─► Decision
//! ```
//!
//! The evaluator holds only its module registry, so one instance can serve
//! any number of concurrent evaluations.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use core_kernel::DateWindow;

use crate::aggregator::RiskAggregator;
use crate::config::EngineConfig;
use crate::context::{ClaimContext, ClaimSubmission, HistorySnapshot, PolicySnapshot};
use crate::deadline::Deadline;
use crate::decision::{Decision, DecisionEngine};
use crate::error::{FraudError, ModuleFailure};
use crate::finding::{FindingSet, ModuleId};
use crate::modules::ModuleRegistry;
use crate::orchestrator::Orchestrator;
use crate::ports::{ClaimsHistoryService, PolicyService, VehicleValuationService};
use crate::validation::ClaimValidator;

/// Everything produced by one evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub findings: FindingSet,
    pub decision: Decision,
}

#[derive(Debug, Clone)]
pub struct ClaimEvaluator {
    registry: ModuleRegistry,
}

impl ClaimEvaluator {
    pub fn new(registry: ModuleRegistry) -> Self {
        Self { registry }
    }

    /// Evaluator running the five standard modules
    pub fn with_valuation(valuation: Arc<dyn VehicleValuationService>) -> Self {
        Self::new(ModuleRegistry::standard(valuation))
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Evaluates a claim and returns its decision
    ///
    /// # Errors
    ///
    /// - [`FraudError::Validation`] when amount, incident date or policy
    ///   number is missing, or the snapshots do not match the claim
    /// - [`FraudError::AggregationInvariantViolation`] when module weights are
    ///   inconsistent with the registry or a score leaves [0, 1]
    /// - [`FraudError::InvalidConfiguration`] for out-of-range settings
    pub async fn evaluate_claim(
        &self,
        submission: ClaimSubmission,
        policy: PolicySnapshot,
        history: HistorySnapshot,
        config: &EngineConfig,
    ) -> Result<Decision, FraudError> {
        Ok(self.evaluate(submission, policy, history, config).await?.decision)
    }

    /// Like [`evaluate_claim`](Self::evaluate_claim) but also returns the findings
    pub async fn evaluate(
        &self,
        submission: ClaimSubmission,
        policy: PolicySnapshot,
        history: HistorySnapshot,
        config: &EngineConfig,
    ) -> Result<Evaluation, FraudError> {
        self.run(submission, policy, history, config, None).await
    }

    /// Fetches the policy and claims history through collaborators, then evaluates
    ///
    /// A missing policy is reported as [`FraudError::PolicyNotFound`]. A failed
    /// history lookup does not abort: the claim is evaluated with an empty
    /// history and Claim-History Analysis is recorded as failed.
    #[tracing::instrument(skip_all, fields(claim_id = %submission.claim_id))]
    pub async fn evaluate_with_lookups(
        &self,
        submission: ClaimSubmission,
        policies: &dyn PolicyService,
        histories: &dyn ClaimsHistoryService,
        config: &EngineConfig,
    ) -> Result<Evaluation, FraudError> {
        config.validate()?;

        let missing = ClaimValidator::required_field_errors(&submission);
        if !missing.is_empty() {
            return Err(FraudError::Validation(missing));
        }
        let policy_number = submission
            .policy_number
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        let budget = Duration::from_millis(config.evaluation_timeout_ms);
        let policy = match tokio::time::timeout(budget, policies.get_policy(&policy_number)).await {
            Ok(Ok(policy)) => policy,
            Ok(Err(e)) if e.is_not_found() => return Err(FraudError::PolicyNotFound(policy_number)),
            Ok(Err(e)) => return Err(FraudError::Collaborator(e)),
            Err(_) => {
                return Err(FraudError::Collaborator(core_kernel::PortError::timeout(
                    "get_policy",
                    config.evaluation_timeout_ms,
                )))
            }
        };

        let window = DateWindow::trailing(submission.submission_date, config.modules.history.window_days)
            .map_err(|e| FraudError::validation(format!("cannot build history window: {}", e)))?;

        let lookup = histories.get_history(submission.claimant_id, window);
        let (history, degraded) = match tokio::time::timeout(budget, lookup).await {
            Ok(Ok(history)) => (history, None),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "claims history unavailable, evaluating without it");
                let failure = if e.is_timeout() {
                    ModuleFailure::ModuleTimeout {
                        budget_ms: config.evaluation_timeout_ms,
                    }
                } else {
                    ModuleFailure::unavailable("claims-history", e.to_string())
                };
                (HistorySnapshot::empty(submission.claimant_id, window), Some(failure))
            }
            Err(_) => {
                tracing::warn!("claims history lookup timed out, evaluating without it");
                (
                    HistorySnapshot::empty(submission.claimant_id, window),
                    Some(ModuleFailure::ModuleTimeout {
                        budget_ms: config.evaluation_timeout_ms,
                    }),
                )
            }
        };

        self.run(submission, policy, history, config, degraded).await
    }

    #[tracing::instrument(skip_all, fields(claim_id = %submission.claim_id))]
    async fn run(
        &self,
        submission: ClaimSubmission,
        policy: PolicySnapshot,
        history: HistorySnapshot,
        config: &EngineConfig,
        history_failure: Option<ModuleFailure>,
    ) -> Result<Evaluation, FraudError> {
        config.validate()?;
        let aggregator = RiskAggregator::new(&config.aggregation);
        aggregator.check_weights(&self.registry.ids())?;

        let ctx = ClaimContext::assemble(submission, policy, history)?;
        let claim_id = ctx.claim_id();
        let product_code = ctx.policy().product_code.clone();

        let mut orchestrator = Orchestrator::new(&self.registry);
        if let Some(failure) = history_failure {
            orchestrator = orchestrator.with_degraded(ModuleId::CLAIM_HISTORY, failure);
        }

        let deadline = Deadline::after_ms(config.evaluation_timeout_ms);
        let findings = orchestrator
            .run(Arc::new(ctx), Arc::new(config.clone()), deadline)
            .await;

        let score = aggregator.aggregate(&findings)?;
        let policy = config.decision.policy_for(&product_code);
        let decision = DecisionEngine::new(policy).decide(claim_id, score, &findings);

        tracing::info!(
            claim_id = %claim_id,
            outcome = %decision.outcome,
            score = decision.risk_score.value,
            level = %decision.risk_score.level,
            indicators = decision.triggering_indicators.len(),
            "claim evaluated"
        );

        Ok(Evaluation { findings, decision })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::DecisionOutcome;
    use crate::testing::{history, policy, submission, FixedValuation};

    fn evaluator() -> ClaimEvaluator {
        ClaimEvaluator::with_valuation(Arc::new(FixedValuation::usd(4_000)))
    }

    #[tokio::test]
    async fn test_clean_claim_is_approved() {
        let sub = submission(1_200);
        let hist = history(&sub);
        let decision = evaluator()
            .evaluate_claim(sub, policy(20_000), hist, &EngineConfig::default())
            .await
            .unwrap();
        assert_eq!(decision.outcome, DecisionOutcome::Approve);
        assert_eq!(decision.module_statuses.len(), 5);
    }

    #[tokio::test]
    async fn test_validation_error_before_modules_run() {
        let mut sub = submission(1_200);
        sub.incident_date = None;
        let hist = history(&sub);
        let err = evaluator()
            .evaluate_claim(sub, policy(20_000), hist, &EngineConfig::default())
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_bad_weights_are_fatal() {
        let config = EngineConfig::default().with_module_weight(&ModuleId::TIMING, 0.5);
        let sub = submission(1_200);
        let hist = history(&sub);
        let err = evaluator()
            .evaluate_claim(sub, policy(20_000), hist, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, FraudError::AggregationInvariantViolation(_)));
    }

    #[tokio::test]
    async fn test_product_override_applies() {
        let mut config = EngineConfig::default();
        config.decision.product_overrides.insert(
            "personal_auto".to_string(),
            crate::config::DecisionPolicy {
                review_on_critical: false,
                review_from_level: crate::aggregator::RiskLevel::Critical,
                ..Default::default()
            },
        );
        let sub = submission(50_000);
        let hist = history(&sub);
        let decision = evaluator()
            .evaluate_claim(sub, policy(20_000), hist, &config)
            .await
            .unwrap();
        assert_eq!(decision.outcome, DecisionOutcome::Approve);
    }
}
