//! Vehicle-Value Analysis
//!
//! Asks the valuation collaborator for the vehicle's market value and flags
//! claims that approach or exceed it. The lookup is this module's whole
//! purpose, so a failed or slow lookup degrades the finding to `failed`.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::context::ClaimContext;
use crate::deadline::Deadline;
use crate::error::ModuleFailure;
use crate::finding::{Finding, FindingBuilder, ModuleId};
use crate::indicator::{FraudIndicator, IndicatorCode, Severity};
use crate::modules::{AnalysisModule, Applicability};
use crate::ports::VehicleValuationService;

const SERVICE: &str = "vehicle-valuation";

pub struct VehicleValueAnalysis {
    valuation: Arc<dyn VehicleValuationService>,
}

impl VehicleValueAnalysis {
    pub fn new(valuation: Arc<dyn VehicleValuationService>) -> Self {
        Self { valuation }
    }
}

#[async_trait]
impl AnalysisModule for VehicleValueAnalysis {
    fn id(&self) -> ModuleId {
        ModuleId::VEHICLE_VALUE
    }

    fn applicability(&self, ctx: &ClaimContext) -> Applicability {
        match ctx.claim().vehicle {
            Some(_) => Applicability::Applicable,
            None => Applicability::NotApplicable("claim has no vehicle descriptor".to_string()),
        }
    }

    async fn evaluate(&self, ctx: &ClaimContext, config: &EngineConfig, deadline: Deadline) -> Finding {
        let Some(vehicle) = ctx.claim().vehicle.as_ref() else {
            return Finding::skipped(self.id(), "claim has no vehicle descriptor");
        };

        let lookup = self.valuation.estimate_value(vehicle, deadline.remaining());
        let estimate = match tokio::time::timeout_at(deadline.instant(), lookup).await {
            Err(_) => {
                return Finding::failed(
                    self.id(),
                    ModuleFailure::ModuleTimeout {
                        budget_ms: deadline.budget_ms(),
                    },
                )
            }
            Ok(Err(e)) if e.is_timeout() => {
                return Finding::failed(
                    self.id(),
                    ModuleFailure::ModuleTimeout {
                        budget_ms: deadline.budget_ms(),
                    },
                )
            }
            Ok(Err(e)) => {
                return Finding::failed(self.id(), ModuleFailure::unavailable(SERVICE, e.to_string()))
            }
            Ok(Ok(value)) => value,
        };

        let amount = ctx.claim().claimed_amount;
        let ratio = match amount.ratio_to(&estimate) {
            Ok(ratio) => ratio,
            Err(e) => {
                return Finding::failed(
                    self.id(),
                    ModuleFailure::unavailable(SERVICE, format!("unusable estimate {}: {}", estimate, e)),
                )
            }
        };

        let cfg = &config.modules.vehicle_value;
        let mut finding = FindingBuilder::new(self.id());
        let severity = if ratio > cfg.high_ratio {
            Some(Severity::High)
        } else if ratio > cfg.mismatch_ratio {
            Some(Severity::Medium)
        } else {
            None
        };

        match severity {
            Some(severity) => {
                finding.triggered(
                    FraudIndicator::new(
                        IndicatorCode::ValueMismatch,
                        severity,
                        format!(
                            "Claimed amount {} is {:.0}% of the estimated {} {} {} value of {}",
                            amount,
                            ratio * 100.0,
                            vehicle.model_year,
                            vehicle.make,
                            vehicle.model,
                            estimate
                        ),
                    ),
                    cfg.weight,
                );
            }
            None => {
                finding.passed(IndicatorCode::ValueMismatch);
            }
        }

        finding.finish()
    }
}
