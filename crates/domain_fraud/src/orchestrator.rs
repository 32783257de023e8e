//! Orchestrator
//!
//! Runs every registered module against one [`ClaimContext`] and always
//! returns a [`FindingSet`] with exactly one finding per module, in registry
//! order.
//!
//! ```text
//!                ┌─► amount ─────────┐
//!                ├─► incident_detail ┤
//! ClaimContext ──┼─► timing ─────────┼──► FindingSet
//!                ├─► vehicle_value ──┤
//!                └─► claim_history ──┘
//! ```
//!
//! Applicable modules are spawned as independent tasks sharing the context
//! through an `Arc`. Results are collected against one absolute deadline;
//! a task still running at the deadline is aborted and recorded as timed out.

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::EngineConfig;
use crate::context::ClaimContext;
use crate::deadline::Deadline;
use crate::error::ModuleFailure;
use crate::finding::{Finding, FindingSet, ModuleId};
use crate::modules::{Applicability, ModuleRegistry};

enum Slot {
    Ready(Finding),
    Running(JoinHandle<Finding>),
}

pub struct Orchestrator<'a> {
    registry: &'a ModuleRegistry,
    degraded: BTreeMap<ModuleId, ModuleFailure>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(registry: &'a ModuleRegistry) -> Self {
        Self {
            registry,
            degraded: BTreeMap::new(),
        }
    }

    /// Records a module as failed without scheduling it
    ///
    /// Used when the data a module depends on could not be fetched while the
    /// context was being assembled.
    pub fn with_degraded(mut self, module: ModuleId, failure: ModuleFailure) -> Self {
        self.degraded.insert(module, failure);
        self
    }

    #[tracing::instrument(skip_all, fields(claim_id = %ctx.claim_id(), modules = self.registry.len()))]
    pub async fn run(
        &self,
        ctx: Arc<ClaimContext>,
        config: Arc<EngineConfig>,
        deadline: Deadline,
    ) -> FindingSet {
        let mut slots: Vec<(ModuleId, Slot)> = Vec::with_capacity(self.registry.len());

        for module in self.registry.iter() {
            let id = module.id();

            if let Some(failure) = self.degraded.get(&id) {
                slots.push((id.clone(), Slot::Ready(Finding::failed(id, failure.clone()))));
                continue;
            }

            match module.applicability(&ctx) {
                Applicability::NotApplicable(reason) => {
                    tracing::debug!(module = %id, %reason, "module not applicable");
                    slots.push((id.clone(), Slot::Ready(Finding::skipped(id, reason))));
                }
                Applicability::Applicable => {
                    let module = Arc::clone(module);
                    let ctx = Arc::clone(&ctx);
                    let config = Arc::clone(&config);
                    let handle =
                        tokio::spawn(async move { module.evaluate(&ctx, &config, deadline).await });
                    slots.push((id, Slot::Running(handle)));
                }
            }
        }

        let mut findings = Vec::with_capacity(slots.len());
        for (id, slot) in slots {
            let finding = match slot {
                Slot::Ready(finding) => finding,
                Slot::Running(handle) => collect(id, handle, deadline).await,
            };

            if finding.status.is_ok() {
                tracing::debug!(
                    module = %finding.module,
                    contribution = finding.contribution,
                    indicators = finding.indicators.len(),
                    "module finished"
                );
            } else if finding.status.is_failed() {
                tracing::warn!(module = %finding.module, status = ?finding.status, "module degraded");
            }
            findings.push(finding);
        }

        FindingSet::new(findings)
    }
}

async fn collect(id: ModuleId, mut handle: JoinHandle<Finding>, deadline: Deadline) -> Finding {
    match tokio::time::timeout_at(deadline.instant(), &mut handle).await {
        Ok(Ok(finding)) if finding.module == id => finding,
        Ok(Ok(finding)) => Finding::failed(
            id,
            ModuleFailure::aborted(format!("module returned a finding for {}", finding.module)),
        ),
        Ok(Err(join_error)) => {
            let message = if join_error.is_panic() {
                "module task panicked"
            } else {
                "module task was cancelled"
            };
            Finding::failed(id, ModuleFailure::aborted(message))
        }
        Err(_) => {
            handle.abort();
            Finding::failed(
                id,
                ModuleFailure::ModuleTimeout {
                    budget_ms: deadline.budget_ms(),
                },
            )
        }
    }
}
