//! Analysis modules
//!
//! Each module is an independent, stateless check over a [`ClaimContext`].
//! Modules never see each other's findings; the orchestrator runs them
//! concurrently and the aggregator combines their results.
//!
//! New checks are added by implementing [`AnalysisModule`] and registering
//! the module together with a weight in the aggregation config.

pub mod amount;
pub mod history;
pub mod incident;
pub mod timing;
pub mod vehicle_value;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::context::ClaimContext;
use crate::deadline::Deadline;
use crate::error::FraudError;
use crate::finding::{Finding, ModuleId};
use crate::ports::VehicleValuationService;

pub use amount::AmountAnalysis;
pub use history::ClaimHistoryAnalysis;
pub use incident::IncidentDetailAnalysis;
pub use timing::TimingAnalysis;
pub use vehicle_value::VehicleValueAnalysis;

/// Whether a module should run for a given claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applicability {
    Applicable,
    NotApplicable(String),
}

/// A single fraud check
#[async_trait]
pub trait AnalysisModule: Send + Sync + 'static {
    fn id(&self) -> ModuleId;

    /// Declarative routing predicate, evaluated once per claim before scheduling
    fn applicability(&self, _ctx: &ClaimContext) -> Applicability {
        Applicability::Applicable
    }

    /// Produces this module's finding
    ///
    /// Must not outlive `deadline`; the orchestrator abandons the module and
    /// records a timeout if it does.
    async fn evaluate(&self, ctx: &ClaimContext, config: &EngineConfig, deadline: Deadline) -> Finding;
}

/// Ordered set of modules scheduled for every evaluation
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    modules: Vec<Arc<dyn AnalysisModule>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The five standard modules, using `valuation` for vehicle value estimates
    ///
    /// Amount and Vehicle-Value Analysis share the one valuation collaborator.
    pub fn standard(valuation: Arc<dyn VehicleValuationService>) -> Self {
        Self {
            modules: vec![
                Arc::new(AmountAnalysis::new(Arc::clone(&valuation))),
                Arc::new(IncidentDetailAnalysis),
                Arc::new(TimingAnalysis),
                Arc::new(VehicleValueAnalysis::new(valuation)),
                Arc::new(ClaimHistoryAnalysis),
            ],
        }
    }

    /// Adds a module
    ///
    /// # Errors
    ///
    /// Fails when a module with the same id is already registered.
    pub fn register(&mut self, module: Arc<dyn AnalysisModule>) -> Result<(), FraudError> {
        let id = module.id();
        if self.modules.iter().any(|m| m.id() == id) {
            return Err(FraudError::configuration(format!(
                "module {} is already registered",
                id
            )));
        }
        self.modules.push(module);
        Ok(())
    }

    pub fn with(mut self, module: Arc<dyn AnalysisModule>) -> Result<Self, FraudError> {
        self.register(module)?;
        Ok(self)
    }

    pub fn ids(&self) -> Vec<ModuleId> {
        self.modules.iter().map(|m| m.id()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn AnalysisModule>> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.ids())
            .finish()
    }
}

/// Lowercases, strips apostrophes and replaces punctuation with spaces, padding
/// both ends so phrases can be matched on word boundaries as `" phrase "`.
pub(crate) fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(' ');
    let mut last_space = true;
    for ch in text.chars() {
        if ch == '\'' || ch == '\u{2019}' {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            last_space = false;
        } else if !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    if !last_space {
        out.push(' ');
    }
    out
}

/// True when `normalized` (from [`normalize_text`]) contains `phrase` as whole words
pub(crate) fn contains_phrase(normalized: &str, phrase: &str) -> bool {
    let needle = normalize_text(phrase);
    !needle.trim().is_empty() && normalized.contains(&needle)
}
