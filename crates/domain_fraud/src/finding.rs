//! Findings
//!
//! A [`Finding`] is the output of one analysis module for one claim. The
//! orchestrator collects exactly one per registered module into a
//! [`FindingSet`], including modules that were skipped or failed, so the set
//! doubles as an audit record of what ran.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use crate::error::ModuleFailure;
use crate::indicator::{FraudIndicator, IndicatorCode, Severity};

/// Identifier of an analysis module
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(Cow<'static, str>);

impl ModuleId {
    pub const AMOUNT: ModuleId = ModuleId(Cow::Borrowed("amount"));
    pub const INCIDENT_DETAIL: ModuleId = ModuleId(Cow::Borrowed("incident_detail"));
    pub const TIMING: ModuleId = ModuleId(Cow::Borrowed("timing"));
    pub const VEHICLE_VALUE: ModuleId = ModuleId(Cow::Borrowed("vehicle_value"));
    pub const CLAIM_HISTORY: ModuleId = ModuleId(Cow::Borrowed("claim_history"));

    /// Identifier for a module registered outside the standard set
    pub fn custom(name: impl Into<String>) -> Self {
        ModuleId(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a module produced a usable result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FindingStatus {
    Ok,
    Skipped { reason: String },
    Failed { failure: ModuleFailure },
}

impl FindingStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, FindingStatus::Ok)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FindingStatus::Failed { .. })
    }

    /// Short label used in decision summaries
    pub fn label(&self) -> &'static str {
        match self {
            FindingStatus::Ok => "ok",
            FindingStatus::Skipped { .. } => "skipped",
            FindingStatus::Failed { failure } if failure.is_timeout() => "timed_out",
            FindingStatus::Failed { .. } => "failed",
        }
    }
}

/// Outcome of one sub-check inside a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckOutcome {
    Passed,
    Triggered,
    Skipped { reason: String },
}

/// Audit entry for a sub-check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubCheck {
    pub name: IndicatorCode,
    #[serde(flatten)]
    pub outcome: CheckOutcome,
}

/// One module's scored, explained output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub module: ModuleId,
    /// Contribution in [0.0, 1.0]
    pub contribution: f64,
    pub indicators: Vec<FraudIndicator>,
    pub checks: Vec<SubCheck>,
    pub status: FindingStatus,
}

impl Finding {
    /// A finding for a module that did not apply to this claim
    pub fn skipped(module: ModuleId, reason: impl Into<String>) -> Self {
        Self {
            module,
            contribution: 0.0,
            indicators: Vec::new(),
            checks: Vec::new(),
            status: FindingStatus::Skipped {
                reason: reason.into(),
            },
        }
    }

    /// A zero-contribution finding for a module that could not complete
    pub fn failed(module: ModuleId, failure: ModuleFailure) -> Self {
        Self {
            module,
            contribution: 0.0,
            indicators: Vec::new(),
            checks: Vec::new(),
            status: FindingStatus::Failed { failure },
        }
    }

    /// Contribution that counts toward the aggregate
    pub fn effective_contribution(&self) -> f64 {
        if self.status.is_ok() {
            self.contribution
        } else {
            0.0
        }
    }

    pub fn highest_severity(&self) -> Option<Severity> {
        self.indicators.iter().map(|i| i.severity).max()
    }

    pub fn check(&self, name: IndicatorCode) -> Option<&CheckOutcome> {
        self.checks.iter().find(|c| c.name == name).map(|c| &c.outcome)
    }
}

/// Accumulates sub-check results into a [`Finding`]
///
/// Each triggered indicator adds `weight × severity` to the running sum; the
/// finished contribution is clamped to [0.0, 1.0].
#[derive(Debug)]
pub struct FindingBuilder {
    module: ModuleId,
    sum: f64,
    indicators: Vec<FraudIndicator>,
    checks: Vec<SubCheck>,
}

impl FindingBuilder {
    pub fn new(module: ModuleId) -> Self {
        Self {
            module,
            sum: 0.0,
            indicators: Vec::new(),
            checks: Vec::new(),
        }
    }

    pub fn triggered(&mut self, indicator: FraudIndicator, weight: f64) -> &mut Self {
        self.sum += weight.max(0.0) * indicator.severity.value();
        self.checks.push(SubCheck {
            name: indicator.code,
            outcome: CheckOutcome::Triggered,
        });
        self.indicators.push(indicator);
        self
    }

    pub fn passed(&mut self, name: IndicatorCode) -> &mut Self {
        self.checks.push(SubCheck {
            name,
            outcome: CheckOutcome::Passed,
        });
        self
    }

    pub fn skipped(&mut self, name: IndicatorCode, reason: impl Into<String>) -> &mut Self {
        self.checks.push(SubCheck {
            name,
            outcome: CheckOutcome::Skipped {
                reason: reason.into(),
            },
        });
        self
    }

    pub fn finish(self) -> Finding {
        let contribution = if self.sum.is_finite() {
            self.sum.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Finding {
            module: self.module,
            contribution,
            indicators: self.indicators,
            checks: self.checks,
            status: FindingStatus::Ok,
        }
    }
}

/// Ordered collection of findings, one per registered module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FindingSet(Vec<Finding>);

impl FindingSet {
    pub fn new(findings: Vec<Finding>) -> Self {
        Self(findings)
    }

    pub fn get(&self, module: &ModuleId) -> Option<&Finding> {
        self.0.iter().find(|f| &f.module == module)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Finding> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn failed_modules(&self) -> impl Iterator<Item = &ModuleId> {
        self.0
            .iter()
            .filter(|f| f.status.is_failed())
            .map(|f| &f.module)
    }

    /// Position of a module in registry order
    pub fn position(&self, module: &ModuleId) -> Option<usize> {
        self.0.iter().position(|f| &f.module == module)
    }
}

impl<'a> IntoIterator for &'a FindingSet {
    type Item = &'a Finding;
    type IntoIter = std::slice::Iter<'a, Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
