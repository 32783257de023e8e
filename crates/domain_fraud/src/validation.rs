//! Claim validation rules
//!
//! Runs before any analysis module is scheduled. Errors abort the
//! evaluation; warnings are logged and the evaluation proceeds.
//!
//! # Validation Rules
//!
//! - Policy number, claimed amount and incident date must be present
//! - Claimed amount must be positive
//! - The policy snapshot must be for the claimed policy number
//! - Claim, coverage limit, deductible and insured value share one currency
//! - The history snapshot must belong to the claimant

use crate::context::{ClaimSubmission, HistorySnapshot, PolicySnapshot};

/// Result of claim validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    /// Non-fatal issues
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.is_valid = false;
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

/// Validator for incoming claim submissions
pub struct ClaimValidator;

impl ClaimValidator {
    /// Validates a submission together with the snapshots it will be evaluated against
    pub fn validate(
        submission: &ClaimSubmission,
        policy: &PolicySnapshot,
        history: &HistorySnapshot,
    ) -> ValidationResult {
        let mut result = ValidationResult::ok();

        Self::validate_required_fields(submission, &mut result);
        Self::validate_policy_match(submission, policy, &mut result);
        Self::validate_currencies(submission, policy, &mut result);

        if history.claimant_id != submission.claimant_id {
            result.add_error(format!(
                "history snapshot is for claimant {} but claim was filed by {}",
                history.claimant_id, submission.claimant_id
            ));
        }

        if submission.supporting_documents.is_empty() {
            result.add_warning("no supporting documents attached");
        }
        if submission.vehicle.is_none() {
            result.add_warning("no vehicle descriptor; vehicle valuation will be skipped");
        }
        if submission.incident_description.trim().is_empty() {
            result.add_warning("incident description is empty");
        }

        result
    }

    /// Problems with the fields every mandatory module depends on
    pub fn required_field_errors(submission: &ClaimSubmission) -> Vec<String> {
        let mut result = ValidationResult::ok();
        Self::validate_required_fields(submission, &mut result);
        result.errors
    }

    fn validate_required_fields(submission: &ClaimSubmission, result: &mut ValidationResult) {
        match submission.policy_number.as_deref().map(str::trim) {
            None | Some("") => result.add_error("policy number is required"),
            Some(_) => {}
        }

        match &submission.claimed_amount {
            None => result.add_error("claimed amount is required"),
            Some(amount) if !amount.is_positive() => {
                result.add_error(format!("claimed amount must be positive, got {}", amount))
            }
            Some(_) => {}
        }

        if submission.incident_date.is_none() {
            result.add_error("incident date is required");
        }
    }

    fn validate_policy_match(
        submission: &ClaimSubmission,
        policy: &PolicySnapshot,
        result: &mut ValidationResult,
    ) {
        if let Some(number) = submission.policy_number.as_deref().map(str::trim) {
            if !number.is_empty() && number != policy.policy_number {
                result.add_error(format!(
                    "claim references policy {} but snapshot is for policy {}",
                    number, policy.policy_number
                ));
            }
        }
    }

    fn validate_currencies(
        submission: &ClaimSubmission,
        policy: &PolicySnapshot,
        result: &mut ValidationResult,
    ) {
        let currency = policy.coverage_limit.currency();
        if policy.deductible.currency() != currency {
            result.add_error(format!(
                "policy deductible is in {} but coverage limit is in {}",
                policy.deductible.currency(),
                currency
            ));
        }
        if let Some(value) = &policy.insured_vehicle_value {
            if value.currency() != currency {
                result.add_error(format!(
                    "insured vehicle value is in {} but coverage limit is in {}",
                    value.currency(),
                    currency
                ));
            }
        }
        if let Some(amount) = &submission.claimed_amount {
            if amount.currency() != currency {
                result.add_error(format!(
                    "claimed amount is in {} but policy is written in {}",
                    amount.currency(),
                    currency
                ));
            }
        }
    }
}
