//! Command Line Interface
//!
//! Evaluates claim bundles read from JSON files against the fraud engine,
//! using the in-memory collaborators and the offline valuation catalogue.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_cli::{bundle::ClaimBundle, config::CliConfig, run_bundle};
//!
//! let config = CliConfig::load(None)?;
//! let bundle = ClaimBundle::from_path("claim.json")?;
//! let evaluation = run_bundle(&bundle, &config).await?;
//! ```

pub mod bundle;
pub mod config;

use std::sync::Arc;

use chrono::Datelike;
use domain_fraud::adapters::CatalogueValuationService;
use domain_fraud::{ClaimEvaluator, Evaluation, FraudError};

use crate::bundle::ClaimBundle;
use crate::config::CliConfig;

/// Evaluates one bundle with collaborators built from its contents
///
/// Vehicle values are estimated as of `valuation_year`, or the submission
/// year when unset.
pub async fn run_bundle(bundle: &ClaimBundle, config: &CliConfig) -> Result<Evaluation, FraudError> {
    let as_of_year = config
        .valuation_year
        .unwrap_or_else(|| bundle.submission.submission_date.year());
    let evaluator = ClaimEvaluator::with_valuation(Arc::new(CatalogueValuationService::standard(as_of_year)));

    evaluator
        .evaluate_with_lookups(
            bundle.submission.clone(),
            &bundle.policy_service(),
            &bundle.history_service(),
            &config.engine,
        )
        .await
}
