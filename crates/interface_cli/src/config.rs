//! CLI configuration

use serde::Deserialize;
use std::path::Path;

use domain_fraud::EngineConfig;

/// CLI configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Log level: trace, debug, info, warn, error
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Year vehicle values are estimated as of; defaults to the submission year
    pub valuation_year: Option<i32>,
    /// Scoring configuration
    pub engine: EngineConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
            valuation_year: None,
            engine: EngineConfig::default(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from an optional file and the environment
    ///
    /// Environment variables use the `FRAUD_` prefix with `__` between
    /// nested keys, e.g. `FRAUD_ENGINE__EVALUATION_TIMEOUT_MS=500`.
    /// The engine section is validated before returning.
    ///
    /// Both sources lowercase map keys, so product-override and module-weight
    /// keys reach the engine folded; the engine matches them ignoring case.
    pub fn load(file: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path));
        }
        let loaded: Self = builder
            .add_source(
                config::Environment::with_prefix("FRAUD")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        loaded
            .engine
            .validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(loaded)
    }
}
