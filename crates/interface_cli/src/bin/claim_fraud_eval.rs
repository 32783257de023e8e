//! Claim Fraud Engine - Evaluation Binary
//!
//! Scores one or more claim bundles and prints each evaluation as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Evaluate a bundle with default configuration
//! cargo run --bin claim-fraud-eval -- demos/clean_claim.json
//!
//! # Use a configuration file and override the deadline from the environment
//! FRAUD_ENGINE__EVALUATION_TIMEOUT_MS=500 \
//!     cargo run --bin claim-fraud-eval -- --config fraud.toml demos/*.json
//! ```
//!
//! # Environment Variables
//!
//! * `FRAUD_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `FRAUD_LOG_JSON` - Emit logs as JSON lines (default: false)
//! * `FRAUD_VALUATION_YEAR` - Year vehicle values are estimated as of
//! * `FRAUD_ENGINE__...` - Any engine setting, nested keys separated by `__`
//! * `RUST_LOG` - Takes precedence over the configured log level

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use interface_cli::{bundle::ClaimBundle, config::CliConfig, run_bundle};

/// Evaluate claim bundles for fraud risk
#[derive(Parser, Debug)]
#[command(name = "claim-fraud-eval")]
#[command(about = "Score claim bundles for fraud risk and print the decisions")]
struct Args {
    /// Claim bundle files (JSON)
    #[arg(required = true)]
    bundles: Vec<PathBuf>,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(long, short = 'c', env = "FRAUD_CONFIG")]
    config: Option<PathBuf>,

    /// Print only the decision instead of the full evaluation
    #[arg(long)]
    decision_only: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = CliConfig::load(args.config.as_deref()).context("loading configuration")?;

    init_tracing(&config.log_level, config.log_json);

    tracing::info!(
        bundles = args.bundles.len(),
        timeout_ms = config.engine.evaluation_timeout_ms,
        "Evaluating claim bundles"
    );

    for path in &args.bundles {
        let bundle = ClaimBundle::from_path(path)?;
        let evaluation = run_bundle(&bundle, &config)
            .await
            .with_context(|| format!("evaluating {}", path.display()))?;

        let output = if args.decision_only {
            to_json(&evaluation.decision, args.pretty)?
        } else {
            to_json(&evaluation, args.pretty)?
        };
        println!("{}", output);
    }

    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

/// Initializes the tracing subscriber, writing to stderr so stdout stays JSON
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
