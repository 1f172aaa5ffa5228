//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own, without loading a `.env` file.
//!
//! ## Intended use
//! Useful for development and debugging. The workspace's main `mhr-run` binary does the same
//! after loading `.env`.

use api_rest::AppState;
use mhr_core::{constants::DEFAULT_DATA_DIR, nesting_policy_from_env_value, CoreConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the MHR REST API server
///
/// # Environment Variables
/// - `MHR_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `MHR_DATA_DIR`: Directory holding `records.yaml` (default: "patient_data")
/// - `MHR_NESTING_POLICY`: `pairwise` (default) or `full-chain`
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the data directory or nesting policy is invalid,
/// - the records file cannot be loaded, or
/// - the server address cannot be bound.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("mhr_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("MHR_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let data_dir = std::env::var("MHR_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.into());
    let policy = nesting_policy_from_env_value(std::env::var("MHR_NESTING_POLICY").ok())?;

    let cfg = CoreConfig::new(PathBuf::from(data_dir), policy)?;
    tracing::info!(nesting_policy = %cfg.nesting_policy(), "using {}", cfg.records_path().display());

    let state = AppState::from_config(&cfg)?;
    api_rest::serve(&addr, state).await
}
