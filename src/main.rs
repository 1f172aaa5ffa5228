use std::path::PathBuf;

use api_rest::AppState;
use mhr_core::{CoreConfig, constants::DEFAULT_DATA_DIR, nesting_policy_from_env_value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the MHR application
///
/// Loads `.env`, then serves the REST API (including Swagger UI at `/swagger-ui`).
///
/// # Environment Variables
/// - `MHR_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `MHR_DATA_DIR`: Directory holding `records.yaml` (default: "patient_data")
/// - `MHR_NESTING_POLICY`: `pairwise` (default) or `full-chain`
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, loading the records or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mhr_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("mhr_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("MHR_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let data_dir = std::env::var("MHR_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.into());
    let policy = nesting_policy_from_env_value(std::env::var("MHR_NESTING_POLICY").ok())?;

    let cfg = CoreConfig::new(PathBuf::from(data_dir), policy)?;
    tracing::info!(
        nesting_policy = %cfg.nesting_policy(),
        "++ Loading records from {}",
        cfg.records_path().display()
    );

    let state = AppState::from_config(&cfg)?;
    api_rest::serve(&rest_addr, state).await
}
