//! Machine Failure Predictor - Main Entry Point

use api::{init_logging, run_server, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_logging(&config.logging).map_err(|e| e as Box<dyn std::error::Error>)?;

    info!("=== Machine Failure Predictor v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Binary threshold {}, ambiguity threshold {}",
        config.decision.binary_threshold, config.decision.ambiguity_threshold
    );

    run_server(config).await?;

    Ok(())
}
