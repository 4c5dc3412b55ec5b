//! # Keeper Loader
//!
//! Reads directive transactions as JSON lines on stdin and writes every
//! loaded file as a JSON line on stdout.
//!
//! ## Startup Sequence
//!
//! 1. Read telemetry and runtime configuration from the environment
//! 2. Install logging, register metrics
//! 3. Wire the loader and seed it from `KL_FIXTURE_PATH`
//! 4. Run stdin through the stage until EOF or Ctrl+C

use anyhow::{Context, Result};
use keeper_telemetry::TelemetryConfig;
use kl_runtime::{LoaderContainer, LoaderRuntime, RuntimeConfig};
use tokio::io::BufReader;
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    keeper_telemetry::init_telemetry(&telemetry).context("Failed to initialize telemetry")?;

    info!(service = %telemetry.service_name, "Keeper loader v{}", env!("CARGO_PKG_VERSION"));

    let config = RuntimeConfig::from_env().context("Invalid configuration")?;
    let container = LoaderContainer::new(config).context("Failed to wire loader")?;
    container
        .seed_from_config()
        .await
        .context("Failed to load fixture")?;

    let runtime = LoaderRuntime::new(container);
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    tokio::select! {
        summary = runtime.run(stdin, stdout) => {
            let summary = summary?;
            debug!(?summary, "Run summary");
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, stopping");
        }
    }

    runtime.shutdown();

    match keeper_telemetry::encode_metrics() {
        Ok(text) => debug!(metrics = %text, "Final metrics"),
        Err(e) => warn!(error = %e, "Could not encode metrics"),
    }
    Ok(())
}
