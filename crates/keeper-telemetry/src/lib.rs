//! # Keeper Telemetry
//!
//! Logging and metrics for the keeper loader.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use keeper_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_telemetry(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `KL_SERVICE_NAME` | `keeper-loader` | Service name in the startup log |
//! | `KL_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `KL_JSON_LOGS` | `false` | JSON log lines (default `true` in containers) |
//! | `KL_CONSOLE_OUTPUT` | `true` | Write logs to stderr |
//!
//! Metrics live in their own [`metrics::REGISTRY`] and are exposed through
//! [`encode_metrics`].

#![warn(missing_docs)]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, BATCHES_TOTAL, BATCH_DURATION, FILES_LOADED,
    ITEMS_DROPPED, STORAGE_FAILURES,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// A metric could not be registered or encoded.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// A configuration value did not parse.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize metrics then logging.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)
}
