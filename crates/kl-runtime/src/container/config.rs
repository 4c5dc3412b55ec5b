//! # Runtime Configuration
//!
//! Loader, stage and fixture settings read from the environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `KL_NETWORK` | `mainnet` |
//! | `KL_PREFIX` | `KPR` |
//! | `KL_STAGE_BUFFER` | `64` |
//! | `KL_FIXTURE_PATH` | unset |
//!
//! Logging variables are read by `keeper_telemetry::TelemetryConfig`.

use kl_file_loader::{LoaderConfig, LoaderError, StageConfig};
use std::path::PathBuf;
use thiserror::Error;

/// Complete runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Decoder settings.
    pub loader: LoaderConfig,
    /// Stage queue settings.
    pub stage: StageConfig,
    /// Fixture to seed the keeper and directory from.
    pub fixture_path: Option<PathBuf>,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but does not parse.
    #[error("{var}={value:?}: {reason}")]
    InvalidValue {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The parsed values do not validate.
    #[error(transparent)]
    Loader(#[from] LoaderError),
}

impl RuntimeConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read the configuration through `get`, which maps a variable name to
    /// its value.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(network) = get("KL_NETWORK") {
            config.loader.network = network;
        }
        if let Some(prefix) = get("KL_PREFIX") {
            config.loader.prefix = prefix.into_bytes();
        }
        if let Some(raw) = get("KL_STAGE_BUFFER") {
            config.stage.buffer_capacity =
                raw.parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::InvalidValue {
                        var: "KL_STAGE_BUFFER",
                        value: raw.clone(),
                        reason: e.to_string(),
                    }
                })?;
        }
        config.fixture_path = get("KL_FIXTURE_PATH")
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        config.validate()?;
        Ok(config)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.loader.validate()?;
        self.stage.validate()?;
        Ok(())
    }
}
