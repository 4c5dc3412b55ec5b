//! # Value Objects
//!
//! Configuration for the loader and its stream stage.

use crate::domain::errors::LoaderError;
use std::fmt;

/// Default network name.
pub const DEFAULT_NETWORK: &str = "mainnet";

/// Default directive prefix.
pub const DEFAULT_PREFIX: &[u8] = b"KPR";

/// Default stage buffer depth.
pub const DEFAULT_BUFFER_CAPACITY: usize = 64;

/// Decoder settings for one loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Network transactions must come from.
    pub network: String,
    /// Prefix marking directives meant for this loader.
    pub prefix: Vec<u8>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            network: DEFAULT_NETWORK.to_string(),
            prefix: DEFAULT_PREFIX.to_vec(),
        }
    }
}

impl LoaderConfig {
    /// Check the configuration.
    pub fn validate(&self) -> Result<(), LoaderError> {
        if self.network.is_empty() {
            return Err(LoaderError::InvalidConfig("network must not be empty".into()));
        }
        if self.prefix.is_empty() {
            return Err(LoaderError::InvalidConfig("prefix must not be empty".into()));
        }
        Ok(())
    }
}

/// Stream stage settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageConfig {
    /// Depth of the input and output queues.
    pub buffer_capacity: usize,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl StageConfig {
    /// Check the configuration.
    pub fn validate(&self) -> Result<(), LoaderError> {
        if self.buffer_capacity == 0 {
            return Err(LoaderError::InvalidConfig(
                "buffer_capacity must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// The two batched fetches of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchRound {
    /// Public files and sealed permission records.
    Primary,
    /// Files referenced by recovered permission records.
    Shared,
}

impl fmt::Display for FetchRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Shared => f.write_str("shared"),
        }
    }
}
