//! # Loader Container
//!
//! Configuration and dependency wiring for the runtime.

pub mod config;
pub mod loader;

pub use config::{ConfigError, RuntimeConfig};
pub use loader::LoaderContainer;
