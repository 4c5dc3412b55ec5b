//! # Keeper Loader Runtime Library
//!
//! Exposes the runtime's modules for testing. The entry point is the
//! `keeper-loader` binary in `main.rs`.
//!
//! - `container/` - configuration and wiring
//! - `adapters/` - fixture seeding and the metrics decorator
//! - `handlers/` - feed, output and bus handlers
//! - `runtime` - the run loop

#![warn(missing_docs)]

pub mod adapters;
pub mod container;
pub mod handlers;
pub mod runtime;

pub use container::{ConfigError, LoaderContainer, RuntimeConfig};
pub use runtime::{LoaderRuntime, RunSummary};
