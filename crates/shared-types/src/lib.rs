//! # Shared Types Crate
//!
//! Entities shared by the loader, the event bus and the runtime.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Every type that crosses a crate boundary is
//!   defined here.
//! - **Wire Friendly**: Entities serialize with serde; byte fields are hex in
//!   human-readable formats.

pub mod entities;

pub use entities::*;
