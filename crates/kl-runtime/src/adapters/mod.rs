//! # Runtime Adapters
//!
//! - `fixture` - seeds the in-memory keeper and directory from JSON
//! - `metered` - metrics decorator around the loader

pub mod fixture;
pub mod metered;

pub use fixture::{Fixture, FixtureError, IdentityEntry, KeeperEntry, SeedReport};
pub use metered::MeteredLoader;
