//! # Keeper Loader Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Parties, directives, keeper doubles
//! └── integration/      # Cross-crate flows
//!     ├── properties.rs # Batch-level guarantees of the loader
//!     ├── stage.rs      # Stream stage and bus notifications
//!     └── runtime.rs    # Runtime container over the real adapters
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p kl-tests
//! cargo test -p kl-tests integration::properties
//! cargo bench -p kl-tests
//! ```

pub mod fixtures;
