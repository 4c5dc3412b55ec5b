//! # Keeper File Loader
//!
//! Turns a batch of chain transactions into the files they reference in the
//! keeper. Public directives carry the keeper key in clear; permission
//! directives carry a pointer sealed under an ECDH secret shared by sender
//! and recipient, which leads to a permission record and from there to the
//! shared file.
//!
//! ## Pipeline
//!
//! ```text
//! TransactionInput[] ──parse──→ ParsedIntent[] ──resolve──→ parties
//!                                                      │
//!                     ┌────────── fetch round 1 ←──────┘
//!                     │   (public keys + record pointers)
//!                     ├──→ public files
//!                     └──→ permission records ──fetch round 2──→ shared files
//! ```
//!
//! ## Guarantees
//!
//! | Guarantee | Description |
//! |-----------|-------------|
//! | Order | Output follows batch position, whatever the resolution order |
//! | Bounded I/O | At most two keeper `get_many` calls per batch |
//! | Isolation | A bad item is dropped; it never fails its neighbours |
//! | Systemic errors | A keeper failure rejects the whole batch |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - entities, outcomes, errors, config
//! - `ports/` - inbound API and outbound collaborator traits
//! - `service/` - the orchestrator and its steps
//! - `adapters/` - codecs, crypto, in-memory stores, stream stage
//!
//! ## Usage
//!
//! ```ignore
//! use kl_file_loader::{FileLoaderService, FileLoaderApi};
//!
//! let loader = FileLoaderService::builder()
//!     .decoder(Arc::new(EnvelopeDecoder))
//!     .identity(directory)
//!     .keeper(keeper)
//!     .codec(Arc::new(BincodePermissionCodec))
//!     .cipher(Arc::new(XChaChaCipher))
//!     .agreement(Arc::new(Secp256k1Agreement))
//!     .build()?;
//!
//! let files = loader.load(batch).await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use domain::entities::{FetchResult, IdentityMatch, KeyMaterial, ResolvedParties, SharedSecret};
pub use domain::errors::{CodecError, KeeperError, LoaderError, LookupError};
pub use domain::outcome::{DropReason, DroppedItem, LoadOutcome, LoadReport, PipelineStage};
pub use domain::value_objects::{FetchRound, LoaderConfig, StageConfig};
pub use ports::inbound::FileLoaderApi;
pub use ports::outbound::{
    IdentityLookup, KeeperClient, KeyAgreement, PermissionCodec, SymmetricCipher,
    TransactionDecoder,
};
pub use service::{FileLoaderBuilder, FileLoaderDependencies, FileLoaderService};

// Re-export adapters
pub use adapters::{
    encode_envelope, notifications_for, BincodePermissionCodec, EnvelopeDecoder,
    InMemoryIdentityDirectory, InMemoryKeeper, LoaderStage, Secp256k1Agreement, StageHandle,
    StageInput, StageResult, StageStats, XChaChaCipher,
};
