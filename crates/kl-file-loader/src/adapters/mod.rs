//! # Adapters
//!
//! - `codec` - envelope decoder and bincode permission codec
//! - `crypto` - XChaCha20-Poly1305 cipher and secp256k1 key agreement
//! - `memory` - in-memory keeper and identity directory
//! - `events` - outcome to notification dispatch
//! - `stage` - push-based stream stage over the service

pub mod codec;
pub mod crypto;
pub mod events;
pub mod memory;
pub mod stage;

pub use codec::{encode_envelope, BincodePermissionCodec, EnvelopeDecoder};
pub use crypto::{Secp256k1Agreement, XChaChaCipher};
pub use events::notifications_for;
pub use memory::{InMemoryIdentityDirectory, InMemoryKeeper};
pub use stage::{LoaderStage, StageHandle, StageInput, StageResult, StageStats};
