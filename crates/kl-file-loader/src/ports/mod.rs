//! # Ports
//!
//! - `inbound` - API the loader offers (driving side)
//! - `outbound` - Collaborators the loader needs (driven side)

pub mod inbound;
pub mod outbound;

pub use inbound::FileLoaderApi;
pub use outbound::{
    IdentityLookup, KeeperClient, KeyAgreement, PermissionCodec, SymmetricCipher,
    TransactionDecoder,
};
