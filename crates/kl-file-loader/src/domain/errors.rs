//! # Domain Errors
//!
//! Systemic failures and collaborator errors.
//!
//! Per-item failures are not errors: they are `DropReason`s carried inside
//! `LoadOutcome::Dropped` and never abort a batch. Only `LoaderError` leaves
//! the service.

use crate::domain::value_objects::FetchRound;
use shared_crypto::CryptoError;
use thiserror::Error;

/// Failure that rejects a whole `run` (or a construction attempt).
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The keeper failed during a batched fetch.
    #[error("storage failure during {round} fetch: {source}")]
    Storage {
        /// Which of the two fetch rounds failed.
        round: FetchRound,
        /// Keeper error.
        #[source]
        source: KeeperError,
    },

    /// A required collaborator was not supplied to the builder.
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// Configuration value out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl LoaderError {
    /// Whether this failure came from the keeper.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}

/// Error from the keeper client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeeperError {
    /// The keeper could not be reached.
    #[error("keeper unavailable: {0}")]
    Unavailable(String),

    /// The keeper refused the request.
    #[error("keeper rejected request: {0}")]
    Rejected(String),

    /// The keeper answered with the wrong number of entries.
    #[error("keeper returned {actual} entries for {expected} keys")]
    ResponseLength {
        /// Keys requested.
        expected: usize,
        /// Entries returned.
        actual: usize,
    },
}

/// Error from an identity lookup. Treated as a miss by the resolver.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// The directory could not be reached.
    #[error("identity directory unavailable: {0}")]
    Unavailable(String),

    /// The address is not well formed for this directory.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Error from the permission codec.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The sealed record did not open under the shared secret.
    #[error("permission record did not decrypt: {0}")]
    Crypto(#[from] CryptoError),

    /// The decrypted bytes are not a permission record.
    #[error("malformed permission record: {0}")]
    Malformed(String),
}
