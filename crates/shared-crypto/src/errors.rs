//! Crypto error types.

use thiserror::Error;

/// Failures of the sealing and key agreement primitives.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// The AEAD refused to seal.
    #[error("Sealing failed: {0}")]
    Seal(String),

    /// Wrong key, or the sealed bytes were altered.
    #[error("Authentication failed: {0}")]
    Open(String),

    /// Key of the wrong size for the primitive.
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Required length in bytes.
        expected: usize,
        /// Supplied length in bytes.
        actual: usize,
    },

    /// Sealed message too short to hold a nonce and a tag.
    #[error("Sealed message truncated: {0} bytes")]
    Truncated(usize),

    /// Not a SEC1-encoded secp256k1 point.
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Not a secp256k1 scalar.
    #[error("Invalid private key")]
    InvalidPrivateKey,
}
