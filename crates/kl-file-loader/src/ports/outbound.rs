//! # Outbound Ports (Driven Ports / SPI)
//!
//! Collaborators the loader consumes. Shipped implementations live in
//! `crate::adapters`.

use crate::domain::entities::{IdentityMatch, SharedSecret};
use crate::domain::errors::{CodecError, KeeperError, LookupError};
use async_trait::async_trait;
use shared_crypto::CryptoError;
use shared_types::entities::{ParsedIntent, PermissionRecord, RawTransaction};

/// Decoder for the directive embedded in a chain transaction.
///
/// Production: `EnvelopeDecoder` (adapters/codec.rs)
pub trait TransactionDecoder: Send + Sync {
    /// Decode `tx`. `None` means the transaction is not a directive for this
    /// loader; that is never an error.
    ///
    /// The returned intent's `original_index` is ignored; the caller stamps it.
    fn parse(&self, tx: &RawTransaction, network: &str, prefix: &[u8]) -> Option<ParsedIntent>;

    /// Check an intent that was parsed earlier.
    fn validate(&self, intent: &ParsedIntent) -> bool;
}

/// Directory mapping addresses to identities.
///
/// Production: any wallet or address book.
/// Testing: `InMemoryIdentityDirectory` (adapters/memory.rs)
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    /// Resolve `address`. With `want_private`, include the private key when
    /// this directory holds it.
    ///
    /// `Ok(None)` is a miss. Errors are treated as misses by the loader.
    async fn lookup(
        &self,
        address: &str,
        want_private: bool,
    ) -> Result<Option<IdentityMatch>, LookupError>;
}

/// Content-addressed keeper client.
///
/// Testing: `InMemoryKeeper` (adapters/memory.rs)
#[async_trait]
pub trait KeeperClient: Send + Sync {
    /// Fetch many keys in one round trip.
    ///
    /// The response must have the same length and order as `keys`; `None`
    /// marks an absent key.
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, KeeperError>;

    /// Store `data` and return the key it is addressable by.
    ///
    /// Never called on the load path.
    async fn put(&self, data: Vec<u8>) -> Result<String, KeeperError>;
}

/// Codec for sealed permission records.
pub trait PermissionCodec: Send + Sync {
    /// Open and decode a permission record sealed under `secret`.
    fn recover(&self, bytes: &[u8], secret: &SharedSecret)
        -> Result<PermissionRecord, CodecError>;
}

/// Symmetric cipher used for permission pointers and shared files.
pub trait SymmetricCipher: Send + Sync {
    /// Decrypt `ciphertext` under `key`.
    fn decrypt(&self, ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// Asymmetric key agreement.
///
/// Must be symmetric: `derive(a.priv, b.pub) == derive(b.priv, a.pub)`.
pub trait KeyAgreement: Send + Sync {
    /// Combine one party's private key with the other's public key.
    fn derive_shared_secret(
        &self,
        private_key: &[u8],
        public_key: &[u8],
    ) -> Result<SharedSecret, CryptoError>;
}
