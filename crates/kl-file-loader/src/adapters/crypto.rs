//! # Crypto Adapters
//!
//! `SymmetricCipher` and `KeyAgreement` over `shared-crypto`.

use crate::domain::entities::SharedSecret;
use crate::ports::outbound::{KeyAgreement, SymmetricCipher};
use shared_crypto::{symmetric, CryptoError, SecretKey};

/// XChaCha20-Poly1305 in the sealed (nonce-prefixed) format.
#[derive(Debug, Clone, Copy, Default)]
pub struct XChaChaCipher;

impl XChaChaCipher {
    /// Seal `plaintext` under a 32-byte `key`.
    pub fn encrypt(&self, plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        symmetric::seal(&SecretKey::from_slice(key)?, plaintext)
    }
}

impl SymmetricCipher for XChaChaCipher {
    fn decrypt(&self, ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        symmetric::open(&SecretKey::from_slice(key)?, ciphertext)
    }
}

/// secp256k1 ECDH with a BLAKE3-derived output key.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Agreement;

impl KeyAgreement for Secp256k1Agreement {
    fn derive_shared_secret(
        &self,
        private_key: &[u8],
        public_key: &[u8],
    ) -> Result<SharedSecret, CryptoError> {
        let key = shared_crypto::derive_shared_secret(private_key, public_key)?;
        Ok(SharedSecret::new(key.to_vec()))
    }
}
