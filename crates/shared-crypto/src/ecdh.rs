//! # Key Agreement (secp256k1 ECDH)
//!
//! Static-static Diffie-Hellman between two chain identities.
//!
//! ## Derivation
//!
//! The raw x-coordinate of the shared point is passed through BLAKE3 in
//! key-derivation mode, giving a uniform 32-byte symmetric key. Both parties
//! arrive at the same key: `derive(a.priv, b.pub) == derive(b.priv, a.pub)`.

use crate::hashing::derive_key;
use crate::symmetric::KEY_LEN;
use crate::CryptoError;
use k256::{ecdh::diffie_hellman, PublicKey, SecretKey};
use zeroize::Zeroize;

/// BLAKE3 context string for shared-secret derivation.
pub const SHARED_SECRET_CONTEXT: &str = "keeper-loader 2024 ecdh shared secret v1";

/// Compressed SEC1 public key length.
pub const PUBLIC_KEY_LEN: usize = 33;

/// Derive the symmetric key shared by `private_key`'s owner and
/// `public_key`'s owner.
///
/// `private_key` is a 32-byte scalar; `public_key` is SEC1 encoded
/// (compressed or uncompressed).
pub fn derive_shared_secret(
    private_key: &[u8],
    public_key: &[u8],
) -> Result<[u8; KEY_LEN], CryptoError> {
    let secret = SecretKey::from_slice(private_key).map_err(|_| CryptoError::InvalidPrivateKey)?;
    let public = PublicKey::from_sec1_bytes(public_key).map_err(|_| CryptoError::InvalidPublicKey)?;

    let shared = diffie_hellman(secret.to_nonzero_scalar(), public.as_affine());
    let mut raw: [u8; KEY_LEN] = (*shared.raw_secret_bytes()).into();
    let key = derive_key(SHARED_SECRET_CONTEXT, &raw);
    raw.zeroize();
    Ok(key)
}

/// secp256k1 keypair for an identity.
pub struct Secp256k1KeyPair {
    secret: SecretKey,
}

impl Secp256k1KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        Self {
            secret: SecretKey::random(&mut rand::thread_rng()),
        }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let secret = SecretKey::from_slice(&bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { secret })
    }

    /// Get public key (compressed, 33 bytes).
    pub fn public_key(&self) -> Vec<u8> {
        self.secret.public_key().to_sec1_bytes().into_vec()
    }

    /// Get secret key bytes (for serialization).
    pub fn to_bytes(&self) -> [u8; 32] {
        self.secret.to_bytes().into()
    }

    /// Derive the key shared with the owner of `peer_public_key`.
    pub fn shared_secret_with(&self, peer_public_key: &[u8]) -> Result<[u8; KEY_LEN], CryptoError> {
        let mut own = self.to_bytes();
        let result = derive_shared_secret(&own, peer_public_key);
        own.zeroize();
        result
    }
}
