//! # Domain Entities
//!
//! Identities, key material and fetch results handled inside one `run`.
//!
//! Secret material (`KeyMaterial` private keys, `SharedSecret`) is wiped on
//! drop and never printed by `Debug`.

use shared_types::Address;
use std::fmt;
use std::sync::Arc;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

// =============================================================================
// IDENTITIES
// =============================================================================

/// Opaque asymmetric key material behind an identity.
#[derive(Clone)]
pub struct KeyMaterial {
    public_key: Vec<u8>,
    private_key: Option<Zeroizing<Vec<u8>>>,
}

impl KeyMaterial {
    /// Key material with an optional private half.
    pub fn new(public_key: Vec<u8>, private_key: Option<Vec<u8>>) -> Self {
        Self {
            public_key,
            private_key: private_key.map(Zeroizing::new),
        }
    }

    /// Key material known only by its public key.
    pub fn public_only(public_key: Vec<u8>) -> Self {
        Self::new(public_key, None)
    }

    /// Encoded public key.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Private key, when this side holds it.
    pub fn private_key(&self) -> Option<&[u8]> {
        self.private_key.as_ref().map(|k| k.as_slice())
    }

    /// Whether the private half is present.
    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    /// Copy with the private half removed.
    pub fn without_private(&self) -> Self {
        Self::public_only(self.public_key.clone())
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("public_key_len", &self.public_key.len())
            .field("private_key", &self.private_key.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Resolved identity behind an address.
#[derive(Debug, Clone)]
pub struct IdentityMatch {
    /// Address that was looked up.
    pub address: Address,
    /// Keys of the identity.
    pub keys: KeyMaterial,
}

impl IdentityMatch {
    /// Create a match.
    pub fn new(address: impl Into<Address>, keys: KeyMaterial) -> Self {
        Self {
            address: address.into(),
            keys,
        }
    }
}

/// Sender and recipient chosen for one intent.
///
/// Either side may be absent; absence is an ordinary outcome.
#[derive(Debug, Clone, Default)]
pub struct ResolvedParties {
    /// First resolvable sender candidate.
    pub sender: Option<Arc<IdentityMatch>>,
    /// First resolvable recipient candidate whose key differs from the sender's.
    pub recipient: Option<Arc<IdentityMatch>>,
}

impl ResolvedParties {
    /// Sender, if resolved.
    pub fn sender(&self) -> Option<&IdentityMatch> {
        self.sender.as_deref()
    }

    /// Recipient, if resolved.
    pub fn recipient(&self) -> Option<&IdentityMatch> {
        self.recipient.as_deref()
    }
}

// =============================================================================
// SECRETS
// =============================================================================

/// Symmetric key agreed between the two parties of a permission transaction.
///
/// Lives only for the duration of one `run`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret {
    inner: Vec<u8>,
}

impl SharedSecret {
    /// Wrap derived key bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { inner: bytes }
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(***)")
    }
}

// =============================================================================
// STORAGE
// =============================================================================

/// Keeper answer for one requested key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// Bytes stored under the key.
    Found(Vec<u8>),
    /// Key not present (or not visible yet).
    Absent,
}

impl FetchResult {
    /// Whether bytes were returned.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Convert into the stored bytes, if any.
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::Found(bytes) => Some(bytes),
            Self::Absent => None,
        }
    }
}

impl From<Option<Vec<u8>>> for FetchResult {
    fn from(value: Option<Vec<u8>>) -> Self {
        match value {
            Some(bytes) => Self::Found(bytes),
            None => Self::Absent,
        }
    }
}
