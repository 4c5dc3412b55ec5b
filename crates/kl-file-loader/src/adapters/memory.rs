//! # In-Memory Adapters
//!
//! Keeper and identity directory backed by `parking_lot::RwLock` maps.
//! Used by the runtime's fixture mode and by tests.

use crate::domain::entities::{IdentityMatch, KeyMaterial};
use crate::domain::errors::{KeeperError, LookupError};
use crate::ports::outbound::{IdentityLookup, KeeperClient};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_crypto::content_address;
use shared_types::Address;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

// =============================================================================
// KEEPER
// =============================================================================

/// Content-addressed in-memory keeper.
///
/// `put` stores under the BLAKE3 hex digest of the data; `insert` stores
/// under an arbitrary key.
#[derive(Debug, Default)]
pub struct InMemoryKeeper {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    get_many_calls: AtomicUsize,
}

impl InMemoryKeeper {
    /// Create an empty keeper.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `data` under `key`, replacing any previous entry.
    pub fn insert(&self, key: impl Into<String>, data: Vec<u8>) {
        self.blobs.write().insert(key.into(), data);
    }

    /// Remove the entry under `key`.
    pub fn remove(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.write().remove(key)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    /// Whether the keeper is empty.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }

    /// Number of `get_many` calls served so far.
    pub fn get_many_calls(&self) -> usize {
        self.get_many_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeeperClient for InMemoryKeeper {
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, KeeperError> {
        self.get_many_calls.fetch_add(1, Ordering::SeqCst);
        let blobs = self.blobs.read();
        Ok(keys.iter().map(|key| blobs.get(key).cloned()).collect())
    }

    async fn put(&self, data: Vec<u8>) -> Result<String, KeeperError> {
        let key = content_address(&data);
        self.blobs.write().insert(key.clone(), data);
        Ok(key)
    }
}

// =============================================================================
// IDENTITY DIRECTORY
// =============================================================================

/// Address book mapping addresses to key material.
///
/// Private keys are only handed out when the caller asks for them.
#[derive(Debug, Default)]
pub struct InMemoryIdentityDirectory {
    identities: RwLock<HashMap<Address, KeyMaterial>>,
}

impl InMemoryIdentityDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `keys` under `address`.
    pub fn insert(&self, address: impl Into<Address>, keys: KeyMaterial) {
        self.identities.write().insert(address.into(), keys);
    }

    /// Number of registered identities.
    pub fn len(&self) -> usize {
        self.identities.read().len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.identities.read().is_empty()
    }
}

#[async_trait]
impl IdentityLookup for InMemoryIdentityDirectory {
    async fn lookup(
        &self,
        address: &str,
        want_private: bool,
    ) -> Result<Option<IdentityMatch>, LookupError> {
        if address.is_empty() {
            return Err(LookupError::InvalidAddress(address.to_string()));
        }
        let identities = self.identities.read();
        Ok(identities.get(address).map(|keys| {
            let keys = if want_private {
                keys.clone()
            } else {
                keys.without_private()
            };
            IdentityMatch::new(address, keys)
        }))
    }
}
