//! # Test Fixtures
//!
//! Parties with secp256k1 keys, directive builders and keeper doubles shared
//! by the integration flows and the benchmarks.

use async_trait::async_trait;
use kl_file_loader::{
    encode_envelope, BincodePermissionCodec, EnvelopeDecoder, FileLoaderBuilder,
    FileLoaderService, IdentityLookup, IdentityMatch, InMemoryIdentityDirectory, InMemoryKeeper,
    KeeperClient, KeeperError, KeyAgreement, KeyMaterial, LookupError, Secp256k1Agreement,
    SharedSecret, XChaChaCipher,
};
use parking_lot::Mutex;
use shared_crypto::Secp256k1KeyPair;
use shared_types::{PermissionRecord, RawTransaction, TxType};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Network every fixture transaction is on.
pub const NETWORK: &str = "mainnet";

/// Directive prefix of every fixture transaction.
pub const PREFIX: &[u8] = b"KPR";

// =============================================================================
// PARTIES
// =============================================================================

/// A chain address with its key pair.
pub struct Party {
    pub address: String,
    pub keys: Secp256k1KeyPair,
}

impl Party {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            keys: Secp256k1KeyPair::generate(),
        }
    }

    /// Public and private key.
    pub fn material(&self) -> KeyMaterial {
        KeyMaterial::new(self.keys.public_key(), Some(self.keys.to_bytes().to_vec()))
    }

    /// Public key only.
    pub fn public_material(&self) -> KeyMaterial {
        KeyMaterial::public_only(self.keys.public_key())
    }

    /// ECDH secret with `other`, as the loader derives it.
    pub fn secret_with(&self, other: &Party) -> SharedSecret {
        Secp256k1Agreement
            .derive_shared_secret(&self.keys.to_bytes(), &other.keys.public_key())
            .expect("valid key pair")
    }
}

// =============================================================================
// DIRECTIVES
// =============================================================================

pub fn raw(txid: &str, from: &[&str], to: &[&str], data: Vec<u8>) -> RawTransaction {
    RawTransaction {
        txid: txid.to_string(),
        network: NETWORK.to_string(),
        inputs: from.iter().map(|s| s.to_string()).collect(),
        outputs: to.iter().map(|s| s.to_string()).collect(),
        data,
    }
}

/// Public directive announcing `key`.
pub fn public_directive(txid: &str, key: &str) -> RawTransaction {
    raw(
        txid,
        &["publisher"],
        &["anyone"],
        encode_envelope(PREFIX, TxType::Public, key.as_bytes()),
    )
}

/// Permission directive carrying `payload`.
pub fn permission_directive(txid: &str, from: &Party, to: &Party, payload: &[u8]) -> RawTransaction {
    raw(
        txid,
        &[from.address.as_str()],
        &[to.address.as_str()],
        encode_envelope(PREFIX, TxType::Permission, payload),
    )
}

/// A transaction that is not a directive.
pub fn noise(txid: &str) -> RawTransaction {
    raw(txid, &["x"], &["y"], b"just a payment".to_vec())
}

// =============================================================================
// WORLD
// =============================================================================

/// Keeper and address book shared by one test.
pub struct World {
    pub keeper: Arc<InMemoryKeeper>,
    pub directory: Arc<InMemoryIdentityDirectory>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            keeper: Arc::new(InMemoryKeeper::new()),
            directory: Arc::new(InMemoryIdentityDirectory::new()),
        }
    }

    /// Register `party`, with or without its private key.
    pub fn register(&self, party: &Party, with_private: bool) {
        let keys = if with_private {
            party.material()
        } else {
            party.public_material()
        };
        self.directory.insert(party.address.clone(), keys);
    }

    /// Builder with the shipped adapters over this world's keeper.
    pub fn builder(&self) -> FileLoaderBuilder {
        FileLoaderService::builder()
            .decoder(Arc::new(EnvelopeDecoder))
            .keeper(self.keeper.clone())
            .codec(Arc::new(BincodePermissionCodec))
            .cipher(Arc::new(XChaChaCipher))
            .agreement(Arc::new(Secp256k1Agreement))
    }

    /// Loader over this world's keeper and directory.
    pub fn service(&self) -> FileLoaderService {
        self.builder()
            .identity(self.directory.clone())
            .build()
            .expect("all collaborators set")
    }

    /// Store `data` and return a public directive for it.
    pub async fn public(&self, txid: &str, data: &[u8]) -> RawTransaction {
        let key = self.keeper.put(data.to_vec()).await.expect("in-memory put");
        public_directive(txid, &key)
    }

    /// Store `data` as a file shared from `from` to `to` and return the
    /// permission directive for it. With `encrypt` the stored file is sealed
    /// under a fresh key carried in the record.
    pub async fn share(
        &self,
        txid: &str,
        from: &Party,
        to: &Party,
        data: &[u8],
        encrypt: bool,
    ) -> RawTransaction {
        let secret = from.secret_with(to);

        let (stored, decryption_key) = if encrypt {
            let key: [u8; 32] = rand::random();
            let sealed = XChaChaCipher.encrypt(data, &key).expect("32-byte key");
            (sealed, Some(key.to_vec()))
        } else {
            (data.to_vec(), None)
        };
        let file_key = self.keeper.put(stored).await.expect("in-memory put");

        let record = PermissionRecord::new(file_key, decryption_key);
        let sealed = BincodePermissionCodec
            .encode(&record, &secret)
            .expect("record encodes");
        let pointer = self.keeper.put(sealed).await.expect("in-memory put");

        let payload = XChaChaCipher
            .encrypt(pointer.as_bytes(), secret.as_bytes())
            .expect("32-byte secret");
        permission_directive(txid, from, to, &payload)
    }
}

// =============================================================================
// DOUBLES
// =============================================================================

/// Keeper wrapper counting `get_many` calls and keys.
pub struct CountingKeeper {
    inner: Arc<InMemoryKeeper>,
    calls: AtomicUsize,
    keys: Mutex<Vec<usize>>,
}

impl CountingKeeper {
    pub fn new(inner: Arc<InMemoryKeeper>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            keys: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of keys of each call, in call order.
    pub fn keys_per_call(&self) -> Vec<usize> {
        self.keys.lock().clone()
    }
}

#[async_trait]
impl KeeperClient for CountingKeeper {
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, KeeperError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.keys.lock().push(keys.len());
        self.inner.get_many(keys).await
    }

    async fn put(&self, data: Vec<u8>) -> Result<String, KeeperError> {
        self.inner.put(data).await
    }
}

/// Keeper failing every call whose index is in `fail_on` (0-based).
pub struct ScriptedKeeper {
    inner: Arc<InMemoryKeeper>,
    fail_on: Vec<usize>,
    calls: AtomicUsize,
}

impl ScriptedKeeper {
    pub fn new(inner: Arc<InMemoryKeeper>, fail_on: Vec<usize>) -> Self {
        Self {
            inner,
            fail_on,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl KeeperClient for ScriptedKeeper {
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, KeeperError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.contains(&call) {
            return Err(KeeperError::Unavailable(format!("scripted failure on call {call}")));
        }
        self.inner.get_many(keys).await
    }

    async fn put(&self, data: Vec<u8>) -> Result<String, KeeperError> {
        self.inner.put(data).await
    }
}

/// Directory answering after a random delay of up to `max_delay`.
pub struct JitteryDirectory {
    inner: Arc<InMemoryIdentityDirectory>,
    max_delay: Duration,
}

impl JitteryDirectory {
    pub fn new(inner: Arc<InMemoryIdentityDirectory>, max_delay: Duration) -> Self {
        Self { inner, max_delay }
    }
}

#[async_trait]
impl IdentityLookup for JitteryDirectory {
    async fn lookup(
        &self,
        address: &str,
        want_private: bool,
    ) -> Result<Option<IdentityMatch>, LookupError> {
        let max = self.max_delay.as_millis().max(1) as u64;
        let delay = rand::random::<u64>() % max;
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.inner.lookup(address, want_private).await
    }
}
