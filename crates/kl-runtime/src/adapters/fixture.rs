//! # Fixture Loading
//!
//! Seeds the in-memory keeper and identity directory from a JSON document:
//!
//! ```json
//! {
//!   "keeper": [
//!     { "data": "68656c6c6f" },
//!     { "key": "legacy-key", "data": "00ff" }
//!   ],
//!   "identities": [
//!     { "address": "alice", "public_key": "02...", "private_key": "1f..." },
//!     { "address": "bob", "public_key": "03..." }
//!   ]
//! }
//! ```
//!
//! Keeper entries without a `key` are stored content-addressed.

use kl_file_loader::{
    InMemoryIdentityDirectory, InMemoryKeeper, KeeperClient, KeeperError, KeyMaterial,
};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Fixture document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    /// Keeper contents.
    #[serde(default)]
    pub keeper: Vec<KeeperEntry>,
    /// Address book.
    #[serde(default)]
    pub identities: Vec<IdentityEntry>,
}

/// One keeper blob.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeeperEntry {
    /// Explicit key; content address when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Blob bytes.
    #[serde_as(as = "Hex")]
    pub data: Vec<u8>,
}

/// One address book entry.
#[serde_as]
#[derive(Clone, Serialize, Deserialize)]
pub struct IdentityEntry {
    /// Chain address.
    pub address: String,
    /// SEC1 public key.
    #[serde_as(as = "Hex")]
    pub public_key: Vec<u8>,
    /// Raw private key, when this node holds it.
    #[serde_as(as = "Option<Hex>")]
    pub private_key: Option<Vec<u8>>,
}

impl std::fmt::Debug for IdentityEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityEntry")
            .field("address", &self.address)
            .field("has_private_key", &self.private_key.is_some())
            .finish()
    }
}

/// What a fixture put where.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SeedReport {
    /// Keys of the stored blobs, in fixture order.
    pub keys: Vec<String>,
    /// Identities registered.
    pub identities: usize,
}

/// Fixture errors.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The file could not be read.
    #[error("failed to read fixture {path}: {source}")]
    Io {
        /// Fixture path.
        path: PathBuf,
        /// I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not a valid fixture.
    #[error("invalid fixture: {0}")]
    Parse(#[from] serde_json::Error),

    /// The keeper refused a blob.
    #[error("keeper rejected fixture blob: {0}")]
    Keeper(#[from] KeeperError),
}

impl Fixture {
    /// Parse a fixture document.
    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a fixture file.
    pub async fn from_path(path: &Path) -> Result<Self, FixtureError> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| FixtureError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&json)
    }

    /// Store every blob and register every identity.
    pub async fn seed(
        self,
        keeper: &InMemoryKeeper,
        directory: &InMemoryIdentityDirectory,
    ) -> Result<SeedReport, FixtureError> {
        let mut report = SeedReport::default();

        for entry in self.keeper {
            let key = match entry.key {
                Some(key) => {
                    keeper.insert(key.clone(), entry.data);
                    key
                }
                None => keeper.put(entry.data).await?,
            };
            debug!(%key, "Fixture blob stored");
            report.keys.push(key);
        }

        for identity in self.identities {
            directory.insert(
                identity.address,
                KeyMaterial::new(identity.public_key, identity.private_key),
            );
            report.identities += 1;
        }

        Ok(report)
    }
}
