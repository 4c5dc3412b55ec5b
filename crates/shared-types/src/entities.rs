//! # Core Domain Entities
//!
//! Entities that cross crate boundaries: the transactions handed to the
//! loader, the intents parsed out of them, the permission records recovered
//! from the keeper and the files the loader finally yields.
//!
//! ## Clusters
//!
//! - **Chain**: `RawTransaction`, `TxType`, `ParsedIntent`, `TransactionInput`
//! - **Access**: `PermissionRecord`
//! - **Output**: `FileKind`, `LoadedFile`

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use std::fmt;

// =============================================================================
// CLUSTER A: THE CHAIN
// =============================================================================

/// A chain address in its textual encoding.
pub type Address = String;

/// A transaction exactly as read from the chain.
///
/// `inputs` and `outputs` keep transaction order; the identity resolver scans
/// them in that order when several candidates could be the sender or the
/// recipient.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    /// Transaction id as reported by the chain.
    pub txid: String,
    /// Network the transaction was read from.
    pub network: String,
    /// Addresses funding the transaction (sender candidates).
    pub inputs: Vec<Address>,
    /// Addresses receiving outputs (recipient candidates).
    pub outputs: Vec<Address>,
    /// Embedded directive bytes.
    #[serde_as(as = "Hex")]
    pub data: Vec<u8>,
}

/// Kind of directive embedded in a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    /// Payload is the keeper key of an unencrypted file.
    Public,
    /// Payload is an encrypted pointer to a permission record.
    Permission,
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str("public"),
            Self::Permission => f.write_str("permission"),
        }
    }
}

/// Normalized decode of a transaction's directive.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedIntent {
    /// Id of the transaction this intent came from.
    pub txid: String,
    /// Directive kind.
    pub tx_type: TxType,
    /// Sender candidates, in transaction order.
    pub from_addresses: Vec<Address>,
    /// Recipient candidates, in transaction order.
    pub to_addresses: Vec<Address>,
    /// Directive payload; meaning depends on `tx_type`.
    #[serde_as(as = "Hex")]
    pub payload: Vec<u8>,
    /// Position of the originating item in its input batch.
    pub original_index: usize,
}

impl ParsedIntent {
    /// First sender candidate, if any.
    #[must_use]
    pub fn from_address(&self) -> Option<&str> {
        self.from_addresses.first().map(String::as_str)
    }

    /// First recipient candidate, if any.
    #[must_use]
    pub fn to_address(&self) -> Option<&str> {
        self.to_addresses.first().map(String::as_str)
    }

    /// Whether this intent needs a shared secret to be read.
    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        self.tx_type == TxType::Permission
    }
}

/// One item of a loader batch.
///
/// Already-parsed intents are accepted so partially processed batches can be
/// fed back without re-reading the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TransactionInput {
    /// Transaction still to be decoded.
    Raw(RawTransaction),
    /// Intent produced by an earlier parse.
    Parsed(ParsedIntent),
}

impl From<RawTransaction> for TransactionInput {
    fn from(tx: RawTransaction) -> Self {
        Self::Raw(tx)
    }
}

impl From<ParsedIntent> for TransactionInput {
    fn from(intent: ParsedIntent) -> Self {
        Self::Parsed(intent)
    }
}

// =============================================================================
// CLUSTER B: ACCESS
// =============================================================================

/// Grant to read a shared file.
#[serde_as]
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    /// Keeper key of the shared file.
    pub file_key: String,
    /// Key to decrypt the shared file with, if it is encrypted.
    #[serde_as(as = "Option<Hex>")]
    pub decryption_key: Option<Vec<u8>>,
}

impl PermissionRecord {
    /// Create a record for a file stored encrypted under `decryption_key`.
    pub fn new(file_key: impl Into<String>, decryption_key: Option<Vec<u8>>) -> Self {
        Self {
            file_key: file_key.into(),
            decryption_key,
        }
    }

    /// Keeper key of the shared file.
    #[must_use]
    pub fn file_key(&self) -> &str {
        &self.file_key
    }

    /// Decryption key for the shared file.
    #[must_use]
    pub fn decryption_key(&self) -> Option<&[u8]> {
        self.decryption_key.as_deref()
    }
}

impl fmt::Debug for PermissionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionRecord")
            .field("file_key", &self.file_key)
            .field(
                "decryption_key",
                &self.decryption_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

// =============================================================================
// CLUSTER C: OUTPUT
// =============================================================================

/// What a loaded file was reached through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Announced directly by a public transaction.
    Public,
    /// A recovered permission record (not a file body).
    Permission,
    /// The file a permission record points to.
    #[serde(rename = "sharedfile")]
    SharedFile,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str("public"),
            Self::Permission => f.write_str("permission"),
            Self::SharedFile => f.write_str("sharedfile"),
        }
    }
}

/// Final decoded artifact of the loader.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedFile {
    /// Position of the originating transaction in its input batch.
    pub original_index: usize,
    /// How the file was reached.
    pub kind: FileKind,
    /// Decrypted bytes.
    #[serde_as(as = "Hex")]
    pub data: Vec<u8>,
    /// Intent the file was derived from.
    pub intent: ParsedIntent,
    /// Permission record the file was reached through, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<PermissionRecord>,
}
