//! # Codec Adapters
//!
//! ## Envelope format
//!
//! ```text
//! ┌──────────┬─────────┬─────┬─────────────┐
//! │ prefix   │ version │ tag │ payload     │
//! │ (config) │ 0x01    │ 1B  │ remaining   │
//! └──────────┴─────────┴─────┴─────────────┘
//! ```
//!
//! `tag` 0x00 = public (payload is the UTF-8 keeper key),
//! 0x01 = permission (payload is the pointer sealed under the shared secret).
//!
//! ## Permission records
//!
//! bincode-encoded `PermissionRecord`, sealed with XChaCha20-Poly1305 under
//! the shared secret.

use crate::domain::entities::SharedSecret;
use crate::domain::errors::CodecError;
use crate::ports::outbound::{PermissionCodec, TransactionDecoder};
use shared_crypto::{symmetric, SecretKey};
use shared_types::entities::{ParsedIntent, PermissionRecord, RawTransaction, TxType};

/// Current envelope version.
pub const ENVELOPE_VERSION: u8 = 0x01;

/// Tag of a public directive.
pub const TAG_PUBLIC: u8 = 0x00;

/// Tag of a permission directive.
pub const TAG_PERMISSION: u8 = 0x01;

/// Build the `data` field of a directive transaction.
pub fn encode_envelope(prefix: &[u8], tx_type: TxType, payload: &[u8]) -> Vec<u8> {
    let tag = match tx_type {
        TxType::Public => TAG_PUBLIC,
        TxType::Permission => TAG_PERMISSION,
    };
    let mut data = Vec::with_capacity(prefix.len() + 2 + payload.len());
    data.extend_from_slice(prefix);
    data.push(ENVELOPE_VERSION);
    data.push(tag);
    data.extend_from_slice(payload);
    data
}

/// Decoder for prefixed, versioned, tagged directives.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeDecoder;

impl TransactionDecoder for EnvelopeDecoder {
    fn parse(&self, tx: &RawTransaction, network: &str, prefix: &[u8]) -> Option<ParsedIntent> {
        if tx.network != network {
            return None;
        }

        let body = tx.data.strip_prefix(prefix)?;
        let (&version, body) = body.split_first()?;
        if version != ENVELOPE_VERSION {
            return None;
        }
        let (&tag, payload) = body.split_first()?;
        let tx_type = match tag {
            TAG_PUBLIC => TxType::Public,
            TAG_PERMISSION => TxType::Permission,
            _ => return None,
        };

        let intent = ParsedIntent {
            txid: tx.txid.clone(),
            tx_type,
            from_addresses: tx.inputs.clone(),
            to_addresses: tx.outputs.clone(),
            payload: payload.to_vec(),
            original_index: 0,
        };

        self.validate(&intent).then_some(intent)
    }

    fn validate(&self, intent: &ParsedIntent) -> bool {
        if intent.payload.is_empty() {
            return false;
        }
        match intent.tx_type {
            TxType::Public => std::str::from_utf8(&intent.payload).is_ok(),
            TxType::Permission => {
                !intent.from_addresses.is_empty() && !intent.to_addresses.is_empty()
            }
        }
    }
}

/// bincode permission codec sealed under the shared secret.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodePermissionCodec;

impl BincodePermissionCodec {
    /// Seal `record` under `secret`; the inverse of `recover`.
    pub fn encode(
        &self,
        record: &PermissionRecord,
        secret: &SharedSecret,
    ) -> Result<Vec<u8>, CodecError> {
        let plain = bincode::serialize(record).map_err(|e| CodecError::Malformed(e.to_string()))?;
        let key = SecretKey::from_slice(secret.as_bytes())?;
        Ok(symmetric::seal(&key, &plain)?)
    }
}

impl PermissionCodec for BincodePermissionCodec {
    fn recover(
        &self,
        bytes: &[u8],
        secret: &SharedSecret,
    ) -> Result<PermissionRecord, CodecError> {
        let key = SecretKey::from_slice(secret.as_bytes())?;
        let plain = symmetric::open(&key, bytes)?;
        let record: PermissionRecord =
            bincode::deserialize(&plain).map_err(|e| CodecError::Malformed(e.to_string()))?;
        if record.file_key().is_empty() {
            return Err(CodecError::Malformed("empty file key".into()));
        }
        Ok(record)
    }
}
