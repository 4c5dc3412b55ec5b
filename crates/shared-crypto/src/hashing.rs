//! # BLAKE3 Hashing
//!
//! Keeper content addresses and derived keys.

/// Keeper address of a blob: lowercase hex of its BLAKE3 hash.
pub fn content_address(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// 32-byte key bound to `context`, derived from `key_material`.
pub fn derive_key(context: &str, key_material: &[u8]) -> [u8; 32] {
    blake3::derive_key(context, key_material)
}
