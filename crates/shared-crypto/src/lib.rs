//! # Shared Crypto
//!
//! The primitives behind permission directives:
//!
//! | Module | Primitive | Used for |
//! |--------|-----------|----------|
//! | `ecdh` | secp256k1 ECDH + BLAKE3 derive-key | sender/recipient shared secret |
//! | `symmetric` | XChaCha20-Poly1305, `nonce ‖ ct ‖ tag` | pointers, records, shared files |
//! | `hashing` | BLAKE3 | keeper content addresses |
//!
//! Secret keys zeroize on drop.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdh;
pub mod errors;
pub mod hashing;
pub mod symmetric;

pub use ecdh::{derive_shared_secret, Secp256k1KeyPair};
pub use errors::CryptoError;
pub use hashing::content_address;
pub use symmetric::{open, seal, SecretKey};
