//! # Shared-Key Deriver
//!
//! Whichever party holds its private key contributes it; the other side
//! contributes its public key. The sender's private key wins when both are
//! present.

use crate::domain::entities::{IdentityMatch, SharedSecret};
use crate::ports::outbound::KeyAgreement;
use tracing::debug;

/// Derive the secret shared by `sender` and `recipient`.
///
/// Returns `None` when either side is missing, when neither side carries a
/// private key, or when the primitive rejects the key material.
pub fn derive_shared_secret(
    agreement: &dyn KeyAgreement,
    sender: Option<&IdentityMatch>,
    recipient: Option<&IdentityMatch>,
) -> Option<SharedSecret> {
    let (sender, recipient) = sender.zip(recipient)?;

    let (private_key, public_key) = if let Some(private_key) = sender.keys.private_key() {
        (private_key, recipient.keys.public_key())
    } else if let Some(private_key) = recipient.keys.private_key() {
        (private_key, sender.keys.public_key())
    } else {
        debug!(
            sender = %sender.address,
            recipient = %recipient.address,
            "No private key on either side"
        );
        return None;
    };

    match agreement.derive_shared_secret(private_key, public_key) {
        Ok(secret) => Some(secret),
        Err(e) => {
            debug!(
                sender = %sender.address,
                recipient = %recipient.address,
                error = %e,
                "Key agreement rejected key material"
            );
            None
        }
    }
}
