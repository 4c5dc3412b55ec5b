//! # Identity Resolver
//!
//! Resolves the sender and recipient of every intent in a batch.
//!
//! ## Concurrency
//!
//! Every distinct `(address, want_private)` pair of the batch is looked up
//! once, all lookups are issued together and joined together. Results are
//! read back by slot, never by arrival order.
//!
//! ## Tie-break
//!
//! - sender: first resolvable address of `from_addresses`, in order
//! - recipient: first resolvable address of `to_addresses`, in order, whose
//!   public key differs from the sender's

use crate::domain::entities::{IdentityMatch, ResolvedParties};
use crate::ports::outbound::IdentityLookup;
use futures::future::join_all;
use shared_types::entities::ParsedIntent;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

type SlotKey<'a> = (&'a str, bool);

/// Batch identity resolver over an optional `IdentityLookup`.
pub struct IdentityResolver {
    lookup: Option<Arc<dyn IdentityLookup>>,
}

impl IdentityResolver {
    /// Create a resolver. Without a lookup every intent resolves to no parties.
    pub fn new(lookup: Option<Arc<dyn IdentityLookup>>) -> Self {
        Self { lookup }
    }

    /// Whether a lookup capability is configured.
    pub fn is_configured(&self) -> bool {
        self.lookup.is_some()
    }

    /// Resolve parties for each intent. Output is parallel to `intents`.
    pub async fn resolve(&self, intents: &[ParsedIntent]) -> Vec<ResolvedParties> {
        let Some(lookup) = self.lookup.as_deref() else {
            return vec![ResolvedParties::default(); intents.len()];
        };

        let mut slots: Vec<SlotKey<'_>> = Vec::new();
        let mut slot_of: HashMap<SlotKey<'_>, usize> = HashMap::new();
        for intent in intents {
            let want_private = intent.is_encrypted();
            for address in intent.from_addresses.iter().chain(&intent.to_addresses) {
                slot_of
                    .entry((address.as_str(), want_private))
                    .or_insert_with(|| {
                        slots.push((address.as_str(), want_private));
                        slots.len() - 1
                    });
            }
        }

        let resolved: Vec<Option<Arc<IdentityMatch>>> =
            join_all(slots.iter().map(|&(address, want_private)| async move {
                match lookup.lookup(address, want_private).await {
                    Ok(found) => found.map(Arc::new),
                    Err(e) => {
                        debug!(address, error = %e, "Identity lookup failed, treating as absent");
                        None
                    }
                }
            }))
            .await;

        debug!(
            lookups = slots.len(),
            found = resolved.iter().filter(|m| m.is_some()).count(),
            "Identities resolved"
        );

        intents
            .iter()
            .map(|intent| {
                let want_private = intent.is_encrypted();
                let matched = |address: &String| {
                    slot_of
                        .get(&(address.as_str(), want_private))
                        .and_then(|&slot| resolved[slot].clone())
                };

                let sender = intent.from_addresses.iter().find_map(&matched);
                let recipient = intent
                    .to_addresses
                    .iter()
                    .filter_map(&matched)
                    .find(|candidate| {
                        sender.as_ref().map_or(true, |s| {
                            s.keys.public_key() != candidate.keys.public_key()
                        })
                    });

                ResolvedParties { sender, recipient }
            })
            .collect()
    }
}
