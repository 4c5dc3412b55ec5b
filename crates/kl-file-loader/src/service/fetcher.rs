//! # Batch Fetcher
//!
//! One keeper round trip per call. Duplicate keys are requested once and
//! share their result.

use crate::domain::entities::FetchResult;
use crate::domain::errors::{KeeperError, LoaderError};
use crate::domain::value_objects::FetchRound;
use crate::ports::outbound::KeeperClient;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// Deduplicating, order-preserving wrapper over `KeeperClient::get_many`.
pub struct BatchFetcher {
    keeper: Arc<dyn KeeperClient>,
}

impl BatchFetcher {
    /// Create a fetcher over `keeper`.
    pub fn new(keeper: Arc<dyn KeeperClient>) -> Self {
        Self { keeper }
    }

    /// Fetch `keys` with exactly one `get_many` call.
    ///
    /// The result has the same length and order as `keys`.
    ///
    /// # Errors
    /// * `LoaderError::Storage` - the keeper failed or answered with the
    ///   wrong number of entries
    pub async fn fetch(
        &self,
        round: FetchRound,
        keys: &[String],
    ) -> Result<Vec<FetchResult>, LoaderError> {
        let mut unique: Vec<String> = Vec::with_capacity(keys.len());
        let mut slot_of: HashMap<&str, usize> = HashMap::with_capacity(keys.len());
        let positions: Vec<usize> = keys
            .iter()
            .map(|key| {
                *slot_of.entry(key.as_str()).or_insert_with(|| {
                    unique.push(key.clone());
                    unique.len() - 1
                })
            })
            .collect();

        trace!(%round, requested = keys.len(), unique = unique.len(), "Batch fetch");

        let response = self
            .keeper
            .get_many(&unique)
            .await
            .map_err(|source| LoaderError::Storage { round, source })?;

        if response.len() != unique.len() {
            return Err(LoaderError::Storage {
                round,
                source: KeeperError::ResponseLength {
                    expected: unique.len(),
                    actual: response.len(),
                },
            });
        }

        Ok(positions
            .into_iter()
            .map(|slot| FetchResult::from(response[slot].clone()))
            .collect())
    }
}
