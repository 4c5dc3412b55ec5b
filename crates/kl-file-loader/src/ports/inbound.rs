//! # Inbound Ports (Driving Ports / API)
//!
//! The public API of the file loader.

use crate::domain::errors::LoaderError;
use crate::domain::outcome::LoadReport;
use async_trait::async_trait;
use shared_types::entities::{LoadedFile, TransactionInput};

/// File Loader API.
///
/// Implementations must be thread-safe (`Send + Sync`); independent batches
/// may run concurrently.
#[async_trait]
pub trait FileLoaderApi: Send + Sync {
    /// Run one batch and return every typed outcome.
    ///
    /// # Errors
    /// * `LoaderError::Storage` - the keeper failed in either fetch round
    async fn run(&self, batch: Vec<TransactionInput>) -> Result<LoadReport, LoaderError>;

    /// Run one batch and return public and shared files in input order.
    ///
    /// An empty batch yields an empty collection.
    async fn load(&self, batch: Vec<TransactionInput>) -> Result<Vec<LoadedFile>, LoaderError> {
        Ok(self.run(batch).await?.into_files())
    }
}
