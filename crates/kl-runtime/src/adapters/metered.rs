//! # Metered Loader
//!
//! `FileLoaderApi` decorator recording batch metrics around any loader.

use async_trait::async_trait;
use keeper_telemetry::{BATCHES_TOTAL, BATCH_DURATION, ITEMS_DROPPED, STORAGE_FAILURES};
use kl_file_loader::{FileLoaderApi, LoadReport, LoaderError};
use shared_types::TransactionInput;

/// Wraps a loader and records:
///
/// - `kl_loader_batches_total` per run
/// - `kl_loader_batch_duration_seconds` per run
/// - `kl_loader_items_dropped_total` per dropped item
/// - `kl_loader_storage_failures_total` per rejected run
pub struct MeteredLoader<L> {
    inner: L,
}

impl<L: FileLoaderApi> MeteredLoader<L> {
    /// Wrap `inner`.
    pub fn new(inner: L) -> Self {
        Self { inner }
    }

    /// The wrapped loader.
    pub fn inner(&self) -> &L {
        &self.inner
    }
}

#[async_trait]
impl<L: FileLoaderApi> FileLoaderApi for MeteredLoader<L> {
    async fn run(&self, batch: Vec<TransactionInput>) -> Result<LoadReport, LoaderError> {
        BATCHES_TOTAL.inc();
        let _timer = keeper_telemetry::time_histogram!(BATCH_DURATION);

        let result = self.inner.run(batch).await;
        match &result {
            Ok(report) => ITEMS_DROPPED.inc_by(report.dropped().count() as f64),
            Err(e) if e.is_storage() => STORAGE_FAILURES.inc(),
            Err(_) => {}
        }
        result
    }
}
