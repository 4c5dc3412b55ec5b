//! # Metrics Handler
//!
//! Counts files by kind from the `file:*` notifications on the bus.

use keeper_telemetry::FILES_LOADED;
use shared_bus::{EventFilter, EventTopic, Subscription};
use tracing::{debug, info};

/// Bus subscriber feeding `kl_loader_files_loaded_total{kind}`.
pub struct MetricsHandler {
    subscription: Subscription,
}

impl MetricsHandler {
    /// Create a handler over `subscription`.
    pub fn new(subscription: Subscription) -> Self {
        Self { subscription }
    }

    /// Topics the handler must be subscribed to.
    pub fn filter() -> EventFilter {
        EventFilter::topics(vec![
            EventTopic::FilePublic,
            EventTopic::FilePermission,
            EventTopic::FileShared,
        ])
    }

    /// Run until the bus closes. Returns the number of files counted.
    pub async fn run(mut self) -> u64 {
        info!("Metrics handler started");
        let mut counted = 0u64;

        while let Some(event) = self.subscription.recv().await {
            if let Some(file) = event.file() {
                let kind = file.kind.to_string();
                FILES_LOADED.with_label_values(&[kind.as_str()]).inc();
                counted += 1;
                debug!(topic = %event.topic(), index = file.original_index, "File counted");
            }
        }

        info!(counted, "Metrics handler stopped");
        counted
    }
}
