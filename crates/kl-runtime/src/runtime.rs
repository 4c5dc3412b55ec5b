//! # Loader Runtime
//!
//! Runs one feed through the stage:
//!
//! ```text
//! reader ──feed_lines──→ LoaderStage ──write_results──→ writer
//!                            │
//!                            └──→ bus ──→ MetricsHandler
//! ```
//!
//! The run ends when the reader hits EOF and the stage has drained.

use crate::container::LoaderContainer;
use crate::handlers::{feed_lines, write_results, FeedStats, MetricsHandler, OutputStats};
use anyhow::{Context, Result};
use kl_file_loader::StageStats;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::watch;
use tracing::{error, info};

/// Counters of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Feed side.
    pub feed: FeedStats,
    /// Stage side.
    pub stage: StageStats,
    /// Output side.
    pub output: OutputStats,
}

/// The runtime driving the loader stage.
pub struct LoaderRuntime {
    container: Arc<LoaderContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl LoaderRuntime {
    /// Create a runtime over a wired container.
    pub fn new(container: LoaderContainer) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// The container.
    pub fn container(&self) -> Arc<LoaderContainer> {
        Arc::clone(&self.container)
    }

    /// Start the bus handlers.
    fn start_handlers(&self) {
        let handler = MetricsHandler::new(self.container.bus.subscribe(MetricsHandler::filter()));
        let mut shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = handler.run() => {}
                _ = shutdown.changed() => {
                    info!("Metrics handler shutdown signal received");
                }
            }
        });
    }

    /// Feed `reader` through the stage and write files to `writer`.
    pub async fn run<R, W>(&self, reader: R, writer: W) -> Result<RunSummary>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.start_handlers();

        let stage = self
            .container
            .spawn_stage()
            .context("Failed to spawn loader stage")?;
        let (input, output, task) = stage.into_parts();

        let (feed, written) = tokio::join!(feed_lines(reader, input), write_results(output, writer));
        let stage = task.await.context("Loader stage panicked")?;

        let summary = RunSummary {
            feed: feed.context("Failed to read transaction feed")?,
            stage,
            output: written.context("Failed to write loaded files")?,
        };

        info!(
            units = summary.feed.units,
            rejected_lines = summary.feed.rejected,
            files = summary.output.files,
            failed_units = summary.stage.errors,
            "Feed complete"
        );
        Ok(summary)
    }

    /// Stop the bus handlers.
    pub fn shutdown(&self) {
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
    }
}
