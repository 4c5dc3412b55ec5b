//! # Loader Stage
//!
//! Push-based stage over a continuous feed of transactions.
//!
//! ```text
//! StageInput ──mpsc(bounded)──→ [ run ] ──mpsc(bounded)──→ Result<LoadedFile, LoaderError>
//!                                  │
//!                                  └──→ EventPublisher (file:*, file, error)
//! ```
//!
//! Each unit runs through the loader. Notifications are raised for every
//! outcome, then files are forwarded one by one in batch order. A systemic
//! failure is published as `error`, forwarded as `Err`, and the stage moves
//! on to the next unit.

use crate::adapters::events::notifications_for;
use crate::domain::errors::LoaderError;
use crate::domain::value_objects::StageConfig;
use crate::ports::inbound::FileLoaderApi;
use shared_bus::{EventPublisher, LoaderEvent};
use shared_types::entities::{LoadedFile, RawTransaction, TransactionInput};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

/// Item emitted downstream.
pub type StageResult = Result<LoadedFile, LoaderError>;

/// One unit of input: a batch of one or more transactions.
#[derive(Debug, Clone, Default)]
pub struct StageInput {
    /// Items of the unit.
    pub items: Vec<TransactionInput>,
}

impl From<Vec<TransactionInput>> for StageInput {
    fn from(items: Vec<TransactionInput>) -> Self {
        Self { items }
    }
}

impl From<TransactionInput> for StageInput {
    fn from(item: TransactionInput) -> Self {
        Self { items: vec![item] }
    }
}

impl From<RawTransaction> for StageInput {
    fn from(tx: RawTransaction) -> Self {
        Self::from(TransactionInput::Raw(tx))
    }
}

/// Counters reported when the stage stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageStats {
    /// Units processed.
    pub units: u64,
    /// Files forwarded downstream.
    pub files: u64,
    /// Units rejected by a systemic failure.
    pub errors: u64,
}

/// Handle to a running stage.
pub struct StageHandle {
    input: mpsc::Sender<StageInput>,
    output: mpsc::Receiver<StageResult>,
    task: JoinHandle<StageStats>,
}

impl StageHandle {
    /// Another sender for the input queue.
    pub fn input(&self) -> mpsc::Sender<StageInput> {
        self.input.clone()
    }

    /// Queue a unit. Waits while the input queue is full.
    pub async fn send(
        &self,
        unit: impl Into<StageInput>,
    ) -> Result<(), mpsc::error::SendError<StageInput>> {
        self.input.send(unit.into()).await
    }

    /// Next downstream item; `None` once the stage has stopped.
    pub async fn recv(&mut self) -> Option<StageResult> {
        self.output.recv().await
    }

    /// Split into the input sender, the output stream and the task.
    ///
    /// The stage stops once every input sender is dropped.
    pub fn into_parts(
        self,
    ) -> (
        mpsc::Sender<StageInput>,
        ReceiverStream<StageResult>,
        JoinHandle<StageStats>,
    ) {
        (self.input, ReceiverStream::new(self.output), self.task)
    }

    /// Output as a stream. Drops this handle's input sender; senders taken
    /// with [`StageHandle::input`] keep the stage alive.
    pub fn into_output_stream(self) -> ReceiverStream<StageResult> {
        ReceiverStream::new(self.output)
    }

    /// Close the input, drain what is left downstream and wait for the stage.
    pub async fn finish(self) -> Result<(Vec<StageResult>, StageStats), JoinError> {
        let Self {
            input,
            mut output,
            task,
        } = self;
        drop(input);

        let mut rest = Vec::new();
        while let Some(item) = output.recv().await {
            rest.push(item);
        }
        let stats = task.await?;
        Ok((rest, stats))
    }
}

/// Spawner for loader stages.
pub struct LoaderStage;

impl LoaderStage {
    /// Spawn a stage on the current Tokio runtime.
    ///
    /// # Errors
    /// * `LoaderError::InvalidConfig` - `config.buffer_capacity` is zero
    pub fn spawn(
        loader: Arc<dyn FileLoaderApi>,
        publisher: Arc<dyn EventPublisher>,
        config: StageConfig,
    ) -> Result<StageHandle, LoaderError> {
        config.validate()?;
        let (input_tx, input_rx) = mpsc::channel(config.buffer_capacity);
        let (output_tx, output_rx) = mpsc::channel(config.buffer_capacity);

        let task = tokio::spawn(run_stage(loader, publisher, input_rx, output_tx));

        Ok(StageHandle {
            input: input_tx,
            output: output_rx,
            task,
        })
    }
}

async fn run_stage(
    loader: Arc<dyn FileLoaderApi>,
    publisher: Arc<dyn EventPublisher>,
    mut input: mpsc::Receiver<StageInput>,
    output: mpsc::Sender<StageResult>,
) -> StageStats {
    let mut stats = StageStats::default();
    info!("Loader stage started");

    while let Some(unit) = input.recv().await {
        stats.units += 1;

        match loader.run(unit.items).await {
            Ok(report) => {
                let events = report.outcomes().iter().flat_map(notifications_for).collect();
                publisher.publish_all(events).await;
                for file in report.into_files() {
                    if output.send(Ok(file)).await.is_err() {
                        debug!("Downstream closed, stopping stage");
                        return stats;
                    }
                    stats.files += 1;
                }
            }
            Err(error) => {
                stats.errors += 1;
                warn!(unit = stats.units, error = %error, "Unit failed, stage continues");
                publisher
                    .publish(LoaderEvent::Error {
                        message: error.to_string(),
                    })
                    .await;
                if output.send(Err(error)).await.is_err() {
                    debug!("Downstream closed, stopping stage");
                    return stats;
                }
            }
        }
    }

    info!(
        units = stats.units,
        files = stats.files,
        errors = stats.errors,
        "Loader stage stopped"
    );
    stats
}
