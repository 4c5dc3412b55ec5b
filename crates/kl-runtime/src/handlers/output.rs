//! # Output Writer
//!
//! Writes each loaded file as one JSON line. Stage errors are logged and
//! counted; they do not stop the output.

use kl_file_loader::StageResult;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_stream::{Stream, StreamExt};
use tracing::error;

/// Counters of one output run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputStats {
    /// Files written.
    pub files: u64,
    /// Stage errors seen.
    pub errors: u64,
}

/// Drain `results` into `out` until the stream ends.
pub async fn write_results<S, W>(mut results: S, mut out: W) -> std::io::Result<OutputStats>
where
    S: Stream<Item = StageResult> + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut stats = OutputStats::default();

    while let Some(result) = results.next().await {
        match result {
            Ok(file) => {
                let mut line = serde_json::to_vec(&file)?;
                line.push(b'\n');
                out.write_all(&line).await?;
                stats.files += 1;
            }
            Err(e) => {
                error!(error = %e, "Batch rejected");
                stats.errors += 1;
            }
        }
    }

    out.flush().await?;
    Ok(stats)
}
