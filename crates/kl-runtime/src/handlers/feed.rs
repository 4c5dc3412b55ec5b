//! # Transaction Feed
//!
//! Reads JSON lines and pushes one stage unit per line. A line is either a
//! single `RawTransaction` object or an array of them. Blank lines are
//! skipped; lines that do not parse are logged and skipped.

use kl_file_loader::StageInput;
use serde::Deserialize;
use shared_types::{RawTransaction, TransactionInput};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Deserialize)]
#[serde(untagged)]
enum FeedLine {
    One(RawTransaction),
    Many(Vec<RawTransaction>),
}

impl From<FeedLine> for StageInput {
    fn from(line: FeedLine) -> Self {
        match line {
            FeedLine::One(tx) => StageInput::from(tx),
            FeedLine::Many(txs) => txs
                .into_iter()
                .map(TransactionInput::Raw)
                .collect::<Vec<_>>()
                .into(),
        }
    }
}

/// Counters of one feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    /// Units handed to the stage.
    pub units: u64,
    /// Lines that did not parse.
    pub rejected: u64,
}

/// Feed `reader` into the stage until EOF or until the stage goes away.
///
/// Dropping `input` on return lets the stage finish once nothing else feeds it.
pub async fn feed_lines<R>(reader: R, input: mpsc::Sender<StageInput>) -> std::io::Result<FeedStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = FeedStats::default();
    let mut lines = reader.lines();
    let mut line_no = 0u64;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let unit = match serde_json::from_str::<FeedLine>(line) {
            Ok(parsed) => StageInput::from(parsed),
            Err(e) => {
                warn!(line = line_no, error = %e, "Skipping unreadable feed line");
                stats.rejected += 1;
                continue;
            }
        };

        if input.send(unit).await.is_err() {
            debug!("Stage closed, stopping feed");
            break;
        }
        stats.units += 1;
    }

    Ok(stats)
}
