//! # Runtime Handlers
//!
//! - `feed` - stdin JSON lines into the stage
//! - `output` - stage results out as JSON lines
//! - `metrics` - bus notifications into Prometheus counters

pub mod feed;
pub mod metrics;
pub mod output;

pub use feed::{feed_lines, FeedStats};
pub use metrics::MetricsHandler;
pub use output::{write_results, OutputStats};
