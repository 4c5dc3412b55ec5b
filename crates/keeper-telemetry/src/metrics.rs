//! Prometheus metrics for the file loader.
//!
//! All metrics follow the naming convention: `kl_loader_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry,
    TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // BATCH METRICS
    // =========================================================================

    /// Batches run through the pipeline
    pub static ref BATCHES_TOTAL: Counter = Counter::new(
        "kl_loader_batches_total",
        "Total number of batches run through the loader"
    ).expect("metric creation failed");

    /// Batch duration histogram
    pub static ref BATCH_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "kl_loader_batch_duration_seconds",
            "Time spent loading one batch"
        ).buckets(exponential_buckets(0.0005, 2.0, 14).expect("bucket layout"))
    ).expect("metric creation failed");

    // =========================================================================
    // ITEM METRICS
    // =========================================================================

    /// Files yielded, by kind
    pub static ref FILES_LOADED: CounterVec = CounterVec::new(
        Opts::new("kl_loader_files_loaded_total", "Files loaded by kind"),
        &["kind"]  // kind: public/permission/sharedfile
    ).expect("metric creation failed");

    /// Items dropped as soft failures
    pub static ref ITEMS_DROPPED: Counter = Counter::new(
        "kl_loader_items_dropped_total",
        "Total items dropped without failing their batch"
    ).expect("metric creation failed");

    // =========================================================================
    // ERROR METRICS
    // =========================================================================

    /// Batches rejected by a storage failure
    pub static ref STORAGE_FAILURES: Counter = Counter::new(
        "kl_loader_storage_failures_total",
        "Total batches rejected because the keeper failed"
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(BATCHES_TOTAL.clone()),
        Box::new(BATCH_DURATION.clone()),
        Box::new(FILES_LOADED.clone()),
        Box::new(ITEMS_DROPPED.clone()),
        Box::new(STORAGE_FAILURES.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
