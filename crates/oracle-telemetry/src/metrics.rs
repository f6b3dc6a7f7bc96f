//! Prometheus metrics for the oracle node.
//!
//! All metrics follow the naming convention: `oc_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: votes cast, verification failures, broadcast errors, dropped events
//! - **Gauge**: highest verified block height
//! - **Histogram**: time spent handling one event

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter,
    IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Votes accepted by the chain
    pub static ref VOTES_CAST: IntCounterVec = IntCounterVec::new(
        Opts::new("oc_votes_cast_total", "Votes accepted by the chain"),
        &["event", "option"]
    ).expect("metric creation failed");

    /// Verification steps that turned a vote into No
    pub static ref VERIFICATION_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("oc_verification_failures_total", "Refused verifications by stage"),
        &["stage", "reason"]
    ).expect("metric creation failed");

    /// Highest verified block height
    pub static ref TRUSTED_HEIGHT: IntGauge = IntGauge::new(
        "oc_trusted_height",
        "Height of the highest light-client verified block"
    ).expect("metric creation failed");

    /// Event handling duration
    pub static ref HANDLER_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "oc_handler_duration_seconds",
            "Time spent deciding and broadcasting one event"
        ).buckets(exponential_buckets(0.005, 2.0, 14).expect("valid buckets")),
        &["event"]
    ).expect("metric creation failed");

    /// Failed vote broadcasts
    pub static ref BROADCAST_ERRORS: IntCounter = IntCounter::new(
        "oc_broadcast_errors_total",
        "Votes decided but not delivered"
    ).expect("metric creation failed");

    /// Broadcast errors by reason
    pub static ref BROADCAST_ERRORS_BY_REASON: IntCounterVec = IntCounterVec::new(
        Opts::new("oc_broadcast_errors_by_reason_total", "Broadcast errors by reason"),
        &["reason"]
    ).expect("metric creation failed");

    /// Events dropped without a vote
    pub static ref EVENTS_DROPPED: IntCounterVec = IntCounterVec::new(
        Opts::new("oc_events_dropped_total", "Events dropped without a vote"),
        &["event"]
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry. Metrics already
/// registered are skipped.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(VOTES_CAST.clone()),
        Box::new(VERIFICATION_FAILURES.clone()),
        Box::new(TRUSTED_HEIGHT.clone()),
        Box::new(HANDLER_DURATION.clone()),
        Box::new(BROADCAST_ERRORS.clone()),
        Box::new(BROADCAST_ERRORS_BY_REASON.clone()),
        Box::new(EVENTS_DROPPED.clone()),
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

/// Timer guard observing a histogram on drop.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a timer for `histogram`.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent() {
        assert!(register_metrics().is_ok());
        assert!(register_metrics().is_ok());
    }

    #[test]
    fn test_counter_increment() {
        VOTES_CAST.with_label_values(&["register_oracle", "yes"]).inc();
        assert!(VOTES_CAST.with_label_values(&["register_oracle", "yes"]).get() >= 1);
    }

    #[test]
    fn test_gauge_set() {
        TRUSTED_HEIGHT.set(42);
        assert_eq!(TRUSTED_HEIGHT.get(), 42);
    }

    #[test]
    fn test_timer_observes_on_drop() {
        let histogram = HANDLER_DURATION.with_label_values(&["data_delivery"]);
        let before = histogram.get_sample_count();
        drop(HistogramTimer::new(&histogram));
        assert_eq!(histogram.get_sample_count(), before + 1);
    }

    #[test]
    fn test_encode_contains_registered_metric() {
        register_metrics().unwrap();
        EVENTS_DROPPED.with_label_values(&["data_verification"]).inc();
        let text = encode_metrics().unwrap();
        assert!(text.contains("oc_events_dropped_total"));
    }
}
