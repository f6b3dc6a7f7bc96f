//! # Prometheus Reactor Metrics
//!
//! Reactor metrics hook backed by the global telemetry registry.

use oc_05_vote_events::{ReactorMetrics, VoteEventKind};
use oracle_telemetry::{
    BROADCAST_ERRORS, BROADCAST_ERRORS_BY_REASON, EVENTS_DROPPED, HANDLER_DURATION,
    TRUSTED_HEIGHT, VERIFICATION_FAILURES, VOTES_CAST,
};
use shared_types::VoteOption;

/// Records reactor activity in Prometheus.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrometheusMetrics;

impl ReactorMetrics for PrometheusMetrics {
    fn vote_cast(&self, kind: VoteEventKind, option: VoteOption) {
        VOTES_CAST
            .with_label_values(&[kind.label(), option.as_str()])
            .inc();
    }

    fn verification_failed(&self, stage: &str, reason: &str) {
        // Reasons carry free text; only the leading word is a label.
        let reason = reason.split_whitespace().next().unwrap_or("unknown");
        VERIFICATION_FAILURES
            .with_label_values(&[stage, reason])
            .inc();
    }

    fn handler_duration(&self, kind: VoteEventKind, seconds: f64) {
        HANDLER_DURATION
            .with_label_values(&[kind.label()])
            .observe(seconds);
    }

    fn broadcast_failed(&self, reason: &str) {
        BROADCAST_ERRORS.inc();
        BROADCAST_ERRORS_BY_REASON.with_label_values(&[reason]).inc();
    }

    fn event_dropped(&self, kind: VoteEventKind) {
        EVENTS_DROPPED.with_label_values(&[kind.label()]).inc();
    }

    fn trusted_height(&self, height: i64) {
        TRUSTED_HEIGHT.set(height);
    }
}
