//! Metrics emission.
//!
//! # Metrics
//! - `relay_health_outcomes_total` (counter): telemetry reports by relay, outcome
//! - `relay_health_latency_ms` (histogram): successful response latency by relay
//! - `relay_health_transitions_total` (counter): status changes by from, to
//! - `relay_health_relays` (gauge): tracked relays by status
//!
//! # Design Decisions
//! - Emits through the `metrics` facade; the host application installs the exporter
//! - Without an installed recorder every call is a no-op

use crate::health::stats::{HealthStatus, StatusTransition};
use crate::routing::report::HealthSummary;

pub fn record_success(relay: &str, latency_ms: f64) {
    ::metrics::counter!("relay_health_outcomes_total", "relay" => relay.to_string(), "outcome" => "success")
        .increment(1);
    if latency_ms.is_finite() && latency_ms >= 0.0 {
        ::metrics::histogram!("relay_health_latency_ms", "relay" => relay.to_string()).record(latency_ms);
    }
}

pub fn record_failure(relay: &str) {
    ::metrics::counter!("relay_health_outcomes_total", "relay" => relay.to_string(), "outcome" => "failure")
        .increment(1);
}

pub fn record_transition(transition: &StatusTransition) {
    ::metrics::counter!(
        "relay_health_transitions_total",
        "from" => transition.from.as_str(),
        "to" => transition.to.as_str()
    )
    .increment(1);
}

pub fn record_summary(summary: &HealthSummary) {
    for status in HealthStatus::ALL {
        ::metrics::gauge!("relay_health_relays", "status" => status.as_str())
            .set(summary.count(status) as f64);
    }
}
