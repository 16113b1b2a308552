//! Health classification.
//!
//! # Priority (first match wins)
//! ```text
//! attempts < min_sample_size                      → Unknown
//! consecutive_failures >= dead_threshold          → Dead
//! success_rate > rate threshold && avg < latency  → Healthy
//! otherwise                                       → Degraded
//! ```
//!
//! Status is always recomputed from the counters, never patched, so it cannot
//! drift from them.

use crate::config::HealthConfig;
use crate::health::stats::{HealthStatus, RelayHealthStats};

/// Fraction of attempts that succeeded; 0 when there are none.
pub fn success_rate(success_count: u64, failure_count: u64) -> f64 {
    let total = success_count.saturating_add(failure_count);
    if total == 0 {
        return 0.0;
    }
    success_count as f64 / total as f64
}

/// Classify a relay from its counters and latency average.
///
/// Reads only `success_count`, `failure_count`, `consecutive_failures` and
/// `avg_response_time_ms`. A relay with no latency sample passes the latency check.
pub fn classify(stats: &RelayHealthStats, config: &HealthConfig) -> HealthStatus {
    if stats.total_attempts() < config.min_sample_size {
        return HealthStatus::Unknown;
    }

    if stats.consecutive_failures >= config.dead_threshold {
        return HealthStatus::Dead;
    }

    let rate = success_rate(stats.success_count, stats.failure_count);
    let fast_enough = stats
        .avg_response_time_ms
        .map_or(true, |avg| avg < config.healthy_latency_ms);

    if rate > config.healthy_success_rate && fast_enough {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    }
}
