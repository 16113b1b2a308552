//! Per-relay health records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;

/// Reliability classification of a relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Too few samples to judge.
    #[default]
    Unknown,
    Healthy,
    Degraded,
    /// On a failure streak; only probed once its backoff has elapsed.
    Dead,
}

impl HealthStatus {
    pub const ALL: [HealthStatus; 4] = [
        HealthStatus::Healthy,
        HealthStatus::Degraded,
        HealthStatus::Dead,
        HealthStatus::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Unknown => "unknown",
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Dead => "dead",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Telemetry snapshot for a single relay.
///
/// Values handed out by the tracker are owned copies; mutating them has no
/// effect on the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayHealthStats {
    /// Normalized relay URL (the identity key).
    pub url: String,
    pub status: HealthStatus,
    pub success_count: u64,
    pub failure_count: u64,
    /// Failures since the last success.
    pub consecutive_failures: u64,
    /// `success_count / (success_count + failure_count)`, 0 with no samples.
    pub success_rate: f64,
    /// Moving average of successful response latency, if any was observed.
    pub avg_response_time_ms: Option<f64>,
    pub last_success_at: Option<Timestamp>,
    pub last_failure_at: Option<Timestamp>,
    /// Earliest time a dead relay may be probed. Set only while `Dead`.
    pub next_recovery_at: Option<Timestamp>,
}

impl RelayHealthStats {
    /// Zero state for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: HealthStatus::Unknown,
            success_count: 0,
            failure_count: 0,
            consecutive_failures: 0,
            success_rate: 0.0,
            avg_response_time_ms: None,
            last_success_at: None,
            last_failure_at: None,
            next_recovery_at: None,
        }
    }

    /// Return to the zero state, keeping the URL.
    pub fn reset(&mut self) {
        let url = std::mem::take(&mut self.url);
        *self = Self::new(url);
    }

    pub fn total_attempts(&self) -> u64 {
        self.success_count.saturating_add(self.failure_count)
    }
}

/// A change of status observed on one relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTransition {
    pub url: String,
    pub from: HealthStatus,
    pub to: HealthStatus,
    pub at: Timestamp,
}

impl StatusTransition {
    /// `Some` when `previous` differs from the current status of `stats`.
    pub(crate) fn between(
        stats: &RelayHealthStats,
        previous: HealthStatus,
        at: Timestamp,
    ) -> Option<Self> {
        (stats.status != previous).then(|| Self {
            url: stats.url.clone(),
            from: previous,
            to: stats.status,
            at,
        })
    }
}
