//! The relay health service object.
//!
//! # Responsibilities
//! - Accept telemetry from the transport layer
//! - Answer routing queries (`select_relays`) and reporting queries
//! - Publish status transitions to subscribers, logs and metrics
//!
//! Construct one at startup and hand clones to every collaborator; clones
//! share state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::clock::{Clock, SystemClock};
use crate::config::validation::{validate_health_config, ValidationError};
use crate::config::{HealthConfig, TrackerConfig};
use crate::health::recovery;
use crate::health::stats::{HealthStatus, RelayHealthStats, StatusTransition};
use crate::health::store::StatsStore;
use crate::observability::metrics;
use crate::relay::normalize_relay_url;
use crate::routing::report::{render_health_report, HealthSummary};
use crate::routing::selector::{self, Candidate};

/// Buffered transitions per subscriber before the slowest one starts lagging.
const TRANSITION_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug)]
struct Inner {
    store: StatsStore,
    metrics_enabled: bool,
}

/// Tracks relay health and turns it into routing preferences.
#[derive(Debug, Clone)]
pub struct RelayHealthTracker {
    inner: Arc<Inner>,
}

impl Default for RelayHealthTracker {
    fn default() -> Self {
        Self::new(HealthConfig::default())
    }
}

impl RelayHealthTracker {
    /// Create a tracker using the system clock.
    pub fn new(config: HealthConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a tracker reading time from `clock`.
    pub fn with_clock(config: HealthConfig, clock: Arc<dyn Clock>) -> Self {
        Self::build(config, clock, true)
    }

    /// Create a tracker from a loaded configuration file.
    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::build(
            config.health,
            Arc::new(SystemClock),
            config.observability.metrics_enabled,
        )
    }

    fn build(config: HealthConfig, clock: Arc<dyn Clock>, metrics_enabled: bool) -> Self {
        let (transitions, _) = broadcast::channel(TRANSITION_CHANNEL_CAPACITY);
        tracing::debug!(?config, metrics_enabled, "Relay health tracker created");
        Self {
            inner: Arc::new(Inner {
                store: StatsStore::new(config, clock, transitions),
                metrics_enabled,
            }),
        }
    }

    // --- Telemetry ---

    /// Report a successful response from `url` that took `latency_ms`.
    pub fn record_success(&self, url: &str, latency_ms: f64) {
        let recorded = self.inner.store.record_success(url, latency_ms);
        if self.inner.metrics_enabled {
            metrics::record_success(&recorded.key, latency_ms);
        }
        if let Some(transition) = recorded.transition {
            self.observe(&transition);
        }
    }

    /// Report a connection error, protocol error or timeout from `url`.
    pub fn record_failure(&self, url: &str) {
        let recorded = self.inner.store.record_failure(url);
        if self.inner.metrics_enabled {
            metrics::record_failure(&recorded.key);
        }
        if let Some(transition) = recorded.transition {
            self.observe(&transition);
        }
    }

    // --- Queries ---

    pub fn get_stats(&self, url: &str) -> Option<RelayHealthStats> {
        self.inner.store.get_stats(url)
    }

    pub fn get_all_stats(&self) -> HashMap<String, RelayHealthStats> {
        self.inner.store.get_all_stats()
    }

    pub fn get_summary(&self) -> HealthSummary {
        let summary = HealthSummary::from_stats(self.get_all_stats().values());
        if self.inner.metrics_enabled {
            metrics::record_summary(&summary);
        }
        summary
    }

    /// Whether `url` is dead and due for a recovery probe.
    pub fn is_probe_eligible(&self, url: &str) -> bool {
        let now = self.inner.store.now();
        self.get_stats(url)
            .is_some_and(|stats| recovery::is_probe_eligible(&stats, now))
    }

    /// Time left before a dead relay may be probed; `None` unless `url` is dead.
    pub fn time_until_probe(&self, url: &str) -> Option<Duration> {
        let now = self.inner.store.now();
        self.get_stats(url)
            .and_then(|stats| recovery::time_until_probe(&stats, now))
    }

    /// Choose up to `n` of `candidates` to contact, best first.
    ///
    /// Never empty when `candidates` is non-empty, even if every relay is dead.
    pub fn select_relays<S: AsRef<str>>(&self, candidates: &[S], n: usize) -> Vec<String> {
        let now = self.inner.store.now();
        let candidates = candidates
            .iter()
            .map(|url| {
                let url = url.as_ref();
                let key = normalize_relay_url(url);
                Candidate {
                    url: url.to_string(),
                    stats: self.inner.store.get_stats(&key),
                    key,
                }
            })
            .collect();

        selector::select_relays(candidates, n, now)
    }

    /// Render the diagnostic report.
    pub fn health_report(&self) -> String {
        let stats = self.get_all_stats();
        let summary = HealthSummary::from_stats(stats.values());
        render_health_report(&stats, &summary)
    }

    /// Emit the diagnostic report through `tracing`, one event per line.
    pub fn log_health_report(&self) {
        for line in self.health_report().lines() {
            tracing::info!(target: "relay_health::report", "{}", line);
        }
    }

    // --- Maintenance ---

    /// Return `url` to its zero state. Unknown URLs are ignored.
    pub fn reset_stats(&self, url: &str) {
        if let Some(transition) = self.inner.store.reset_stats(url) {
            self.observe(&transition);
        }
    }

    /// Forget every relay.
    pub fn reset_all(&self) {
        for transition in self.inner.store.reset_all() {
            self.observe(&transition);
        }
    }

    pub fn config(&self) -> HealthConfig {
        self.inner.store.config()
    }

    /// Validate and apply new thresholds, reclassifying every relay.
    ///
    /// An invalid configuration is rejected and the current one kept.
    pub fn apply_config(&self, config: HealthConfig) -> Result<(), Vec<ValidationError>> {
        validate_health_config(&config)?;

        let transitions = self.inner.store.apply_config(config);
        tracing::info!(
            reclassified = transitions.len(),
            "Applied health configuration"
        );
        for transition in &transitions {
            self.observe(transition);
        }
        Ok(())
    }

    /// Receive every status transition from now on.
    ///
    /// Transitions of one relay arrive in the order they happened, each
    /// `from` matching the previous `to`. No order is promised across
    /// relays; use [`StatusTransition::at`] to interleave them. A receiver
    /// that falls more than 256 transitions behind gets
    /// [`broadcast::error::RecvError::Lagged`] and skips ahead.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusTransition> {
        self.inner.store.subscribe()
    }

    /// Log and count a transition the store has already sent to subscribers.
    fn observe(&self, transition: &StatusTransition) {
        match transition.to {
            HealthStatus::Dead => tracing::warn!(
                relay = %transition.url,
                from = %transition.from,
                "Relay marked dead"
            ),
            _ if transition.from == HealthStatus::Dead => tracing::info!(
                relay = %transition.url,
                to = %transition.to,
                "Relay recovered from dead"
            ),
            _ => tracing::debug!(
                relay = %transition.url,
                from = %transition.from,
                to = %transition.to,
                "Relay status changed"
            ),
        }

        if self.inner.metrics_enabled {
            metrics::record_transition(transition);
        }
    }
}
