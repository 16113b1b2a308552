//! Per-relay telemetry store.
//!
//! # Responsibilities
//! - Own the only mutable copy of every relay's stats
//! - Apply telemetry, then reclassify and reschedule in the same critical section
//! - Hand out owned snapshots, never references into the map
//!
//! # Concurrency
//! Entries live in a `DashMap`. Each update holds the entry's shard guard for
//! its whole read-modify-classify sequence, so concurrent reports for one URL
//! are serialized while different URLs proceed in parallel.
//!
//! The configuration is loaded only once the guard is held, and transitions
//! are sent to subscribers before it is released. A reload therefore either
//! sees an update's result or is seen by it, and each URL's transitions reach
//! subscribers in the order they happened.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::clock::{Clock, Timestamp};
use crate::config::HealthConfig;
use crate::health::classifier::{classify, success_rate};
use crate::health::recovery::RecoveryScheduler;
use crate::health::stats::{HealthStatus, RelayHealthStats, StatusTransition};
use crate::relay::normalize_relay_url;

/// Outcome of one telemetry report.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    /// Normalized key the report was filed under.
    pub key: String,
    pub transition: Option<StatusTransition>,
}

/// Owner of all relay health state.
#[derive(Debug)]
pub struct StatsStore {
    entries: DashMap<String, RelayHealthStats>,
    config: ArcSwap<HealthConfig>,
    /// Held across a config swap and the reclassification that follows it.
    reload: Mutex<()>,
    transitions: broadcast::Sender<StatusTransition>,
    clock: Arc<dyn Clock>,
}

impl StatsStore {
    /// Create an empty store that announces transitions on `transitions`.
    pub fn new(
        config: HealthConfig,
        clock: Arc<dyn Clock>,
        transitions: broadcast::Sender<StatusTransition>,
    ) -> Self {
        Self {
            entries: DashMap::new(),
            config: ArcSwap::from_pointee(config),
            reload: Mutex::new(()),
            transitions,
            clock,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> HealthConfig {
        **self.config.load()
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now_ms()
    }

    /// Record a successful request that took `latency_ms`.
    ///
    /// Negative or non-finite latencies are dropped; the success still counts.
    pub fn record_success(&self, url: &str, latency_ms: f64) -> Recorded {
        let key = normalize_relay_url(url);
        let now = self.now();

        let mut entry = self
            .entries
            .entry(key.clone())
            .or_insert_with(|| RelayHealthStats::new(key.as_str()));
        let config = self.config();
        let stats = &mut *entry;
        let previous = stats.status;

        stats.success_count = stats.success_count.saturating_add(1);
        stats.consecutive_failures = 0;
        stats.last_success_at = Some(now);

        if latency_ms.is_finite() && latency_ms >= 0.0 {
            stats.avg_response_time_ms = Some(match stats.avg_response_time_ms {
                Some(avg) => avg * (1.0 - config.ema_alpha) + latency_ms * config.ema_alpha,
                None => latency_ms,
            });
        } else {
            tracing::debug!(relay = %key, latency_ms, "Discarding malformed latency sample");
        }

        refresh(stats, &config, false, now);
        tracing::trace!(relay = %key, status = %stats.status, "Recorded success");

        let transition = self.announce(StatusTransition::between(stats, previous, now));
        drop(entry);
        Recorded { key, transition }
    }

    /// Record a failed request (connection error, protocol error or timeout).
    pub fn record_failure(&self, url: &str) -> Recorded {
        let key = normalize_relay_url(url);
        let now = self.now();

        let mut entry = self
            .entries
            .entry(key.clone())
            .or_insert_with(|| RelayHealthStats::new(key.as_str()));
        let config = self.config();
        let stats = &mut *entry;
        let previous = stats.status;

        stats.failure_count = stats.failure_count.saturating_add(1);
        stats.consecutive_failures = stats.consecutive_failures.saturating_add(1);
        stats.last_failure_at = Some(now);

        refresh(stats, &config, true, now);
        tracing::trace!(
            relay = %key,
            status = %stats.status,
            consecutive_failures = stats.consecutive_failures,
            "Recorded failure"
        );

        let transition = self.announce(StatusTransition::between(stats, previous, now));
        drop(entry);
        Recorded { key, transition }
    }

    pub fn get_stats(&self, url: &str) -> Option<RelayHealthStats> {
        let key = normalize_relay_url(url);
        self.entries.get(&key).map(|r| r.value().clone())
    }

    /// Snapshot of every entry, keyed by normalized URL.
    pub fn get_all_stats(&self) -> HashMap<String, RelayHealthStats> {
        self.entries
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect()
    }

    /// Overwrite an entry with its zero state. Unknown URLs are ignored.
    pub fn reset_stats(&self, url: &str) -> Option<StatusTransition> {
        let key = normalize_relay_url(url);
        let now = self.now();

        let mut entry = self.entries.get_mut(&key)?;
        let previous = entry.status;
        entry.reset();
        self.announce(StatusTransition::between(&entry, previous, now))
    }

    /// Drop every entry. Returns a transition to `Unknown` for each entry that was not already unknown.
    pub fn reset_all(&self) -> Vec<StatusTransition> {
        let now = self.now();
        let mut transitions = Vec::new();

        // retain visits each shard under its write lock, so nothing recorded
        // concurrently is reported as reset without being removed
        self.entries.retain(|url, stats| {
            if stats.status != HealthStatus::Unknown {
                transitions.extend(self.announce(Some(StatusTransition {
                    url: url.clone(),
                    from: stats.status,
                    to: HealthStatus::Unknown,
                    at: now,
                })));
            }
            false
        });

        transitions
    }

    /// Swap in a new configuration and reclassify every entry under it.
    ///
    /// Reloads are serialized, so the last one applied is the one every entry
    /// ends up classified under.
    pub fn apply_config(&self, config: HealthConfig) -> Vec<StatusTransition> {
        let _reload = self.reload.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.config.store(Arc::new(config));
        let now = self.now();

        let mut transitions = Vec::new();
        for mut entry in self.entries.iter_mut() {
            let stats = &mut *entry;
            let previous = stats.status;
            refresh(stats, &config, false, now);
            transitions.extend(self.announce(StatusTransition::between(stats, previous, now)));
        }
        transitions
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Normalized URLs of every tracked relay, sorted.
    pub fn urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.entries.iter().map(|r| r.key().clone()).collect();
        urls.sort();
        urls
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusTransition> {
        self.transitions.subscribe()
    }

    /// Send `transition` to subscribers. Callers hold the entry's guard.
    fn announce(&self, transition: Option<StatusTransition>) -> Option<StatusTransition> {
        if let Some(transition) = &transition {
            // No subscribers is fine.
            let _ = self.transitions.send(transition.clone());
        }
        transition
    }
}

/// Recompute every derived field of `stats` from its counters.
fn refresh(
    stats: &mut RelayHealthStats,
    config: &HealthConfig,
    failure_recorded: bool,
    now: Timestamp,
) {
    stats.success_rate = success_rate(stats.success_count, stats.failure_count);
    stats.status = classify(stats, config);
    RecoveryScheduler::from_config(config).reconcile(stats, failure_recorded, now);
}
