//! Recovery scheduling for dead relays.
//!
//! # State Transitions
//! ```text
//! * → Dead:           next_recovery_at = now + backoff(consecutive_failures)
//! Dead → Dead (fail): next_recovery_at pushed out with the longer streak
//! Dead → *:           next_recovery_at cleared
//! ```
//!
//! A probe is not a separate call: once `now >= next_recovery_at` the relay
//! becomes eligible in routing, and whatever the transport reports next
//! flows back through the normal record path.

use std::time::Duration;

use crate::clock::Timestamp;
use crate::config::{BackoffStrategy, HealthConfig};
use crate::health::stats::{HealthStatus, RelayHealthStats};
use crate::resilience::backoff::calculate_backoff;

/// Shortest delay ever scheduled, so a freshly dead relay is never eligible at once.
const MIN_BACKOFF: Duration = Duration::from_millis(1);

/// Computes probe deadlines from the backoff settings of a [`HealthConfig`].
#[derive(Debug, Clone, Copy)]
pub struct RecoveryScheduler {
    strategy: BackoffStrategy,
    dead_threshold: u64,
    base_ms: u64,
    max_ms: u64,
}

impl RecoveryScheduler {
    pub fn from_config(config: &HealthConfig) -> Self {
        Self {
            strategy: config.backoff_strategy,
            dead_threshold: config.dead_threshold,
            base_ms: config.backoff_base_ms,
            max_ms: config.backoff_max_ms,
        }
    }

    /// Delay before a relay with `consecutive_failures` may be probed.
    pub fn backoff(&self, consecutive_failures: u64) -> Duration {
        let steps = match self.strategy {
            BackoffStrategy::Linear => consecutive_failures,
            // doubling starts at the failure that crossed the dead threshold
            BackoffStrategy::Exponential => {
                consecutive_failures.saturating_sub(self.dead_threshold.saturating_sub(1))
            }
        };
        calculate_backoff(self.strategy, steps, self.base_ms, self.max_ms).max(MIN_BACKOFF)
    }

    /// Bring `next_recovery_at` in line with the (already classified) status.
    ///
    /// `failure_recorded` reschedules a relay that was dead before this update.
    pub fn reconcile(&self, stats: &mut RelayHealthStats, failure_recorded: bool, now: Timestamp) {
        if stats.status != HealthStatus::Dead {
            stats.next_recovery_at = None;
            return;
        }

        if stats.next_recovery_at.is_none() || failure_recorded {
            let delay = self.backoff(stats.consecutive_failures);
            stats.next_recovery_at = Some(now.saturating_add(delay.as_millis() as u64));
        }
    }
}

/// True when `stats` is dead and its backoff has elapsed.
pub fn is_probe_eligible(stats: &RelayHealthStats, now: Timestamp) -> bool {
    stats.status == HealthStatus::Dead && stats.next_recovery_at.is_some_and(|at| now >= at)
}

/// Remaining wait before a dead relay may be probed; zero once eligible.
///
/// `None` for relays that are not dead.
pub fn time_until_probe(stats: &RelayHealthStats, now: Timestamp) -> Option<Duration> {
    if stats.status != HealthStatus::Dead {
        return None;
    }
    stats
        .next_recovery_at
        .map(|at| Duration::from_millis(at.saturating_sub(now)))
}
