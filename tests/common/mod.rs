//! Shared utilities for integration and load testing.

use std::sync::Arc;

use relay_health::clock::ManualClock;
use relay_health::{HealthConfig, RelayHealthTracker};

/// Fixed starting point for manual clocks (2024-01-01T00:00:00Z).
pub const START_MS: u64 = 1_704_067_200_000;

/// A tracker with default thresholds driven by a manual clock.
pub fn manual_tracker() -> (RelayHealthTracker, Arc<ManualClock>) {
    manual_tracker_with(HealthConfig::default())
}

#[allow(dead_code)]
pub fn manual_tracker_with(config: HealthConfig) -> (RelayHealthTracker, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(START_MS));
    (RelayHealthTracker::with_clock(config, clock.clone()), clock)
}

/// Drive `url` into the dead state with `n` straight failures.
#[allow(dead_code)]
pub fn fail_times(tracker: &RelayHealthTracker, url: &str, n: usize) {
    for _ in 0..n {
        tracker.record_failure(url);
    }
}

/// Give `url` `n` fast successes.
#[allow(dead_code)]
pub fn succeed_times(tracker: &RelayHealthTracker, url: &str, n: usize) {
    for _ in 0..n {
        tracker.record_success(url, 100.0);
    }
}
