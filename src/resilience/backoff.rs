//! Capped backoff curves.
//!
//! Both curves are deterministic and non-decreasing in `failures`, so a relay
//! that keeps failing is never probed sooner than it was the last time.

use std::time::Duration;

use crate::config::BackoffStrategy;

/// Calculate the backoff delay after `failures` consecutive failures.
pub fn calculate_backoff(
    strategy: BackoffStrategy,
    failures: u64,
    base_ms: u64,
    max_ms: u64,
) -> Duration {
    if failures == 0 {
        return Duration::from_millis(0);
    }

    let delay_ms = match strategy {
        BackoffStrategy::Linear => base_ms.saturating_mul(failures),
        BackoffStrategy::Exponential => {
            let exponent = u32::try_from(failures - 1).unwrap_or(u32::MAX);
            base_ms.saturating_mul(2u64.saturating_pow(exponent))
        }
    };

    Duration::from_millis(delay_ms.min(max_ms))
}
