//! Health-preferring relay selection.
//!
//! # Preference Order
//! ```text
//! 1. Healthy          (higher success rate, then lower latency first)
//! 2. Unknown          (includes relays never seen; input order)
//! 3. Degraded         (higher success rate, then lower latency first)
//! 4. Dead, probe due  (earliest deadline first)
//! 5. Dead, backing off (earliest deadline first)
//! ```
//!
//! Ties not broken above fall back to input order, so the same inputs always
//! produce the same output. Dead relays still in backoff are a last resort:
//! a non-empty candidate list never yields an empty selection.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::clock::Timestamp;
use crate::health::recovery::is_probe_eligible;
use crate::health::stats::{HealthStatus, RelayHealthStats};

/// A relay offered for selection together with what is known about it.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// URL exactly as the caller supplied it.
    pub url: String,
    /// Normalized key, used to drop duplicates.
    pub key: String,
    pub stats: Option<RelayHealthStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tier {
    Healthy,
    Unknown,
    Degraded,
    ProbeDue,
    BackingOff,
}

fn tier_of(stats: Option<&RelayHealthStats>, now: Timestamp) -> Tier {
    match stats.map(|s| s.status) {
        None | Some(HealthStatus::Unknown) => Tier::Unknown,
        Some(HealthStatus::Healthy) => Tier::Healthy,
        Some(HealthStatus::Degraded) => Tier::Degraded,
        Some(HealthStatus::Dead) => {
            if stats.is_some_and(|s| is_probe_eligible(s, now)) {
                Tier::ProbeDue
            } else {
                Tier::BackingOff
            }
        }
    }
}

struct Ranked {
    tier: Tier,
    index: usize,
    success_rate: f64,
    latency: f64,
    next_recovery_at: Timestamp,
    url: String,
}

impl Ranked {
    fn compare(&self, other: &Self) -> Ordering {
        self.tier
            .cmp(&other.tier)
            .then_with(|| match self.tier {
                Tier::Healthy | Tier::Degraded => other
                    .success_rate
                    .total_cmp(&self.success_rate)
                    .then_with(|| self.latency.total_cmp(&other.latency)),
                Tier::ProbeDue | Tier::BackingOff => {
                    self.next_recovery_at.cmp(&other.next_recovery_at)
                }
                Tier::Unknown => Ordering::Equal,
            })
            .then_with(|| self.index.cmp(&other.index))
    }
}

/// Pick up to `n` relays from `candidates`, best first.
///
/// `n == 0` is treated as 1: a non-empty candidate list always yields at least one relay.
pub fn select_relays(candidates: Vec<Candidate>, n: usize, now: Timestamp) -> Vec<String> {
    let limit = n.max(1);
    let mut seen = HashSet::new();

    let mut ranked: Vec<Ranked> = candidates
        .into_iter()
        .filter(|c| seen.insert(c.key.clone()))
        .enumerate()
        .map(|(index, c)| {
            let stats = c.stats.as_ref();
            Ranked {
                tier: tier_of(stats, now),
                index,
                success_rate: stats.map_or(0.0, |s| s.success_rate),
                latency: stats
                    .and_then(|s| s.avg_response_time_ms)
                    .unwrap_or(f64::MAX),
                next_recovery_at: stats
                    .and_then(|s| s.next_recovery_at)
                    .unwrap_or(Timestamp::MAX),
                url: c.url,
            }
        })
        .collect();

    ranked.sort_by(Ranked::compare);
    ranked.into_iter().take(limit).map(|r| r.url).collect()
}
