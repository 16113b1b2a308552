//! Failure injection tests: dead relays, backoff and recovery probing.

use std::time::Duration;

use relay_health::config::BackoffStrategy;
use relay_health::{HealthConfig, HealthStatus};

mod common;

const FLAKY: &str = "wss://flaky.example.com";

#[test]
fn test_backoff_grows_with_each_failed_probe() {
    let (tracker, clock) = common::manual_tracker();
    common::fail_times(&tracker, FLAKY, 5);

    let mut last_delay = Duration::ZERO;
    for _ in 0..200 {
        let delay = tracker.time_until_probe(FLAKY).unwrap();
        assert!(delay >= last_delay, "backoff shrank: {delay:?} < {last_delay:?}");
        assert!(delay <= Duration::from_millis(3_600_000));
        last_delay = delay;

        // wait out the backoff, probe, fail again
        clock.advance(delay);
        assert!(tracker.is_probe_eligible(FLAKY));
        tracker.record_failure(FLAKY);
    }

    assert_eq!(last_delay, Duration::from_millis(3_600_000));
}

#[test]
fn test_exponential_backoff_is_capped() {
    let (tracker, clock) = common::manual_tracker_with(HealthConfig {
        backoff_strategy: BackoffStrategy::Exponential,
        backoff_base_ms: 1_000,
        backoff_max_ms: 60_000,
        ..Default::default()
    });
    common::fail_times(&tracker, FLAKY, 5);

    // first dead backoff is the base, then it doubles up to the cap
    for expected_secs in [1, 2, 4, 8, 16, 32, 60, 60] {
        let delay = tracker.time_until_probe(FLAKY).unwrap();
        assert_eq!(delay, Duration::from_secs(expected_secs));
        clock.advance(delay);
        tracker.record_failure(FLAKY);
    }
}

#[test]
fn test_exponential_defaults_wait_base_after_going_dead() {
    let (tracker, _) = common::manual_tracker_with(HealthConfig {
        backoff_strategy: BackoffStrategy::Exponential,
        ..Default::default()
    });
    common::fail_times(&tracker, FLAKY, 5);
    assert_eq!(tracker.time_until_probe(FLAKY), Some(Duration::from_secs(30)));
}

#[test]
fn test_successful_probe_revives_dead_relay() {
    let (tracker, clock) = common::manual_tracker();
    common::fail_times(&tracker, FLAKY, 5);
    assert_eq!(tracker.get_stats(FLAKY).unwrap().status, HealthStatus::Dead);

    let wait = tracker.time_until_probe(FLAKY).unwrap();
    clock.advance(wait);
    assert_eq!(tracker.select_relays(&[FLAKY], 1), vec![FLAKY]);

    tracker.record_success(FLAKY, 150.0);
    let stats = tracker.get_stats(FLAKY).unwrap();
    assert_ne!(stats.status, HealthStatus::Dead);
    assert_eq!(stats.next_recovery_at, None);
    assert!(!tracker.is_probe_eligible(FLAKY));

    // enough good responses bring it all the way back
    common::succeed_times(&tracker, FLAKY, 6);
    assert_eq!(tracker.get_stats(FLAKY).unwrap().status, HealthStatus::Healthy);
}

#[test]
fn test_all_dead_candidates_still_selected() {
    let (tracker, clock) = common::manual_tracker();
    let relays = [
        "wss://a.example.com",
        "wss://b.example.com",
        "wss://c.example.com",
    ];
    for (i, relay) in relays.iter().enumerate() {
        // stagger so deadlines differ
        clock.advance(Duration::from_secs(i as u64));
        common::fail_times(&tracker, relay, 5);
    }

    let selected = tracker.select_relays(&relays, 2);
    assert_eq!(selected, vec!["wss://a.example.com", "wss://b.example.com"]);

    let selected = tracker.select_relays(&relays, 0);
    assert_eq!(selected.len(), 1);
}

#[test]
fn test_probe_due_relay_outranks_backing_off_relay() {
    let (tracker, clock) = common::manual_tracker();
    common::fail_times(&tracker, "wss://early.example.com", 5);
    clock.advance(Duration::from_secs(10));
    common::fail_times(&tracker, "wss://late.example.com", 8);

    // early: due at +150s; late: due at +10s + 240s
    clock.advance(Duration::from_secs(145));
    let selected = tracker.select_relays(&["wss://late.example.com", "wss://early.example.com"], 2);
    assert_eq!(selected, vec!["wss://early.example.com", "wss://late.example.com"]);
    assert!(tracker.is_probe_eligible("wss://early.example.com"));
    assert!(!tracker.is_probe_eligible("wss://late.example.com"));
}

#[test]
fn test_routing_prefers_healthy_over_flaky() {
    let (tracker, _) = common::manual_tracker();
    common::succeed_times(&tracker, "wss://solid.example.com", 10);
    common::fail_times(&tracker, FLAKY, 5);
    for _ in 0..3 {
        tracker.record_success("wss://slow.example.com", 9_000.0);
    }

    let selected = tracker.select_relays(
        &[
            FLAKY,
            "wss://slow.example.com",
            "wss://unseen.example.com",
            "wss://solid.example.com",
        ],
        4,
    );
    assert_eq!(
        selected,
        vec![
            "wss://solid.example.com",
            "wss://unseen.example.com",
            "wss://slow.example.com",
            FLAKY,
        ]
    );
}

#[test]
fn test_config_reload_reclassifies_and_notifies() {
    let (tracker, _) = common::manual_tracker();
    common::fail_times(&tracker, FLAKY, 3);
    assert_eq!(tracker.get_stats(FLAKY).unwrap().status, HealthStatus::Degraded);

    let mut rx = tracker.subscribe();
    tracker
        .apply_config(HealthConfig {
            dead_threshold: 3,
            ..Default::default()
        })
        .unwrap();

    let stats = tracker.get_stats(FLAKY).unwrap();
    assert_eq!(stats.status, HealthStatus::Dead);
    assert!(stats.next_recovery_at.is_some());

    let transition = rx.try_recv().unwrap();
    assert_eq!(transition.url, FLAKY);
    assert_eq!(transition.to, HealthStatus::Dead);
}
