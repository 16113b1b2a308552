//! Health summaries and the diagnostic report.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::health::stats::{HealthStatus, RelayHealthStats};

/// Count of tracked relays per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub total: usize,
    pub healthy: usize,
    pub degraded: usize,
    pub dead: usize,
    pub unknown: usize,
}

impl HealthSummary {
    pub fn from_stats<'a>(stats: impl IntoIterator<Item = &'a RelayHealthStats>) -> Self {
        let mut summary = Self::default();
        for s in stats {
            summary.total += 1;
            match s.status {
                HealthStatus::Healthy => summary.healthy += 1,
                HealthStatus::Degraded => summary.degraded += 1,
                HealthStatus::Dead => summary.dead += 1,
                HealthStatus::Unknown => summary.unknown += 1,
            }
        }
        summary
    }

    pub fn count(&self, status: HealthStatus) -> usize {
        match status {
            HealthStatus::Healthy => self.healthy,
            HealthStatus::Degraded => self.degraded,
            HealthStatus::Dead => self.dead,
            HealthStatus::Unknown => self.unknown,
        }
    }
}

fn display_rank(status: HealthStatus) -> u8 {
    match status {
        HealthStatus::Dead => 0,
        HealthStatus::Degraded => 1,
        HealthStatus::Unknown => 2,
        HealthStatus::Healthy => 3,
    }
}

/// Display order: dead, degraded, unknown, healthy; then success rate descending, then URL.
pub fn display_order(a: &RelayHealthStats, b: &RelayHealthStats) -> Ordering {
    display_rank(a.status)
        .cmp(&display_rank(b.status))
        .then_with(|| b.success_rate.total_cmp(&a.success_rate))
        .then_with(|| a.url.cmp(&b.url))
}

/// Render a plain-text report. Output depends only on the arguments.
pub fn render_health_report(
    stats: &HashMap<String, RelayHealthStats>,
    summary: &HealthSummary,
) -> String {
    let mut rows: Vec<&RelayHealthStats> = stats.values().collect();
    rows.sort_by(|a, b| display_order(a, b));

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Relay health: {} relays (healthy {}, degraded {}, dead {}, unknown {})",
        summary.total, summary.healthy, summary.degraded, summary.dead, summary.unknown
    );

    for s in rows {
        let latency = s
            .avg_response_time_ms
            .map_or_else(|| "-".to_string(), |ms| format!("{ms:.0}ms"));
        let _ = write!(
            out,
            "  {:<8} {}  success {:.1}% ({}/{})  streak {}  avg {}",
            s.status.as_str(),
            s.url,
            s.success_rate * 100.0,
            s.success_count,
            s.total_attempts(),
            s.consecutive_failures,
            latency,
        );
        if let Some(at) = s.next_recovery_at {
            let _ = write!(out, "  next probe at {at}");
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str, status: HealthStatus, rate: f64) -> (String, RelayHealthStats) {
        let stats = RelayHealthStats {
            status,
            success_rate: rate,
            ..RelayHealthStats::new(url)
        };
        (url.to_string(), stats)
    }

    #[test]
    fn test_summary_counts() {
        let stats: HashMap<_, _> = [
            entry("wss://a", HealthStatus::Healthy, 1.0),
            entry("wss://b", HealthStatus::Dead, 0.0),
            entry("wss://c", HealthStatus::Dead, 0.0),
            entry("wss://d", HealthStatus::Unknown, 0.0),
        ]
        .into_iter()
        .collect();

        let summary = HealthSummary::from_stats(stats.values());
        assert_eq!(
            summary,
            HealthSummary {
                total: 4,
                healthy: 1,
                degraded: 0,
                dead: 2,
                unknown: 1
            }
        );
        assert_eq!(summary.count(HealthStatus::Dead), 2);
    }

    #[test]
    fn test_report_rows_in_display_order() {
        let stats: HashMap<_, _> = [
            entry("wss://healthy", HealthStatus::Healthy, 0.9),
            entry("wss://unknown", HealthStatus::Unknown, 0.0),
            entry("wss://degraded-low", HealthStatus::Degraded, 0.2),
            entry("wss://degraded-high", HealthStatus::Degraded, 0.4),
            entry("wss://dead", HealthStatus::Dead, 0.1),
        ]
        .into_iter()
        .collect();
        let summary = HealthSummary::from_stats(stats.values());

        let report = render_health_report(&stats, &summary);
        let urls: Vec<&str> = report
            .lines()
            .skip(1)
            .map(|line| line.split_whitespace().nth(1).unwrap())
            .collect();

        assert_eq!(
            urls,
            vec![
                "wss://dead",
                "wss://degraded-high",
                "wss://degraded-low",
                "wss://unknown",
                "wss://healthy"
            ]
        );
        assert!(report.starts_with("Relay health: 5 relays (healthy 1, degraded 2, dead 1, unknown 1)"));
    }

    #[test]
    fn test_report_is_deterministic() {
        let stats: HashMap<_, _> = (0..20)
            .map(|i| entry(&format!("wss://r{i}"), HealthStatus::Degraded, 0.3))
            .collect();
        let summary = HealthSummary::from_stats(stats.values());

        let copy: HashMap<_, _> = stats.clone().into_iter().collect();
        assert_eq!(
            render_health_report(&stats, &summary),
            render_health_report(&copy, &summary)
        );
    }

    #[test]
    fn test_report_row_details() {
        let mut stats = RelayHealthStats::new("wss://dead.example.com");
        stats.status = HealthStatus::Dead;
        stats.failure_count = 5;
        stats.consecutive_failures = 5;
        stats.next_recovery_at = Some(151_000);
        let map: HashMap<_, _> = [(stats.url.clone(), stats)].into_iter().collect();

        let report = render_health_report(&map, &HealthSummary::from_stats(map.values()));
        let row = report.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "  dead     wss://dead.example.com  success 0.0% (0/5)  streak 5  avg -  next probe at 151000"
        );
    }
}
