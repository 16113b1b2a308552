//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the tracker.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the relay health tracker.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Classification and recovery settings.
    pub health: HealthConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Classification thresholds and recovery backoff.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HealthConfig {
    /// Smoothing factor for the latency moving average (0, 1].
    pub ema_alpha: f64,

    /// Minimum total attempts before a relay leaves `unknown`.
    pub min_sample_size: u64,

    /// Consecutive failures that mark a relay `dead`.
    pub dead_threshold: u64,

    /// Success rate a relay must exceed to be `healthy`.
    pub healthy_success_rate: f64,

    /// Average latency a relay must stay under to be `healthy`.
    pub healthy_latency_ms: f64,

    /// Shape of the recovery backoff curve.
    pub backoff_strategy: BackoffStrategy,

    /// Backoff unit in milliseconds.
    pub backoff_base_ms: u64,

    /// Upper bound on any single backoff in milliseconds.
    pub backoff_max_ms: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            ema_alpha: 0.3,
            min_sample_size: 3,
            dead_threshold: 5,
            healthy_success_rate: 0.5,
            healthy_latency_ms: 5_000.0,
            backoff_strategy: BackoffStrategy::Linear,
            backoff_base_ms: 30_000,
            backoff_max_ms: 3_600_000,
        }
    }
}

/// Backoff curve for dead relays.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    /// `base * failures`, capped.
    #[default]
    Linear,
    /// `base * 2^(failures - dead_threshold)`, capped. The first dead backoff is `base`.
    Exponential,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error, off).
    pub log_level: String,

    /// Output format for log lines.
    pub log_format: LogFormat,

    /// Emit counters and gauges through the `metrics` facade.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, for development.
    #[default]
    Pretty,
    /// One JSON object per line, for production.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: TrackerConfig = toml::from_str("").unwrap();
        assert_eq!(config, TrackerConfig::default());
        assert_eq!(config.health.dead_threshold, 5);
        assert_eq!(config.health.backoff_strategy, BackoffStrategy::Linear);
    }

    #[test]
    fn test_partial_override() {
        let config: TrackerConfig = toml::from_str(
            r#"
            [health]
            dead_threshold = 8
            backoff_strategy = "exponential"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.health.dead_threshold, 8);
        assert_eq!(config.health.min_sample_size, 3);
        assert_eq!(config.health.backoff_strategy, BackoffStrategy::Exponential);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.observability.log_level, "info");
    }
}
