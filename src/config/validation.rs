//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ratios in range, thresholds non-zero)
//! - Check the backoff cap is reachable from the base
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: TrackerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;

use crate::config::schema::{HealthConfig, ObservabilityConfig, TrackerConfig};

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("health.ema_alpha must be in (0, 1], got {0}")]
    EmaAlphaOutOfRange(f64),

    #[error("health.min_sample_size must be at least 1")]
    ZeroMinSampleSize,

    #[error("health.dead_threshold must be at least 1")]
    ZeroDeadThreshold,

    #[error("health.healthy_success_rate must be in [0, 1), got {0}")]
    SuccessRateOutOfRange(f64),

    #[error("health.healthy_latency_ms must be positive, got {0}")]
    InvalidLatencyThreshold(f64),

    #[error("health.backoff_base_ms must be positive")]
    ZeroBackoffBase,

    #[error("health.backoff_max_ms ({max}) must be >= health.backoff_base_ms ({base})")]
    BackoffCapBelowBase { base: u64, max: u64 },

    #[error("observability.log_level '{0}' is not a valid level")]
    UnknownLogLevel(String),
}

/// Validate a full tracker configuration.
pub fn validate_config(config: &TrackerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = health_errors(&config.health);
    errors.extend(observability_errors(&config.observability));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate only the health section, used when applying a reload.
pub fn validate_health_config(config: &HealthConfig) -> Result<(), Vec<ValidationError>> {
    let errors = health_errors(config);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn health_errors(config: &HealthConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // NaN fails every comparison, so these checks reject it too.
    if !(config.ema_alpha > 0.0 && config.ema_alpha <= 1.0) {
        errors.push(ValidationError::EmaAlphaOutOfRange(config.ema_alpha));
    }
    if config.min_sample_size == 0 {
        errors.push(ValidationError::ZeroMinSampleSize);
    }
    if config.dead_threshold == 0 {
        errors.push(ValidationError::ZeroDeadThreshold);
    }
    if !(config.healthy_success_rate >= 0.0 && config.healthy_success_rate < 1.0) {
        errors.push(ValidationError::SuccessRateOutOfRange(
            config.healthy_success_rate,
        ));
    }
    if !(config.healthy_latency_ms > 0.0) {
        errors.push(ValidationError::InvalidLatencyThreshold(
            config.healthy_latency_ms,
        ));
    }
    if config.backoff_base_ms == 0 {
        errors.push(ValidationError::ZeroBackoffBase);
    }
    if config.backoff_max_ms < config.backoff_base_ms {
        errors.push(ValidationError::BackoffCapBelowBase {
            base: config.backoff_base_ms,
            max: config.backoff_max_ms,
        });
    }

    errors
}

fn observability_errors(config: &ObservabilityConfig) -> Vec<ValidationError> {
    match LevelFilter::from_str(&config.log_level) {
        Ok(_) => Vec::new(),
        Err(_) => vec![ValidationError::UnknownLogLevel(config.log_level.clone())],
    }
}
