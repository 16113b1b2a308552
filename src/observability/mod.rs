//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! RelayHealthTracker produces:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON)
//!     → Whatever metrics exporter the host installs
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Relay URL is a field on every per-relay event
//! - Metrics are cheap and can be switched off in config

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LoggingError};
