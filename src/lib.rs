//! Relay health tracking and adaptive routing for decentralized pub/sub clients.
//!
//! # Architecture Overview
//!
//! ```text
//!   transport / connection pool                 dispatcher / UI
//!     │ record_success(url, ms)                   ▲ select_relays(urls, n)
//!     │ record_failure(url)                       │ get_summary(), report
//!     ▼                                           │
//!   ┌───────────────────────────────────────────────────────────┐
//!   │                  routing::RelayHealthTracker               │
//!   │                                                            │
//!   │  health::store ──▶ health::classifier ──▶ health::recovery │
//!   │        │                                        │          │
//!   │        └──────── snapshots ───────▶ routing::selector      │
//!   │                                     routing::report        │
//!   └───────────────────────────────────────────────────────────┘
//!          │ transitions                    │ logs / metrics
//!          ▼                                ▼
//!     broadcast subscribers           observability
//! ```
//!
//! # Example
//!
//! ```
//! use relay_health::{HealthConfig, RelayHealthTracker};
//!
//! let tracker = RelayHealthTracker::new(HealthConfig::default());
//! tracker.record_success("wss://relay.example.com", 120.0);
//! tracker.record_failure("wss://flaky.example.com");
//!
//! let relays = tracker.select_relays(&["wss://flaky.example.com", "wss://relay.example.com"], 1);
//! assert_eq!(relays.len(), 1);
//! ```

// Core subsystems
pub mod health;
pub mod routing;

// Supporting
pub mod clock;
pub mod config;
pub mod relay;
pub mod resilience;

// Cross-cutting concerns
pub mod observability;

pub use config::{HealthConfig, TrackerConfig};
pub use health::{HealthStatus, RelayHealthStats, StatusTransition};
pub use routing::{HealthSummary, RelayHealthTracker};
