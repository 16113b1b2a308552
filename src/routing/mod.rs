//! Routing and reporting subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher asks for relays (candidate URLs, n)
//!     → tracker.rs (snapshot stats for each candidate)
//!     → selector.rs (rank by health tier, take n)
//!     → Return: ordered URLs, never empty for non-empty input
//!
//! UI / diagnostics:
//!     → tracker.rs (snapshot all stats)
//!     → report.rs (summary counts, rendered report)
//! ```
//!
//! # Design Decisions
//! - Reads only owned snapshots; never holds a reference into the live store
//! - Deterministic: same stats and candidates always give the same order
//! - Advisory only: dead relays are demoted, never dropped

pub mod report;
pub mod selector;
pub mod tracker;

pub use report::HealthSummary;
pub use tracker::RelayHealthTracker;
