//! Relay health subsystem.
//!
//! # Data Flow
//! ```text
//! Transport reports outcome:
//!     record_success(url, latency) / record_failure(url)
//!     → store.rs (update counters under the entry lock)
//!     → classifier.rs (recompute status from scratch)
//!     → recovery.rs (set/clear next_recovery_at for dead relays)
//!     → StatusTransition returned if status changed
//!
//! Readers:
//!     → store.rs snapshots (owned copies)
//! ```
//!
//! # Design Decisions
//! - Status is never stored independently of the counters that determine it
//! - A dead relay always has a probe deadline; no relay is excluded forever
//! - Dependency order: store → classifier → recovery; no upward calls

pub mod classifier;
pub mod recovery;
pub mod stats;
pub mod store;

pub use classifier::classify;
pub use recovery::RecoveryScheduler;
pub use stats::{HealthStatus, RelayHealthStats, StatusTransition};
pub use store::{Recorded, StatsStore};
