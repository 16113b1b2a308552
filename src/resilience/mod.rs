//! Resilience primitives.
//!
//! # Data Flow
//! ```text
//! Relay marked dead (health::store):
//!     → health::recovery asks backoff.rs for a delay
//!     → delay added to "now" → next_recovery_at
//! ```
//!
//! # Design Decisions
//! - No jitter: probe deadlines must never move backwards for a relay that keeps failing
//! - Every curve is capped so no relay is excluded forever

pub mod backoff;
