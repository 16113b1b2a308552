//! Relay identity helpers.

pub mod url;

pub use self::url::normalize_relay_url;
