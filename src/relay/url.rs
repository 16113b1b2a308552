//! Relay URL normalization.
//!
//! Telemetry for `wss://Relay.Example.com/` and `wss://relay.example.com`
//! must land on the same entry, so every URL is normalized before it is used
//! as a key.
//!
//! # Normalization Rules
//!
//! - Trim surrounding whitespace
//! - Lowercase the scheme and host
//! - Drop default ports (80 for ws://, 443 for wss://)
//! - Remove trailing slashes from the path (never from a query or fragment)
//!
//! Only `ws://` and `wss://` URLs with a host are rewritten. Anything else is
//! kept verbatim (after trimming): telemetry is never dropped because of an
//! unusual key.

use url::Url;

/// Normalize a relay URL into its identity key.
///
/// # Examples
///
/// ```
/// use relay_health::relay::normalize_relay_url;
///
/// assert_eq!(normalize_relay_url("wss://Relay.Example.COM/"), "wss://relay.example.com");
/// assert_eq!(normalize_relay_url("not a url"), "not a url");
/// ```
pub fn normalize_relay_url(url: &str) -> String {
    let trimmed = url.trim();

    match Url::parse(trimmed) {
        Ok(mut parsed) if is_websocket(&parsed) => {
            let path = parsed.path().trim_end_matches('/').to_owned();
            parsed.set_path(&path);

            // ws and wss always serialize a root path as "/"
            let mut normalized = parsed.to_string();
            let has_suffix = parsed.query().is_some() || parsed.fragment().is_some();
            if !has_suffix && normalized.ends_with('/') {
                normalized.pop();
            }
            normalized
        }
        _ => trimmed.to_string(),
    }
}

fn is_websocket(url: &Url) -> bool {
    matches!(url.scheme(), "ws" | "wss") && url.host_str().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_removed() {
        assert_eq!(
            normalize_relay_url("wss://relay.damus.io/"),
            "wss://relay.damus.io"
        );
        assert_eq!(
            normalize_relay_url("wss://relay.example.com/nostr/"),
            "wss://relay.example.com/nostr"
        );
    }

    #[test]
    fn test_query_and_fragment_slashes_kept() {
        assert_eq!(
            normalize_relay_url("wss://r.example.com/?a=/"),
            "wss://r.example.com/?a=/"
        );
        assert_ne!(
            normalize_relay_url("wss://r.example.com/?a=/"),
            normalize_relay_url("wss://r.example.com/?a=")
        );
        assert_eq!(
            normalize_relay_url("wss://r.example.com/nostr//?a=b"),
            "wss://r.example.com/nostr?a=b"
        );
        assert_eq!(
            normalize_relay_url("wss://r.example.com/#x/"),
            "wss://r.example.com/#x/"
        );
    }

    #[test]
    fn test_case_and_default_port() {
        assert_eq!(
            normalize_relay_url("WSS://Relay.Example.COM:443"),
            "wss://relay.example.com"
        );
        assert_eq!(
            normalize_relay_url("ws://relay.example.com:80/"),
            "ws://relay.example.com"
        );
    }

    #[test]
    fn test_custom_port_preserved() {
        assert_eq!(
            normalize_relay_url("wss://relay.example.com:7777/"),
            "wss://relay.example.com:7777"
        );
    }

    #[test]
    fn test_non_websocket_kept_verbatim() {
        assert_eq!(normalize_relay_url("  X  "), "X");
        assert_eq!(
            normalize_relay_url("https://Example.com/"),
            "https://Example.com/"
        );
    }
}
