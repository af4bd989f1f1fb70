// Pure address logic - no Tauri imports allowed.
// URL parsing, remediation transforms and bookmark naming helpers,
// all unit testable without a webview.

use url::Url;

/// Logic for parsing user input into a navigable URL.
///
/// This function performs purely local string manipulation:
/// 1. It does NOT perform any DNS resolution or reachability checks.
/// 2. It does NOT prefetch any content.
/// 3. The only external request happens when the caller commits the
///    parsed URL to the webview.
///
/// There is deliberately no search-engine fallback: input that cannot be
/// read as an address is an error, surfaced to the user as such.
pub fn parse_address(input: &str) -> Result<Url, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("address is empty".to_string());
    }

    // 1. Force HTTP for implicit localhost/IP (if no scheme present)
    let has_scheme_separator = trimmed.contains("://");
    let is_localhost = trimmed.starts_with("localhost") || trimmed.starts_with("127.0.0.1");
    let is_ip = trimmed.parse::<std::net::IpAddr>().is_ok();

    if (is_localhost || is_ip) && !has_scheme_separator {
        let candidate = format!("http://{}", trimmed);
        if let Ok(u) = Url::parse(&candidate) {
            return Ok(u);
        }
    }

    // 2. Try parsing as-is (valid scheme)
    if let Ok(u) = Url::parse(trimmed) {
        let s = u.scheme();
        // Only accept known standard web/file schemes.
        // This prevents "google.com" being parsed as scheme "google".
        if s == "http" || s == "https" || s == "file" || s == "about" || s == "data" {
            return Ok(u);
        }
    }

    // 3. Heuristic: dot implies host -> try HTTPS
    // (Exclude spaces, which can never appear in a host)
    if !trimmed.contains(' ') && trimmed.contains('.') && !trimmed.ends_with('.') {
        let candidate = format!("https://{}", trimmed);
        if let Ok(u) = Url::parse(&candidate) {
            if u.host().is_some() {
                return Ok(u);
            }
        }
    }

    Err(format!("'{}' is not a navigable address", trimmed))
}

/// Swap `127.0.0.1` and `localhost` in an address. Remediation action for
/// servers that bind one name but not the other; a pure text substitution.
pub fn swap_host_alias(address: &str) -> String {
    if address.contains("127.0.0.1") {
        address.replace("127.0.0.1", "localhost")
    } else if address.contains("localhost") {
        address.replace("localhost", "127.0.0.1")
    } else {
        address.to_string()
    }
}

const PRIMARY_PORT: &str = ":5001";
const FALLBACK_PORT: &str = ":3000";

/// Swap the conventional API port for the conventional web port, or insert
/// the web port when the address names neither. A pure text substitution.
pub fn swap_port(address: &str) -> String {
    if address.contains(PRIMARY_PORT) {
        return address.replacen(PRIMARY_PORT, FALLBACK_PORT, 1);
    }
    if address.contains(FALLBACK_PORT) {
        return address.to_string();
    }

    // Insert the port between the authority and the path, if any.
    let Some(scheme_end) = address.find("://") else {
        return address.to_string();
    };
    let authority_start = scheme_end + 3;
    match address[authority_start..].find('/') {
        Some(slash) => {
            let at = authority_start + slash;
            format!("{}{}{}", &address[..at], FALLBACK_PORT, &address[at..])
        }
        None => format!("{}{}", address, FALLBACK_PORT),
    }
}

/// Default display name for a bookmark: the host portion of the address,
/// falling back to a positional name when no host can be derived.
pub fn derive_bookmark_name(address: &str, position: usize) -> String {
    Url::parse(address)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| format!("URL {}", position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // --- parse_address tests ---

    #[rstest]
    // Standard URLs (unchanged or normalized)
    #[case("https://example.com", "https://example.com/")]
    #[case("http://example.com", "http://example.com/")]
    #[case("https://example.com/path?query=1", "https://example.com/path?query=1")]
    // Localhost handling (should get http://)
    #[case("localhost", "http://localhost/")]
    #[case("localhost:3000", "http://localhost:3000/")]
    #[case("localhost:8080/path", "http://localhost:8080/path")]
    // IP address handling (should get http://)
    #[case("127.0.0.1", "http://127.0.0.1/")]
    #[case("127.0.0.1:8080", "http://127.0.0.1:8080/")]
    #[case("192.168.1.1", "http://192.168.1.1/")]
    // Domain-like strings (should get https://)
    #[case("example.com", "https://example.com/")]
    #[case("sub.domain.com", "https://sub.domain.com/")]
    #[case("docs.rs/my-crate", "https://docs.rs/my-crate")]
    // Special schemes
    #[case("about:blank", "about:blank")]
    #[case("file:///home/test/doc.html", "file:///home/test/doc.html")]
    #[case("data:text/html,<h1>Hi</h1>", "data:text/html,<h1>Hi</h1>")]
    // Whitespace trimmed
    #[case("  http://127.0.0.1/chat  ", "http://127.0.0.1/chat")]
    fn parses_navigable_addresses(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(parse_address(input).unwrap().to_string(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("not a url")]
    #[case("hello world")]
    #[case("just-words")]
    #[case("trailing.")]
    fn rejects_non_addresses(#[case] input: &str) {
        assert!(parse_address(input).is_err());
    }

    // --- remediation transforms ---

    #[rstest]
    #[case("http://127.0.0.1/chat/ABC", "http://localhost/chat/ABC")]
    #[case("http://localhost:5001/apps", "http://127.0.0.1:5001/apps")]
    #[case("https://example.com/", "https://example.com/")]
    fn host_alias_swaps_both_ways(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(swap_host_alias(input), expected);
    }

    #[rstest]
    #[case("http://127.0.0.1:5001/chat", "http://127.0.0.1:3000/chat")]
    #[case("http://127.0.0.1:3000/chat", "http://127.0.0.1:3000/chat")]
    #[case("http://127.0.0.1/chat", "http://127.0.0.1:3000/chat")]
    #[case("http://localhost", "http://localhost:3000")]
    #[case("plain text", "plain text")]
    fn port_swap_replaces_or_inserts(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(swap_port(input), expected);
    }

    // --- bookmark naming ---

    #[rstest]
    #[case("http://x/y", 1, "x")]
    #[case("https://chat.example.com/app", 3, "chat.example.com")]
    #[case("about:blank", 2, "URL 2")]
    #[case("???", 5, "URL 5")]
    fn derives_bookmark_names(#[case] address: &str, #[case] position: usize, #[case] expected: &str) {
        assert_eq!(derive_bookmark_name(address, position), expected);
    }
}
