//! Host pattern matching.
//!
//! # Responsibilities
//! - Classify a hostmap key as exact, suffix or wildcard
//! - Match a lower-cased host against a pattern
//!
//! # Design Decisions
//! - Keys are normalized to lowercase once, at parse time
//! - A suffix pattern is any key starting with `.`
//! - The empty key is the wildcard
//! - No globbing beyond suffix matching

/// A single hostmap key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostPattern {
    /// Matches one host exactly.
    Exact(String),
    /// Matches any host ending with the stored suffix (leading dot included).
    Suffix(String),
    /// Matches every host. Written as the empty key.
    Wildcard,
}

impl HostPattern {
    /// Classify a raw hostmap key.
    pub fn parse(key: &str) -> Self {
        let key = key.trim().to_lowercase();
        if key.is_empty() {
            HostPattern::Wildcard
        } else if key.starts_with('.') {
            HostPattern::Suffix(key)
        } else {
            HostPattern::Exact(key)
        }
    }

    /// Returns true if `host` (already lower-cased) matches this pattern.
    pub fn matches(&self, host: &str) -> bool {
        match self {
            HostPattern::Exact(expected) => host == expected,
            HostPattern::Suffix(suffix) => host.ends_with(suffix.as_str()),
            HostPattern::Wildcard => true,
        }
    }

    /// The key as written in the hostmap.
    pub fn key(&self) -> &str {
        match self {
            HostPattern::Exact(k) | HostPattern::Suffix(k) => k,
            HostPattern::Wildcard => "",
        }
    }
}

/// Reduce a `Host` header value to the lower-cased hostname used for lookup.
///
/// The port is dropped, IPv6 literals keep their brackets.
pub fn normalize_host(raw: &str) -> String {
    let raw = raw.trim();
    let host = if raw.starts_with('[') {
        match raw.find(']') {
            Some(end) => &raw[..=end],
            None => raw,
        }
    } else {
        match raw.rsplit_once(':') {
            Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => name,
            _ => raw,
        }
    };
    host.to_lowercase()
}
