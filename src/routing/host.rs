//! Host header normalization.

use std::net::IpAddr;

/// A normalized request host: lowercase, without port or trailing dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedHost {
    /// `localhost` or an IP literal. Never carries a subdomain.
    Literal,
    /// A DNS name split into labels (at least one, none empty).
    Name(Vec<String>),
    /// Empty or malformed input.
    Invalid,
}

/// Normalize a raw `Host` header value.
pub fn normalize(raw: &str) -> NormalizedHost {
    let host = raw.trim().to_ascii_lowercase();
    let host = strip_port(&host);
    let host = host.strip_suffix('.').unwrap_or(host);

    if host.is_empty() {
        return NormalizedHost::Invalid;
    }
    if host == "localhost" || host.parse::<IpAddr>().is_ok() {
        return NormalizedHost::Literal;
    }

    let labels: Vec<String> = host.split('.').map(str::to_string).collect();
    if labels.iter().any(|l| l.is_empty()) {
        return NormalizedHost::Invalid;
    }
    NormalizedHost::Name(labels)
}

/// Strip a `:port` suffix. Bracketed IPv6 literals lose their brackets.
fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return match rest.find(']') {
            Some(end) => &rest[..end],
            None => "",
        };
    }
    // A bare IPv6 literal has more than one colon and no port.
    if host.matches(':').count() > 1 {
        return host;
    }
    match host.split_once(':') {
        Some((name, _port)) => name,
        None => host,
    }
}
