//! Host header validation.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Permitted request hostnames.
///
/// Patterns are matched case-insensitively against the request host with
/// any port removed:
/// - `*` matches every host
/// - `.example.com` matches `example.com` and all of its subdomains
/// - anything else must match exactly
#[derive(Debug, Clone)]
pub struct HostAllowList {
    patterns: Arc<[String]>,
}

impl HostAllowList {
    pub fn new(hosts: &[String]) -> Self {
        Self {
            patterns: hosts.iter().map(|h| h.to_ascii_lowercase()).collect(),
        }
    }

    /// Check a raw `Host` header value, port included.
    pub fn is_allowed(&self, host: &str) -> bool {
        let Some(domain) = domain_of(host) else {
            return false;
        };
        self.patterns.iter().any(|pattern| matches_pattern(&domain, pattern))
    }
}

fn matches_pattern(domain: &str, pattern: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    match pattern.strip_prefix('.') {
        Some(parent) => domain == parent || domain.ends_with(pattern),
        None => domain == pattern,
    }
}

/// Lower-cased host without port or trailing dot.
fn domain_of(host: &str) -> Option<String> {
    let host = host.trim().to_ascii_lowercase();
    if host.is_empty() {
        return None;
    }
    let domain = if host.starts_with('[') {
        // Bracketed IPv6 literal, optionally followed by :port.
        let end = host.find(']')?;
        host[..=end].to_string()
    } else {
        match host.rsplit_once(':') {
            Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name.to_string(),
            Some(_) => return None,
            None => host,
        }
    };
    let domain = domain.strip_suffix('.').map(str::to_string).unwrap_or(domain);
    if domain.is_empty() {
        None
    } else {
        Some(domain)
    }
}

/// Reject requests whose `Host` is not in the allow-list with 400.
pub async fn host_validation_middleware(
    State(hosts): State<HostAllowList>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| req.uri().authority().map(|a| a.as_str()));

    if host.is_some_and(|h| hosts.is_allowed(h)) {
        return next.run(req).await;
    }

    tracing::warn!(
        host = ?host,
        path = %req.uri().path(),
        "Rejected request with disallowed Host header"
    );
    (StatusCode::BAD_REQUEST, "Invalid Host header").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(hosts: &[&str]) -> HostAllowList {
        let owned: Vec<String> = hosts.iter().map(|h| h.to_string()).collect();
        HostAllowList::new(&owned)
    }

    #[test]
    fn test_exact_match_ignores_port_and_case() {
        let hosts = list(&["example.com", "127.0.0.1"]);
        assert!(hosts.is_allowed("example.com"));
        assert!(hosts.is_allowed("EXAMPLE.com:8000"));
        assert!(hosts.is_allowed("example.com."));
        assert!(hosts.is_allowed("127.0.0.1:80"));
        assert!(!hosts.is_allowed("www.example.com"));
        assert!(!hosts.is_allowed("example.com:http"));
        assert!(!hosts.is_allowed(""));
    }

    #[test]
    fn test_subdomain_pattern() {
        let hosts = list(&[".Example.com"]);
        assert!(hosts.is_allowed("example.com"));
        assert!(hosts.is_allowed("api.example.com"));
        assert!(hosts.is_allowed("a.b.example.com:443"));
        assert!(!hosts.is_allowed("badexample.com"));
        assert!(!hosts.is_allowed("example.com.evil.org"));
    }

    #[test]
    fn test_wildcard_and_ipv6() {
        assert!(list(&["*"]).is_allowed("anything.test"));

        let hosts = list(&["[::1]"]);
        assert!(hosts.is_allowed("[::1]"));
        assert!(hosts.is_allowed("[::1]:8000"));
        assert!(!hosts.is_allowed("[::2]:8000"));
    }
}
