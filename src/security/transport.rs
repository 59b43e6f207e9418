//! HTTPS enforcement: redirect, HSTS and secure cookies.

use axum::{
    body::Body,
    extract::State,
    http::{header, uri::Scheme, HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::SecurityPolicy;

/// Header set by TLS-terminating proxies in front of the application.
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Apply the transport half of the security policy.
///
/// Insecure requests are redirected with 301 when `force_https` is set.
/// Responses to secure requests carry HSTS when enabled, and every
/// `Set-Cookie` is marked `Secure` when `secure_cookies` is set.
pub async fn transport_security_middleware(
    State(policy): State<SecurityPolicy>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let secure = is_secure(&req);

    if policy.force_https && !secure {
        return https_redirect(&req);
    }

    let mut response = next.run(req).await;

    if secure {
        if let Some(value) = policy.hsts_header_value().and_then(|v| HeaderValue::from_str(&v).ok()) {
            response
                .headers_mut()
                .entry(header::STRICT_TRANSPORT_SECURITY)
                .or_insert(value);
        }
    }

    if policy.secure_cookies {
        mark_cookies_secure(response.headers_mut());
    }

    response
}

/// True when the request arrived over TLS, directly or via a proxy.
pub fn is_secure(req: &Request<Body>) -> bool {
    if req.uri().scheme() == Some(&Scheme::HTTPS) {
        return true;
    }
    req.headers()
        .get(X_FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"))
}

fn https_redirect(req: &Request<Body>) -> Response {
    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| req.uri().authority().map(|a| a.as_str()));
    let path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let Some(location) = host.and_then(|h| HeaderValue::from_str(&format!("https://{}{}", h, path)).ok()) else {
        return (StatusCode::BAD_REQUEST, "Cannot redirect request without a Host").into_response();
    };

    tracing::debug!(location = ?location, "Redirecting insecure request");
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
}

/// Append `; Secure` to every `Set-Cookie` value that lacks it.
pub fn mark_cookies_secure(headers: &mut HeaderMap) {
    if !headers.contains_key(header::SET_COOKIE) {
        return;
    }

    let cookies: Vec<HeaderValue> = headers.get_all(header::SET_COOKIE).iter().cloned().collect();
    headers.remove(header::SET_COOKIE);

    for cookie in cookies {
        let updated = match cookie.to_str() {
            Ok(text) if !has_secure_attribute(text) => {
                HeaderValue::from_str(&format!("{}; Secure", text)).unwrap_or(cookie)
            }
            _ => cookie,
        };
        headers.append(header::SET_COOKIE, updated);
    }
}

fn has_secure_attribute(cookie: &str) -> bool {
    cookie
        .split(';')
        .skip(1)
        .any(|attr| attr.trim().eq_ignore_ascii_case("secure"))
}
