//! Header sanitization for both legs of a proxied request.
//!
//! # Responsibilities
//! - Build the outbound header set: fixed identity headers plus caller
//!   headers, never leaking the inbound client's session or origin
//! - Sanitize upstream response headers before relaying to the client
//!
//! # Design Decisions
//! - `HeaderMap` normalizes names to lowercase, so removal is
//!   case-insensitive by construction
//! - `host` and `content-length` are recomputed by the HTTP client

use axum::http::{header, HeaderMap, HeaderValue};

use crate::config::UpstreamConfig;

/// Request headers never forwarded upstream.
const BLOCKED_OUTBOUND: &[&str] = &["cookie", "x-forwarded-for", "host", "content-length"];

/// Build the header set for an upstream request: fixed user-agent and accept
/// headers merged with caller-supplied headers, minus anything blocked.
pub fn outbound_headers(config: &UpstreamConfig, caller: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Ok(value) = HeaderValue::from_str(&config.user_agent) {
        headers.insert(header::USER_AGENT, value);
    }
    if let Ok(value) = HeaderValue::from_str(&config.accept) {
        headers.insert(header::ACCEPT, value);
    }
    for (name, value) in caller {
        headers.insert(name.clone(), value.clone());
    }
    for name in BLOCKED_OUTBOUND {
        headers.remove(*name);
    }

    headers
}

/// Sanitize upstream response headers for the passthrough path: everything is
/// relayed verbatim except `set-cookie` and connection framing, and caching
/// is always disabled.
pub fn sanitize_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for (name, value) in upstream {
        if name == header::SET_COOKIE
            || name == header::CONNECTION
            || name == header::TRANSFER_ENCODING
        {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbound_never_carries_cookies_or_forwarded_identity() {
        let config = UpstreamConfig::default();
        let mut caller = HeaderMap::new();
        caller.insert("Cookie", "session=abc".parse().unwrap());
        caller.insert("X-Forwarded-For", "1.2.3.4".parse().unwrap());
        caller.insert("content-type", "application/json".parse().unwrap());

        let headers = outbound_headers(&config, &caller);

        assert!(headers.get("cookie").is_none());
        assert!(headers.get("x-forwarded-for").is_none());
        assert_eq!(headers.get("content-type").unwrap(), "application/json");
        assert_eq!(
            headers.get(header::USER_AGENT).unwrap(),
            config.user_agent.as_str()
        );
        assert_eq!(headers.get(header::ACCEPT).unwrap(), config.accept.as_str());
    }

    #[test]
    fn caller_headers_override_the_fixed_set() {
        let config = UpstreamConfig::default();
        let mut caller = HeaderMap::new();
        caller.insert(header::ACCEPT, "image/png".parse().unwrap());

        let headers = outbound_headers(&config, &caller);
        assert_eq!(headers.get(header::ACCEPT).unwrap(), "image/png");
    }

    #[test]
    fn response_set_cookie_is_stripped_and_no_store_forced() {
        let mut upstream = HeaderMap::new();
        upstream.insert("set-cookie", "sid=1".parse().unwrap());
        upstream.insert("content-type", "image/png".parse().unwrap());
        upstream.insert("cache-control", "max-age=3600".parse().unwrap());

        let headers = sanitize_response_headers(&upstream);

        assert!(headers.get("set-cookie").is_none());
        assert_eq!(headers.get("content-type").unwrap(), "image/png");
        assert_eq!(headers.get("cache-control").unwrap(), "no-store");
    }
}
