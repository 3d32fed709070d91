//! Header hygiene between caller, gateway and backend.
//!
//! # Design Decisions
//! - Host and Content-Length never cross the gateway; the outbound client recomputes them
//! - Everything else, including Authorization, passes through untouched
//! - On the way back only framing headers are dropped since the body is re-framed

use axum::http::{header, HeaderMap};

/// Headers forwarded to the backend.
pub fn outbound_request_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = inbound.clone();
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);
    headers
}

/// Headers returned to the caller.
pub fn inbound_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = upstream.clone();
    headers.remove(header::CONTENT_LENGTH);
    headers.remove(header::TRANSFER_ENCODING);
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_strips_host_and_length_only() {
        let mut inbound = HeaderMap::new();
        inbound.insert(header::HOST, HeaderValue::from_static("gateway.local"));
        inbound.insert(header::CONTENT_LENGTH, HeaderValue::from_static("42"));
        inbound.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        inbound.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        inbound.append("x-tag", HeaderValue::from_static("one"));
        inbound.append("x-tag", HeaderValue::from_static("two"));

        let out = outbound_request_headers(&inbound);
        assert!(out.get(header::HOST).is_none());
        assert!(out.get(header::CONTENT_LENGTH).is_none());
        assert_eq!(out.get(header::AUTHORIZATION).unwrap(), "Bearer abc");
        assert_eq!(out.get(header::CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(out.get_all("x-tag").iter().count(), 2);
    }

    #[test]
    fn test_response_strips_framing() {
        let mut upstream = HeaderMap::new();
        upstream.insert(header::CONTENT_LENGTH, HeaderValue::from_static("12"));
        upstream.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        upstream.insert(header::SET_COOKIE, HeaderValue::from_static("sid=1"));

        let out = inbound_response_headers(&upstream);
        assert!(out.get(header::CONTENT_LENGTH).is_none());
        assert!(out.get(header::TRANSFER_ENCODING).is_none());
        assert_eq!(out.get(header::SET_COOKIE).unwrap(), "sid=1");
    }
}
