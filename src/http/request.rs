//! Inbound request handling.
//!
//! # Responsibilities
//! - Generate unique request IDs (UUID v4)
//! - Split the path into target service and remaining subpath
//! - Read the body within the configured limit

use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, Request},
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::error::GatewayError;
use crate::proxy::ProxyRequest;

/// Request ID generator for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Split `/{service}/{subpath...}` into its parts. The subpath keeps its raw
/// (still percent-encoded) form and may be empty.
pub fn split_service_path(path: &str) -> Option<(&str, &str)> {
    let path = path.trim_start_matches('/');
    let (service, subpath) = path.split_once('/').unwrap_or((path, ""));
    if service.is_empty() {
        None
    } else {
        Some((service, subpath))
    }
}

/// Turn an inbound request into a dispatchable one.
pub async fn into_proxy_request(
    request: Request<Body>,
    max_body_bytes: usize,
) -> Result<ProxyRequest, GatewayError> {
    let (parts, body) = request.into_parts();

    let (service, subpath) = split_service_path(parts.uri.path())
        .ok_or_else(|| GatewayError::UnknownService(String::new()))?;
    let (service, subpath) = (service.to_string(), subpath.to_string());

    let body = read_body(body, max_body_bytes).await?;

    Ok(ProxyRequest {
        service,
        subpath,
        method: parts.method,
        headers: parts.headers,
        query: parts.uri.query().map(str::to_string),
        body,
    })
}

async fn read_body(body: Body, limit: usize) -> Result<Bytes, GatewayError> {
    axum::body::to_bytes(body, limit).await.map_err(|e| {
        tracing::debug!(error = %e, limit, "Failed to read request body");
        GatewayError::PayloadTooLarge(format!("body could not be read within the {} byte limit", limit))
    })
}
