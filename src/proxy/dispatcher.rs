//! Request dispatch to registered backends.
//!
//! # Responsibilities
//! - Resolve the target service against the registry
//! - Refuse services known to be unhealthy without touching the network
//! - Translate the inbound request into one outbound call
//! - Translate the backend response back, or classify the failure
//!
//! # Design Decisions
//! - Exactly one forwarding attempt; retries belong to callers
//! - Bodies are forwarded as opaque bytes, never re-serialized
//! - The descriptor snapshot taken at resolution time is used for the whole call
//! - Dropping the dispatch future (caller went away) drops the outbound call

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, Response, StatusCode, Uri},
    response::IntoResponse,
};
use hyper::body::Incoming;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time;

use crate::error::GatewayError;
use crate::observability::metrics;
use crate::proxy::body::UpstreamBody;
use crate::proxy::client::HttpClient;
use crate::proxy::headers::{inbound_response_headers, outbound_request_headers};
use crate::registry::{ServiceDescriptor, ServiceRegistry};

/// One inbound call, already split into its routing parts.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    /// Target service name (first path segment).
    pub service: String,
    /// Remaining path, may contain slashes, without leading slash.
    pub subpath: String,
    pub method: Method,
    pub headers: HeaderMap,
    /// Raw query string, forwarded verbatim for GET and DELETE.
    pub query: Option<String>,
    pub body: Bytes,
}

/// A translated backend response.
#[derive(Debug)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: UpstreamBody,
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> axum::response::Response {
        let mut response = axum::response::Response::new(Body::from(self.body.into_bytes()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// How the request body is handled for a given method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyMode {
    /// Query string forwarded, body dropped.
    QueryOnly,
    /// Raw body forwarded.
    Payload,
}

fn body_mode(method: &Method) -> Option<BodyMode> {
    match *method {
        Method::GET | Method::DELETE => Some(BodyMode::QueryOnly),
        Method::POST | Method::PUT | Method::PATCH => Some(BodyMode::Payload),
        _ => None,
    }
}

/// Metrics label for the target service. Caller-supplied names that never
/// resolved share one label so they cannot grow the series set.
pub const UNKNOWN_SERVICE_LABEL: &str = "(unknown)";

fn service_label<'a>(service: &'a str, result: &Result<ProxyResponse, GatewayError>) -> &'a str {
    match result {
        Err(GatewayError::UnknownService(_)) => UNKNOWN_SERVICE_LABEL,
        _ => service,
    }
}

/// Build `base_url/subpath[?query]`.
pub fn target_url(base_url: &str, subpath: &str, query: Option<&str>) -> String {
    let mut url = format!("{}/{}", base_url, subpath.trim_start_matches('/'));
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    url
}

pub struct Dispatcher {
    registry: Arc<ServiceRegistry>,
    client: HttpClient,
    request_timeout: Duration,
    max_response_bytes: usize,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<ServiceRegistry>,
        client: HttpClient,
        request_timeout: Duration,
        max_response_bytes: usize,
    ) -> Self {
        Self {
            registry,
            client,
            request_timeout,
            max_response_bytes,
        }
    }

    /// Forward one request and report the outcome to the observability sink.
    pub async fn dispatch(&self, request: ProxyRequest) -> Result<ProxyResponse, GatewayError> {
        let start = Instant::now();
        let method = request.method.clone();
        let service = request.service.clone();

        let result = self.forward(request).await;

        let status = match &result {
            Ok(response) => response.status,
            Err(e) => e.status(),
        };
        metrics::record_request(method.as_str(), service_label(&service, &result), status.as_u16(), start);

        let latency_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => tracing::info!(
                method = %method,
                service = %service,
                status = status.as_u16(),
                latency_ms,
                "Dispatched request"
            ),
            Err(e) => tracing::warn!(
                method = %method,
                service = %service,
                status = status.as_u16(),
                latency_ms,
                kind = e.kind(),
                "Dispatch failed"
            ),
        }

        result
    }

    async fn forward(&self, request: ProxyRequest) -> Result<ProxyResponse, GatewayError> {
        let descriptor = self.resolve(&request.service)?;

        let mode = body_mode(&request.method).ok_or_else(|| GatewayError::MethodNotAllowed {
            service: descriptor.name.clone(),
            method: request.method.clone(),
        })?;

        let query = match mode {
            BodyMode::QueryOnly => request.query.as_deref(),
            BodyMode::Payload => None,
        };
        let target = target_url(&descriptor.base_url, &request.subpath, query);
        let uri: Uri = target.parse().map_err(|e| {
            tracing::warn!(service = %descriptor.name, target = %target, error = %e, "Invalid target URL");
            GatewayError::UpstreamUnreachable {
                service: descriptor.name.clone(),
                reason: "target URL could not be built".to_string(),
            }
        })?;

        let body = match mode {
            BodyMode::QueryOnly => Body::empty(),
            BodyMode::Payload => Body::from(request.body),
        };

        let mut builder = Request::builder().method(request.method.clone()).uri(uri);
        if let Some(headers) = builder.headers_mut() {
            *headers = outbound_request_headers(&request.headers);
        }
        let outbound = builder.body(body).map_err(|e| {
            tracing::warn!(service = %descriptor.name, error = %e, "Failed to build outbound request");
            GatewayError::UpstreamUnreachable {
                service: descriptor.name.clone(),
                reason: "outbound request could not be built".to_string(),
            }
        })?;

        tracing::debug!(service = %descriptor.name, method = %request.method, target = %target, "Forwarding request");

        match time::timeout(self.request_timeout, self.exchange(&descriptor, outbound)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::UpstreamTimeout {
                service: descriptor.name,
                timeout: self.request_timeout,
            }),
        }
    }

    /// Registry lookup plus the unhealthy short-circuit.
    fn resolve(&self, name: &str) -> Result<ServiceDescriptor, GatewayError> {
        let descriptor = self
            .registry
            .get(name)
            .map_err(|_| GatewayError::UnknownService(name.to_string()))?;

        if descriptor.is_unhealthy() {
            return Err(GatewayError::ServiceUnavailable(descriptor.name));
        }
        Ok(descriptor)
    }

    /// Send the request and buffer the response body.
    async fn exchange(
        &self,
        descriptor: &ServiceDescriptor,
        outbound: Request<Body>,
    ) -> Result<ProxyResponse, GatewayError> {
        let response: Response<Incoming> = self.client.request(outbound).await.map_err(|e| {
            let reason = if e.is_connect() {
                "connection to backend failed"
            } else {
                "backend closed the connection before responding"
            };
            tracing::warn!(service = %descriptor.name, error = ?e, reason, "Upstream error");
            GatewayError::UpstreamUnreachable {
                service: descriptor.name.clone(),
                reason: reason.to_string(),
            }
        })?;

        let (parts, incoming) = response.into_parts();
        let bytes = axum::body::to_bytes(Body::new(incoming), self.max_response_bytes)
            .await
            .map_err(|e| {
                tracing::warn!(service = %descriptor.name, error = %e, "Failed to read upstream body");
                GatewayError::UpstreamUnreachable {
                    service: descriptor.name.clone(),
                    reason: "backend response body could not be read".to_string(),
                }
            })?;

        let body = UpstreamBody::classify(&parts.headers, bytes);
        tracing::debug!(
            service = %descriptor.name,
            status = parts.status.as_u16(),
            json = body.is_json(),
            bytes = body.bytes().len(),
            "Upstream responded"
        );

        Ok(ProxyResponse {
            status: parts.status,
            body,
            headers: inbound_response_headers(&parts.headers),
        })
    }
}
