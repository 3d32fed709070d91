//! Gateway error taxonomy.
//!
//! Every failure the dispatcher or the registry endpoints can produce is
//! classified into one of these kinds before it leaves the core. The HTTP
//! surface only maps kinds to status codes; it never inspects transport errors.

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Methods the dispatcher forwards. Advertised in `Allow` on 405 responses.
pub const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, PATCH";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("service '{0}' is not registered")]
    UnknownService(String),

    #[error("service '{0}' is currently marked unhealthy")]
    ServiceUnavailable(String),

    #[error("method {method} is not supported for service '{service}'")]
    MethodNotAllowed { service: String, method: Method },

    #[error("service '{service}' is unreachable: {reason}")]
    UpstreamUnreachable { service: String, reason: String },

    #[error("service '{service}' did not respond within {}ms", timeout.as_millis())]
    UpstreamTimeout { service: String, timeout: Duration },

    #[error("invalid registration: {0}")]
    MalformedRegistration(String),

    #[error("service '{0}' not found")]
    NotFound(String),

    #[error("request body rejected: {0}")]
    PayloadTooLarge(String),

    #[error("missing or invalid credentials")]
    Unauthorized,
}

impl GatewayError {
    /// Stable machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::UnknownService(_) => "unknown_service",
            GatewayError::ServiceUnavailable(_) => "service_unavailable",
            GatewayError::MethodNotAllowed { .. } => "method_not_allowed",
            GatewayError::UpstreamUnreachable { .. } => "upstream_unreachable",
            GatewayError::UpstreamTimeout { .. } => "upstream_timeout",
            GatewayError::MalformedRegistration(_) => "malformed_registration",
            GatewayError::NotFound(_) => "not_found",
            GatewayError::PayloadTooLarge(_) => "payload_too_large",
            GatewayError::Unauthorized => "unauthorized",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::UnknownService(_) => StatusCode::NOT_FOUND,
            GatewayError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::UpstreamUnreachable { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::MalformedRegistration(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    /// The service the failure is about, when there is one.
    pub fn service(&self) -> Option<&str> {
        match self {
            GatewayError::UnknownService(name)
            | GatewayError::ServiceUnavailable(name)
            | GatewayError::NotFound(name) => Some(name),
            GatewayError::MethodNotAllowed { service, .. }
            | GatewayError::UpstreamUnreachable { service, .. }
            | GatewayError::UpstreamTimeout { service, .. } => Some(service),
            GatewayError::MalformedRegistration(_)
            | GatewayError::PayloadTooLarge(_)
            | GatewayError::Unauthorized => None,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({
            "success": false,
            "error": self.kind(),
            "service": self.service(),
            "message": self.to_string(),
        });

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::METHOD_NOT_ALLOWED {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (GatewayError::UnknownService("a".into()), 404),
            (GatewayError::ServiceUnavailable("a".into()), 503),
            (
                GatewayError::MethodNotAllowed { service: "a".into(), method: Method::HEAD },
                405,
            ),
            (
                GatewayError::UpstreamUnreachable { service: "a".into(), reason: "x".into() },
                502,
            ),
            (
                GatewayError::UpstreamTimeout { service: "a".into(), timeout: Duration::from_secs(1) },
                504,
            ),
            (GatewayError::MalformedRegistration("x".into()), 400),
            (GatewayError::NotFound("a".into()), 404),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status().as_u16(), expected, "{}", err.kind());
        }
    }

    #[test]
    fn test_method_not_allowed_advertises_methods() {
        let err = GatewayError::MethodNotAllowed { service: "orders".into(), method: Method::OPTIONS };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), ALLOWED_METHODS);
    }

    #[test]
    fn test_service_is_named_in_message() {
        let err = GatewayError::UpstreamUnreachable {
            service: "orders".into(),
            reason: "connection failed".into(),
        };
        assert_eq!(err.service(), Some("orders"));
        assert!(err.to_string().contains("orders"));
    }
}
