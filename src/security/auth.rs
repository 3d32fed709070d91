//! Authentication gate in front of the dispatcher.
//!
//! Disabled: every request passes unchanged. Enabled: a request either
//! matches an exempt path, carries the configured bearer token, or is
//! rejected with 401 before it reaches a handler. The Authorization header
//! is never stripped; backends see what the caller sent.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::error::GatewayError;

#[derive(Debug, Clone)]
pub struct AuthPolicy {
    enabled: bool,
    expected: String,
    exempt: Vec<String>,
}

impl AuthPolicy {
    /// Build the policy; exempt paths are resolved against the route prefix.
    pub fn new(config: &AuthConfig, path_prefix: &str) -> Self {
        let exempt = config
            .exempt_paths
            .iter()
            .flat_map(|p| [p.clone(), format!("{}{}", path_prefix, p)])
            .collect();

        Self {
            enabled: config.enabled,
            expected: format!("Bearer {}", config.bearer_token),
            exempt,
        }
    }

    fn is_exempt(&self, path: &str) -> bool {
        self.exempt.iter().any(|p| p == path)
    }

    fn admits(&self, request: &Request<Body>) -> bool {
        if !self.enabled || self.is_exempt(request.uri().path()) {
            return true;
        }
        request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v == self.expected)
            .unwrap_or(false)
    }
}

pub async fn auth_middleware(
    State(policy): State<Arc<AuthPolicy>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if policy.admits(&request) {
        tracing::debug!(path = %request.uri().path(), "Request admitted");
        return next.run(request).await;
    }

    tracing::warn!(path = %request.uri().path(), "Rejected unauthenticated request");
    GatewayError::Unauthorized.into_response()
}
