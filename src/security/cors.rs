//! Cross-origin policy.
//!
//! `CorsLayer` answers every `OPTIONS` request itself. Only real preflights
//! (`Origin` plus `Access-Control-Request-Method`) are handed to it; any other
//! `OPTIONS` request goes to the routes like every other method.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request},
    middleware::{self, Next},
    response::Response,
    Router,
};
use tower::ServiceExt;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::config::CorsConfig;

/// Wrap `router` with the configured CORS policy. Unchanged when CORS is off.
pub fn apply_cors(router: Router, config: &CorsConfig) -> Router {
    match cors_layer(config) {
        Some(cors) => {
            let with_cors = router.clone().layer(cors);
            router.layer(middleware::from_fn_with_state(with_cors, preflight_gate))
        }
        None => router,
    }
}

fn is_preflight(request: &Request<Body>) -> bool {
    request.method() == Method::OPTIONS
        && request.headers().contains_key(header::ORIGIN)
        && request
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

async fn preflight_gate(
    State(with_cors): State<Router>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS && !is_preflight(&request) {
        return next.run(request).await;
    }

    match with_cors.oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    }
}

/// Build the CORS layer, or `None` when no origins are configured.
///
/// Credentials are allowed, so methods and headers are mirrored from the
/// preflight request instead of using a wildcard.
pub fn cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true),
    )
}
