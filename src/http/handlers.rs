//! Route handlers: gateway info, registry management, health checks, proxy.

use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::Request,
    response::Response,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::GatewayError;
use crate::health::{ProbeOutcome, ProbeReport};
use crate::http::request::into_proxy_request;
use crate::http::response::{self, ApiResponse};
use crate::http::server::AppState;
use crate::proxy::ProxyResponse;
use crate::registry::{HealthStatus, ServiceDescriptor, ServiceRegistration};

#[derive(Debug, Serialize)]
pub struct ProbeSummary {
    pub name: String,
    pub healthy: bool,
    pub status: HealthStatus,
    pub last_check: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct HealthRound {
    pub total: usize,
    pub healthy: usize,
    pub unhealthy: usize,
    pub errors: usize,
    pub results: Vec<ProbeReport>,
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Service Gateway",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Liveness of the gateway itself; never touches backends.
pub async fn gateway_health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "service-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "registered_services": state.registry.len(),
    }))
}

pub async fn list_services(State(state): State<AppState>) -> ApiResponse<Vec<ServiceDescriptor>> {
    let services = state.registry.list();
    let message = format!("{} service(s) registered", services.len());
    ApiResponse::success(services, message)
}

pub async fn register_service(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<ApiResponse<ServiceDescriptor>, GatewayError> {
    let descriptor = ServiceRegistration::from_json(&body)?.into_descriptor()?;
    let replaced = state.registry.register(descriptor.clone());

    tracing::info!(
        service = %descriptor.name,
        base_url = %descriptor.base_url,
        status = %descriptor.status,
        replaced = replaced.is_some(),
        "Service registered"
    );

    let message = match replaced {
        Some(_) => format!("service '{}' updated", descriptor.name),
        None => format!("service '{}' registered", descriptor.name),
    };
    Ok(ApiResponse::success(descriptor, message))
}

pub async fn unregister_service(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<ApiResponse<ServiceDescriptor>, GatewayError> {
    let removed = state.registry.unregister(&name)?;
    tracing::info!(service = %name, "Service unregistered");
    Ok(ApiResponse::success(removed, format!("service '{}' unregistered", name)))
}

pub async fn check_service(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<ApiResponse<ProbeSummary>, GatewayError> {
    let descriptor = state.registry.get(&name)?;
    let healthy = state.checker.check_one(&descriptor).await;

    // The service may have been removed while the probe ran.
    let last_check = state.registry.get(&name).ok().and_then(|d| d.last_check);

    let summary = ProbeSummary {
        name: descriptor.name,
        healthy,
        status: if healthy { HealthStatus::Healthy } else { HealthStatus::Unhealthy },
        last_check,
    };
    let message = format!("service '{}' is {}", summary.name, summary.status);
    Ok(ApiResponse::success(summary, message))
}

pub async fn check_all_services(State(state): State<AppState>) -> ApiResponse<HealthRound> {
    let snapshot = state.registry.list();
    let results = state.checker.check_all(snapshot).await;

    let count = |wanted: fn(&ProbeOutcome) -> bool| results.iter().filter(|r| wanted(&r.outcome)).count();
    let healthy = count(|o| matches!(o, ProbeOutcome::Healthy));
    let unhealthy = count(|o| matches!(o, ProbeOutcome::Unhealthy));
    let errors = count(|o| matches!(o, ProbeOutcome::Error { .. }));

    let round = HealthRound {
        total: results.len(),
        healthy,
        unhealthy,
        errors,
        results,
    };
    let message = format!("{}/{} service(s) healthy", round.healthy, round.total);
    ApiResponse::success(round, message)
}

/// `/{service}/{subpath...}` for every method.
pub async fn proxy(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<ProxyResponse, GatewayError> {
    let request = into_proxy_request(request, state.max_request_body_bytes).await?;
    state.dispatcher.dispatch(request).await
}

pub async fn not_found() -> Response {
    response::not_found()
}

