//! Health probes.
//!
//! # Responsibilities
//! - Probe one service and record the result in the registry
//! - Probe a snapshot of services concurrently, isolating failures

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::Utc;
use futures_util::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;

use crate::observability::metrics;
use crate::proxy::client::HttpClient;
use crate::registry::{HealthStatus, ServiceDescriptor, ServiceRegistry};

const USER_AGENT: &str = "service-gateway-health-check";

/// Result of probing one service inside `check_all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum ProbeOutcome {
    Healthy,
    Unhealthy,
    /// The probe task itself failed (e.g. panicked).
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub name: String,
    #[serde(flatten)]
    pub outcome: ProbeOutcome,
}

pub struct HealthChecker {
    registry: Arc<ServiceRegistry>,
    client: HttpClient,
    timeout: Duration,
}

impl HealthChecker {
    pub fn new(registry: Arc<ServiceRegistry>, client: HttpClient, timeout: Duration) -> Self {
        Self {
            registry,
            client,
            timeout,
        }
    }

    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    /// Probe one service and record the outcome. Never fails.
    pub async fn check_one(&self, descriptor: &ServiceDescriptor) -> bool {
        let healthy = self.probe(descriptor).await;
        let status = if healthy {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };

        self.registry.set_status(&descriptor.name, status, Utc::now());
        metrics::record_probe(&descriptor.name, healthy);
        healthy
    }

    /// Probe every descriptor in `snapshot` concurrently.
    ///
    /// Reports come back in snapshot order. Wall-clock time is bounded by the
    /// slowest single probe, not by the number of services.
    pub async fn check_all(self: &Arc<Self>, snapshot: Vec<ServiceDescriptor>) -> Vec<ProbeReport> {
        let (names, tasks): (Vec<_>, Vec<_>) = snapshot
            .into_iter()
            .map(|descriptor| {
                let checker = Arc::clone(self);
                let name = descriptor.name.clone();
                let task = tokio::spawn(async move { checker.check_one(&descriptor).await });
                (name, task)
            })
            .unzip();

        let results = join_all(tasks).await;

        names
            .into_iter()
            .zip(results)
            .map(|(name, result)| {
                let outcome = match result {
                    Ok(true) => ProbeOutcome::Healthy,
                    Ok(false) => ProbeOutcome::Unhealthy,
                    Err(e) => {
                        tracing::error!(service = %name, error = %e, "Health probe task failed");
                        ProbeOutcome::Error { message: e.to_string() }
                    }
                };
                ProbeReport { name, outcome }
            })
            .collect()
    }

    async fn probe(&self, descriptor: &ServiceDescriptor) -> bool {
        let request = match Request::builder()
            .method("GET")
            .uri(descriptor.health_url.as_str())
            .header(header::USER_AGENT, USER_AGENT)
            .body(Body::empty())
        {
            Ok(req) => req,
            Err(e) => {
                tracing::warn!(service = %descriptor.name, error = %e, "Failed to build health check request");
                return false;
            }
        };

        match time::timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let healthy = response.status() == StatusCode::OK;
                if !healthy {
                    tracing::warn!(service = %descriptor.name, status = %response.status(), "Health check failed: non-200 status");
                }
                healthy
            }
            Ok(Err(e)) => {
                tracing::warn!(service = %descriptor.name, error = %e, "Health check failed: connection error");
                false
            }
            Err(_) => {
                tracing::warn!(service = %descriptor.name, timeout_ms = self.timeout.as_millis() as u64, "Health check failed: timeout");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serialization() {
        let healthy = ProbeReport { name: "a".into(), outcome: ProbeOutcome::Healthy };
        assert_eq!(
            serde_json::to_value(&healthy).unwrap(),
            serde_json::json!({"name": "a", "outcome": "healthy"})
        );

        let failed = ProbeReport {
            name: "b".into(),
            outcome: ProbeOutcome::Error { message: "task 3 panicked".into() },
        };
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"name": "b", "outcome": "error", "message": "task 3 panicked"})
        );
    }
}
