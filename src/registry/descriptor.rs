//! Service descriptor.
//!
//! # Responsibilities
//! - Represent one backend service (identity, location, health)
//! - Validate and normalize registration input
//!
//! # Design Decisions
//! - `base_url` never carries a trailing slash; targets are built as `base_url/subpath`
//! - Only plain `http://` backends are accepted (the outbound client does not speak TLS)
//! - Names are restricted to a single URL path segment

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::GatewayError;

/// Path segments owned by the gateway itself; a service with one of these
/// names would never receive traffic.
pub const RESERVED_NAMES: &[&str] = &["health", "services"];

/// Health state of a registered service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Unknown,
    #[default]
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Unknown => "unknown",
            HealthStatus::Healthy => "healthy",
            HealthStatus::Unhealthy => "unhealthy",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered backend service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDescriptor {
    /// Unique registry key; also the first path segment routed to this service.
    pub name: String,
    /// Absolute URL prefix of the backend, without trailing slash.
    pub base_url: String,
    /// URL probed by the health checker.
    pub health_url: String,
    /// Last known health state.
    pub status: HealthStatus,
    /// Time of the most recent probe, if any.
    pub last_check: Option<DateTime<Utc>>,
}

impl ServiceDescriptor {
    /// Build a validated descriptor.
    ///
    /// `health_url` defaults to `base_url + "/health"` and `status` to
    /// [`HealthStatus::Healthy`] until the first probe.
    pub fn new(
        name: &str,
        base_url: &str,
        health_url: Option<&str>,
        status: Option<HealthStatus>,
    ) -> Result<Self, GatewayError> {
        let name = validate_name(name)?;
        let base_url = normalize_url("url", base_url)?;
        let health_url = match health_url {
            Some(url) if !url.trim().is_empty() => normalize_url("health_url", url)?,
            _ => format!("{}/health", base_url),
        };

        Ok(Self {
            name,
            base_url,
            health_url,
            status: status.unwrap_or_default(),
            last_check: None,
        })
    }

    pub fn is_unhealthy(&self) -> bool {
        self.status == HealthStatus::Unhealthy
    }
}

/// Registration payload as accepted from operators (HTTP body or CLI).
///
/// Every field is optional at the serde level so that a missing field is
/// reported as a malformed registration rather than a generic parse error.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServiceRegistration {
    pub name: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub health_url: Option<String>,
    #[serde(default)]
    pub status: Option<HealthStatus>,
}

impl ServiceRegistration {
    /// Parse a raw JSON body.
    pub fn from_json(body: &[u8]) -> Result<Self, GatewayError> {
        serde_json::from_slice(body)
            .map_err(|e| GatewayError::MalformedRegistration(format!("body is not a valid registration: {}", e)))
    }

    pub fn into_descriptor(self) -> Result<ServiceDescriptor, GatewayError> {
        let name = self
            .name
            .ok_or_else(|| GatewayError::MalformedRegistration("missing field 'name'".into()))?;
        let url = self
            .url
            .ok_or_else(|| GatewayError::MalformedRegistration("missing field 'url'".into()))?;

        ServiceDescriptor::new(&name, &url, self.health_url.as_deref(), self.status)
    }
}

fn validate_name(name: &str) -> Result<String, GatewayError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(GatewayError::MalformedRegistration("field 'name' must not be empty".into()));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(GatewayError::MalformedRegistration(format!(
            "field 'name' may only contain letters, digits, '-', '_' and '.': {:?}",
            name
        )));
    }
    if name.chars().all(|c| c == '.') {
        return Err(GatewayError::MalformedRegistration(format!(
            "field 'name' must not consist only of dots: {:?}",
            name
        )));
    }
    if RESERVED_NAMES.contains(&name) {
        return Err(GatewayError::MalformedRegistration(format!(
            "field 'name' uses reserved gateway path '{}'",
            name
        )));
    }
    Ok(name.to_string())
}

fn normalize_url(field: &str, raw: &str) -> Result<String, GatewayError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(GatewayError::MalformedRegistration(format!("field '{}' must not be empty", field)));
    }

    let parsed = Url::parse(raw).map_err(|e| {
        GatewayError::MalformedRegistration(format!("field '{}' is not an absolute URL: {}", field, e))
    })?;

    if parsed.scheme() != "http" {
        return Err(GatewayError::MalformedRegistration(format!(
            "field '{}' must use the http scheme, got '{}'",
            field,
            parsed.scheme()
        )));
    }
    if parsed.host_str().is_none() {
        return Err(GatewayError::MalformedRegistration(format!("field '{}' has no host", field)));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(GatewayError::MalformedRegistration(format!(
            "field '{}' must not carry a query or fragment",
            field
        )));
    }

    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let d = ServiceDescriptor::new("orders", "http://localhost:9001/", None, None).unwrap();
        assert_eq!(d.base_url, "http://localhost:9001");
        assert_eq!(d.health_url, "http://localhost:9001/health");
        assert_eq!(d.status, HealthStatus::Healthy);
        assert!(d.last_check.is_none());
    }

    #[test]
    fn test_explicit_health_url_and_status() {
        let d = ServiceDescriptor::new(
            "x",
            "http://h:1/api",
            Some("http://h:2/ping"),
            Some(HealthStatus::Unknown),
        )
        .unwrap();
        assert_eq!(d.base_url, "http://h:1/api");
        assert_eq!(d.health_url, "http://h:2/ping");
        assert_eq!(d.status, HealthStatus::Unknown);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(ServiceDescriptor::new("", "http://h:1", None, None).is_err());
        assert!(ServiceDescriptor::new("a/b", "http://h:1", None, None).is_err());
        assert!(ServiceDescriptor::new("services", "http://h:1", None, None).is_err());
        assert!(ServiceDescriptor::new(".", "http://h:1", None, None).is_err());
        assert!(ServiceDescriptor::new("..", "http://h:1", None, None).is_err());
        assert!(ServiceDescriptor::new("v1.2", "http://h:1", None, None).is_ok());
        assert!(ServiceDescriptor::new("x", "not a url", None, None).is_err());
        assert!(ServiceDescriptor::new("x", "https://h:1", None, None).is_err());
        assert!(ServiceDescriptor::new("x", "http://h:1/?a=b", None, None).is_err());
    }

    #[test]
    fn test_registration_missing_fields() {
        let reg = ServiceRegistration::from_json(br#"{"name": "x"}"#).unwrap();
        let err = reg.into_descriptor().unwrap_err();
        assert_eq!(err.kind(), "malformed_registration");
        assert!(err.to_string().contains("url"));

        let err = ServiceRegistration::from_json(b"[1, 2]").unwrap_err();
        assert_eq!(err.kind(), "malformed_registration");

        let err = ServiceRegistration::from_json(br#"{"name": "x", "url": "http://h:1", "status": "sleepy"}"#)
            .unwrap_err();
        assert_eq!(err.kind(), "malformed_registration");
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&HealthStatus::Unhealthy).unwrap();
        assert_eq!(json, "\"unhealthy\"");
    }
}
