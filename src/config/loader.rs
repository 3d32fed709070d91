//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::{GatewayConfig, ServiceConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Suffix marking an environment variable as a service URL.
const SERVICE_URL_SUFFIX: &str = "_SERVICE_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: file (if any), then environment overrides, then validation.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, std::env::vars());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse a TOML document.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Apply deployment overrides from environment variables.
///
/// - `GATEWAY_HOST` / `GATEWAY_PORT` replace parts of the bind address
/// - `GATEWAY_PATH_PREFIX` replaces the route prefix
/// - `LOG_LEVEL` replaces the log level
/// - `<NAME>_SERVICE_URL` registers or re-points service `<name>`
pub fn apply_env_overrides<I>(config: &mut GatewayConfig, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut host = None;
    let mut port = None;
    let mut service_urls = Vec::new();

    for (key, value) in vars {
        let value = value.trim().to_string();
        match key.as_str() {
            "GATEWAY_HOST" if !value.is_empty() => host = Some(value),
            "GATEWAY_PORT" if !value.is_empty() => port = Some(value),
            "GATEWAY_PATH_PREFIX" => config.listener.path_prefix = value,
            "LOG_LEVEL" if !value.is_empty() => {
                config.observability.log_level = value.to_lowercase()
            }
            _ => {
                if let Some(prefix) = key.strip_suffix(SERVICE_URL_SUFFIX) {
                    if !prefix.is_empty() && !value.is_empty() {
                        service_urls.push((prefix.to_lowercase().replace('_', "-"), value));
                    }
                }
            }
        }
    }

    if host.is_some() || port.is_some() {
        let (current_host, current_port) = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(h, p)| (h.to_string(), p.to_string()))
            .unwrap_or_else(|| (config.listener.bind_address.clone(), "8000".to_string()));
        config.listener.bind_address = format!(
            "{}:{}",
            host.unwrap_or(current_host),
            port.unwrap_or(current_port)
        );
    }

    // Environment iteration order is unspecified.
    service_urls.sort();
    for (name, url) in service_urls {
        match config.services.iter_mut().find(|s| s.name == name) {
            Some(existing) => existing.url = url,
            None => config.services.push(ServiceConfig::new(name, url)),
        }
    }
}
