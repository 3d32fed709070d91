//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides: GATEWAY_*, LOG_LEVEL, *_SERVICE_URL)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → seeds the service registry, configures client and middleware
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; runtime changes go through the registry API
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AuthConfig, CorsConfig, GatewayConfig, HealthCheckConfig, LimitsConfig, ListenerConfig,
    LogFormat, ObservabilityConfig, ServiceConfig, TimeoutConfig,
};
