//! Service gateway library.
//!
//! Routes `/{service}/{subpath...}` to registered backends and keeps a live
//! registry of those backends and their health.

pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod registry;
pub mod security;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
