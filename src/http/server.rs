//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the registry, outbound client, dispatcher and health checker
//! - Create the Axum router for registry, health and proxy routes
//! - Wire up middleware (request ID, tracing, CORS, authentication)
//! - Run the serve loop and the background health monitor until shutdown

use axum::{
    routing::{any, delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::health::{HealthChecker, HealthMonitor};
use crate::http::handlers;
use crate::http::request::UuidRequestId;
use crate::lifecycle::shutdown;
use crate::proxy::{build_client, Dispatcher};
use crate::registry::ServiceRegistry;
use crate::security::{apply_cors, auth_middleware, AuthPolicy};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ServiceRegistry>,
    pub dispatcher: Arc<Dispatcher>,
    pub checker: Arc<HealthChecker>,
    pub max_request_body_bytes: usize,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    registry: Arc<ServiceRegistry>,
    checker: Arc<HealthChecker>,
}

impl HttpServer {
    /// Create a new server; the registry is seeded from `config.services`.
    pub fn new(config: GatewayConfig) -> Self {
        let registry = Arc::new(ServiceRegistry::from_config(&config.services));
        Self::with_registry(config, registry)
    }

    /// Create a server around an existing registry.
    pub fn with_registry(config: GatewayConfig, registry: Arc<ServiceRegistry>) -> Self {
        let client = build_client(Duration::from_secs(config.timeouts.connect_secs));

        let dispatcher = Arc::new(Dispatcher::new(
            registry.clone(),
            client.clone(),
            Duration::from_secs(config.timeouts.request_secs),
            config.limits.max_response_body_bytes,
        ));
        let checker = Arc::new(HealthChecker::new(
            registry.clone(),
            client,
            Duration::from_secs(config.health_check.timeout_secs),
        ));

        let state = AppState {
            registry: registry.clone(),
            dispatcher,
            checker: checker.clone(),
            max_request_body_bytes: config.limits.max_request_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            registry,
            checker,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let api = Router::new()
            .route("/health", get(handlers::gateway_health))
            .route("/services", get(handlers::list_services))
            .route("/services/register", post(handlers::register_service))
            .route("/services/health/all", post(handlers::check_all_services))
            .route("/services/{name}", delete(handlers::unregister_service))
            .route("/services/{name}/health", post(handlers::check_service))
            .route("/{service}", any(handlers::proxy))
            .route("/{service}/", any(handlers::proxy))
            .route("/{service}/{*subpath}", any(handlers::proxy));

        let prefix = config.listener.path_prefix.as_str();
        let mounted = if prefix.is_empty() {
            api
        } else {
            Router::new().nest(prefix, api)
        };

        let policy = Arc::new(AuthPolicy::new(&config.auth, prefix));
        let router = mounted
            .route("/", get(handlers::root))
            .fallback(handlers::not_found)
            .with_state(state)
            .layer(axum::middleware::from_fn_with_state(policy, auth_middleware))
            .layer(PropagateRequestIdLayer::x_request_id());

        apply_cors(router, &config.cors)
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The fully layered router, for in-process serving.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            prefix = %self.config.listener.path_prefix,
            services = self.registry.len(),
            "HTTP server starting"
        );

        if self.config.health_check.enabled {
            let monitor = HealthMonitor::new(
                self.checker.clone(),
                Duration::from_secs(self.config.health_check.interval_secs),
            );
            tokio::spawn(monitor.run(shutdown.resubscribe()));
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
