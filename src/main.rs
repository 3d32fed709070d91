//! Service Gateway
//!
//! Dynamic reverse proxy in front of independently deployed backend services.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────┐
//!                    │                   SERVICE GATEWAY                     │
//!                    │                                                       │
//!  Client Request    │  ┌──────────┐   ┌──────────┐   ┌────────────────┐    │
//!  ──────────────────┼─▶│  http    │──▶│ security │──▶│   dispatcher   │────┼──▶ Backend
//!                    │  │ server   │   │ cors/auth│   │ resolve+forward│    │   /{service}
//!                    │  └────┬─────┘   └──────────┘   └───────┬────────┘    │
//!                    │       │ /services/*                    │ get(name)   │
//!                    │       ▼                                ▼             │
//!                    │  ┌──────────┐   set_status     ┌──────────────┐      │
//!                    │  │  health  │─────────────────▶│   registry   │      │
//!                    │  │ checker  │◀──── list() ─────│ name → desc. │      │
//!                    │  └────┬─────┘                  └──────────────┘      │
//!                    │       │ probes (fan-out)                             │
//!                    └───────┼──────────────────────────────────────────────┘
//!                            ▼
//!                      Backend /health
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use service_gateway::config::load_config;
use service_gateway::lifecycle::{signals, Shutdown};
use service_gateway::observability::{logging, metrics};
use service_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "service-gateway")]
#[command(about = "Dynamic reverse proxy with a live service registry", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults plus environment are used when omitted.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Local development convenience; deployments inject real variables.
    dotenv::dotenv().ok();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "service-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        services = config.services.len(),
        request_timeout_secs = config.timeouts.request_secs,
        health_checks = config.health_check.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
