use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the service gateway", long_about = None)]
struct Cli {
    /// Gateway base URL.
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    /// Route prefix the gateway is mounted under (e.g. /api/v1).
    #[arg(short, long, default_value = "")]
    prefix: String,

    /// Bearer token, when the gateway requires authentication.
    #[arg(short, long, env = "GATEWAY_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway liveness
    Health,
    /// List registered services and their health
    Services,
    /// Register or replace a service
    Register {
        name: String,
        url: String,
        #[arg(long)]
        health_url: Option<String>,
        /// Initial status: unknown, healthy or unhealthy
        #[arg(long)]
        status: Option<String>,
    },
    /// Remove a service
    Unregister { name: String },
    /// Probe one service now
    Check { name: String },
    /// Probe every service now
    CheckAll,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
    }

    let base = format!("{}{}", cli.url.trim_end_matches('/'), cli.prefix);
    let call = |method: Method, path: &str| -> RequestBuilder {
        client
            .request(method, format!("{}{}", base, path))
            .headers(headers.clone())
    };

    let request = match cli.command {
        Commands::Health => call(Method::GET, "/health"),
        Commands::Services => call(Method::GET, "/services"),
        Commands::Register { name, url, health_url, status } => {
            call(Method::POST, "/services/register").json(&json!({
                "name": name,
                "url": url,
                "health_url": health_url,
                "status": status,
            }))
        }
        Commands::Unregister { name } => call(Method::DELETE, &format!("/services/{}", name)),
        Commands::Check { name } => call(Method::POST, &format!("/services/{}/health", name)),
        Commands::CheckAll => call(Method::POST, "/services/health/all"),
    };

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    let rendered = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{}", rendered);
    } else {
        eprintln!("Error: gateway returned status {}", status);
        eprintln!("{}", rendered);
        std::process::exit(1);
    }
    Ok(())
}
