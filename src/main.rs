//! API Gateway
//!
//! Routes inbound requests by path to the platform's backend services.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client Request
//!   ─────────────▶ http server ──▶ route table ──┬─ Forward ──▶ discovery ──▶ upstream instance
//!                  (request id,    (first match   │              (load balancer,
//!                   tracing,        wins)         │               health state)
//!                   limits)                       └─ Terminate ──▶ synthesized response
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use api_gateway::config::{load_config, GatewayConfig};
use api_gateway::lifecycle::signals::shutdown_on_signal;
use api_gateway::observability::{logging, metrics};
use api_gateway::{Gateway, GatewayError, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "api-gateway", version, about = "Path-routing API gateway")]
struct Cli {
    /// Path to the TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), GatewayError> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?cli.config,
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        services = config.services.len(),
        "api-gateway starting"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| GatewayError::InvalidAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let gateway = Gateway::build(config)?;

    let bind_address = gateway.config.listener.bind_address.clone();
    let listener = TcpListener::bind(&bind_address)
        .await
        .map_err(|source| GatewayError::Bind {
            address: bind_address.clone(),
            source,
        })?;

    let shutdown = Shutdown::new();
    let signal_handle = shutdown.clone();
    tokio::spawn(async move { shutdown_on_signal(&signal_handle).await });

    HttpServer::new(gateway).run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
