//! Authentication relay.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                 AUTH RELAY                   │
//!   Game client /    │  ┌────────┐   ┌─────────┐   ┌─────────────┐  │
//!   game server ─────┼─▶│  http  │──▶│ routing │──▶│ relay       │  │
//!                    │  │ server │   │         │   │ engine      │  │
//!                    │  └────────┘   └─────────┘   └──────┬──────┘  │
//!                    │                                    │         │
//!                    │              offline ┌─────────────┤         │
//!                    │                      ▼             ▼ online  │
//!                    │               ┌──────────┐  ┌─────────────┐  │   upstream 1
//!                    │               │UserStore │  │ fallback    │──┼─▶ upstream 2
//!                    │               └──────────┘  │ sweep       │  │   ...
//!                    │                             └─────────────┘  │
//!                    └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use tokio::net::TcpListener;

use auth_relay::cli::Cli;
use auth_relay::http::HttpServer;
use auth_relay::lifecycle::{build_engine, Shutdown};
use auth_relay::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    logging::init_logging(&config.observability);

    tracing::info!("auth-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        upstream_list = ?config.upstreams.list_path,
        reload = ?config.upstreams.reload,
        style = ?config.upstreams.style,
        offline = config.offline.enabled,
        "Configuration loaded"
    );

    let engine = build_engine(&config)?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(engine, config.observability.debug);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
