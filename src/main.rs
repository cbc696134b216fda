//! Composition root: wire the engine, registry, and dispatcher together and
//! serve all three transports until ctrl-c.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use graphgate::config::GatewayConfig;
use graphgate::dispatch::Dispatcher;
use graphgate::handlers;
use graphgate::registry::MethodRegistry;
use graphgate::sdk::{GraphClient, MemoryGraph};
use graphgate::transport;

/// Multi-transport RPC gateway for a graph database engine.
#[derive(Debug, Parser)]
#[command(name = "graphgate", version)]
struct Cli {
    /// HTTP listen address
    #[arg(long)]
    http_addr: Option<SocketAddr>,

    /// TCP listen address
    #[arg(long)]
    tcp_addr: Option<SocketAddr>,

    /// WebSocket listen address
    #[arg(long)]
    ws_addr: Option<SocketAddr>,

    /// Log output as plain text instead of JSON
    #[arg(long)]
    pretty_logs: bool,
}

fn init_tracing(pretty: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("graphgate=info,warn"));
    if pretty {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.pretty_logs);

    let mut config = GatewayConfig::from_env()?;
    if let Some(addr) = cli.http_addr {
        config.http_addr = addr;
    }
    if let Some(addr) = cli.tcp_addr {
        config.tcp_addr = addr;
    }
    if let Some(addr) = cli.ws_addr {
        config.ws_addr = addr;
    }

    let client: Arc<dyn GraphClient> = Arc::new(MemoryGraph::new());
    let mut registry = MethodRegistry::new();
    handlers::register_all(&mut registry, client)?;
    info!(methods = registry.len(), "method surface registered");

    let dispatcher = Arc::new(Dispatcher::new(
        Arc::new(registry),
        config.dispatch_timeout,
    ));

    let (shutdown, _) = broadcast::channel::<()>(1);

    let http_listener = TcpListener::bind(config.http_addr).await?;
    let tcp_listener = TcpListener::bind(config.tcp_addr).await?;
    let ws_listener = TcpListener::bind(config.ws_addr).await?;
    info!(
        http = %config.http_addr,
        tcp = %config.tcp_addr,
        ws = %config.ws_addr,
        "listening"
    );

    let router = transport::http::router(
        Arc::clone(&dispatcher),
        config.max_body_bytes,
        config.max_concurrency,
    );
    let http = tokio::spawn(transport::http::serve(
        http_listener,
        router,
        shutdown.clone(),
    ));
    let tcp = tokio::spawn(transport::tcp::serve(
        tcp_listener,
        Arc::clone(&dispatcher),
        config.max_frame_bytes,
        shutdown.clone(),
    ));
    let ws = tokio::spawn(transport::ws::serve(
        ws_listener,
        Arc::clone(&dispatcher),
        config.max_frame_bytes,
        shutdown.clone(),
    ));

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    let _ = shutdown.send(());

    for (name, task) in [("http", http), ("tcp", tcp), ("ws", ws)] {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(listener = name, error = %e, "listener exited with error"),
            Err(e) => error!(listener = name, error = %e, "listener task failed"),
        }
    }
    info!("shutdown complete");
    Ok(())
}
