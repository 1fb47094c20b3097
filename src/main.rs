//! Static HTTP server binary.
//!
//! # Startup
//!
//! ```text
//! CLI flags ──┐
//! --config ───┴─▶ ServerConfig ─▶ validate ─▶ HttpServer (pipeline + router)
//!                                               │
//!                      SIGINT / SIGTERM ─▶ Shutdown ─▶ graceful stop
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use static_http_server::cli::Cli;
use static_http_server::config::{load_config, validate_config, ConfigError, ServerConfig};
use static_http_server::error::ServerError;
use static_http_server::lifecycle::{wait_for_signal, Shutdown};
use static_http_server::observability::logging::{access_log_fn, init_tracing};
use static_http_server::observability::metrics::init_metrics;
use static_http_server::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    cli.apply(&mut config)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    init_tracing(&config.observability.log_level);
    tracing::info!("static-http-server v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let addr: SocketAddr = config
        .listener
        .bind_address
        .parse()
        .map_err(|_| ServerError::InvalidAddress(config.listener.bind_address.clone()))?;
    let tls = config.listener.tls.clone();

    let mut builder = HttpServer::builder(config);
    if !cli.silent {
        builder = builder.log_fn(access_log_fn());
    }
    let server = builder.build()?;

    tracing::info!(
        root = %server.root().display(),
        address = %addr,
        tls = tls.is_some(),
        "Configuration loaded"
    );

    let shutdown = Arc::new(Shutdown::new());
    let trigger = Arc::clone(&shutdown);
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("Shutdown signal received");
        trigger.trigger();
    });

    match tls {
        Some(tls) => server.serve_tls(addr, &tls, shutdown.subscribe()).await?,
        None => {
            let listener = TcpListener::bind(addr)
                .await
                .map_err(|source| ServerError::Bind { addr, source })?;
            server.serve(listener, shutdown.subscribe().wait()).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
