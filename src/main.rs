//! Edge server binary.
//!
//! Startup order: parse flags, merge with the config file, initialize
//! tracing, populate the static cache, optionally start the metrics
//! exporter, then serve (plain or TLS) until Ctrl+C.

use std::net::ToSocketAddrs;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use edge_proxy::config::Cli;
use edge_proxy::http::HttpServer;
use edge_proxy::lifecycle::Shutdown;
use edge_proxy::net::tls::load_tls_config;
use edge_proxy::observability::metrics;
use edge_proxy::static_files::StaticCache;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Arc::new(cli.into_config()?);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "edge_proxy={0},tower_http={0}",
                    config.observability.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        bind_address = %config.bind_address(),
        public_dir = %config.static_files.public_dir,
        cache_static = config.static_files.cache_static,
        proxy_prefix = %config.proxy.path_prefix,
        strip_cors = config.proxy.strip_cors,
        tls = config.listener.tls.is_some(),
        "Configuration loaded"
    );

    let cache = if config.static_files.cache_static {
        StaticCache::build(Path::new(&config.static_files.public_dir)).await
    } else {
        StaticCache::empty()
    };

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    shutdown.listen_for_ctrl_c();

    let server = HttpServer::new(config.clone(), Arc::new(cache));
    match &config.listener.tls {
        Some(tls) => {
            let tls_config =
                load_tls_config(Path::new(&tls.cert_path), Path::new(&tls.key_path)).await?;
            let addr = config
                .bind_address()
                .to_socket_addrs()?
                .next()
                .ok_or("bind address resolved to no socket address")?;
            server.run_tls(addr, tls_config, shutdown.subscribe()).await?;
        }
        None => {
            let listener = TcpListener::bind(config.bind_address()).await?;
            server.run(listener, shutdown.subscribe()).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
