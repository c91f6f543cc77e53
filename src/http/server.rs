//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Build the Axum router: proxy handler under the configured prefix,
//!   static handler everywhere else
//! - Wire up middleware (timeout, request ID, tracing)
//! - Invoke the fallible responders and render their errors
//! - Serve plain or TLS with graceful shutdown
//!
//! # Design Decisions
//! - Responders either write a full response or return a `HandlerError`;
//!   the dispatch layer here is the only place errors become bytes, so
//!   exactly one terminal response is produced per request
//! - Routes are registered once at startup; the more specific proxy
//!   prefix wins over the static wildcard by router construction

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::http::error::{self, HandlerError};
use crate::http::request::MakeRequestUuid;
use crate::observability::metrics;
use crate::proxy::{self, ProxyClient};
use crate::static_files::{responder, StaticCache};

/// Application state injected into handlers. Configuration and cache
/// are read-only after startup, so sharing is plain `Arc` cloning.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub cache: Arc<StaticCache>,
    pub client: ProxyClient,
}

/// HTTP server for the edge proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server from startup-validated configuration
    /// and the populated static cache.
    pub fn new(config: Arc<ServerConfig>, cache: Arc<StaticCache>) -> Self {
        let state = AppState {
            config: config.clone(),
            cache,
            client: proxy::build_client(),
        };
        let router = Self::build_router(&config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        let prefix = &config.proxy.path_prefix;
        Router::new()
            .route(prefix, get(proxy_handler).post(proxy_handler))
            .route(
                &format!("{prefix}/{{*target}}"),
                get(proxy_handler).post(proxy_handler),
            )
            .route("/", get(static_handler))
            .route("/{*path}", get(static_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server, accepting connections on the given listener
    /// until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server over TLS with the loaded certificate pair.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let graceful = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Shutdown signal received");
            graceful.graceful_shutdown(Some(Duration::from_secs(5)));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Static responder entry point.
async fn static_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let result = responder::respond(&state.config.static_files, &state.cache, &path).await;
    complete(&state, &method, "static", start, result).await
}

/// Proxy responder entry point.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();

    let result = proxy::respond(&state.config, &state.client, request).await;
    complete(&state, &method, "proxy", start, result).await
}

/// Turn a responder result into the terminal response and record it.
async fn complete(
    state: &AppState,
    method: &str,
    route: &str,
    start: Instant,
    result: Result<Response, HandlerError>,
) -> Response {
    let response = match result {
        Ok(response) => response,
        Err(e) => error::render(&state.config, &state.cache, e).await,
    };
    metrics::record_request(method, response.status().as_u16(), route, start);
    response
}
