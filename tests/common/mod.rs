//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use edge_proxy::config::ServerConfig;
use edge_proxy::http::HttpServer;
use edge_proxy::lifecycle::Shutdown;
use edge_proxy::static_files::StaticCache;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Start the edge server on an ephemeral loopback port. Returns its
/// address and the shutdown coordinator that stops it.
pub async fn spawn_server(mut config: ServerConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.host = addr.ip().to_string();
    config.listener.port = addr.port();

    let cache = if config.static_files.cache_static {
        StaticCache::build(Path::new(&config.static_files.public_dir)).await
    } else {
        StaticCache::empty()
    };

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let server = HttpServer::new(Arc::new(config), Arc::new(cache));
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

/// Bind a mock upstream on an ephemeral port without serving yet, so
/// tests can embed the address in the response they hand to
/// [`serve_upstream`].
#[allow(dead_code)]
pub async fn bind_upstream() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Serve a fixed raw response to every connection, counting them.
#[allow(dead_code)]
pub fn serve_upstream(listener: TcpListener, response: Vec<u8>) -> Arc<AtomicU32> {
    serve_upstream_with_delay(listener, response, Duration::ZERO)
}

/// Like [`serve_upstream`], but wait before answering to simulate a
/// slow upstream.
#[allow(dead_code)]
pub fn serve_upstream_with_delay(
    listener: TcpListener,
    response: Vec<u8>,
    delay: Duration,
) -> Arc<AtomicU32> {
    let connections = Arc::new(AtomicU32::new(0));
    let count = connections.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    count.fetch_add(1, Ordering::SeqCst);
                    let response = response.clone();
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        let _ = socket.write_all(&response).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });
    connections
}

/// Upstream that accepts and immediately drops every connection, so
/// each fetch attempt is observable but never succeeds.
#[allow(dead_code)]
pub fn serve_dead_upstream(listener: TcpListener) -> Arc<AtomicU32> {
    let connections = Arc::new(AtomicU32::new(0));
    let count = connections.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    count.fetch_add(1, Ordering::SeqCst);
                    drop(socket);
                }
                Err(_) => break,
            }
        }
    });
    connections
}

/// Assemble a raw HTTP/1.1 response.
#[allow(dead_code)]
pub fn http_response(status: &str, headers: &[(&str, &str)], body: &[u8]) -> Vec<u8> {
    let mut response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        body.len()
    );
    for (name, value) in headers {
        response.push_str(&format!("{}: {}\r\n", name, value));
    }
    response.push_str("\r\n");
    let mut bytes = response.into_bytes();
    bytes.extend_from_slice(body);
    bytes
}

/// Send a raw HTTP/1.1 request, bypassing client-side path
/// normalization, and return the full response text.
#[allow(dead_code)]
pub async fn raw_request(addr: SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8_lossy(&response).into_owned()
}
