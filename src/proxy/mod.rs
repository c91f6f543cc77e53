//! Pass-through proxy subsystem.
//!
//! # Data Flow
//! ```text
//! GET|POST {prefix}/<target> or {prefix}?url=<target>
//!     → resolve_target (query parameter wins, else path remainder)
//!     → bounded upstream fetch (hyper client, single attempt)
//!     → rewrite.rs (HTML/CSS link rewriting, same-origin only)
//!     → header relay (hop-by-hop dropped, CORS optionally stripped)
//!     → response to client
//! ```
//!
//! # Design Decisions
//! - No retries: a single upstream failure surfaces immediately as 502
//! - Non-success upstream statuses propagate verbatim
//! - Upstream bodies are buffered so rewriting sees the whole document

pub mod rewrite;

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderName, Request, Response};
use bytes::Bytes;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use url::Url;

use crate::config::ServerConfig;
use crate::http::error::HandlerError;

/// Outbound HTTP client shared by all proxied requests.
pub type ProxyClient = Client<HttpConnector, Body>;

/// Build the shared outbound client.
pub fn build_client() -> ProxyClient {
    Client::builder(TokioExecutor::new()).build(HttpConnector::new())
}

/// Connection-scoped headers that are never relayed to the client.
/// Content-Length is recomputed from the (possibly rewritten) body.
const DROPPED_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-length",
];

/// Forward the request to its resolved upstream target and relay the
/// response, rewriting link references in HTML/CSS bodies.
pub async fn respond(
    config: &ServerConfig,
    client: &ProxyClient,
    request: Request<Body>,
) -> Result<Response<Body>, HandlerError> {
    let target = resolve_target(
        &config.proxy.path_prefix,
        request.uri().path(),
        request.uri().query(),
    )?;
    tracing::debug!(target = %target, method = %request.method(), "Proxying to upstream");

    let (parts, body) = request.into_parts();
    let outbound = Request::builder()
        .method(parts.method)
        .uri(target.as_str())
        .body(body)
        .map_err(|e| HandlerError::Internal(Box::new(e)))?;

    let timeout = Duration::from_secs(config.timeouts.upstream_secs);
    let (upstream, bytes) = match tokio::time::timeout(timeout, fetch(client, outbound)).await {
        Ok(result) => result?,
        Err(elapsed) => return Err(HandlerError::UpstreamFetch(Box::new(elapsed))),
    };

    let content_type = upstream
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let body = if rewrite::is_rewritable(content_type) {
        match std::str::from_utf8(&bytes) {
            Ok(text) => Bytes::from(rewrite::rewrite_links(
                text,
                &target,
                &config.external_url(),
                &config.proxy.path_prefix,
            )),
            // Declared rewritable but not valid UTF-8; relay untouched.
            Err(_) => bytes,
        }
    } else {
        bytes
    };

    let mut response = Response::builder().status(upstream.status);
    if let Some(headers) = response.headers_mut() {
        for (name, value) in upstream.headers.iter() {
            if should_relay(name, config.proxy.strip_cors) {
                headers.append(name.clone(), value.clone());
            }
        }
    }
    response
        .body(Body::from(body))
        .map_err(|e| HandlerError::Internal(Box::new(e)))
}

/// Single-attempt upstream fetch: issue the request, reject non-success
/// statuses, and buffer the response body.
async fn fetch(
    client: &ProxyClient,
    outbound: Request<Body>,
) -> Result<(axum::http::response::Parts, Bytes), HandlerError> {
    let upstream: Response<hyper::body::Incoming> = client
        .request(outbound)
        .await
        .map_err(|e| HandlerError::UpstreamFetch(Box::new(e)))?;

    let status = upstream.status();
    if !status.is_success() {
        return Err(HandlerError::UpstreamStatus(status));
    }

    let (parts, body) = upstream.into_parts();
    let bytes = axum::body::to_bytes(Body::new(body), usize::MAX)
        .await
        .map_err(|e| HandlerError::UpstreamFetch(Box::new(e)))?;
    Ok((parts, bytes))
}

fn should_relay(name: &HeaderName, strip_cors: bool) -> bool {
    let name = name.as_str();
    if DROPPED_HEADERS.contains(&name) {
        return false;
    }
    !(strip_cors && name.starts_with("access-control-"))
}

/// Resolve the upstream target from the request.
///
/// An explicit `url` query parameter is authoritative; otherwise the
/// prefix-stripped path remainder names the target. Schemeless targets
/// default to `http://`.
fn resolve_target(prefix: &str, path: &str, query: Option<&str>) -> Result<Url, HandlerError> {
    if let Some(query) = query {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if key == "url" {
                return parse_target(&value);
            }
        }
    }

    let rest = path
        .strip_prefix(prefix)
        .unwrap_or(path)
        .trim_start_matches('/');
    if rest.is_empty() {
        return Err(HandlerError::BadTarget(
            "no target in path or url parameter".into(),
        ));
    }
    parse_target(rest)
}

fn parse_target(raw: &str) -> Result<Url, HandlerError> {
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };
    let url = Url::parse(&candidate).map_err(|e| HandlerError::BadTarget(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(HandlerError::BadTarget(format!(
            "unsupported scheme {}",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(HandlerError::BadTarget("target has no host".into()));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn path_remainder_becomes_target() {
        let url = resolve_target("/p", "/p/example.com/a/b.html", None).unwrap();
        assert_eq!(url.as_str(), "http://example.com/a/b.html");
    }

    #[test]
    fn host_port_remainder_keeps_port() {
        let url = resolve_target("/p", "/p/127.0.0.1:9000/x", None).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/x");
    }

    #[test]
    fn query_parameter_wins_over_path() {
        let url = resolve_target("/p", "/p/ignored.example", Some("url=example.com/q")).unwrap();
        assert_eq!(url.as_str(), "http://example.com/q");
    }

    #[test]
    fn explicit_scheme_is_preserved() {
        let url = resolve_target("/p", "/p/https://example.com/s", None).unwrap();
        assert_eq!(url.scheme(), "https");
    }

    #[test]
    fn empty_target_is_rejected() {
        let error = resolve_target("/p", "/p", None).unwrap_err();
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        let error = resolve_target("/p", "/p/", None).unwrap_err();
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn garbage_targets_are_rejected() {
        assert!(resolve_target("/p", "/p/:::", None).is_err());
        assert!(resolve_target("/p", "/p/ftp://example.com/f", None).is_err());
    }

    #[test]
    fn cors_headers_dropped_only_when_stripping() {
        let name = HeaderName::from_static("access-control-allow-origin");
        assert!(!should_relay(&name, true));
        assert!(should_relay(&name, false));
    }

    #[test]
    fn hop_by_hop_headers_never_relay() {
        for raw in ["connection", "transfer-encoding", "content-length"] {
            let name = HeaderName::from_static(raw);
            assert!(!should_relay(&name, false));
        }
        assert!(should_relay(&HeaderName::from_static("content-type"), true));
    }
}
