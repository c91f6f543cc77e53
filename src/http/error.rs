//! Structured handler errors and the response adapter.
//!
//! Responders never write a failure response themselves. They either
//! fully succeed (returning a complete `Response`) or return a
//! `HandlerError` carrying a status code, a human message (`Display`)
//! and the underlying cause. [`render`] is the single place that turns
//! an error into bytes on the wire, so exactly one terminal response is
//! produced per request.

use std::path::Path;

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::Response;
use thiserror::Error;

use crate::config::ServerConfig;
use crate::static_files::StaticCache;

/// Error returned by a request responder instead of a response.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Static resource missing, unreadable, or outside the public dir.
    #[error("file not found")]
    NotFound(#[source] std::io::Error),

    /// Upstream unreachable, or did not answer within the timeout.
    #[error("upstream fetch failed")]
    UpstreamFetch(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Upstream answered with a non-success status, propagated verbatim.
    #[error("upstream returned an error status")]
    UpstreamStatus(StatusCode),

    /// The proxy target was missing or could not be parsed.
    #[error("invalid proxy target")]
    BadTarget(String),

    /// Failure that has no user-meaningful interpretation.
    #[error("internal server error")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    /// HTTP status code this error renders with.
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::NotFound(_) => StatusCode::NOT_FOUND,
            HandlerError::UpstreamFetch(_) => StatusCode::BAD_GATEWAY,
            HandlerError::UpstreamStatus(status) => *status,
            HandlerError::BadTarget(_) => StatusCode::BAD_REQUEST,
            HandlerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text form of the underlying cause, for the diagnostic log line
    /// and the generic error body.
    pub fn cause(&self) -> String {
        match self {
            HandlerError::NotFound(e) => e.to_string(),
            HandlerError::UpstreamFetch(e) => e.to_string(),
            HandlerError::UpstreamStatus(status) => status.to_string(),
            HandlerError::BadTarget(reason) => reason.clone(),
            HandlerError::Internal(e) => e.to_string(),
        }
    }
}

/// Render a handler error as the terminal HTTP response.
///
/// 404s get a best-effort friendly page: the cached "404" entry if
/// present, else `404.html` read from the public directory, else the
/// generic text body. Every other status gets the generic text body.
pub async fn render(config: &ServerConfig, cache: &StaticCache, error: HandlerError) -> Response {
    let status = error.status();
    tracing::warn!(
        status = %status,
        message = %error,
        cause = %error.cause(),
        "Request failed"
    );

    if status == StatusCode::NOT_FOUND {
        if config.static_files.cache_static {
            if let Some(page) = cache.not_found() {
                return html_response(status, Body::from(page));
            }
        }
        let path = Path::new(&config.static_files.public_dir).join("404.html");
        if let Ok(bytes) = tokio::fs::read(&path).await {
            return html_response(status, Body::from(bytes));
        }
    }

    generic_response(status, &error)
}

/// Plain-text `"<message>\n<cause>"` body with the error's status.
fn generic_response(status: StatusCode, error: &HandlerError) -> Response {
    let body = format!("{}\n{}", error, error.cause());
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from(body))
        .unwrap()
}

fn html_response(status: StatusCode, body: Body) -> Response {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .body(body)
        .unwrap()
}
