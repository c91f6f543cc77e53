//! Static file responder.
//!
//! # Responsibilities
//! - Map "/" to the logical index resource
//! - Serve cached bytes for cache hits (no disk I/O)
//! - Read everything else from the public directory
//! - Reject paths that escape the public directory
//!
//! # Design Decisions
//! - Traversal attempts are indistinguishable from missing files (404)
//!   since this responder sits on an untrusted network boundary
//! - Content type is inferred from the file extension

use std::io;
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::Response;
use bytes::Bytes;

use crate::config::StaticFilesConfig;
use crate::http::error::HandlerError;
use crate::static_files::cache::{StaticCache, INDEX_FILE};

/// Serve the file the request path resolves to, or return the error the
/// adapter renders.
pub async fn respond(
    config: &StaticFilesConfig,
    cache: &StaticCache,
    path: &str,
) -> Result<Response, HandlerError> {
    if path == "/" {
        if config.cache_static {
            if let Some(bytes) = cache.index() {
                tracing::debug!("Serving cached index");
                return Ok(file_response(bytes, "text/html; charset=utf-8"));
            }
        }
        return read_from_disk(config, Path::new(INDEX_FILE)).await;
    }

    let relative = sanitize(path).ok_or_else(|| {
        HandlerError::NotFound(io::Error::new(
            io::ErrorKind::NotFound,
            "path escapes the public directory",
        ))
    })?;

    read_from_disk(config, &relative).await
}

/// Resolve a request path to a path relative to the public directory.
///
/// Returns `None` for anything that could step outside it: parent
/// references, backslashes, or an empty result.
fn sanitize(path: &str) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            s if s.contains('\\') => return None,
            s => clean.push(s),
        }
    }
    if clean.as_os_str().is_empty() {
        None
    } else {
        Some(clean)
    }
}

async fn read_from_disk(
    config: &StaticFilesConfig,
    relative: &Path,
) -> Result<Response, HandlerError> {
    let full = Path::new(&config.public_dir).join(relative);
    let bytes = tokio::fs::read(&full)
        .await
        .map_err(HandlerError::NotFound)?;

    let mime = mime_guess::from_path(&full).first_or_octet_stream();
    tracing::debug!(path = %full.display(), content_type = %mime, "Serving file from disk");
    Ok(file_response(Bytes::from(bytes), mime.as_ref()))
}

fn file_response(bytes: Bytes, content_type: &str) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(bytes))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_accepts_normal_paths() {
        assert_eq!(sanitize("/app.css"), Some(PathBuf::from("app.css")));
        assert_eq!(
            sanitize("/assets/js/app.js"),
            Some(PathBuf::from("assets/js/app.js"))
        );
        // Repeated and trailing slashes collapse.
        assert_eq!(sanitize("//a///b/"), Some(PathBuf::from("a/b")));
    }

    #[test]
    fn sanitize_rejects_traversal() {
        assert_eq!(sanitize("/../secret.txt"), None);
        assert_eq!(sanitize("/a/../../b"), None);
        assert_eq!(sanitize("/a/..%5c"), Some(PathBuf::from("a/..%5c")));
        assert_eq!(sanitize("/a\\b"), None);
        assert_eq!(sanitize("/"), None);
    }

    #[tokio::test]
    async fn serves_cached_index_without_disk() {
        let config = StaticFilesConfig {
            public_dir: "/nonexistent".into(),
            cache_static: true,
        };
        let cache = StaticCache::from_parts(Some(b"cached index".to_vec()), None);

        let response = respond(&config, &cache, "/").await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"cached index");
    }

    #[tokio::test]
    async fn cache_not_consulted_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), b"disk index").unwrap();
        let config = StaticFilesConfig {
            public_dir: dir.path().to_str().unwrap().into(),
            cache_static: false,
        };
        // Populated cache must be ignored.
        let cache = StaticCache::from_parts(Some(b"cached index".to_vec()), None);

        let response = respond(&config, &cache, "/").await.unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"disk index");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let config = StaticFilesConfig {
            public_dir: dir.path().to_str().unwrap().into(),
            cache_static: true,
        };
        let error = respond(&config, &StaticCache::empty(), "/nope.txt")
            .await
            .unwrap_err();
        assert_eq!(error.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn content_type_follows_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("style.css"), b"body{}").unwrap();
        let config = StaticFilesConfig {
            public_dir: dir.path().to_str().unwrap().into(),
            cache_static: false,
        };

        let response = respond(&config, &StaticCache::empty(), "/style.css")
            .await
            .unwrap();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert_eq!(content_type, "text/css");
    }
}
