//! TLS certificate loading for the listener.
//!
//! The certificate and key default to the well-known `cert.pem` and
//! `key.pem` filenames in the working directory; both paths are
//! configurable. Loading happens once at startup, before the listener
//! binds.

use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;

/// Load the listener's TLS configuration from a PEM certificate and
/// key file pair.
pub async fn load_tls_config(
    cert_path: &Path,
    key_path: &Path,
) -> Result<RustlsConfig, std::io::Error> {
    if !cert_path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("certificate file not found: {}", cert_path.display()),
        ));
    }
    if !key_path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("private key file not found: {}", key_path.display()),
        ));
    }

    RustlsConfig::from_pem_file(cert_path, key_path).await
}
