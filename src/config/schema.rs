//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the edge
//! server. All types derive Serde traits for deserialization from config
//! files, and every field has a default so a minimal (or absent) config
//! file still produces a runnable server.

use serde::{Deserialize, Serialize};

/// Root configuration for the edge server.
///
/// Immutable after startup; shared via `Arc` with all request handlers.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Static file serving configuration.
    pub static_files: StaticFilesConfig,

    /// Pass-through proxy configuration.
    pub proxy: ProxyConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ServerConfig {
    /// The `host:port` pair the listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.listener.host, self.listener.port)
    }

    /// External URL used as the base when rewriting proxied content.
    ///
    /// Falls back to the bind address when not configured, matching the
    /// common single-machine deployment.
    pub fn external_url(&self) -> String {
        if self.proxy.external_url.is_empty() {
            self.bind_address()
        } else {
            self.proxy.external_url.clone()
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host to listen on.
    pub host: String,

    /// Port to listen on.
    pub port: u16,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
///
/// The certificate and key default to well-known filenames in the
/// working directory.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            cert_path: "cert.pem".to_string(),
            key_path: "key.pem".to_string(),
        }
    }
}

/// Static file serving configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Directory the static responder serves from.
    pub public_dir: String,

    /// Cache the hottest static files (index, 404 page) in memory at
    /// startup. When false, every static request reads from disk.
    pub cache_static: bool,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            public_dir: "pub".to_string(),
            cache_static: true,
        }
    }
}

/// Pass-through proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Path prefix the proxy responder is registered under.
    pub path_prefix: String,

    /// External URL used when rewriting proxied content so links route
    /// back through this server. Empty means "derive from bind address".
    pub external_url: String,

    /// Strip `Access-Control-*` response headers from proxied content.
    pub strip_cors: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            path_prefix: "/p".to_string(),
            external_url: String::new(),
            strip_cors: true,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Upstream fetch timeout for proxied requests in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            upstream_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_uses_defaults() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.port, 8000);
        assert_eq!(config.static_files.public_dir, "pub");
        assert!(config.static_files.cache_static);
        assert_eq!(config.proxy.path_prefix, "/p");
        assert!(config.proxy.strip_cors);
        assert!(config.listener.tls.is_none());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [listener]
            port = 9000

            [proxy]
            strip_cors = false
            "#,
        )
        .unwrap();
        assert_eq!(config.listener.port, 9000);
        assert_eq!(config.listener.host, "127.0.0.1");
        assert!(!config.proxy.strip_cors);
        assert_eq!(config.timeouts.upstream_secs, 10);
    }

    #[test]
    fn external_url_falls_back_to_bind_address() {
        let config = ServerConfig::default();
        assert_eq!(config.external_url(), "127.0.0.1:8000");

        let mut config = ServerConfig::default();
        config.proxy.external_url = "proxy.example.com".to_string();
        assert_eq!(config.external_url(), "proxy.example.com");
    }

    #[test]
    fn tls_defaults_to_working_directory_pair() {
        let tls = TlsConfig::default();
        assert_eq!(tls.cert_path, "cert.pem");
        assert_eq!(tls.key_path, "key.pem");
    }
}
