//! Command-line interface.
//!
//! Flags override values from the config file, which override the
//! built-in defaults. The flag set mirrors the fields a deployment
//! actually varies per machine; everything else stays in the file.

use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::{ServerConfig, TlsConfig};
use crate::config::validation::validate_config;

/// Static file server with a pass-through web proxy.
#[derive(Parser, Debug, Default)]
#[command(name = "edge-proxy", version)]
pub struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to listen on for the webserver.
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on for the webserver.
    #[arg(long)]
    pub port: Option<u16>,

    /// Path to the static files the webserver should serve.
    #[arg(long)]
    pub public_dir: Option<String>,

    /// Do not cache heavily used static files in memory.
    #[arg(long)]
    pub no_cache_static: bool,

    /// Pass upstream CORS headers through instead of stripping them.
    #[arg(long)]
    pub no_strip_cors: bool,

    /// External URL for formatting proxied content to link back through
    /// the proxy.
    #[arg(long)]
    pub external_url: Option<String>,

    /// Serve with TLS (https). Certificate is cert.pem and key is
    /// key.pem, both read from the working directory.
    #[arg(long)]
    pub tls: bool,
}

impl Cli {
    /// Resolve the final configuration: file (or defaults) plus flag
    /// overrides, re-validated after merging.
    pub fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ServerConfig::default(),
        };

        if let Some(host) = self.host {
            config.listener.host = host;
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(public_dir) = self.public_dir {
            config.static_files.public_dir = public_dir;
        }
        if self.no_cache_static {
            config.static_files.cache_static = false;
        }
        if self.no_strip_cors {
            config.proxy.strip_cors = false;
        }
        if let Some(external_url) = self.external_url {
            config.proxy.external_url = external_url;
        }
        if self.tls && config.listener.tls.is_none() {
            config.listener.tls = Some(TlsConfig::default());
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}
