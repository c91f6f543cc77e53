//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Check the proxy prefix and external URL are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use url::Url;

use crate::config::schema::ServerConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g. "proxy.path_prefix").
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.host.is_empty() {
        errors.push(ValidationError {
            field: "listener.host".into(),
            message: "must not be empty".into(),
        });
    }
    if config.listener.port == 0 {
        errors.push(ValidationError {
            field: "listener.port".into(),
            message: "must be non-zero".into(),
        });
    }

    if config.static_files.public_dir.is_empty() {
        errors.push(ValidationError {
            field: "static_files.public_dir".into(),
            message: "must not be empty".into(),
        });
    }

    if !config.proxy.path_prefix.starts_with('/') || config.proxy.path_prefix.len() < 2 {
        errors.push(ValidationError {
            field: "proxy.path_prefix".into(),
            message: "must start with '/' and name at least one segment".into(),
        });
    }
    if config.proxy.path_prefix.ends_with('/') {
        errors.push(ValidationError {
            field: "proxy.path_prefix".into(),
            message: "must not end with '/'".into(),
        });
    }

    if !config.proxy.external_url.is_empty() {
        // Accept both "host:port" and full URL forms.
        let candidate = if config.proxy.external_url.contains("://") {
            config.proxy.external_url.clone()
        } else {
            format!("http://{}", config.proxy.external_url)
        };
        if Url::parse(&candidate).is_err() {
            errors.push(ValidationError {
                field: "proxy.external_url".into(),
                message: "is not a valid URL or host:port pair".into(),
            });
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError {
            field: "timeouts.request_secs".into(),
            message: "must be greater than zero".into(),
        });
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError {
            field: "timeouts.upstream_secs".into(),
            message: "must be greater than zero".into(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
