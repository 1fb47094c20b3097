//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, header names and values, and the proxy target
//! - Validate value ranges (cache seconds, timeouts)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue};
use url::Url;

use crate::config::schema::{CachePolicy, ServerConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single problem with a configuration value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Check every semantic constraint and report all violations.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.trim().is_empty() {
            errors.push(ValidationError::new("listener.tls.cert_path", "must not be empty"));
        }
        if tls.key_path.trim().is_empty() {
            errors.push(ValidationError::new("listener.tls.key_path", "must not be empty"));
        }
    }

    match &config.cache {
        CachePolicy::Seconds(secs) if *secs < -1 => {
            errors.push(ValidationError::new(
                "cache",
                "must be -1 (no caching) or a non-negative number of seconds",
            ));
        }
        CachePolicy::Directive(directive) if HeaderValue::from_str(directive).is_err() => {
            errors.push(ValidationError::new("cache", "not a valid header value"));
        }
        _ => {}
    }

    for (name, value) in &config.headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::new(
                format!("headers.{name}"),
                "not a valid header name",
            ));
        }
        if HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::new(
                format!("headers.{name}"),
                "not a valid header value",
            ));
        }
    }

    if HeaderValue::from_str(&config.content_type).is_err() || !config.content_type.contains('/') {
        errors.push(ValidationError::new("content_type", "must be a media type"));
    }

    if config.index_file.is_empty() || config.index_file.contains('/') {
        errors.push(ValidationError::new(
            "index_file",
            "must be a non-empty file name without '/'",
        ));
    }

    if config.ext.contains('/') || config.ext.starts_with('.') {
        errors.push(ValidationError::new(
            "ext",
            "must be an extension without leading '.' or '/'",
        ));
    }

    if let Some(extra) = &config.cors_headers {
        for name in extra.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if HeaderName::from_bytes(name.as_bytes()).is_err() {
                errors.push(ValidationError::new(
                    "cors_headers",
                    format!("'{name}' is not a valid header name"),
                ));
            }
        }
    }

    if let Some(target) = &config.proxy {
        match Url::parse(target) {
            Ok(url) if !matches!(url.scheme(), "http" | "https") => {
                errors.push(ValidationError::new(
                    "proxy",
                    format!("scheme '{}' is not supported, use http or https", url.scheme()),
                ));
            }
            Ok(url) if url.host_str().is_none() => {
                errors.push(ValidationError::new("proxy", "missing host"));
            }
            Ok(_) => {}
            Err(e) => errors.push(ValidationError::new("proxy", e.to_string())),
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("must be one of {}", LOG_LEVELS.join(", ")),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "not a socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
