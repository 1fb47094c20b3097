//! Structured logging and the per-request log hook.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Define the log hook invoked for every request and every error
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Log level configurable via config and `RUST_LOG`
//! - Errors reach the hook as a report (message + status), never a live error value

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, HeaderMap, Method, Request, StatusCode, Uri};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Hook invoked once per request and once per reported error.
pub type LogFn = Arc<dyn Fn(&LogRecord<'_>) + Send + Sync>;

/// A failure surfaced to the log hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub message: String,
    /// Response status at the time of the failure, when one applies.
    pub status: Option<StatusCode>,
}

impl ErrorReport {
    pub fn new(message: impl Into<String>, status: Option<StatusCode>) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }
}

/// View of a request handed to the log hook.
#[derive(Debug, Clone, Copy)]
pub struct LogRecord<'a> {
    pub method: &'a Method,
    pub uri: &'a Uri,
    pub headers: &'a HeaderMap,
    pub remote_addr: Option<SocketAddr>,
    pub error: Option<&'a ErrorReport>,
}

impl<'a> LogRecord<'a> {
    pub fn new(request: &'a Request<Body>) -> Self {
        Self {
            method: request.method(),
            uri: request.uri(),
            headers: request.headers(),
            remote_addr: request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr),
            error: None,
        }
    }

    pub fn with_error(mut self, error: &'a ErrorReport) -> Self {
        self.error = Some(error);
        self
    }

    pub fn user_agent(&self) -> &'a str {
        self.headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }
}

/// Default hook: requests at `debug`, errors at `warn`.
pub fn tracing_log_fn() -> LogFn {
    Arc::new(|record: &LogRecord<'_>| match record.error {
        Some(error) => tracing::warn!(
            method = %record.method,
            uri = %record.uri,
            status = ?error.status.map(|s| s.as_u16()),
            error = %error.message,
            "Request error"
        ),
        None => tracing::debug!(
            method = %record.method,
            uri = %record.uri,
            "Request"
        ),
    })
}

/// Access-log hook: one `info` line per request including the user agent.
pub fn access_log_fn() -> LogFn {
    Arc::new(|record: &LogRecord<'_>| match record.error {
        Some(error) => tracing::error!(
            method = %record.method,
            uri = %record.uri,
            status = ?error.status.map(|s| s.as_u16()),
            error = %error.message,
            "Error serving request"
        ),
        None => tracing::info!(
            client = ?record.remote_addr,
            method = %record.method,
            uri = %record.uri,
            user_agent = %record.user_agent(),
            "Request"
        ),
    })
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins over `level` when set.
pub fn init_tracing(level: &str) {
    let default_filter = format!("static_http_server={level},tower_http={level}");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
