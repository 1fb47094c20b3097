//! Top-level error type for building and running the server.

use std::net::SocketAddr;

use crate::config::ConfigError;
use crate::pipeline::StepError;
use crate::proxy::ProxyError;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid address {0}")]
    InvalidAddress(String),

    #[error("invalid response header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("TLS setup failed: {0}")]
    Tls(#[source] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Proxy(#[from] ProxyError),

    #[error("pipeline setup failed: {0}")]
    Pipeline(#[from] StepError),

    #[error("server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
