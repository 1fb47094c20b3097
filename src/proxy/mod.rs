//! Upstream proxy fallback.
//!
//! # Data Flow
//! ```text
//! Request (not served from disk)
//!     → client.rs rewrites the URI onto the target origin
//!     → Host set to the target, hop-by-hop headers dropped
//!     → pooled hyper client (rustls for https) → upstream response streamed back
//! ```
//!
//! # Design Decisions
//! - `http://` and `https://` targets; the target's scheme is kept upstream
//! - No retries; a failed forward is reported and the pipeline decides the status

pub mod client;

pub use client::ProxyClient;

/// Failures while forwarding to the upstream.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("invalid proxy target {target}: {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("unsupported proxy scheme {0}, use http or https")]
    UnsupportedScheme(String),

    #[error("failed to build upstream request: {0}")]
    Request(#[from] axum::http::Error),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
}
