//! Static asset server.
//!
//! # Data Flow
//! ```text
//! GET /docs/test.ttl
//!     → file_server.rs (decode path, dotfile policy, stat under root)
//!         directory → redirect / index.html / listing.rs
//!         missing   → retry with default extension
//!         file      → precompressed variant? → conditional (304)?
//!                   → range.rs (206 / 416) → body
//! ```
//!
//! # Design Decisions
//! - Not found is an outcome, not an error; the caller decides whether it
//!   ends the request or falls through to a proxy
//! - Only I/O failures other than "missing" surface as errors
//! - Encoded variants are always served whole
//! - The server reads only the request head, so its futures stay `Send`
//!   while a caller keeps the body

pub mod file_server;
pub mod listing;
pub mod range;

use std::path::PathBuf;

use axum::body::Body;
use axum::http::{Request, Response};

pub use file_server::{FileServer, FileServerConfig};

/// Body-less copy of `request` for [`FileServer::serve`].
///
/// `Body` is not `Sync`, so a borrowed `Request<Body>` cannot live across an
/// await in a `Send` future.
pub fn request_head<B>(request: &Request<B>) -> Request<()> {
    let mut head = Request::new(());
    *head.method_mut() = request.method().clone();
    *head.uri_mut() = request.uri().clone();
    *head.version_mut() = request.version();
    *head.headers_mut() = request.headers().clone();
    head
}

/// Result of asking the asset server for a request.
#[derive(Debug)]
pub enum AssetOutcome {
    /// A complete response (file, listing, redirect, 304, 206 or 416).
    Served(Response<Body>),
    /// Nothing to serve at this path.
    NotFound,
    /// Only `GET` and `HEAD` are served.
    MethodNotAllowed,
}

/// Unexpected failure while serving an asset.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build response: {0}")]
    Http(#[from] axum::http::Error),
}

impl AssetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AssetError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Method, Version};

    #[test]
    fn test_request_head_keeps_everything_but_the_body() {
        let request = Request::builder()
            .method(Method::HEAD)
            .uri("/docs/test.ttl?x=1")
            .version(Version::HTTP_10)
            .header(header::RANGE, "bytes=0-4")
            .body(Body::from("ignored"))
            .unwrap();

        let head = request_head(&request);
        assert_eq!(head.method(), Method::HEAD);
        assert_eq!(head.uri(), "/docs/test.ttl?x=1");
        assert_eq!(head.version(), Version::HTTP_10);
        assert_eq!(head.headers().get(header::RANGE).unwrap(), "bytes=0-4");
    }
}
