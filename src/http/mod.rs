//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum router: request ID, trace, timeout)
//!     → pipeline (ordered steps, first response wins)
//!     → Send to client
//! ```

pub mod path;
pub mod server;

pub use server::{resolve_root, HttpServer, HttpServerBuilder, RunningServer};
