//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → plain: axum::serve on a tokio TcpListener
//!     → TLS:   tls.rs loads PEM material → axum-server rustls acceptor
//!     → Hand off to the HTTP layer (Router → Pipeline)
//! ```
//!
//! # Design Decisions
//! - TLS is optional and handled transparently
//! - Certificates are read once at startup

pub mod tls;
