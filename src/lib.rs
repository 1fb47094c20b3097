//! Embeddable static file server.
//!
//! Requests run through an ordered pipeline of steps. Each step either
//! continues or produces the final response:
//!
//! ```text
//! logger → trailing slash → content negotiation → basic auth → CORS
//!        → robots.txt → compression Vary → static assets → proxy
//! ```
//!
//! Steps that are switched off in [`ServerConfig`] are left out of the
//! pipeline. If every step continues, the response is the status recorded on
//! the exchange (404 unless the proxy failed).

// Core subsystems
pub mod assets;
pub mod config;
pub mod http;
pub mod net;
pub mod pipeline;
pub mod proxy;

// Content negotiation
pub mod mime;
pub mod negotiation;

// Cross-cutting concerns
pub mod cli;
pub mod error;
pub mod lifecycle;
pub mod observability;

pub use config::ServerConfig;
pub use error::ServerError;
pub use http::{HttpServer, HttpServerBuilder, RunningServer};
pub use lifecycle::Shutdown;
