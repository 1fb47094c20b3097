//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)          CLI flags
//!     → loader.rs (parse)         │
//!     → ServerConfig ←────────────┘ (flags override file values)
//!     → validation.rs (semantic checks, every problem reported)
//!     → HttpServer::new (immutable for the server's lifetime)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the server is built
//! - All fields have defaults so an empty file is a valid config
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CachePolicy, ListenerConfig, ObservabilityConfig, RobotsPolicy, ServerConfig, TimeoutConfig,
    TlsConfig,
};
pub use validation::{validate_config, ValidationError};
