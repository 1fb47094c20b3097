//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pipeline steps produce:
//!     → logging.rs (log hook invoked per request, per upstream error, per fault)
//!     → metrics.rs (counters, histograms)
//!     → tracing events with request IDs (tower-http layers)
//!
//! Consumers:
//!     → stdout via tracing-subscriber
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - The log hook is a plain closure so embedders can route it anywhere
//! - Metrics go through the `metrics` facade; recording without an
//!   installed exporter is a no-op

pub mod logging;
pub mod metrics;
