//! Request pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! Request<Body>
//!     → Exchange (request + accumulated response headers)
//!     → orchestrator.rs walks the steps in configured order:
//!         logger → trailing slash → negotiation → auth → cors
//!         → robots → compression vary → static assets → proxy
//!     → first step returning Flow::Respond ends the run
//!     → accumulated headers merged onto that response
//! ```
//!
//! # State Machine
//! ```text
//! Running(step i) --Continue--> Running(step i+1)
//! Running(step i) --Respond---> Terminated
//! Running(step i) --Err-------> Faulted (500, reported to the log hook)
//! Running(last)   --Continue--> Exhausted (pending status, 404 or 502)
//! ```
//!
//! # Design Decisions
//! - Steps are explicit objects; control flow is a single loop, no callbacks
//! - The step list is fixed at construction and never re-entered
//! - A fault ends only the request it happened in

pub mod exchange;
pub mod orchestrator;
pub mod steps;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Response;

use crate::assets::AssetError;

pub use exchange::{append_vary, Exchange};
pub use orchestrator::{Outcome, Pipeline, PipelineBuilder};

/// What a step decided.
#[derive(Debug)]
pub enum Flow {
    /// Hand the exchange to the next step.
    Continue,
    /// End the run with this response.
    Respond(Response<Body>),
}

/// A pipeline step failed unexpectedly.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("asset server error: {0}")]
    Asset(#[from] AssetError),

    #[error("invalid request path: {0}")]
    InvalidPath(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// One unit of request handling.
#[async_trait]
pub trait Step: Send + Sync {
    /// Short name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Inspect or mutate the exchange, then continue or respond.
    async fn handle(&self, exchange: &mut Exchange) -> Result<Flow, StepError>;
}
