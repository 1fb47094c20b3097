//! Ordered, short-circuiting step runner.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{HeaderMap, Request, Response, StatusCode};
use axum::response::IntoResponse;

use crate::observability::logging::{ErrorReport, LogFn, LogRecord};
use crate::observability::metrics;
use crate::pipeline::{Exchange, Flow, Step, StepError};

/// How a traversal ended.
#[derive(Debug)]
pub enum Outcome {
    /// A step produced the response.
    Terminated {
        step: &'static str,
        response: Response<Body>,
    },
    /// Every step continued.
    Exhausted,
    /// A step failed; no further steps ran.
    Faulted {
        step: &'static str,
        error: StepError,
    },
}

/// An immutable sequence of steps.
pub struct Pipeline {
    steps: Vec<Arc<dyn Step>>,
    base_headers: HeaderMap,
    log_fn: Option<LogFn>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Step names in execution order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run a request through the pipeline and produce its response.
    pub async fn run(&self, request: Request<Body>) -> Response<Body> {
        let start = Instant::now();
        let method = request.method().to_string();
        let mut exchange = Exchange::with_headers(request, self.base_headers.clone());

        let response = match self.traverse(&mut exchange).await {
            Outcome::Terminated { step, response } => {
                tracing::debug!(
                    step,
                    status = response.status().as_u16(),
                    path = %exchange.path(),
                    "Pipeline terminated"
                );
                exchange.finish(response)
            }
            Outcome::Exhausted => {
                let status = exchange.pending_status();
                tracing::debug!(status = status.as_u16(), path = %exchange.path(), "Pipeline exhausted");
                let body = status.canonical_reason().unwrap_or("");
                exchange.finish((status, body).into_response())
            }
            Outcome::Faulted { step, error } => {
                tracing::error!(step, error = %error, path = %exchange.path(), "Pipeline step failed");
                metrics::record_pipeline_fault(step);
                if let Some(log_fn) = &self.log_fn {
                    let report = ErrorReport::new(error.to_string(), Some(StatusCode::INTERNAL_SERVER_ERROR));
                    log_fn(&LogRecord::new(exchange.request()).with_error(&report));
                }
                exchange.finish(StatusCode::INTERNAL_SERVER_ERROR.into_response())
            }
        };

        metrics::record_request(&method, response.status().as_u16(), start);
        response
    }

    /// Walk the steps in order until one responds, fails, or all continue.
    pub async fn traverse(&self, exchange: &mut Exchange) -> Outcome {
        for step in &self.steps {
            match step.handle(exchange).await {
                Ok(Flow::Continue) => {
                    tracing::trace!(step = step.name(), "Step continued");
                }
                Ok(Flow::Respond(response)) => {
                    return Outcome::Terminated {
                        step: step.name(),
                        response,
                    };
                }
                Err(error) => {
                    return Outcome::Faulted {
                        step: step.name(),
                        error,
                    };
                }
            }
        }
        Outcome::Exhausted
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("steps", &self.step_names())
            .field("base_headers", &self.base_headers)
            .finish()
    }
}

/// Assembles a [`Pipeline`]; steps run in the order they are added.
#[derive(Default)]
pub struct PipelineBuilder {
    steps: Vec<Arc<dyn Step>>,
    base_headers: HeaderMap,
    log_fn: Option<LogFn>,
}

impl PipelineBuilder {
    pub fn step<S: Step + 'static>(mut self, step: S) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    pub fn shared_step(mut self, step: Arc<dyn Step>) -> Self {
        self.steps.push(step);
        self
    }

    /// Headers merged into every response.
    pub fn base_headers(mut self, headers: HeaderMap) -> Self {
        self.base_headers = headers;
        self
    }

    /// Hook that receives pipeline faults.
    pub fn log_fn(mut self, log_fn: LogFn) -> Self {
        self.log_fn = Some(log_fn);
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            steps: self.steps,
            base_headers: self.base_headers,
            log_fn: self.log_fn,
        }
    }
}
