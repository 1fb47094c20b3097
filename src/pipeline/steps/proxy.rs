//! Handoff to the upstream proxy.

use async_trait::async_trait;
use axum::http::StatusCode;

use crate::observability::logging::{ErrorReport, LogFn, LogRecord};
use crate::observability::metrics;
use crate::pipeline::{Exchange, Flow, Step, StepError};
use crate::proxy::ProxyClient;

/// Forwards whatever the asset server could not answer.
///
/// Upstream failures are reported to the log hook together with the status
/// the exchange held at that moment; the exchange is then marked `502` and
/// the pipeline continues.
pub struct Proxy {
    client: ProxyClient,
    log_fn: Option<LogFn>,
}

impl Proxy {
    pub fn new(client: ProxyClient, log_fn: Option<LogFn>) -> Self {
        Self { client, log_fn }
    }
}

#[async_trait]
impl Step for Proxy {
    fn name(&self) -> &'static str {
        "proxy"
    }

    async fn handle(&self, exchange: &mut Exchange) -> Result<Flow, StepError> {
        let request = exchange.take_forward_request();
        match self.client.forward(request).await {
            Ok(response) => Ok(Flow::Respond(response)),
            Err(e) => {
                metrics::record_proxy_error();
                tracing::warn!(
                    target_url = %self.client.target(),
                    path = %exchange.path(),
                    error = %e,
                    "Proxy request failed"
                );
                if let Some(log_fn) = &self.log_fn {
                    let report = ErrorReport::new(e.to_string(), Some(exchange.pending_status()));
                    log_fn(&LogRecord::new(exchange.request()).with_error(&report));
                }
                exchange.set_pending_status(StatusCode::BAD_GATEWAY);
                Ok(Flow::Continue)
            }
        }
    }
}
