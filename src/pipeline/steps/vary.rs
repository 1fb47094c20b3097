//! `Vary: Accept-Encoding` for compressed responses.

use async_trait::async_trait;

use crate::pipeline::{append_vary, Exchange, Flow, Step, StepError};

/// Marks responses as varying on `Accept-Encoding`.
///
/// Only installed when gzip or brotli variants may be served.
#[derive(Debug, Default, Clone, Copy)]
pub struct CompressionVary;

#[async_trait]
impl Step for CompressionVary {
    fn name(&self) -> &'static str {
        "compression_vary"
    }

    async fn handle(&self, exchange: &mut Exchange) -> Result<Flow, StepError> {
        append_vary(exchange.response_headers_mut(), "Accept-Encoding");
        Ok(Flow::Continue)
    }
}
