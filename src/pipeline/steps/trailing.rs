//! Trailing-slash normalization.

use async_trait::async_trait;

use crate::http::path::is_extensionless;
use crate::pipeline::{Exchange, Flow, Step, StepError};

/// Appends `/` to extensionless paths so they resolve as directories.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrailingSlash;

#[async_trait]
impl Step for TrailingSlash {
    fn name(&self) -> &'static str {
        "trailing_slash"
    }

    async fn handle(&self, exchange: &mut Exchange) -> Result<Flow, StepError> {
        let path = exchange.path();
        if is_extensionless(path) && !path.ends_with('/') {
            let rewritten = format!("{path}/");
            exchange.set_path(&rewritten)?;
        }
        Ok(Flow::Continue)
    }
}
