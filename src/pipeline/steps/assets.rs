//! Handoff to the static asset server.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;

use crate::assets::{request_head, AssetOutcome, FileServer};
use crate::pipeline::{Exchange, Flow, Step, StepError};

/// Serves the (possibly rewritten) request path from disk.
///
/// With `passthrough` set, misses continue to the next step instead of
/// ending the request; this is how a trailing proxy gets its chance.
pub struct StaticAssets {
    server: Arc<FileServer>,
    passthrough: bool,
}

impl StaticAssets {
    pub fn new(server: Arc<FileServer>, passthrough: bool) -> Self {
        Self {
            server,
            passthrough,
        }
    }
}

#[async_trait]
impl Step for StaticAssets {
    fn name(&self) -> &'static str {
        "static_assets"
    }

    async fn handle(&self, exchange: &mut Exchange) -> Result<Flow, StepError> {
        let head = request_head(exchange.request());
        match self.server.serve(&head).await? {
            AssetOutcome::Served(response) => Ok(Flow::Respond(response)),
            AssetOutcome::NotFound if self.passthrough => Ok(Flow::Continue),
            AssetOutcome::NotFound => Ok(Flow::Respond(
                (StatusCode::NOT_FOUND, "Not Found").into_response(),
            )),
            AssetOutcome::MethodNotAllowed if self.passthrough => Ok(Flow::Continue),
            AssetOutcome::MethodNotAllowed => Ok(Flow::Respond(
                (
                    StatusCode::METHOD_NOT_ALLOWED,
                    [(header::ALLOW, "GET, HEAD")],
                    "Method Not Allowed",
                )
                    .into_response(),
            )),
        }
    }
}
