//! Cross-origin resource sharing.
//!
//! Every origin is allowed. Preflight requests are answered here and never
//! reach the asset server.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN,
};
use axum::http::{HeaderMap, HeaderValue, Method, Response, StatusCode};

use crate::pipeline::{Exchange, Flow, Step, StepError};

/// Request headers every CORS response allows.
pub const DEFAULT_ALLOW_HEADERS: &[&str] =
    &["Origin", "X-Requested-With", "Content-Type", "Accept", "Range"];

const ALLOW_METHODS: &str = "GET, HEAD, POST";
const MAX_AGE_SECS: &str = "86400";

/// Adds CORS headers and ends preflight requests with `204`.
#[derive(Debug, Clone)]
pub struct Cors {
    allow_headers: HeaderValue,
}

impl Cors {
    /// `extra_headers` is a comma separated list appended to the defaults.
    pub fn new(extra_headers: Option<&str>) -> Result<Self, StepError> {
        let mut headers: Vec<&str> = DEFAULT_ALLOW_HEADERS.to_vec();
        if let Some(extra) = extra_headers {
            headers.extend(extra.split(',').map(str::trim).filter(|h| !h.is_empty()));
        }

        let allow_headers = HeaderValue::from_str(&headers.join(", "))
            .map_err(|e| StepError::Internal(format!("invalid CORS header list: {e}")))?;
        Ok(Self { allow_headers })
    }

    /// Headers attached to every response when CORS is on.
    pub fn simple_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
        headers
    }

    fn is_preflight(exchange: &Exchange) -> bool {
        let request = exchange.request();
        request.method() == Method::OPTIONS
            && request.headers().contains_key(ORIGIN)
            && request.headers().contains_key(ACCESS_CONTROL_REQUEST_METHOD)
    }

    fn preflight_response(&self) -> Result<Response<Body>, StepError> {
        let mut response = Response::builder()
            .status(StatusCode::NO_CONTENT)
            .header(ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS)
            .header(ACCESS_CONTROL_MAX_AGE, MAX_AGE_SECS)
            .body(Body::empty())
            .map_err(|e| StepError::Internal(e.to_string()))?;
        response.headers_mut().extend(self.simple_headers());
        Ok(response)
    }
}

#[async_trait]
impl Step for Cors {
    fn name(&self) -> &'static str {
        "cors"
    }

    async fn handle(&self, exchange: &mut Exchange) -> Result<Flow, StepError> {
        if Self::is_preflight(exchange) {
            tracing::debug!(path = %exchange.path(), "Answering CORS preflight");
            return Ok(Flow::Respond(self.preflight_response()?));
        }

        exchange.response_headers_mut().extend(self.simple_headers());
        Ok(Flow::Continue)
    }
}
