//! Per-request state carried through the pipeline.

use axum::body::Body;
use axum::http::header::{HeaderName, VARY};
use axum::http::uri::PathAndQuery;
use axum::http::{HeaderMap, HeaderValue, Request, Response, StatusCode, Uri};

use crate::pipeline::StepError;

/// The request being handled plus response state accumulated by earlier steps.
#[derive(Debug)]
pub struct Exchange {
    request: Request<Body>,
    response_headers: HeaderMap,
    pending_status: StatusCode,
}

impl Exchange {
    pub fn new(request: Request<Body>) -> Self {
        Self::with_headers(request, HeaderMap::new())
    }

    /// Start from a set of headers every response should carry.
    pub fn with_headers(request: Request<Body>, response_headers: HeaderMap) -> Self {
        Self {
            request,
            response_headers,
            pending_status: StatusCode::NOT_FOUND,
        }
    }

    pub fn request(&self) -> &Request<Body> {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut Request<Body> {
        &mut self.request
    }

    /// The current (possibly rewritten) request path, still percent-encoded.
    pub fn path(&self) -> &str {
        self.request.uri().path()
    }

    /// Replace the request path, keeping scheme, authority and query.
    pub fn set_path(&mut self, path: &str) -> Result<(), StepError> {
        let uri = self.request.uri();
        let path_and_query = match uri.query() {
            Some(query) => format!("{path}?{query}"),
            None => path.to_string(),
        };

        let mut parts = uri.clone().into_parts();
        parts.path_and_query = Some(
            PathAndQuery::try_from(path_and_query.as_str())
                .map_err(|e| StepError::InvalidPath(format!("{path}: {e}")))?,
        );
        *self.request.uri_mut() =
            Uri::from_parts(parts).map_err(|e| StepError::InvalidPath(format!("{path}: {e}")))?;
        Ok(())
    }

    /// A request header as a string, joining repeated headers with `, `.
    pub fn header_str(&self, name: &HeaderName) -> Option<String> {
        let values: Vec<&str> = self
            .request
            .headers()
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        (!values.is_empty()).then(|| values.join(", "))
    }

    pub fn response_headers(&self) -> &HeaderMap {
        &self.response_headers
    }

    pub fn response_headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.response_headers
    }

    /// Status used if every step continues without responding.
    pub fn pending_status(&self) -> StatusCode {
        self.pending_status
    }

    pub fn set_pending_status(&mut self, status: StatusCode) {
        self.pending_status = status;
    }

    /// Build a request to forward elsewhere, moving the body out of the exchange.
    pub fn take_forward_request(&mut self) -> Request<Body> {
        let body = std::mem::take(self.request.body_mut());
        let mut forwarded = Request::new(body);
        *forwarded.method_mut() = self.request.method().clone();
        *forwarded.uri_mut() = self.request.uri().clone();
        *forwarded.version_mut() = self.request.version();
        *forwarded.headers_mut() = self.request.headers().clone();
        forwarded
    }

    /// Merge the accumulated headers onto a final response.
    ///
    /// `Vary` tokens are combined; any other accumulated header only fills
    /// in when the response does not already set it.
    pub fn finish(&self, mut response: Response<Body>) -> Response<Body> {
        let headers = response.headers_mut();
        for name in self.response_headers.keys() {
            if name == VARY {
                for value in self.response_headers.get_all(VARY) {
                    if let Ok(value) = value.to_str() {
                        for token in value.split(',') {
                            append_vary(headers, token.trim());
                        }
                    }
                }
                continue;
            }
            if headers.contains_key(name) {
                continue;
            }
            for value in self.response_headers.get_all(name) {
                headers.append(name.clone(), value.clone());
            }
        }
        response
    }
}

/// Add `token` to the `Vary` header, folding all values into one and never
/// repeating a token.
pub fn append_vary(headers: &mut HeaderMap, token: &str) {
    if token.is_empty() {
        return;
    }

    let existing: Vec<String> = headers
        .get_all(VARY)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    if existing.iter().any(|t| t == "*" || t.eq_ignore_ascii_case(token)) {
        return;
    }

    let mut tokens = existing;
    tokens.push(token.to_string());
    if let Ok(value) = HeaderValue::from_str(&tokens.join(", ")) {
        headers.insert(VARY, value);
    }
}
