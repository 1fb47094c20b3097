//! Content negotiation over on-disk representations.
//!
//! # Data Flow
//! ```text
//! /test  + Accept: text/turtle
//!     → Vary: Accept
//!     → cache.resolve("/test") = {application/n-triples: nt, text/turtle: ttl}
//!     → negotiator.select(..) = text/turtle
//!     → path rewritten to /test.ttl
//!
//! /dir/  → /dir/index → same as above
//! ```
//!
//! # Design Decisions
//! - Never terminates; an unsatisfiable request falls through to the asset
//!   server which reports not found
//! - The index name stays appended even when no type is selected

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::header;

use crate::http::path::{encode_segment, is_extensionless};
use crate::negotiation::{ContentNegotiator, RepresentationCache};
use crate::pipeline::{append_vary, Exchange, Flow, Step, StepError};

/// Rewrites extensionless paths to the best available representation.
pub struct ContentNegotiation {
    cache: Arc<dyn RepresentationCache>,
    negotiator: Arc<dyn ContentNegotiator>,
    index_file: String,
}

impl ContentNegotiation {
    pub fn new(
        cache: Arc<dyn RepresentationCache>,
        negotiator: Arc<dyn ContentNegotiator>,
        index_file: impl Into<String>,
    ) -> Self {
        Self {
            cache,
            negotiator,
            index_file: index_file.into(),
        }
    }

    fn applies_to(path: &str) -> bool {
        path.ends_with('/') || is_extensionless(path)
    }
}

#[async_trait]
impl Step for ContentNegotiation {
    fn name(&self) -> &'static str {
        "conneg"
    }

    async fn handle(&self, exchange: &mut Exchange) -> Result<Flow, StepError> {
        if !Self::applies_to(exchange.path()) {
            return Ok(Flow::Continue);
        }

        append_vary(exchange.response_headers_mut(), "Accept");

        let mut path = exchange.path().to_string();
        if path.ends_with('/') {
            path.push_str(&encode_segment(&self.index_file));
            exchange.set_path(&path)?;
        }

        let representations = self.cache.resolve(&path).await;
        let accept = exchange.header_str(&header::ACCEPT);
        let candidates: Vec<&str> = representations.types().collect();

        let selected = self
            .negotiator
            .select(accept.as_deref(), &candidates)
            .or_else(|| {
                if self.negotiator.accepts_any(accept.as_deref()) {
                    representations.first().map(|(mime, _)| mime.to_string())
                } else {
                    None
                }
            });

        let Some(extension) = selected
            .as_deref()
            .and_then(|mime| representations.extension_for(mime))
        else {
            tracing::debug!(
                path = %path,
                accept = ?accept,
                available = candidates.len(),
                "No acceptable representation"
            );
            return Ok(Flow::Continue);
        };

        let rewritten = format!("{path}.{}", encode_segment(extension));
        tracing::debug!(from = %path, to = %rewritten, "Negotiated representation");
        exchange.set_path(&rewritten)?;
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::body::Body;
    use axum::http::{HeaderValue, Request};

    use crate::negotiation::{QualityNegotiator, Representations};
    use crate::pipeline::steps::test_support::exchange_with;

    /// Fixed answers keyed by path; counts lookups.
    struct StubCache {
        entries: Vec<(&'static str, Arc<Representations>)>,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl RepresentationCache for StubCache {
        async fn resolve(&self, request_path: &str) -> Arc<Representations> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.entries
                .iter()
                .find(|(p, _)| *p == request_path)
                .map(|(_, r)| Arc::clone(r))
                .unwrap_or_default()
        }
    }

    fn step() -> (ContentNegotiation, Arc<StubCache>) {
        let test: Representations = [("application/n-triples", "nt"), ("text/turtle", "ttl")]
            .into_iter()
            .collect();
        let index: Representations = [("text/turtle", "ttl"), ("text/html", "html")]
            .into_iter()
            .collect();
        let cache = Arc::new(StubCache {
            entries: vec![("/test", Arc::new(test)), ("/test2/index", Arc::new(index))],
            lookups: AtomicUsize::new(0),
        });
        let step = ContentNegotiation::new(
            Arc::clone(&cache) as Arc<dyn RepresentationCache>,
            Arc::new(QualityNegotiator),
            "index",
        );
        (step, cache)
    }

    async fn negotiate(uri: &str, accept: Option<&str>) -> (String, Option<HeaderValue>) {
        let (step, _) = step();
        let mut builder = Request::builder().uri(uri);
        if let Some(accept) = accept {
            builder = builder.header(header::ACCEPT, accept);
        }
        let mut ex = exchange_with(builder.body(Body::empty()).unwrap());

        let flow = step.handle(&mut ex).await.unwrap();
        assert!(matches!(flow, Flow::Continue));
        (
            ex.path().to_string(),
            ex.response_headers().get(header::VARY).cloned(),
        )
    }

    #[tokio::test]
    async fn test_selects_requested_type() {
        let (path, vary) = negotiate("/test", Some("text/turtle")).await;
        assert_eq!(path, "/test.ttl");
        assert_eq!(vary.unwrap(), "Accept");

        let (path, _) = negotiate("/test", Some("application/n-triples")).await;
        assert_eq!(path, "/test.nt");
    }

    #[tokio::test]
    async fn test_unavailable_type_passes_through() {
        let (path, vary) = negotiate("/test", Some("application/rdf+xml")).await;
        assert_eq!(path, "/test");
        assert_eq!(vary.unwrap(), "Accept");
    }

    #[tokio::test]
    async fn test_missing_accept_takes_first() {
        let (path, _) = negotiate("/test", None).await;
        assert_eq!(path, "/test.nt");
    }

    #[tokio::test]
    async fn test_wildcard_fallback_with_excluded_types() {
        // Every variant is refused explicitly but the client still accepts anything
        let (path, _) = negotiate(
            "/test",
            Some("text/turtle;q=0, application/n-triples;q=0, */*"),
        )
        .await;
        assert_eq!(path, "/test.nt");
    }

    #[tokio::test]
    async fn test_directory_gets_index() {
        let (path, _) = negotiate("/test2/", Some("text/turtle")).await;
        assert_eq!(path, "/test2/index.ttl");

        let (path, _) = negotiate("/missing/", Some("text/turtle")).await;
        assert_eq!(path, "/missing/index");
    }

    #[tokio::test]
    async fn test_paths_with_extension_untouched() {
        let (step, cache) = step();
        let mut ex = exchange_with(
            Request::builder()
                .uri("/test.ttl")
                .body(Body::empty())
                .unwrap(),
        );
        step.handle(&mut ex).await.unwrap();

        assert_eq!(ex.path(), "/test.ttl");
        assert!(ex.response_headers().get(header::VARY).is_none());
        assert_eq!(cache.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_garbage_accept_not_found() {
        let (path, _) = negotiate("/test", Some("garbage")).await;
        assert_eq!(path, "/test");
    }
}
