//! Built-in pipeline steps.
//!
//! # Responsibilities
//! - One step per concern, each independently testable against an [`Exchange`]
//! - Steps only see the exchange; shared collaborators are injected at construction
//!
//! # Design Decisions
//! - Steps that only decorate (logger, vary, negotiation) always continue
//! - Terminal handoffs (assets, proxy) live at the end of the sequence
//!
//! [`Exchange`]: crate::pipeline::Exchange

pub mod assets;
pub mod auth;
pub mod conneg;
pub mod cors;
pub mod logging;
pub mod proxy;
pub mod robots;
pub mod trailing;
pub mod vary;

pub use assets::StaticAssets;
pub use auth::BasicAuth;
pub use conneg::ContentNegotiation;
pub use cors::Cors;
pub use logging::RequestLogger;
pub use proxy::Proxy;
pub use robots::Robots;
pub use trailing::TrailingSlash;
pub use vary::CompressionVary;

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::Body;
    use axum::http::Request;

    use crate::pipeline::Exchange;

    pub fn exchange(uri: &str) -> Exchange {
        Exchange::new(Request::builder().uri(uri).body(Body::empty()).unwrap())
    }

    pub fn exchange_with(request: Request<Body>) -> Exchange {
        Exchange::new(request)
    }

    pub async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }
}
