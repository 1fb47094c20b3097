//! `/robots.txt` responder.

use async_trait::async_trait;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;

use crate::pipeline::{Exchange, Flow, Step, StepError};

/// Disallows every crawler from everything.
pub const DISALLOW_ALL: &str = "User-agent: *\nDisallow: /";

/// Answers `/robots.txt` with a fixed body.
#[derive(Debug, Clone)]
pub struct Robots {
    body: String,
}

impl Robots {
    /// `None` serves [`DISALLOW_ALL`]. Literal `\n` sequences in custom text
    /// become newlines so the text can be given on one command line.
    pub fn new(text: Option<&str>) -> Self {
        let body = match text {
            Some(text) => text.replace("\\n", "\n"),
            None => DISALLOW_ALL.to_string(),
        };
        Self { body }
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

#[async_trait]
impl Step for Robots {
    fn name(&self) -> &'static str {
        "robots"
    }

    async fn handle(&self, exchange: &mut Exchange) -> Result<Flow, StepError> {
        if exchange.path() != "/robots.txt" {
            return Ok(Flow::Continue);
        }
        Ok(Flow::Respond(
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/plain")],
                self.body.clone(),
            )
                .into_response(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::steps::test_support::{body_string, exchange};

    #[tokio::test]
    async fn test_default_body() {
        let robots = Robots::new(None);
        let mut ex = exchange("/robots.txt");
        let Flow::Respond(response) = robots.handle(&mut ex).await.unwrap() else {
            panic!("robots.txt should be answered");
        };
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(body_string(response).await, "User-agent: *\nDisallow: /");
    }

    #[test]
    fn test_custom_text_expands_newlines() {
        let robots = Robots::new(Some("User-agent: bot\\nDisallow: /private\\nAllow: /"));
        assert_eq!(robots.body(), "User-agent: bot\nDisallow: /private\nAllow: /");
    }

    #[tokio::test]
    async fn test_other_paths_continue() {
        let robots = Robots::new(None);
        let mut ex = exchange("/robots.txt.bak");
        assert!(matches!(robots.handle(&mut ex).await.unwrap(), Flow::Continue));
    }
}
