//! HTTP Basic authentication gate.
//!
//! # Design Decisions
//! - Username and password are both compared on every request; the results
//!   are combined without short-circuiting
//! - Comparisons run over SHA-256 digests so input length does not leak
//! - Failure is always the same response regardless of what was wrong

use async_trait::async_trait;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};
use subtle::{Choice, ConstantTimeEq};

use crate::pipeline::{Exchange, Flow, Step, StepError};

const CHALLENGE: &str = "Basic realm=\"\"";
const DENIED_BODY: &str = "Access denied";

/// Rejects requests without the configured static credentials.
pub struct BasicAuth {
    username: String,
    password: String,
}

impl BasicAuth {
    /// A missing value is compared against the empty string.
    pub fn new(username: Option<String>, password: Option<String>) -> Self {
        Self {
            username: username.unwrap_or_default(),
            password: password.unwrap_or_default(),
        }
    }

    fn verify(&self, credentials: Option<(String, String)>) -> bool {
        let Some((username, password)) = credentials else {
            return false;
        };
        let username_ok = digest_eq(username.as_bytes(), self.username.as_bytes());
        let password_ok = digest_eq(password.as_bytes(), self.password.as_bytes());
        (username_ok & password_ok).into()
    }
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl Step for BasicAuth {
    fn name(&self) -> &'static str {
        "basic_auth"
    }

    async fn handle(&self, exchange: &mut Exchange) -> Result<Flow, StepError> {
        let credentials = exchange
            .request()
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_basic);

        if self.verify(credentials) {
            return Ok(Flow::Continue);
        }

        tracing::debug!(path = %exchange.path(), "Rejected credentials");
        Ok(Flow::Respond(
            (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, CHALLENGE)],
                DENIED_BODY,
            )
                .into_response(),
        ))
    }
}

/// Decode `Basic <base64(user:pass)>`. The password may contain `:`.
fn parse_basic(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

fn digest_eq(provided: &[u8], expected: &[u8]) -> Choice {
    Sha256::digest(provided).ct_eq(&Sha256::digest(expected))
}
