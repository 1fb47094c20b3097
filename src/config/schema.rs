//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// `Cache-Control` sent when caching is requested without a duration.
pub const DEFAULT_CACHE_SECS: i64 = 3600;

/// Root configuration for the static server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Directory to serve. Defaults to `./public` when it exists, else `./`.
    pub root: Option<PathBuf>,

    /// Headers added to every response.
    pub headers: BTreeMap<String, String>,

    /// Cache policy for served files.
    pub cache: CachePolicy,

    /// List directories that have no index file.
    pub show_dir: bool,

    /// Serve `index.html` for directory requests.
    pub auto_index: bool,

    /// Serve files and directories whose name starts with `.`.
    pub show_dotfiles: bool,

    /// Serve `.gz` siblings to clients that accept gzip.
    pub gzip: bool,

    /// Serve `.br` siblings to clients that accept brotli.
    pub brotli: bool,

    /// Content type for files of unknown type.
    pub content_type: String,

    /// Negotiate extensionless paths against the `Accept` header.
    pub conneg: bool,

    /// Append `/` to extensionless paths.
    pub trailing: bool,

    /// Base name negotiated for directory requests.
    pub index_file: String,

    /// Extension tried when an extensionless file is missing.
    pub ext: String,

    /// Basic auth username; setting either credential enables auth.
    pub username: Option<String>,

    /// Basic auth password.
    pub password: Option<String>,

    /// Enable CORS.
    pub cors: bool,

    /// Extra comma separated headers allowed by CORS.
    pub cors_headers: Option<String>,

    /// Answer `/robots.txt`.
    pub robots: RobotsPolicy,

    /// Upstream origin for requests not served from disk.
    pub proxy: Option<String>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            root: None,
            headers: BTreeMap::new(),
            cache: CachePolicy::default(),
            show_dir: true,
            auto_index: true,
            show_dotfiles: true,
            gzip: false,
            brotli: false,
            content_type: "application/octet-stream".to_string(),
            conneg: false,
            trailing: false,
            index_file: "index".to_string(),
            ext: "html".to_string(),
            username: None,
            password: None,
            cors: false,
            cors_headers: None,
            robots: RobotsPolicy::default(),
            proxy: None,
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn auth_enabled(&self) -> bool {
        self.username.is_some() || self.password.is_some()
    }

    pub fn compression_enabled(&self) -> bool {
        self.gzip || self.brotli
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// How long clients may cache served files.
///
/// `cache = 600` caches for ten minutes, `cache = -1` forbids caching,
/// `cache = "public, max-age=60"` is sent verbatim and `cache = false`
/// omits the header.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CachePolicy {
    Toggle(bool),
    Seconds(i64),
    Directive(String),
}

impl Default for CachePolicy {
    fn default() -> Self {
        CachePolicy::Seconds(DEFAULT_CACHE_SECS)
    }
}

impl CachePolicy {
    /// The `Cache-Control` value, or `None` to omit the header.
    pub fn header_value(&self) -> Option<String> {
        match self {
            CachePolicy::Toggle(false) => None,
            CachePolicy::Toggle(true) => Some(format!("max-age={DEFAULT_CACHE_SECS}")),
            CachePolicy::Seconds(-1) => Some("no-cache, no-store, must-revalidate".to_string()),
            CachePolicy::Seconds(secs) => Some(format!("max-age={secs}")),
            CachePolicy::Directive(directive) => Some(directive.clone()),
        }
    }
}

/// `/robots.txt` behavior: off, the disallow-all default, or custom text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RobotsPolicy {
    Toggle(bool),
    Text(String),
}

impl Default for RobotsPolicy {
    fn default() -> Self {
        RobotsPolicy::Toggle(false)
    }
}

impl RobotsPolicy {
    pub fn enabled(&self) -> bool {
        match self {
            RobotsPolicy::Toggle(enabled) => *enabled,
            RobotsPolicy::Text(text) => !text.is_empty(),
        }
    }

    /// Custom body text, `None` for the default.
    pub fn custom_text(&self) -> Option<&str> {
        match self {
            RobotsPolicy::Text(text) if !text.is_empty() => Some(text),
            _ => None,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        cache: CachePolicy,
        robots: RobotsPolicy,
    }

    fn parse(cache: &str, robots: &str) -> Wrapper {
        toml::from_str(&format!("cache = {cache}\nrobots = {robots}")).unwrap()
    }

    #[test]
    fn test_cache_policy_forms() {
        assert_eq!(parse("600", "false").cache.header_value().as_deref(), Some("max-age=600"));
        assert_eq!(
            parse("-1", "false").cache.header_value().as_deref(),
            Some("no-cache, no-store, must-revalidate")
        );
        assert_eq!(parse("false", "false").cache.header_value(), None);
        assert_eq!(
            parse("\"public, max-age=60\"", "false").cache.header_value().as_deref(),
            Some("public, max-age=60")
        );
        assert_eq!(
            CachePolicy::default().header_value().as_deref(),
            Some("max-age=3600")
        );
    }

    #[test]
    fn test_robots_policy_forms() {
        let off = parse("0", "false").robots;
        assert!(!off.enabled());

        let default = parse("0", "true").robots;
        assert!(default.enabled());
        assert_eq!(default.custom_text(), None);

        let custom = parse("0", "\"User-agent: bot\"").robots;
        assert!(custom.enabled());
        assert_eq!(custom.custom_text(), Some("User-agent: bot"));
    }

    #[test]
    fn test_feature_switches() {
        let mut config = ServerConfig::default();
        assert!(!config.auth_enabled());
        assert!(!config.compression_enabled());

        config.password = Some("secret".into());
        config.brotli = true;
        assert!(config.auth_enabled());
        assert!(config.compression_enabled());
    }
}
