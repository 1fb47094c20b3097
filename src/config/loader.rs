//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse configuration from TOML text without validating it.
pub fn parse_config(content: &str) -> Result<ServerConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CachePolicy, RobotsPolicy};

    #[test]
    fn test_empty_file_is_default() {
        let config = parse_config("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.cache, CachePolicy::Seconds(3600));
        assert_eq!(config.index_file, "index");
        assert_eq!(config.ext, "html");
        assert!(config.show_dir);
        assert!(!config.conneg);
    }

    #[test]
    fn test_parse_full_file() {
        let config = parse_config(
            r#"
            root = "/srv/data"
            conneg = true
            trailing = true
            cache = -1
            robots = "User-agent: *\\nDisallow: /private"
            cors = true
            cors_headers = "X-Test"
            proxy = "http://localhost:8081"
            username = "user"
            password = "pass"

            [listener]
            bind_address = "127.0.0.1:9000"

            [headers]
            X-Served-By = "static"

            [timeouts]
            request_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.root.as_deref(), Some(Path::new("/srv/data")));
        assert_eq!(config.cache, CachePolicy::Seconds(-1));
        assert_eq!(
            config.robots,
            RobotsPolicy::Text("User-agent: *\\nDisallow: /private".to_string())
        );
        assert_eq!(config.headers.get("X-Served-By").map(String::as_str), Some("static"));
        assert_eq!(config.timeouts.request_secs, 5);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_reports_validation_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        std::fs::write(&path, "proxy = \"ftp://example.com\"\nindex_file = \"\"\n").unwrap();

        match load_config(&path) {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation errors, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_config(Path::new("/definitely/not/here.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
