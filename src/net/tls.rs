//! TLS configuration and certificate loading.

use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;

use crate::config::TlsConfig;
use crate::error::ServerError;

/// Load rustls settings from the configured PEM files.
pub async fn load_tls_config(tls: &TlsConfig) -> Result<RustlsConfig, ServerError> {
    let cert_path = Path::new(&tls.cert_path);
    let key_path = Path::new(&tls.key_path);

    for (kind, path) in [("Certificate", cert_path), ("Private key", key_path)] {
        if !path.exists() {
            return Err(ServerError::Tls(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{kind} file not found: {}", path.display()),
            )));
        }
    }

    RustlsConfig::from_pem_file(cert_path, key_path)
        .await
        .map_err(ServerError::Tls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_files_rejected() {
        let tls = TlsConfig {
            cert_path: "/nonexistent/cert.pem".into(),
            key_path: "/nonexistent/key.pem".into(),
        };
        match load_tls_config(&tls).await {
            Err(ServerError::Tls(e)) => {
                assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
                assert!(e.to_string().contains("Certificate"));
            }
            other => panic!("expected TLS error, got {:?}", other.map(|_| ())),
        }
    }
}
