//! Command line interface.
//!
//! Flags override values loaded from `--config`; anything not given on the
//! command line keeps its file or default value.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;

use crate::config::{CachePolicy, RobotsPolicy, ServerConfig, TlsConfig};
use crate::error::ServerError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Parser)]
#[command(name = "static-http-server", version)]
#[command(about = "Serve a directory over HTTP", long_about = None)]
pub struct Cli {
    /// Directory to serve [default: ./public if it exists, else ./]
    pub root: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(short, long)]
    pub address: Option<String>,

    /// List directories without an index file
    #[arg(short = 'd', long, value_name = "BOOL")]
    pub show_dir: Option<bool>,

    /// Serve index.html for directory requests
    #[arg(short = 'i', long, value_name = "BOOL")]
    pub auto_index: Option<bool>,

    /// Serve dotfiles
    #[arg(long, value_name = "BOOL")]
    pub dotfiles: Option<bool>,

    /// Serve .gz files to clients that accept gzip
    #[arg(short, long)]
    pub gzip: bool,

    /// Serve .br files to clients that accept brotli
    #[arg(short, long)]
    pub brotli: bool,

    /// Extension tried for extensionless paths
    #[arg(short, long)]
    pub ext: Option<String>,

    /// Cache max-age in seconds, -1 to disable caching, or a Cache-Control value
    #[arg(short, long, allow_hyphen_values = true)]
    pub cache: Option<String>,

    /// Enable CORS, optionally allowing extra comma separated headers
    #[arg(long, value_name = "HEADERS", num_args = 0..=1, default_missing_value = "")]
    pub cors: Option<String>,

    /// Forward requests that match no file to this origin
    #[arg(short = 'P', long)]
    pub proxy: Option<String>,

    /// Serve HTTPS
    #[arg(short = 'S', long)]
    pub ssl: bool,

    /// TLS certificate (PEM)
    #[arg(short = 'C', long, value_name = "FILE", default_value = "cert.pem")]
    pub cert: String,

    /// TLS private key (PEM)
    #[arg(short = 'K', long, value_name = "FILE", default_value = "key.pem")]
    pub key: String,

    /// Answer /robots.txt, optionally with custom text
    #[arg(short, long, value_name = "TEXT", num_args = 0..=1, default_missing_value = "")]
    pub robots: Option<String>,

    /// Basic auth username
    #[arg(long)]
    pub username: Option<String>,

    /// Basic auth password
    #[arg(long)]
    pub password: Option<String>,

    /// Negotiate extensionless paths against Accept
    #[arg(long)]
    pub conneg: bool,

    /// Append a trailing slash to extensionless paths
    #[arg(long)]
    pub trailing: bool,

    /// Base name negotiated for directory requests
    #[arg(long)]
    pub index_file: Option<String>,

    /// Content type for files of unknown type
    #[arg(long)]
    pub content_type: Option<String>,

    /// Header added to every response, as "Name: value"
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Suppress the access log
    #[arg(short, long)]
    pub silent: bool,
}

impl Cli {
    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, config: &mut ServerConfig) -> Result<(), ServerError> {
        if self.port.is_some() || self.address.is_some() {
            config.listener.bind_address = self.bind_address(&config.listener.bind_address)?;
        }
        if let Some(root) = &self.root {
            config.root = Some(root.clone());
        }
        if let Some(show_dir) = self.show_dir {
            config.show_dir = show_dir;
        }
        if let Some(auto_index) = self.auto_index {
            config.auto_index = auto_index;
        }
        if let Some(dotfiles) = self.dotfiles {
            config.show_dotfiles = dotfiles;
        }
        config.gzip |= self.gzip;
        config.brotli |= self.brotli;
        config.conneg |= self.conneg;
        config.trailing |= self.trailing;

        if let Some(ext) = &self.ext {
            config.ext = ext.trim_start_matches('.').to_string();
        }
        if let Some(cache) = &self.cache {
            config.cache = parse_cache(cache);
        }
        if let Some(extra) = &self.cors {
            config.cors = true;
            if !extra.is_empty() {
                config.cors_headers = Some(extra.clone());
            }
        }
        if let Some(proxy) = &self.proxy {
            config.proxy = Some(proxy.clone());
        }
        if self.ssl {
            config.listener.tls = Some(TlsConfig {
                cert_path: self.cert.clone(),
                key_path: self.key.clone(),
            });
        }
        if let Some(text) = &self.robots {
            config.robots = if text.is_empty() {
                RobotsPolicy::Toggle(true)
            } else {
                RobotsPolicy::Text(text.clone())
            };
        }
        if let Some(username) = &self.username {
            config.username = Some(username.clone());
        }
        if let Some(password) = &self.password {
            config.password = Some(password.clone());
        }
        if let Some(index_file) = &self.index_file {
            config.index_file = index_file.clone();
        }
        if let Some(content_type) = &self.content_type {
            config.content_type = content_type.clone();
        }
        for header in &self.headers {
            let (name, value) = parse_header(header)?;
            config.headers.insert(name, value);
        }
        Ok(())
    }

    fn bind_address(&self, current: &str) -> Result<String, ServerError> {
        let (host, port) = match current.parse::<SocketAddr>() {
            Ok(addr) => (addr.ip().to_string(), addr.port()),
            Err(_) => (DEFAULT_HOST.to_string(), DEFAULT_PORT),
        };
        let host = self.address.clone().unwrap_or(host);
        let ip: IpAddr = host
            .parse()
            .map_err(|_| ServerError::InvalidAddress(host.clone()))?;
        Ok(SocketAddr::new(ip, self.port.unwrap_or(port)).to_string())
    }
}

/// `600` and `-1` are seconds, `false` disables the header, anything else is
/// sent as the `Cache-Control` value.
fn parse_cache(value: &str) -> CachePolicy {
    if let Ok(secs) = value.parse::<i64>() {
        return CachePolicy::Seconds(secs);
    }
    match value {
        "false" => CachePolicy::Toggle(false),
        "true" => CachePolicy::Toggle(true),
        directive => CachePolicy::Directive(directive.to_string()),
    }
}

fn parse_header(header: &str) -> Result<(String, String), ServerError> {
    let (name, value) = header
        .split_once(':')
        .ok_or_else(|| ServerError::InvalidHeader {
            name: header.to_string(),
            reason: "expected \"Name: value\"".to_string(),
        })?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}
