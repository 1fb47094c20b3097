//! Filesystem-backed asset server.
//!
//! # Responsibilities
//! - Map a request path onto a file under the root
//! - Redirect, index or list directories
//! - Emit caching headers and answer conditional requests
//! - Serve precompressed `.br` / `.gz` siblings and single byte ranges

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, Response, StatusCode};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::assets::listing::render_listing;
use crate::assets::range::{parse_range, ByteRange};
use crate::assets::{AssetError, AssetOutcome};
use crate::http::path::{decode_path, is_extensionless};
use crate::mime::MimeIndex;
use crate::negotiation::{preferred_encoding, Encoding};

const INDEX_HTML: &str = "index.html";

/// Asset server settings.
#[derive(Debug, Clone)]
pub struct FileServerConfig {
    pub root: PathBuf,
    /// `Cache-Control` value; `None` omits the header.
    pub cache_control: Option<String>,
    pub show_dir: bool,
    /// Serve `index.html` for directory requests.
    pub auto_index: bool,
    pub show_dotfiles: bool,
    /// Extension tried when an extensionless path is missing.
    pub default_ext: Option<String>,
    pub gzip: bool,
    pub brotli: bool,
    /// Content type for files no registry knows.
    pub content_type: String,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            cache_control: Some("max-age=3600".to_string()),
            show_dir: true,
            auto_index: true,
            show_dotfiles: true,
            default_ext: Some("html".to_string()),
            gzip: false,
            brotli: false,
            content_type: "application/octet-stream".to_string(),
        }
    }
}

/// A file chosen to answer a request, possibly an encoded sibling.
#[derive(Debug)]
struct Selected {
    /// The file the client asked for; decides the content type.
    original: PathBuf,
    /// The file whose bytes are sent.
    served: PathBuf,
    encoding: Option<Encoding>,
    len: u64,
    modified: Option<SystemTime>,
}

/// Serves files from a root directory.
#[derive(Debug, Clone)]
pub struct FileServer {
    config: FileServerConfig,
    index: &'static MimeIndex,
}

impl FileServer {
    pub fn new(config: FileServerConfig) -> Self {
        Self {
            config,
            index: MimeIndex::global(),
        }
    }

    pub fn config(&self) -> &FileServerConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Answer `request` from the filesystem.
    ///
    /// Only the request head is read; callers holding a full request pass
    /// [`request_head`](crate::assets::request_head) of it.
    pub async fn serve(&self, request: &Request<()>) -> Result<AssetOutcome, AssetError> {
        let method = request.method();
        if method != Method::GET && method != Method::HEAD {
            return Ok(AssetOutcome::MethodNotAllowed);
        }

        let raw_path = request.uri().path();
        let Some(decoded) = decode_path(raw_path) else {
            tracing::debug!(path = %raw_path, "Rejected asset path");
            return Ok(AssetOutcome::NotFound);
        };
        if !self.config.show_dotfiles && has_hidden_segment(&decoded) {
            return Ok(AssetOutcome::NotFound);
        }

        let fs_path = self.config.root.join(decoded.trim_start_matches('/'));
        let metadata = match tokio::fs::metadata(&fs_path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return Err(AssetError::io(fs_path, e));
            }
            Err(_) => return self.serve_with_default_ext(request, &fs_path, &decoded).await,
        };

        if metadata.is_dir() {
            return self.serve_directory(request, &fs_path).await;
        }
        self.serve_file(request, fs_path).await
    }

    async fn serve_with_default_ext(
        &self,
        request: &Request<()>,
        fs_path: &Path,
        decoded: &str,
    ) -> Result<AssetOutcome, AssetError> {
        let Some(ext) = self.config.default_ext.as_deref().filter(|e| !e.is_empty()) else {
            return Ok(AssetOutcome::NotFound);
        };
        if decoded.ends_with('/') || !is_extensionless(decoded) {
            return Ok(AssetOutcome::NotFound);
        }

        let candidate = with_suffix(fs_path, &format!(".{ext}"));
        match tokio::fs::metadata(&candidate).await {
            Ok(metadata) if metadata.is_file() => self.serve_file(request, candidate).await,
            _ => Ok(AssetOutcome::NotFound),
        }
    }

    async fn serve_directory(
        &self,
        request: &Request<()>,
        dir: &Path,
    ) -> Result<AssetOutcome, AssetError> {
        let uri = request.uri();
        if !uri.path().ends_with('/') {
            let location = match uri.query() {
                Some(query) => format!("{}/?{query}", uri.path()),
                None => format!("{}/", uri.path()),
            };
            let response = Response::builder()
                .status(StatusCode::FOUND)
                .header(header::LOCATION, location)
                .body(Body::empty())?;
            return Ok(AssetOutcome::Served(response));
        }

        if self.config.auto_index {
            let index = dir.join(INDEX_HTML);
            if let Ok(metadata) = tokio::fs::metadata(&index).await {
                if metadata.is_file() {
                    return self.serve_file(request, index).await;
                }
            }
        }

        if !self.config.show_dir {
            return Ok(AssetOutcome::NotFound);
        }

        let html = render_listing(dir, uri.path(), self.config.show_dotfiles)
            .await
            .map_err(|e| AssetError::io(dir, e))?;
        let len = html.len();
        let body = if request.method() == Method::HEAD {
            Body::empty()
        } else {
            Body::from(html)
        };
        let response = Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
            .header(header::CONTENT_LENGTH, len)
            .header(header::CACHE_CONTROL, "no-cache")
            .body(body)?;
        Ok(AssetOutcome::Served(response))
    }

    async fn serve_file(
        &self,
        request: &Request<()>,
        path: PathBuf,
    ) -> Result<AssetOutcome, AssetError> {
        let selected = match self.select_variant(request.headers(), &path).await {
            Ok(selected) => selected,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AssetOutcome::NotFound),
            Err(e) => return Err(AssetError::io(path, e)),
        };

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, self.content_type(&selected.original));
        headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
        if let Some(encoding) = selected.encoding {
            headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static(encoding.as_str()));
        }
        if let Some(cache_control) = self
            .config
            .cache_control
            .as_deref()
            .and_then(|v| HeaderValue::from_str(v).ok())
        {
            headers.insert(header::CACHE_CONTROL, cache_control);
        }
        let etag = entity_tag(selected.len, selected.modified, selected.encoding);
        if let Ok(value) = HeaderValue::from_str(&etag) {
            headers.insert(header::ETAG, value);
        }
        if let Some(modified) = selected.modified {
            if let Ok(value) = HeaderValue::from_str(&httpdate::fmt_http_date(modified)) {
                headers.insert(header::LAST_MODIFIED, value);
            }
        }

        if is_not_modified(request.headers(), &etag, selected.modified) {
            let mut response = Response::builder()
                .status(StatusCode::NOT_MODIFIED)
                .body(Body::empty())?;
            for name in [header::ETAG, header::LAST_MODIFIED, header::CACHE_CONTROL] {
                if let Some(value) = headers.remove(&name) {
                    response.headers_mut().insert(name, value);
                }
            }
            return Ok(AssetOutcome::Served(response));
        }

        let range = match (selected.encoding, request.headers().get(header::RANGE)) {
            (None, Some(value)) => value
                .to_str()
                .map(|v| parse_range(v, selected.len))
                .unwrap_or(ByteRange::Full),
            _ => ByteRange::Full,
        };
        let head = request.method() == Method::HEAD;

        let (status, body, content_length) = match range {
            ByteRange::Full => {
                let body = if head {
                    Body::empty()
                } else {
                    let bytes = tokio::fs::read(&selected.served)
                        .await
                        .map_err(|e| AssetError::io(&selected.served, e))?;
                    Body::from(bytes)
                };
                (StatusCode::OK, body, selected.len)
            }
            ByteRange::Partial { start, end } => {
                let length = range.len();
                let body = if head {
                    Body::empty()
                } else {
                    Body::from(read_slice(&selected.served, start, length).await?)
                };
                let content_range = format!("bytes {start}-{end}/{}", selected.len);
                if let Ok(value) = HeaderValue::from_str(&content_range) {
                    headers.insert(header::CONTENT_RANGE, value);
                }
                (StatusCode::PARTIAL_CONTENT, body, length)
            }
            ByteRange::Unsatisfiable => {
                let mut response = Response::builder()
                    .status(StatusCode::RANGE_NOT_SATISFIABLE)
                    .header(header::CONTENT_RANGE, format!("bytes */{}", selected.len))
                    .body(Body::empty())?;
                response
                    .headers_mut()
                    .insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
                return Ok(AssetOutcome::Served(response));
            }
        };

        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(content_length));
        let mut response = Response::builder().status(status).body(body)?;
        *response.headers_mut() = headers;

        tracing::debug!(
            file = %selected.served.display(),
            status = status.as_u16(),
            encoding = ?selected.encoding.map(|e| e.as_str()),
            "Serving asset"
        );
        Ok(AssetOutcome::Served(response))
    }

    /// Pick the identity file or an acceptable precompressed sibling.
    async fn select_variant(&self, headers: &HeaderMap, path: &Path) -> std::io::Result<Selected> {
        let mut enabled = Vec::with_capacity(2);
        if self.config.brotli {
            enabled.push(Encoding::Brotli);
        }
        if self.config.gzip {
            enabled.push(Encoding::Gzip);
        }

        if !enabled.is_empty() {
            let mut present = Vec::with_capacity(enabled.len());
            for encoding in enabled {
                let sibling = with_suffix(path, encoding.file_suffix());
                if let Ok(metadata) = tokio::fs::metadata(&sibling).await {
                    if metadata.is_file() {
                        present.push((encoding, sibling, metadata));
                    }
                }
            }

            let accept_encoding = headers
                .get(header::ACCEPT_ENCODING)
                .and_then(|v| v.to_str().ok());
            let available: Vec<Encoding> = present.iter().map(|(e, _, _)| *e).collect();
            if let Some(chosen) = preferred_encoding(accept_encoding, &available) {
                if let Some((encoding, served, metadata)) =
                    present.into_iter().find(|(e, _, _)| *e == chosen)
                {
                    return Ok(Selected {
                        original: path.to_path_buf(),
                        served,
                        encoding: Some(encoding),
                        len: metadata.len(),
                        modified: metadata.modified().ok(),
                    });
                }
            }
        }

        let metadata = tokio::fs::metadata(path).await?;
        Ok(Selected {
            served: path.to_path_buf(),
            original: path.to_path_buf(),
            encoding: None,
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }

    fn content_type(&self, path: &Path) -> HeaderValue {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let mime = self
            .index
            .content_type_for(extension)
            .unwrap_or(self.config.content_type.as_str());

        let value = if mime.starts_with("text/") && !mime.contains("charset") {
            format!("{mime}; charset=utf-8")
        } else {
            mime.to_string()
        };
        HeaderValue::from_str(&value)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"))
    }
}

async fn read_slice(path: &Path, start: u64, length: u64) -> Result<Vec<u8>, AssetError> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| AssetError::io(path, e))?;
    file.seek(SeekFrom::Start(start))
        .await
        .map_err(|e| AssetError::io(path, e))?;
    let mut buffer = Vec::new();
    file.take(length)
        .read_to_end(&mut buffer)
        .await
        .map_err(|e| AssetError::io(path, e))?;
    Ok(buffer)
}

fn has_hidden_segment(decoded: &str) -> bool {
    decoded
        .split('/')
        .any(|segment| segment.starts_with('.') && segment != ".")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

/// Weak validator from size and modification time.
fn entity_tag(len: u64, modified: Option<SystemTime>, encoding: Option<Encoding>) -> String {
    let mtime = modified
        .and_then(|m| m.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0);
    match encoding {
        Some(encoding) => format!("W/\"{len:x}-{mtime:x}-{}\"", encoding.as_str()),
        None => format!("W/\"{len:x}-{mtime:x}\""),
    }
}

fn is_not_modified(headers: &HeaderMap, etag: &str, modified: Option<SystemTime>) -> bool {
    if let Some(if_none_match) = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
    {
        let ours = etag.trim_start_matches("W/");
        return if_none_match
            .split(',')
            .map(str::trim)
            .any(|tag| tag == "*" || tag.trim_start_matches("W/") == ours);
    }

    let since = headers
        .get(header::IF_MODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| httpdate::parse_http_date(v).ok());
    match (since, modified) {
        (Some(since), Some(modified)) => {
            // HTTP dates have one second resolution
            let modified_secs = modified.duration_since(UNIX_EPOCH).map(|d| d.as_secs());
            let since_secs = since.duration_since(UNIX_EPOCH).map(|d| d.as_secs());
            matches!((modified_secs, since_secs), (Ok(m), Ok(s)) if m <= s)
        }
        _ => false,
    }
}
