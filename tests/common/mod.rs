//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tower::ServiceExt;

use static_http_server::{HttpServer, ServerConfig};

pub const FILE_BODY: &str = "hello, world\n";
pub const HIDDEN_BODY: &str = "I am hidden\n";
pub const TURTLE_BODY: &str = "<#a> <#b> <#c> .\n";
pub const NTRIPLES_BODY: &str = "<http://example.com/a> <http://example.com/b> \"c\" .\n";
pub const TURTLE_GZ_BODY: &[u8] = b"gzip-bytes";
pub const TURTLE_BR_BODY: &[u8] = b"brotli-bytes";
pub const INDEX_TURTLE_BODY: &str = "<#index> <#is> <#turtle> .\n";
pub const INDEX_HTML_BODY: &str = "<html><body>index</body></html>\n";

/// A served root with plain, hidden, negotiable and precompressed files.
///
/// ```text
/// file
/// canYouSeeMe
/// .hidden
/// test.ttl  test.nt  test.ttl.gz  test.ttl.br
/// test2/index.ttl  test2/index.html
/// empty/
/// ```
pub fn fixture_root() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write(root, "file", FILE_BODY.as_bytes());
    write(root, "canYouSeeMe", HIDDEN_BODY.as_bytes());
    write(root, ".hidden", HIDDEN_BODY.as_bytes());
    write(root, "test.ttl", TURTLE_BODY.as_bytes());
    write(root, "test.nt", NTRIPLES_BODY.as_bytes());
    write(root, "test.ttl.gz", TURTLE_GZ_BODY);
    write(root, "test.ttl.br", TURTLE_BR_BODY);
    write(root, "test2/index.ttl", INDEX_TURTLE_BODY.as_bytes());
    write(root, "test2/index.html", INDEX_HTML_BODY.as_bytes());
    fs::create_dir_all(root.join("empty")).unwrap();

    dir
}

fn write(root: &Path, relative: &str, contents: &[u8]) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Build a server over a fresh fixture root; `configure` adjusts the config.
pub fn server_with(configure: impl FnOnce(&mut ServerConfig)) -> (HttpServer, TempDir) {
    let dir = fixture_root();
    let mut config = ServerConfig {
        root: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    configure(&mut config);
    (HttpServer::new(config).unwrap(), dir)
}

/// Send one request through the server's router.
pub async fn send(server: &HttpServer, request: Request<Body>) -> Response<Body> {
    server.router().oneshot(request).await.unwrap()
}

pub async fn get(server: &HttpServer, uri: &str) -> Response<Body> {
    send(server, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_with(
    server: &HttpServer,
    uri: &str,
    header: &str,
    value: &str,
) -> Response<Body> {
    send(
        server,
        Request::get(uri).header(header, value).body(Body::empty()).unwrap(),
    )
    .await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_string(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub fn header<'a>(response: &'a Response<Body>, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Start a mock upstream that answers every connection with `response`.
pub async fn start_mock_backend(status: u16, body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        // Drain the request head so the client sees a clean exchange
                        let mut buf = [0u8; 4096];
                        let _ = tokio::io::AsyncReadExt::read(&mut socket, &mut buf).await;
                        let response = format!(
                            "HTTP/1.1 {status} {}\r\nContent-Type: text/plain\r\nX-Upstream: mock\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                            reason(status),
                            body.len()
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
