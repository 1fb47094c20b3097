//! Content negotiation over a real directory.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;

use static_http_server::negotiation::{
    DirectoryScanner, MemoryRepresentationCache, RepresentationCache,
};
use static_http_server::{HttpServer, ServerConfig};

use common::*;

fn conneg_server() -> (HttpServer, tempfile::TempDir) {
    server_with(|c| c.conneg = true)
}

fn vary_has(response: &axum::http::Response<axum::body::Body>, token: &str) -> bool {
    header(response, "vary")
        .map(|v| v.split(',').any(|t| t.trim().eq_ignore_ascii_case(token)))
        .unwrap_or(false)
}

#[tokio::test]
async fn test_accept_selects_matching_variant() {
    let (server, _dir) = conneg_server();
    let response = get_with(&server, "/test", "accept", "text/turtle").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(vary_has(&response, "Accept"));
    assert!(header(&response, "content-type").unwrap().starts_with("text/turtle"));
    assert_eq!(body_string(response).await, TURTLE_BODY);

    let response = get_with(&server, "/test", "accept", "application/n-triples").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, NTRIPLES_BODY);
}

#[tokio::test]
async fn test_quality_values_decide() {
    let (server, _dir) = conneg_server();
    let response = get_with(
        &server,
        "/test",
        "accept",
        "application/n-triples;q=0.5, text/turtle;q=0.9",
    )
    .await;
    assert_eq!(body_string(response).await, TURTLE_BODY);
}

#[tokio::test]
async fn test_unavailable_type_is_404() {
    let (server, _dir) = conneg_server();
    let response = get_with(&server, "/test", "accept", "application/rdf+xml").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(vary_has(&response, "Accept"));
}

#[tokio::test]
async fn test_missing_accept_serves_some_variant() {
    let (server, _dir) = conneg_server();
    let response = get(&server, "/test").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(vary_has(&response, "Accept"));
    let body = body_string(response).await;
    assert!(body == TURTLE_BODY || body == NTRIPLES_BODY);
}

#[tokio::test]
async fn test_wildcard_falls_back_to_first_variant() {
    let (server, _dir) = conneg_server();
    // Both variants refused by name, so only the wildcard can match
    let response = get_with(
        &server,
        "/test",
        "accept",
        "text/turtle;q=0, application/n-triples;q=0, */*",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(vary_has(&response, "Accept"));
    assert_eq!(body_string(response).await, NTRIPLES_BODY);
}

#[tokio::test]
async fn test_negotiates_common_types_beyond_linked_data() {
    let (server, dir) = conneg_server();
    std::fs::write(dir.path().join("script.sh"), "#!/bin/sh\necho hi\n").unwrap();
    std::fs::write(dir.path().join("clip.mkv"), "matroska").unwrap();

    let response = get_with(&server, "/script", "accept", "application/x-sh").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "#!/bin/sh\necho hi\n");

    let response = get_with(&server, "/clip", "accept", "video/x-matroska").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "matroska");
}

#[tokio::test]
async fn test_trailing_directory_negotiates_index() {
    let (server, _dir) = server_with(|c| {
        c.conneg = true;
        c.trailing = true;
    });

    let response = get_with(&server, "/test2", "accept", "text/turtle").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, INDEX_TURTLE_BODY);

    let response = get_with(&server, "/test2/", "accept", "text/html").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, INDEX_HTML_BODY);
}

#[tokio::test]
async fn test_custom_index_file() {
    let (server, dir) = server_with(|c| {
        c.conneg = true;
        c.index_file = "main".into();
    });
    std::fs::write(dir.path().join("test2/main.ttl"), "<#main> <#a> <#b> .\n").unwrap();

    let response = get_with(&server, "/test2/", "accept", "text/turtle").await;
    assert_eq!(body_string(response).await, "<#main> <#a> <#b> .\n");
}

#[tokio::test]
async fn test_explicit_extension_is_untouched() {
    let (server, _dir) = conneg_server();
    let response = get_with(&server, "/test.nt", "accept", "text/turtle").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!vary_has(&response, "Accept"));
    assert_eq!(body_string(response).await, NTRIPLES_BODY);
}

#[tokio::test]
async fn test_negotiation_with_precompressed_variant() {
    let (server, _dir) = server_with(|c| {
        c.conneg = true;
        c.brotli = true;
    });
    let response = send(
        &server,
        axum::http::Request::get("/test")
            .header("accept", "text/turtle")
            .header("accept-encoding", "br")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(header(&response, "content-encoding"), Some("br"));
    assert!(vary_has(&response, "Accept"));
    assert!(vary_has(&response, "Accept-Encoding"));
    assert_eq!(body_bytes(response).await, TURTLE_BR_BODY);
}

#[tokio::test]
async fn test_cache_scans_each_path_once() {
    let dir = fixture_root();
    let cache = Arc::new(MemoryRepresentationCache::new(DirectoryScanner::new(dir.path())));
    let config = ServerConfig {
        root: Some(dir.path().to_path_buf()),
        conneg: true,
        ..Default::default()
    };
    let server = HttpServer::builder(config)
        .representation_cache(Arc::clone(&cache) as Arc<dyn RepresentationCache>)
        .build()
        .unwrap();

    for _ in 0..3 {
        let response = get_with(&server, "/test", "accept", "text/turtle").await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert_eq!(cache.scans(), 1);
    assert_eq!(cache.len(), 1);

    let first = cache.resolve("/test").await;
    let second = cache.resolve("/test").await;
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.scans(), 1);
}

#[tokio::test]
async fn test_cache_does_not_see_new_files() {
    let (server, dir) = conneg_server();

    let response = get_with(&server, "/late", "accept", "text/turtle").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    std::fs::write(dir.path().join("late.ttl"), TURTLE_BODY).unwrap();
    let response = get_with(&server, "/late", "accept", "text/turtle").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
