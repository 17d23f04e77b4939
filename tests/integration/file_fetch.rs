//! File fetcher tests: atomic writes, parent creation, failure statuses

use super::test_utils::{file_entry, FakeServer, Route};
use repomirror::fetch::fetch_file;
use repomirror::session::{Session, SessionOptions};
use repomirror::tree::path::parse_http_url;
use repomirror::tree::{TreeWalker, WalkOptions};
use repomirror::MirrorError;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn session() -> Session {
    let api_root = parse_http_url("http://127.0.0.1/contents").unwrap();
    Session::new(&SessionOptions::default(), &api_root).unwrap()
}

fn leftover_parts(dir: &std::path::Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name.ends_with(".part"))
        .collect()
}

#[tokio::test]
async fn test_fetch_writes_exact_bytes() {
    let body: Vec<u8> = (0..200_000).map(|i| (i % 251) as u8).collect();
    let expected = body.clone();
    let server = FakeServer::start(move |_| vec![("/raw/blob.bin".to_string(), Route::Bytes(body))]).await;
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("blob.bin");

    let written = fetch_file(&session(), &server.url("/raw/blob.bin"), &dest)
        .await
        .unwrap();

    assert_eq!(written, expected.len() as u64);
    assert_eq!(fs::read(&dest).unwrap(), expected);
    assert!(leftover_parts(temp.path()).is_empty());
}

#[tokio::test]
async fn test_fetch_creates_missing_parents() {
    let server = FakeServer::start(|_| vec![("/raw/x".to_string(), Route::Bytes(b"x".to_vec()))]).await;
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("deep").join("er").join("x");

    fetch_file(&session(), &server.url("/raw/x"), &dest)
        .await
        .unwrap();

    assert_eq!(fs::read_to_string(&dest).unwrap(), "x");
}

#[tokio::test]
async fn test_fetch_empty_body_creates_empty_file() {
    let server = FakeServer::start(|_| vec![("/raw/empty".to_string(), Route::Bytes(Vec::new()))]).await;
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("empty");

    let written = fetch_file(&session(), &server.url("/raw/empty"), &dest)
        .await
        .unwrap();

    assert_eq!(written, 0);
    assert!(dest.is_file());
    assert_eq!(fs::metadata(&dest).unwrap().len(), 0);
}

#[tokio::test]
async fn test_fetch_overwrites_existing_file() {
    let server = FakeServer::start(|_| vec![("/raw/x".to_string(), Route::Bytes(b"new".to_vec()))]).await;
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("x");
    fs::write(&dest, "old contents").unwrap();

    fetch_file(&session(), &server.url("/raw/x"), &dest)
        .await
        .unwrap();

    assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
}

#[tokio::test]
async fn test_fetch_non_success_status_is_remote_fetch_error() {
    let server = FakeServer::start(|_| vec![("/raw/broken".to_string(), Route::Status(500))]).await;
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("broken");
    let url = server.url("/raw/broken");

    let err = fetch_file(&session(), &url, &dest).await.unwrap_err();

    match err {
        MirrorError::RemoteFetch { url: failed, status } => {
            assert_eq!(failed, url);
            assert_eq!(status, 500);
        }
        other => panic!("expected RemoteFetch, got {other:?}"),
    }
    assert!(!dest.exists());
    assert!(leftover_parts(temp.path()).is_empty());
}

#[tokio::test]
async fn test_fetch_missing_file_reports_404() {
    let server = FakeServer::start(|_| Vec::new()).await;
    let temp = TempDir::new().unwrap();

    let err = fetch_file(&session(), &server.url("/raw/nope"), &temp.path().join("nope"))
        .await
        .unwrap_err();

    assert!(matches!(err, MirrorError::RemoteFetch { status: 404, .. }));
}

#[tokio::test]
async fn test_fetch_invalid_url() {
    let temp = TempDir::new().unwrap();
    let err = fetch_file(&session(), "not a url", &temp.path().join("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, MirrorError::InvalidUrl { .. }));
}

#[tokio::test]
async fn test_fetch_unreachable_host_is_transport_error() {
    // Bind and drop to get a port nothing listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let options = SessionOptions {
        connect_timeout: Duration::from_secs(2),
        ..SessionOptions::default()
    };
    let api_root = parse_http_url(&format!("http://127.0.0.1:{}/contents", port)).unwrap();
    let session = Session::new(&options, &api_root).unwrap();
    let temp = TempDir::new().unwrap();

    let err = fetch_file(
        &session,
        &format!("http://127.0.0.1:{}/raw/x", port),
        &temp.path().join("x"),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, MirrorError::Transport { .. }));
}

#[tokio::test]
async fn test_fetch_sends_token() {
    let server = FakeServer::start(|_| vec![("/raw/x".to_string(), Route::Bytes(b"x".to_vec()))]).await;
    let options = SessionOptions {
        token: Some("s3cret".to_string()),
        ..SessionOptions::default()
    };
    let api_root = parse_http_url(&server.url("/contents")).unwrap();
    let session = Session::new(&options, &api_root).unwrap();
    let temp = TempDir::new().unwrap();

    fetch_file(&session, &server.url("/raw/x"), &temp.path().join("x"))
        .await
        .unwrap();

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].authorization.as_deref(), Some("token s3cret"));
}

#[tokio::test]
async fn test_token_not_sent_to_other_origin() {
    let cdn = FakeServer::start(|_| {
        vec![("/raw/b.txt".to_string(), Route::Bytes(b"B".to_vec()))]
    })
    .await;
    let download_url = cdn.url("/raw/b.txt");
    let api = FakeServer::start(move |_| {
        vec![(
            "/contents".to_string(),
            Route::Listing(vec![file_entry("b.txt", &download_url)]),
        )]
    })
    .await;

    let options = SessionOptions {
        token: Some("s3cret".to_string()),
        ..SessionOptions::default()
    };
    let root = parse_http_url(&api.url("/contents")).unwrap();
    let session = Session::new(&options, &root).unwrap();
    let temp = TempDir::new().unwrap();

    TreeWalker::new(&session, WalkOptions::default())
        .walk(&root, temp.path())
        .await
        .unwrap();

    assert_eq!(fs::read_to_string(temp.path().join("b.txt")).unwrap(), "B");
    let api_requests = api.requests();
    assert_eq!(api_requests.len(), 1);
    assert_eq!(api_requests[0].authorization.as_deref(), Some("token s3cret"));
    let cdn_requests = cdn.requests();
    assert_eq!(cdn_requests.len(), 1);
    assert!(cdn_requests[0].authorization.is_none());
}

#[tokio::test]
async fn test_fetch_rejects_non_http_scheme() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("sub").join("passwd");

    for url in ["file:///etc/passwd", "ftp://example.com/raw/x"] {
        let err = fetch_file(&session(), url, &dest).await.unwrap_err();
        match err {
            MirrorError::InvalidUrl { url: rejected, reason } => {
                assert_eq!(rejected, url);
                assert!(reason.contains("unsupported scheme"));
            }
            other => panic!("expected InvalidUrl, got {other:?}"),
        }
    }
    assert!(!temp.path().join("sub").exists());
}
