use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use docmirror_server::{App, ServerConfig, StartupError, create_app};
use docmirror_watch::{MockWatcher, WatchEventKind};
use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use tokio_tungstenite::tungstenite::Message;
use tower::ServiceExt;

fn project(content: &str) -> (tempfile::TempDir, ServerConfig) {
    let temp = tempfile::tempdir().unwrap();
    fs::create_dir(temp.path().join("public")).unwrap();
    fs::write(temp.path().join("README.md"), content).unwrap();

    let config = ServerConfig {
        source: temp.path().join("README.md"),
        public_dir: temp.path().join("public"),
        live_reload_enabled: true,
        version: "test".to_owned(),
        ..ServerConfig::default()
    };
    (temp, config)
}

async fn get(router: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

async fn wait_for_content(path: &Path, expected: &str) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if fs::read_to_string(path).is_ok_and(|c| c == expected) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}

fn start(config: &ServerConfig, watcher: &MockWatcher) -> App {
    create_app(config, watcher).unwrap()
}

#[tokio::test]
async fn serves_mirrored_document_after_startup() {
    let (_temp, config) = project("Hello");
    let watcher = MockWatcher::new();
    let app = start(&config, &watcher);

    let (status, headers, body) = get(app.router(), "/README.md").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Hello");
    assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-cache");
    assert!(headers.get(header::ETAG).is_some());
    assert_eq!(fs::read_to_string(config.mirrored_path()).unwrap(), "Hello");
}

#[tokio::test]
async fn source_change_updates_route_and_notifies_clients() {
    let (_temp, config) = project("Hello");
    let watcher = MockWatcher::new();
    let app = start(&config, &watcher);
    let mut notifications = app.subscribe().unwrap();

    fs::write(&config.source, "World").unwrap();
    watcher.emit(&config.source, WatchEventKind::Modified);
    assert!(wait_for_content(&config.mirrored_path(), "World").await);

    // The copy is observed as a change to the mirrored file
    watcher.emit(config.mirrored_path(), WatchEventKind::Modified);
    let notification = tokio::time::timeout(Duration::from_secs(2), notifications.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(notification.event(), "readme-update");
    assert_eq!(
        serde_json::to_value(&notification).unwrap(),
        serde_json::json!({"type": "custom", "event": "readme-update"})
    );

    let (status, _, body) = get(app.router(), "/README.md").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "World");
}

#[tokio::test]
async fn startup_fails_when_source_missing() {
    let (_temp, config) = project("Hello");
    fs::remove_file(&config.source).unwrap();
    let watcher = MockWatcher::new();

    let result = create_app(&config, &watcher);

    let Err(StartupError::Mirror(err)) = result else {
        panic!("expected mirror error");
    };
    assert_eq!(err.io_kind(), std::io::ErrorKind::NotFound);
    assert!(!config.mirrored_path().exists());
    assert_eq!(watcher.subscriber_count(), 0);
}

#[tokio::test]
async fn unrelated_change_neither_copies_nor_notifies() {
    let (temp, config) = project("Hello");
    let watcher = MockWatcher::new();
    let app = start(&config, &watcher);
    let mut notifications = app.subscribe().unwrap();

    fs::write(&config.source, "Changed").unwrap();
    let other = temp.path().join("notes.txt");
    fs::write(&other, "unrelated").unwrap();
    assert_eq!(watcher.emit(&other, WatchEventKind::Modified), 1);
    let public_other = config.public_dir.join("other.txt");
    fs::write(&public_other, "unrelated").unwrap();
    assert_eq!(watcher.emit(&public_other, WatchEventKind::Modified), 1);

    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(fs::read_to_string(config.mirrored_path()).unwrap(), "Hello");
    assert!(notifications.try_recv().is_err());
}

#[tokio::test]
async fn matching_etag_returns_not_modified() {
    let (_temp, config) = project("Hello");
    let watcher = MockWatcher::new();
    let app = start(&config, &watcher);

    let (_, headers, _) = get(app.router(), "/README.md").await;
    let etag = headers.get(header::ETAG).unwrap().clone();

    let response = app
        .router()
        .oneshot(
            Request::builder()
                .uri("/README.md")
                .header(header::IF_NONE_MATCH, etag)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
}

#[tokio::test]
async fn document_route_returns_not_found_when_mirror_deleted() {
    let (_temp, config) = project("Hello");
    let watcher = MockWatcher::new();
    let app = start(&config, &watcher);
    fs::remove_file(config.mirrored_path()).unwrap();

    let (status, _, body) = get(app.router(), "/README.md").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["path"], "/README.md");
}

#[tokio::test]
async fn config_endpoint_describes_document() {
    let (_temp, config) = project("Hello");
    let watcher = MockWatcher::new();
    let app = start(&config, &watcher);

    let (status, _, body) = get(app.router(), "/api/config").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "documentRoute": "/README.md",
            "liveReloadEnabled": true,
            "event": "readme-update",
        })
    );
}

#[tokio::test]
async fn serves_public_files_and_builtin_page() {
    let (_temp, config) = project("Hello");
    fs::write(config.public_dir.join("style.css"), "body {}").unwrap();
    let watcher = MockWatcher::new();
    let app = start(&config, &watcher);

    let (status, headers, body) = get(app.router(), "/style.css").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "body {}");
    assert_eq!(
        headers.get(header::CONTENT_TYPE).unwrap(),
        "text/css; charset=utf-8"
    );

    let (status, headers, body) = get(app.router(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("loading..."));
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    let csp = headers.get("content-security-policy").unwrap().to_str().unwrap();
    assert!(csp.contains("script-src 'self'"));
    assert!(csp.contains("connect-src 'self' ws: wss:"));

    let (status, headers, _) = get(app.router(), "/__docmirror/style.css").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(header::CONTENT_TYPE).unwrap(),
        "text/css; charset=utf-8"
    );

    let (status, _, body) = get(app.router(), "/__docmirror/client.js").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/api/config"));

    let (status, _, _) = get(app.router(), "/missing.txt").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn source_change_is_mirrored_with_live_reload_disabled() {
    let (_temp, mut config) = project("Hello");
    config.live_reload_enabled = false;
    let watcher = MockWatcher::new();
    let app = start(&config, &watcher);

    assert!(app.subscribe().is_none());
    assert_eq!(watcher.subscriber_count(), 1);

    fs::write(&config.source, "World").unwrap();
    watcher.emit(&config.source, WatchEventKind::Modified);
    assert!(wait_for_content(&config.mirrored_path(), "World").await);

    // Observing the copy reaches no client
    watcher.emit(config.mirrored_path(), WatchEventKind::Modified);

    let (status, _, body) = get(app.router(), "/README.md").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "World");

    let (status, _, _) = get(app.router(), "/ws/live-reload").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn document_with_space_in_name_is_served() {
    let (_temp, mut config) = project("Hello");
    config.target = PathBuf::from("My Notes.md");
    config.route = "/My%20Notes.md".to_owned();
    fs::write(config.public_dir.join("Other File.txt"), "other").unwrap();
    let watcher = MockWatcher::new();
    let app = start(&config, &watcher);

    let (status, _, body) = get(app.router(), "/My%20Notes.md").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Hello");

    let (status, _, body) = get(app.router(), "/Other%20File.txt").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "other");
}

#[tokio::test]
async fn conflicting_document_route_is_a_startup_error() {
    for (target, route) in [
        ("api/config", "/api/config"),
        ("ws/live-reload", "/ws/live-reload"),
        (":notes.md", "/:notes.md"),
        ("{id}.md", "/{id}.md"),
    ] {
        let (_temp, mut config) = project("Hello");
        config.target = PathBuf::from(target);
        config.route = route.to_owned();
        let watcher = MockWatcher::new();

        let result = create_app(&config, &watcher);

        assert!(
            matches!(result, Err(StartupError::InvalidRoute { .. })),
            "{route} should be rejected"
        );
        assert_eq!(watcher.subscriber_count(), 0);
    }
}

#[tokio::test]
async fn websocket_forwards_notification_as_json_text() {
    let (_temp, config) = project("Hello");
    let watcher = MockWatcher::new();
    let app = start(&config, &watcher);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws/live-reload"))
        .await
        .unwrap();

    // The handler subscribes before completing the handshake
    watcher.emit(config.mirrored_path(), WatchEventKind::Modified);

    let frame = tokio::time::timeout(Duration::from_secs(2), socket.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let text = match frame {
        Message::Text(text) => text,
        other => panic!("expected text frame, got {other:?}"),
    };
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"type": "custom", "event": "readme-update"})
    );

    // A change the session does not guard sends nothing
    watcher.emit(config.public_dir.join("other.txt"), WatchEventKind::Modified);
    assert!(
        tokio::time::timeout(Duration::from_millis(100), socket.next())
            .await
            .is_err()
    );

    socket.close(None).await.unwrap();
}
