//! End-to-end tests for the dev server over real sockets.

use std::time::Duration;

use hot_router::config::DevServerConfig;
use hot_router::reload::FileTrigger;

mod common;

use common::{client, get, TestServer};

const V1: &str = r#"
[[route]]
path = "/hello"
body = "hello v1"
"#;

const V2: &str = r#"
[[route]]
path = "/hello"
body = "hello v2"

[[route]]
path = "/added"
method = "POST"
status = 201
content_type = "application/json"
body = '{"added":true}'
"#;

#[tokio::test]
async fn serves_routes_from_file() {
    let server = TestServer::start(V1).await;

    assert_eq!(get(&server.url("/hello")).await, (200, "hello v1".into()));
    assert_eq!(get(&server.url("/nope")).await.0, 404);
}

#[tokio::test]
async fn reload_endpoint_picks_up_edits() {
    let server = TestServer::start(V1).await;
    server.write_routes(V2);

    let res = client()
        .post(server.url("/__dev/reload"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 202);
    server.wait_for_version(2).await;

    assert_eq!(get(&server.url("/hello")).await, (200, "hello v2".into()));

    let res = client().post(server.url("/added")).send().await.unwrap();
    assert_eq!(res.status(), 201);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.text().await.unwrap(), r#"{"added":true}"#);
}

#[tokio::test]
async fn broken_routes_file_keeps_previous_routes() {
    let server = TestServer::start(V1).await;
    server.write_routes("[[route]]\npath = \"no-slash\"\n");

    client()
        .post(server.url("/__dev/reload"))
        .send()
        .await
        .unwrap();
    server.wait_for_failures(1).await;

    assert_eq!(server.hot.version(), Some(1));
    assert_eq!(get(&server.url("/hello")).await, (200, "hello v1".into()));

    let (status, body) = get(&server.url("/__dev/status")).await;
    assert_eq!(status, 200);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["reloads_failed"], 1);
    assert_eq!(json["router_version"], 1);
}

#[tokio::test]
async fn status_and_health() {
    let server = TestServer::start(V1).await;

    assert_eq!(get(&server.url("/__dev/health")).await, (200, "ok".into()));

    let (status, body) = get(&server.url("/__dev/status")).await;
    assert_eq!(status, 200);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["state"], "active");
    assert_eq!(json["mode"], "development");
    assert_eq!(json["router_version"], 1);
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn responses_carry_request_id() {
    let server = TestServer::start(V1).await;

    let res = client().get(server.url("/hello")).send().await.unwrap();
    assert!(res.headers().contains_key("x-request-id"));

    let res = client()
        .get(server.url("/hello"))
        .header("x-request-id", "test-id-42")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "test-id-42");
}

#[tokio::test]
async fn cors_headers_in_development() {
    let server = TestServer::start(V1).await;

    let res = client()
        .get(server.url("/hello"))
        .header("origin", "http://localhost:5173")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn cors_can_be_disabled() {
    let mut config = DevServerConfig::default();
    config.dev.cors = false;
    let server = TestServer::start_with(V1, config).await;

    let res = client()
        .get(server.url("/hello"))
        .header("origin", "http://localhost:5173")
        .send()
        .await
        .unwrap();
    assert!(!res.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn file_watcher_triggers_reload() {
    let server = TestServer::start(V1).await;

    let trigger = FileTrigger::new(&[server.routes_file.clone()], Duration::from_millis(100));
    server.hot.listen(&trigger);
    let _watcher = trigger.start().unwrap();

    server.write_routes(V2);

    // A save can surface as several events; wait for the last build to land.
    for _ in 0..200 {
        if get(&server.url("/hello")).await == (200, "hello v2".into()) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("edited routes were never served");
}

#[tokio::test]
async fn static_files_served_when_no_route_matches() {
    let public = tempfile::tempdir().unwrap();
    std::fs::write(public.path().join("app.css"), "body {}").unwrap();

    let mut config = DevServerConfig::default();
    config.dev.static_dir = Some(public.path().to_path_buf());
    let server = TestServer::start_with(V1, config).await;

    assert_eq!(get(&server.url("/app.css")).await, (200, "body {}".into()));
    assert_eq!(get(&server.url("/hello")).await, (200, "hello v1".into()));
    assert_eq!(get(&server.url("/nope.css")).await.0, 404);
}
