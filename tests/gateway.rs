//! End-to-end tests against a gateway listening on a real socket.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use reqwest::StatusCode;
use serde_json::Value;
use tokio_tungstenite::tungstenite::Message;

mod common;

const ROUTES: &str = r#"
[[routes]]
prefix = "/"
targets = [{ kind = "static", body = "root" }]

[[routes]]
prefix = "/api"
targets = [{ kind = "static", body = "api" }]

[[routes]]
prefix = "/api/v1"
targets = [{ kind = "echo" }]

[[routes]]
prefix = "/old"
targets = [{ kind = "redirect", location = "/new", status = 301 }]

[[routes]]
prefix = "/ws"
targets = [{ kind = "websocket_echo" }]
"#;

#[tokio::test]
async fn test_longest_prefix_wins_over_the_wire() {
    let gateway = common::spawn_gateway(common::config(ROUTES)).await;
    let client = common::client();

    let body = client.get(gateway.url("/api/x")).send().await.unwrap().text().await.unwrap();
    assert_eq!(body, "api");

    let body = client.get(gateway.url("/elsewhere")).send().await.unwrap().text().await.unwrap();
    assert_eq!(body, "root");

    let echo: Value = client
        .get(gateway.url("/api/v1/users?page=2"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(echo["prefix"], "/api/v1");
    assert_eq!(echo["path"], "/api/v1/users");
    assert_eq!(echo["query"], "page=2");

    gateway.stop().await;
}

#[tokio::test]
async fn test_redirect_target() {
    let gateway = common::spawn_gateway(common::config(ROUTES)).await;

    let resp = common::client().get(gateway.url("/old/page")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(resp.headers()["location"], "/new");

    gateway.stop().await;
}

#[tokio::test]
async fn test_unmatched_path_is_empty_404_with_request_id() {
    let gateway = common::spawn_gateway(common::config(
        r#"
        [[routes]]
        prefix = "/only"
        targets = [{ kind = "echo" }]
        "#,
    ))
    .await;

    let resp = common::client()
        .get(gateway.url("/nope"))
        .header("x-request-id", "client-chosen")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let id = resp.headers()["x-request-id"].to_str().unwrap().to_string();
    assert!(id.starts_with("req_"));
    assert_ne!(id, "client-chosen");
    assert!(resp.text().await.unwrap().is_empty());

    gateway.stop().await;
}

#[tokio::test]
async fn test_request_id_reaches_handler_and_response() {
    let gateway = common::spawn_gateway(common::config(ROUTES)).await;

    let resp = common::client().get(gateway.url("/api/v1")).send().await.unwrap();
    let header = resp.headers()["x-request-id"].to_str().unwrap().to_string();
    let echo: Value = resp.json().await.unwrap();
    assert_eq!(echo["request_id"], header.as_str());

    gateway.stop().await;
}

const AUTH: &str = r#"
[auth]
enabled = true
sources = [
    { type = "cookie", name = "session" },
    { type = "header", name = "Authorization" },
]
credentials = [
    { token = "t1", scope = "/api /ws" },
    { token = "t2", scope = "/admin" },
]

[[routes]]
prefix = "/api"
targets = [{ kind = "echo" }]

[[routes]]
prefix = "/admin"
targets = [{ kind = "static", body = "admin" }]

[[routes]]
prefix = "/health"
public = true
targets = [{ kind = "static", body = "ok" }]
"#;

#[tokio::test]
async fn test_access_gate() {
    let gateway = common::spawn_gateway(common::config(AUTH)).await;
    let client = common::client();

    let resp = client.get(gateway.url("/api/items")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .get(gateway.url("/api/items"))
        .header("Authorization", "nope")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .get(gateway.url("/api/items"))
        .header("Authorization", "t1")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Value = resp.json().await.unwrap();
    assert_eq!(echo["authenticated"], true);
    assert_eq!(echo["authorized"], true);

    let resp = client
        .get(gateway.url("/admin"))
        .header("Authorization", "t1")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = client.get(gateway.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");

    gateway.stop().await;
}

#[tokio::test]
async fn test_cookie_source_takes_precedence_over_header() {
    let gateway = common::spawn_gateway(common::config(AUTH)).await;
    let client = common::client();

    // Cookie is checked first, so its credential decides.
    let resp = client
        .get(gateway.url("/admin"))
        .header("Cookie", "theme=dark; session=t2")
        .header("Authorization", "t1")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "admin");

    let resp = client
        .get(gateway.url("/api"))
        .header("Cookie", "session=t2")
        .header("Authorization", "t1")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    gateway.stop().await;
}

#[tokio::test]
async fn test_response_headers_applied() {
    let gateway = common::spawn_gateway(common::config(
        r#"
        [security]
        response_headers = [{ name = "x-frame-options", value = "DENY" }]

        [[routes]]
        prefix = "/"
        targets = [{ kind = "static", body = "hi" }]
        "#,
    ))
    .await;

    let resp = common::client().get(gateway.url("/")).send().await.unwrap();
    assert_eq!(resp.headers()["x-frame-options"], "DENY");

    gateway.stop().await;
}

#[tokio::test]
async fn test_hot_reload_swaps_routes() {
    let gateway = common::spawn_gateway(common::config(ROUTES)).await;
    let client = common::client();

    assert_eq!(
        client.get(gateway.url("/api")).send().await.unwrap().text().await.unwrap(),
        "api"
    );

    gateway
        .updates
        .send(common::config(
            r#"
            [[routes]]
            prefix = "/api"
            targets = [{ kind = "static", body = "api v2" }]
            "#,
        ))
        .unwrap();

    let mut body = String::new();
    for _ in 0..50 {
        body = client.get(gateway.url("/api")).send().await.unwrap().text().await.unwrap();
        if body == "api v2" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(body, "api v2");

    // "/" was dropped by the reload.
    let resp = client.get(gateway.url("/elsewhere")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    gateway.stop().await;
}

#[tokio::test]
async fn test_websocket_echo() {
    let gateway = common::spawn_gateway(common::config(ROUTES)).await;

    let (mut socket, response) = tokio_tungstenite::connect_async(gateway.ws_url("/ws/chat"))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 101);

    socket.send(Message::text("meow")).await.unwrap();
    let reply = tokio::time::timeout(Duration::from_secs(5), socket.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(reply, Message::text("meow"));

    socket.close(None).await.unwrap();
    drop(socket);
    gateway.stop().await;
}

#[tokio::test]
async fn test_websocket_requires_credential_when_protected() {
    let gateway = common::spawn_gateway(common::config(&format!(
        "{AUTH}\n[[routes]]\nprefix = \"/ws\"\ntargets = [{{ kind = \"websocket_echo\" }}]\n"
    )))
    .await;

    let err = tokio_tungstenite::connect_async(gateway.ws_url("/ws"))
        .await
        .unwrap_err();
    match err {
        tokio_tungstenite::tungstenite::Error::Http(resp) => {
            assert_eq!(resp.status().as_u16(), 401);
        }
        other => panic!("expected HTTP rejection, got {other:?}"),
    }

    gateway.stop().await;
}
