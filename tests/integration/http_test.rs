//! Integration tests for the HTTP surface.

mod helpers;

use axum::http::StatusCode;

use helpers::{TestApp, gift_frame};

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_detailed_health_counts_visitors() {
    let app = TestApp::spawn().await;
    let (_visitor, _) = app.visitor().await;
    let mut pending = app.connect().await;
    pending
        .send_json(&gift_frame(&app.item.id.to_string(), 5.0, "fake-valid-nonce", "Bob"))
        .await;
    assert_eq!(pending.recv().await["message"], "Connection not opened");

    let (status, body) = app.get("/api/health/detailed").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database"], "connected");
    assert_eq!(body["data"]["ws_connections"], 2);
    assert_eq!(body["data"]["online_visitors"], 1);
}

#[tokio::test]
async fn test_registry_snapshot_reflects_gifts() {
    let app = TestApp::spawn().await;
    let (mut giver, _) = app.visitor().await;
    giver
        .send_json(&gift_frame(&app.item.id.to_string(), 25.5, "fake-valid-nonce", "Nana"))
        .await;
    giver.recv().await;

    let (status, body) = app.get("/api/registry").await;

    assert_eq!(status, StatusCode::OK);
    let item = &body["data"][0];
    assert_eq!(item["totalGiven"], 25.5);
    assert_eq!(item["comments"][0]["nickname"], "Nana");
}

#[tokio::test]
async fn test_ws_requires_upgrade() {
    let app = TestApp::spawn().await;

    let status = raw_get(&app).await;

    assert!(status.is_client_error(), "Expected 4xx, got {status}");
}

async fn raw_get(app: &TestApp) -> StatusCode {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let mut stream = tokio::net::TcpStream::connect(app.addr)
        .await
        .expect("Failed to connect");
    stream
        .write_all(b"GET /ws HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .expect("Failed to write request");
    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .await
        .expect("Failed to read response");
    let status_line = String::from_utf8_lossy(&response);
    let code = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|c| c.parse::<u16>().ok())
        .expect("No status code");
    StatusCode::from_u16(code).expect("Invalid status code")
}
