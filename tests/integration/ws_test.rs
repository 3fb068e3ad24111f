//! Integration tests for the WebSocket gift flow.

mod helpers;

use serde_json::json;

use helpers::{TestApp, gift_frame};

#[tokio::test]
async fn test_open_returns_state() {
    let app = TestApp::spawn().await;

    let (_client, opened) = app.visitor().await;
    let state = &opened["state"];

    assert_eq!(state["user"]["nickname"], "anonymous");
    assert!(state["user"]["id"].is_string());
    assert!(state["user"].get("ip").is_none());
    assert!(state["user"].get("userAgent").is_none());
    assert!(state["clientToken"].as_str().is_some_and(|t| !t.is_empty()));

    let registry = state["registry"].as_array().expect("registry array");
    assert_eq!(registry.len(), 1);
    assert_eq!(registry[0]["title"], "Snorkel trip");
    assert_eq!(registry[0]["totalGiven"], 0.0);
    assert_eq!(registry[0]["goalReached"], false);
    assert_eq!(registry[0]["comments"], json!([]));
}

#[tokio::test]
async fn test_gift_reaches_giver_and_peers() {
    let app = TestApp::spawn().await;
    let registry_id = app.item.id.to_string();

    let (mut giver, opened) = app.visitor().await;
    let giver_id = opened["state"]["user"]["id"].clone();
    let (mut peer, _) = app.visitor().await;

    giver
        .send_json(&gift_frame(&registry_id, 50.0, "fake-valid-nonce", "Aunt May"))
        .await;

    let created = giver.recv().await;
    assert_eq!(created["type"], "GIFT_CREATED");
    assert_eq!(created["data"]["user"]["id"], giver_id);
    assert_eq!(created["data"]["user"]["nickname"], "Aunt May");
    let item = &created["data"]["registry"][0];
    assert_eq!(item["totalGiven"], 50.0);
    assert_eq!(item["comments"][0]["nickname"], "Aunt May");
    assert_eq!(item["comments"][0]["comment"], "From Aunt May");

    let notified = peer.recv().await;
    assert_eq!(notified["type"], "PEER_GIFT_CREATED");
    assert_eq!(notified["data"]["gift"]["userId"], giver_id);
    assert_eq!(notified["data"]["gift"]["nickname"], "Aunt May");
    assert!(notified["data"]["gift"].get("amount").is_none());
    assert_eq!(notified["data"]["registry"][0]["totalGiven"], 50.0);

    giver.assert_silent().await;

    let sales = app.gateway.sales().await;
    assert_eq!(sales.len(), 1);
    assert!(sales[0].submit_for_settlement);
}

#[tokio::test]
async fn test_gift_reaches_goal() {
    let app = TestApp::spawn().await;
    let registry_id = app.item.id.to_string();
    let (mut giver, _) = app.visitor().await;

    giver
        .send_json(&gift_frame(&registry_id, 150.0, "fake-valid-nonce", "Dad"))
        .await;
    assert_eq!(giver.recv().await["data"]["registry"][0]["goalReached"], false);

    giver
        .send_json(&gift_frame(&registry_id, 60.0, "fake-valid-nonce", "Dad"))
        .await;
    let item = &giver.recv().await["data"]["registry"][0];
    assert_eq!(item["totalGiven"], 210.0);
    assert_eq!(item["goalReached"], true);
    assert_eq!(item["comments"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_gift_errors_stay_with_sender() {
    let app = TestApp::spawn().await;
    let registry_id = app.item.id.to_string();

    let mut pending = app.connect().await;
    pending
        .send_json(&gift_frame(&registry_id, 10.0, "fake-valid-nonce", "Early"))
        .await;
    let err = pending.recv().await;
    assert_eq!(err["type"], "GIFT_CREATE_ERROR");
    assert_eq!(err["message"], "Connection not opened");

    let (mut giver, _) = app.visitor().await;
    let (mut peer, _) = app.visitor().await;

    giver
        .send_json(&json!({ "type": "GIFT_CREATE", "data": { "amount": 10 } }))
        .await;
    assert_eq!(
        giver.recv().await["message"],
        "Missing argument: paymentMethodNonce"
    );

    giver
        .send_json(&gift_frame(&registry_id, 10.0, "fake-declined-nonce", "Cousin"))
        .await;
    let err = giver.recv().await;
    assert_eq!(err["type"], "GIFT_CREATE_ERROR");
    assert_eq!(err["message"], "Do Not Honor");

    let unknown = registry_core::types::RegistryItemId::new().to_string();
    giver
        .send_json(&gift_frame(&unknown, 10.0, "fake-valid-nonce", "Cousin"))
        .await;
    let err = giver.recv().await;
    assert_eq!(err["type"], "GIFT_CREATE_ERROR");
    assert_eq!(err["message"], "Registry item not found");

    peer.assert_silent().await;

    let (status, body) = app.get("/api/registry").await;
    assert!(status.is_success());
    assert_eq!(body["data"][0]["totalGiven"], 0.0);
    assert_eq!(app.gateway.sales().await.len(), 1);
}

#[tokio::test]
async fn test_duplicate_open_is_rejected() {
    let app = TestApp::spawn().await;
    let (mut client, _) = app.visitor().await;

    client.send_json(&json!({ "type": "CONNECTION_OPEN" })).await;
    let err = client.recv().await;
    assert_eq!(err["type"], "CONNECTION_OPEN_ERROR");
    assert_eq!(err["message"], "Connection already opened");
}

#[tokio::test]
async fn test_malformed_frames_are_ignored() {
    let app = TestApp::spawn().await;
    let mut client = app.connect().await;

    client.send_text("{not json").await;
    client.send_json(&json!({ "type": "GIFT_DELETE" })).await;
    client.assert_silent().await;

    client.send_json(&json!({ "type": "CONNECTION_OPEN" })).await;
    assert_eq!(client.recv().await["type"], "CONNECTION_OPENED");
}

#[tokio::test]
async fn test_oversized_frame_is_dropped_and_socket_survives() {
    let app = TestApp::spawn().await;
    let (mut sender, _) = app.visitor().await;
    let (mut peer, _) = app.visitor().await;

    let limit = app.state.config.realtime.max_message_bytes;
    let oversized = json!({
        "type": "CONNECTION_OPEN",
        "padding": "x".repeat(limit + 4_096),
    });
    sender.send_json(&oversized).await;
    sender.assert_silent().await;
    peer.assert_silent().await;

    sender.send_json(&json!({ "type": "CONNECTION_OPEN" })).await;
    let reply = sender.recv().await;
    assert_eq!(reply["type"], "CONNECTION_OPEN_ERROR");
    assert_eq!(reply["message"], "Connection already opened");
    assert_eq!(app.state.realtime.connections.opened_count(), 2);
    assert!(app.state.realtime.metrics.snapshot().messages_dropped >= 1);
}

#[tokio::test]
async fn test_close_notifies_opened_peers() {
    let app = TestApp::spawn().await;
    let (leaver, opened) = app.visitor().await;
    let leaver_id = opened["state"]["user"]["id"].clone();
    let (mut peer, _) = app.visitor().await;

    let never_opened = app.connect().await;
    never_opened.close().await;
    peer.assert_silent().await;

    leaver.close().await;
    let closed = peer.recv().await;
    assert_eq!(closed["type"], "CONNECTION_CLOSED");
    assert_eq!(closed["userId"], leaver_id);
}

#[tokio::test]
async fn test_shutdown_closes_sockets() {
    let app = TestApp::spawn().await;
    let (mut client, _) = app.visitor().await;
    let engine = app.state.realtime.clone();

    app.shutdown().await.expect("Server should stop cleanly");

    assert!(client.closed().await);
    assert_eq!(engine.connections.connection_count(), 0);
}
