//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tower::ServiceExt;

use registry_api::AppState;
use registry_core::config::AppConfig;
use registry_core::error::AppError;
use registry_core::types::Money;
use registry_database::{MemoryStore, Stores};
use registry_entity::registry::{CreateRegistryItem, RegistryItem};
use registry_payment::MockGateway;
use registry_realtime::RealtimeEngine;
use registry_service::{AlertService, Services};

/// Test application context
pub struct TestApp {
    /// Address the server is listening on
    pub addr: SocketAddr,
    /// Shared state, for inspecting services and the engine
    pub state: AppState,
    /// Gateway that records every sale
    pub gateway: Arc<MockGateway>,
    /// The one seeded registry item
    pub item: RegistryItem,
    shutdown: Option<oneshot::Sender<()>>,
    server: Option<JoinHandle<Result<(), AppError>>>,
}

impl TestApp {
    /// Start a server over an in-memory store and the mock gateway.
    pub async fn spawn() -> Self {
        let mut config = AppConfig::default();
        config.server.shutdown_grace_seconds = 1;
        let config = Arc::new(config);

        let stores = Stores::memory(Arc::new(MemoryStore::new()));
        let gateway = Arc::new(MockGateway::new());
        let alerts =
            Arc::new(AlertService::new(&config.alerts).expect("Failed to build alert mailer"));
        let services = Services::new(&config, &stores, gateway.clone(), alerts);
        let item = services
            .registry
            .seed(CreateRegistryItem {
                title: "Snorkel trip".to_string(),
                description: "Half day on the reef".to_string(),
                total_price: Money::from_minor(20_000),
            })
            .await
            .expect("Failed to seed registry");

        let realtime = Arc::new(RealtimeEngine::new(config.realtime.clone(), &services));
        let state = AppState::new(config, stores, services, realtime);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(registry_api::app::serve(
            listener,
            state.clone(),
            async move {
                let _ = shutdown_rx.await;
            },
        ));

        Self {
            addr,
            state,
            gateway,
            item,
            shutdown: Some(shutdown_tx),
            server: Some(server),
        }
    }

    /// Router without a listener, for plain HTTP requests.
    pub fn router(&self) -> Router {
        registry_api::build_app(self.state.clone())
    }

    /// Make a GET request against the router.
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");
        let response = self
            .router()
            .oneshot(request)
            .await
            .expect("Request failed");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    /// Open a WebSocket to `/ws`.
    pub async fn connect(&self) -> WsClient {
        let (stream, _) = connect_async(format!("ws://{}/ws", self.addr))
            .await
            .expect("Failed to connect WebSocket");
        WsClient { stream }
    }

    /// Connect and complete `CONNECTION_OPEN`. Returns the client and the
    /// `CONNECTION_OPENED` payload.
    pub async fn visitor(&self) -> (WsClient, Value) {
        let mut client = self.connect().await;
        client.send_json(&serde_json::json!({ "type": "CONNECTION_OPEN" })).await;
        let opened = client.recv().await;
        assert_eq!(opened["type"], "CONNECTION_OPENED");
        (client, opened)
    }

    /// Stop the server and wait for it to finish.
    pub async fn shutdown(mut self) -> Result<(), AppError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.server.take() {
            Some(server) => server.await.expect("Server task panicked"),
            None => Ok(()),
        }
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// A test WebSocket client
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    /// Send a raw text frame.
    pub async fn send_text(&mut self, text: &str) {
        self.stream
            .send(Message::Text(text.to_string().into()))
            .await
            .expect("Failed to send frame");
    }

    /// Send a JSON frame.
    pub async fn send_json(&mut self, value: &Value) {
        self.send_text(&value.to_string()).await;
    }

    /// Next JSON text frame, failing after two seconds.
    pub async fn recv(&mut self) -> Value {
        tokio::time::timeout(Duration::from_secs(2), self.next_text())
            .await
            .expect("Timed out waiting for a frame")
            .expect("Socket closed")
    }

    /// Assert nothing arrives within a short window.
    pub async fn assert_silent(&mut self) {
        if let Ok(Some(frame)) =
            tokio::time::timeout(Duration::from_millis(200), self.next_text()).await
        {
            panic!("Unexpected frame: {frame}");
        }
    }

    /// Wait for the server to close the socket.
    pub async fn closed(&mut self) -> bool {
        tokio::time::timeout(Duration::from_secs(2), self.next_text())
            .await
            .map(|frame| frame.is_none())
            .unwrap_or(false)
    }

    /// Close from the client side.
    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }

    async fn next_text(&mut self) -> Option<Value> {
        while let Some(message) = self.stream.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    return Some(serde_json::from_str(text.as_str()).expect("Invalid JSON frame"));
                }
                Ok(Message::Close(_)) | Err(_) => return None,
                Ok(_) => continue,
            }
        }
        None
    }
}

/// A `GIFT_CREATE` frame for `registry_id`.
pub fn gift_frame(registry_id: &str, amount: f64, nonce: &str, nickname: &str) -> Value {
    serde_json::json!({
        "type": "GIFT_CREATE",
        "data": {
            "amount": amount,
            "paymentMethodNonce": nonce,
            "nickname": nickname,
            "comment": format!("From {nickname}"),
            "registryId": registry_id,
        }
    })
}
