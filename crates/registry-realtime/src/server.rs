//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use registry_core::config::RealtimeConfig;
use registry_entity::user::ClientMetadata;
use registry_service::Services;

use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::connection::manager::ConnectionManager;
use crate::dispatch::ActionDispatcher;
use crate::message::types::InboundAction;
use crate::message::validator::validate_inbound;
use crate::metrics::RealtimeMetrics;

/// Central real-time engine that coordinates all WebSocket subsystems.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection manager.
    pub connections: Arc<ConnectionManager>,
    /// Action dispatcher.
    pub dispatcher: Arc<ActionDispatcher>,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    /// Configuration.
    config: RealtimeConfig,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("connections", &self.connections.connection_count())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine over the given services.
    pub fn new(config: RealtimeConfig, services: &Services) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let metrics = Arc::new(RealtimeMetrics::new());
        let connections = Arc::new(ConnectionManager::new(config.clone(), metrics.clone()));
        let dispatcher = Arc::new(ActionDispatcher::new(
            connections.clone(),
            services.visitors.clone(),
            services.gifts.clone(),
            metrics.clone(),
        ));

        info!("Real-time engine initialized");

        Self {
            connections,
            dispatcher,
            metrics,
            config,
            shutdown_tx,
        }
    }

    /// Largest inbound frame accepted, in bytes.
    pub fn max_message_bytes(&self) -> usize {
        self.config.max_message_bytes
    }

    /// Accept a socket. Nothing is sent until the client opens.
    pub fn connect(
        &self,
        metadata: ClientMetadata,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        self.connections.register(metadata)
    }

    /// Process one text frame from a client.
    ///
    /// Malformed frames and unknown action types are logged and dropped.
    pub async fn handle_inbound(&self, conn_id: &ConnectionId, raw: &str) {
        let Some(handle) = self.connections.get(conn_id) else {
            warn!(conn_id = %conn_id, "Message from unknown connection");
            return;
        };
        self.metrics.message_received();

        if let Err(e) = validate_inbound(raw, self.config.max_message_bytes) {
            self.metrics.message_dropped();
            warn!(conn_id = %conn_id, error = %e, "Dropping inbound frame");
            return;
        }

        let action: InboundAction = match serde_json::from_str(raw) {
            Ok(action) => action,
            Err(e) => {
                self.metrics.message_dropped();
                warn!(conn_id = %conn_id, error = %e, "Dropping unparseable action");
                return;
            }
        };
        debug!(conn_id = %conn_id, action = ?action, "Inbound action");

        for notification in self.dispatcher.dispatch(&handle, action).await {
            notification.deliver(&self.connections);
        }
    }

    /// Forget a socket and tell the others if a visitor left.
    pub fn handle_close(&self, conn_id: &ConnectionId) {
        let user_id = self.connections.unregister(conn_id);
        if let Some(notification) = self.dispatcher.disconnected(user_id) {
            notification.deliver(&self.connections);
        }
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signal every socket task to stop and drop all connections.
    pub fn shutdown(&self) {
        info!("Shutting down real-time engine");
        let _ = self.shutdown_tx.send(());
        self.connections.close_all();
        info!("Real-time engine shut down");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use registry_core::config::AppConfig;
    use registry_core::types::Money;
    use registry_database::{MemoryStore, Stores};
    use registry_entity::registry::CreateRegistryItem;
    use registry_payment::MockGateway;
    use registry_service::AlertService;
    use serde_json::{Value, json};

    use super::*;

    struct Harness {
        engine: RealtimeEngine,
        registry_id: String,
    }

    async fn harness() -> Harness {
        let config = AppConfig::default();
        let stores = Stores::memory(Arc::new(MemoryStore::new()));
        let alerts = Arc::new(AlertService::new(&config.alerts).unwrap());
        let services = Services::new(&config, &stores, Arc::new(MockGateway::new()), alerts);
        let item = services
            .registry
            .seed(CreateRegistryItem {
                title: "Glacier hike".to_string(),
                description: "Guided, crampons included".to_string(),
                total_price: Money::from_minor(30_000),
            })
            .await
            .unwrap();
        Harness {
            engine: RealtimeEngine::new(config.realtime, &services),
            registry_id: item.id.to_string(),
        }
    }

    async fn next(rx: &mut mpsc::Receiver<String>) -> Value {
        let raw = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timed out")
            .expect("channel closed");
        serde_json::from_str(&raw).unwrap()
    }

    fn gift(registry_id: &str, nonce: &str) -> String {
        json!({
            "type": "GIFT_CREATE",
            "data": {
                "amount": 100,
                "paymentMethodNonce": nonce,
                "nickname": "Uncle Ray",
                "comment": "Stay warm",
                "registryId": registry_id,
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_open_then_gift_notifies_peers() {
        let h = harness().await;
        let (a, mut rx_a) = h.engine.connect(ClientMetadata::default());
        let (b, mut rx_b) = h.engine.connect(ClientMetadata::default());

        h.engine.handle_inbound(&a.id, r#"{"type":"CONNECTION_OPEN"}"#).await;
        let opened = next(&mut rx_a).await;
        assert_eq!(opened["type"], "CONNECTION_OPENED");
        assert_eq!(opened["state"]["user"]["nickname"], "anonymous");
        assert!(opened["state"]["clientToken"].is_string());
        assert_eq!(opened["state"]["registry"][0]["title"], "Glacier hike");

        h.engine.handle_inbound(&b.id, r#"{"type":"CONNECTION_OPEN"}"#).await;
        assert_eq!(next(&mut rx_b).await["type"], "CONNECTION_OPENED");

        h.engine.handle_inbound(&a.id, &gift(&h.registry_id, "fake-valid-nonce")).await;
        let created = next(&mut rx_a).await;
        assert_eq!(created["type"], "GIFT_CREATED");
        assert_eq!(created["data"]["user"]["nickname"], "Uncle Ray");
        assert_eq!(created["data"]["registry"][0]["totalGiven"], 100.0);

        let peer = next(&mut rx_b).await;
        assert_eq!(peer["type"], "PEER_GIFT_CREATED");
        assert_eq!(peer["data"]["gift"]["comment"], "Stay warm");
        assert!(peer["data"]["gift"].get("amount").is_none());
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_errors_go_to_originator() {
        let h = harness().await;
        let (a, mut rx_a) = h.engine.connect(ClientMetadata::default());
        let (b, mut rx_b) = h.engine.connect(ClientMetadata::default());
        h.engine.handle_inbound(&b.id, r#"{"type":"CONNECTION_OPEN"}"#).await;
        next(&mut rx_b).await;

        h.engine.handle_inbound(&a.id, &gift(&h.registry_id, "fake-valid-nonce")).await;
        let err = next(&mut rx_a).await;
        assert_eq!(err["type"], "GIFT_CREATE_ERROR");
        assert_eq!(err["message"], "Connection not opened");

        h.engine.handle_inbound(&a.id, r#"{"type":"CONNECTION_OPEN"}"#).await;
        next(&mut rx_a).await;
        h.engine.handle_inbound(&a.id, r#"{"type":"CONNECTION_OPEN"}"#).await;
        let err = next(&mut rx_a).await;
        assert_eq!(err["type"], "CONNECTION_OPEN_ERROR");
        assert_eq!(err["message"], "Connection already opened");

        h.engine.handle_inbound(&a.id, r#"{"type":"GIFT_CREATE","data":{}}"#).await;
        assert_eq!(next(&mut rx_a).await["message"], "Missing argument: amount");

        h.engine.handle_inbound(&a.id, &gift(&h.registry_id, "fake-declined-nonce")).await;
        let err = next(&mut rx_a).await;
        assert_eq!(err["type"], "GIFT_CREATE_ERROR");
        assert_eq!(err["message"], "Do Not Honor");

        assert!(rx_b.try_recv().is_err());
        assert_eq!(h.engine.metrics.snapshot().gift_errors, 3);
    }

    #[tokio::test]
    async fn test_malformed_frames_are_dropped() {
        let h = harness().await;
        let (a, mut rx_a) = h.engine.connect(ClientMetadata::default());
        h.engine.handle_inbound(&a.id, "not json").await;
        h.engine.handle_inbound(&a.id, r#"{"type":"GIFT_REFUND"}"#).await;
        h.engine.handle_inbound(&a.id, "").await;
        assert!(rx_a.try_recv().is_err());
        assert_eq!(h.engine.metrics.snapshot().messages_dropped, 3);
    }

    #[tokio::test]
    async fn test_close_broadcasts_to_remaining() {
        let h = harness().await;
        let (a, mut rx_a) = h.engine.connect(ClientMetadata::default());
        let (b, mut rx_b) = h.engine.connect(ClientMetadata::default());
        let (pending, _rx_pending) = h.engine.connect(ClientMetadata::default());
        h.engine.handle_inbound(&a.id, r#"{"type":"CONNECTION_OPEN"}"#).await;
        let user_id = next(&mut rx_a).await["state"]["user"]["id"].clone();
        h.engine.handle_inbound(&b.id, r#"{"type":"CONNECTION_OPEN"}"#).await;
        next(&mut rx_b).await;

        h.engine.handle_close(&pending.id);
        assert!(rx_b.try_recv().is_err());

        h.engine.handle_close(&a.id);
        let closed = next(&mut rx_b).await;
        assert_eq!(closed["type"], "CONNECTION_CLOSED");
        assert_eq!(closed["userId"], user_id);
        assert_eq!(h.engine.connections.connection_count(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_signals_sockets() {
        let h = harness().await;
        let mut shutdown = h.engine.shutdown_receiver();
        let (a, _rx) = h.engine.connect(ClientMetadata::default());
        h.engine.shutdown();
        assert!(shutdown.recv().await.is_ok());
        assert!(!a.is_alive());
        assert_eq!(h.engine.connections.connection_count(), 0);
    }
}
