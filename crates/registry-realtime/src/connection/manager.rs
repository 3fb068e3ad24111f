//! Connection manager: connection lifecycle and message routing.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info};

use registry_core::config::RealtimeConfig;
use registry_core::error::AppError;
use registry_core::types::UserId;
use registry_entity::user::ClientMetadata;

use crate::message::types::OutboundAction;
use crate::metrics::RealtimeMetrics;

use super::handle::{ConnectionHandle, ConnectionId};
use super::pool::ConnectionPool;

/// Manages all live WebSocket connections.
#[derive(Debug)]
pub struct ConnectionManager {
    /// Connection pool.
    pool: ConnectionPool,
    /// Metrics.
    metrics: Arc<RealtimeMetrics>,
    /// Configuration.
    config: RealtimeConfig,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(config: RealtimeConfig, metrics: Arc<RealtimeMetrics>) -> Self {
        Self {
            pool: ConnectionPool::new(),
            metrics,
            config,
        }
    }

    /// Registers a newly accepted socket.
    ///
    /// Returns the connection handle and a receiver for outbound messages.
    pub fn register(
        &self,
        metadata: ClientMetadata,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.outbound_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(metadata, tx));

        self.pool.add(handle.clone());
        self.metrics.connection_opened();

        info!(
            conn_id = %handle.id,
            ip = handle.metadata.ip.as_deref().unwrap_or("-"),
            "WebSocket connection registered"
        );

        (handle, rx)
    }

    /// Marks a connection as an opened visitor.
    pub fn open(&self, conn_id: &ConnectionId, user_id: UserId) -> Result<(), AppError> {
        let handle = self
            .pool
            .get(conn_id)
            .ok_or_else(|| AppError::not_found("Connection is closed"))?;
        if !handle.attach_user(user_id) {
            return Err(AppError::conflict("Connection already opened"));
        }
        self.pool.index_user(&handle);

        info!(conn_id = %conn_id, user_id = %user_id, "Connection opened");
        Ok(())
    }

    /// Unregisters a connection. Returns the visitor id if it had been opened.
    pub fn unregister(&self, conn_id: &ConnectionId) -> Option<UserId> {
        let handle = self.pool.remove(conn_id)?;
        handle.mark_closed();
        self.metrics.connection_closed();

        info!(
            conn_id = %conn_id,
            user_id = ?handle.user_id(),
            "WebSocket connection unregistered"
        );
        handle.user_id()
    }

    /// Gets a connection handle.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.pool.get(conn_id)
    }

    /// Sends to one connection.
    pub fn send_to_connection(&self, conn_id: &ConnectionId, action: &OutboundAction) -> bool {
        let Some(handle) = self.pool.get(conn_id) else {
            return false;
        };
        let Some(payload) = self.encode(action) else {
            return false;
        };
        let sent = handle.send(payload);
        if sent {
            self.metrics.messages_sent(1);
        }
        sent
    }

    /// Sends to every opened connection, optionally excluding one.
    pub fn broadcast_opened(&self, except: Option<ConnectionId>, action: &OutboundAction) -> usize {
        self.fan_out(self.pool.opened_connections(except), action)
    }

    /// Returns total number of live connections.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Returns number of distinct opened visitors.
    pub fn opened_count(&self) -> usize {
        self.pool.user_count()
    }

    /// Closes and forgets every connection.
    pub fn close_all(&self) {
        let closed = self.pool.clear();
        for handle in &closed {
            handle.mark_closed();
            self.metrics.connection_closed();
        }
        info!(count = closed.len(), "All connections closed");
    }

    fn fan_out(&self, handles: Vec<Arc<ConnectionHandle>>, action: &OutboundAction) -> usize {
        if handles.is_empty() {
            return 0;
        }
        let Some(payload) = self.encode(action) else {
            return 0;
        };
        let sent = handles
            .iter()
            .filter(|handle| handle.send(payload.clone()))
            .count();
        self.metrics.messages_sent(sent);
        sent
    }

    fn encode(&self, action: &OutboundAction) -> Option<String> {
        action
            .encode()
            .inspect_err(|e| error!(action = action.kind(), error = %e, "Failed to encode action"))
            .ok()
    }
}
