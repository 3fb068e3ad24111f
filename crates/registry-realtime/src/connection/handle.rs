//! Individual WebSocket connection handle.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

use registry_core::types::UserId;
use registry_entity::user::ClientMetadata;

/// Unique connection identifier
pub type ConnectionId = Uuid;

/// A handle to a single WebSocket connection.
///
/// Holds the sender side of the connection's outbound queue plus what we
/// know about the client. The visitor id is set once, on
/// `CONNECTION_OPEN`.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Client metadata captured at upgrade
    pub metadata: ClientMetadata,
    /// Sender for serialized outbound actions
    sender: mpsc::Sender<String>,
    /// Visitor attached by `CONNECTION_OPEN`
    user: OnceLock<UserId>,
    /// When the socket was accepted
    pub connected_at: DateTime<Utc>,
    /// Whether the connection is still alive
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle
    pub fn new(metadata: ClientMetadata, sender: mpsc::Sender<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            metadata,
            sender,
            user: OnceLock::new(),
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
        }
    }

    /// Queue a serialized message. Returns `false` if it was dropped.
    pub fn send(&self, msg: String) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(msg) {
            Ok(_) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Send buffer full, dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_closed();
                false
            }
        }
    }

    /// Visitor id, once the connection is opened
    pub fn user_id(&self) -> Option<UserId> {
        self.user.get().copied()
    }

    /// Whether `CONNECTION_OPEN` has completed on this socket
    pub fn is_opened(&self) -> bool {
        self.user.get().is_some()
    }

    /// Attach a visitor. Returns `false` if one was already attached.
    pub(crate) fn attach_user(&self, user_id: UserId) -> bool {
        self.user.set(user_id).is_ok()
    }

    /// Check if connection is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as closed
    pub fn mark_closed(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}
