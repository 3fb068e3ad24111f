//! Outbound actions paired with who should receive them.

use tracing::debug;

use crate::connection::handle::ConnectionId;
use crate::connection::manager::ConnectionManager;
use crate::message::types::OutboundAction;

/// Who receives an outbound action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// One socket.
    Connection(ConnectionId),
    /// Every opened socket except one.
    OpenedExcept(ConnectionId),
    /// Every opened socket.
    Opened,
}

/// An outbound action and its audience.
#[derive(Debug, Clone)]
pub struct Notification {
    /// Recipients.
    pub audience: Audience,
    /// What to send.
    pub action: OutboundAction,
}

impl Notification {
    /// Reply to the originating socket.
    pub fn reply(conn_id: ConnectionId, action: OutboundAction) -> Self {
        Self {
            audience: Audience::Connection(conn_id),
            action,
        }
    }

    /// Tell every other opened socket.
    pub fn peers(conn_id: ConnectionId, action: OutboundAction) -> Self {
        Self {
            audience: Audience::OpenedExcept(conn_id),
            action,
        }
    }

    /// Tell every opened socket.
    pub fn everyone(action: OutboundAction) -> Self {
        Self {
            audience: Audience::Opened,
            action,
        }
    }

    /// Queue the action on every matching socket. Returns how many were reached.
    pub fn deliver(&self, connections: &ConnectionManager) -> usize {
        let sent = match self.audience {
            Audience::Connection(conn_id) => {
                usize::from(connections.send_to_connection(&conn_id, &self.action))
            }
            Audience::OpenedExcept(conn_id) => {
                connections.broadcast_opened(Some(conn_id), &self.action)
            }
            Audience::Opened => connections.broadcast_opened(None, &self.action),
        };
        debug!(
            action = self.action.kind(),
            audience = ?self.audience,
            recipients = sent,
            "Notification delivered"
        );
        sent
    }
}
