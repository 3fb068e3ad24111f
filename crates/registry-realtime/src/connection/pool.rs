//! Connection pool: tracks all live connections by id and by visitor.

use std::sync::Arc;

use dashmap::DashMap;

use registry_core::types::UserId;

use super::handle::{ConnectionHandle, ConnectionId};

/// Thread-safe pool of all active WebSocket connections.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    /// Connection ID → connection handle.
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
    /// Visitor ID → opened connections.
    by_user: DashMap<UserId, Vec<Arc<ConnectionHandle>>>,
}

impl ConnectionPool {
    /// Creates a new empty connection pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to the pool.
    pub fn add(&self, handle: Arc<ConnectionHandle>) {
        self.by_id.insert(handle.id, handle);
    }

    /// Indexes an opened connection under its visitor.
    pub fn index_user(&self, handle: &Arc<ConnectionHandle>) {
        if let Some(user_id) = handle.user_id() {
            self.by_user.entry(user_id).or_default().push(handle.clone());
        }
    }

    /// Removes a connection from the pool.
    pub fn remove(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let (_, handle) = self.by_id.remove(conn_id)?;
        if let Some(user_id) = handle.user_id() {
            if let Some(mut connections) = self.by_user.get_mut(&user_id) {
                connections.retain(|c| c.id != *conn_id);
                if connections.is_empty() {
                    drop(connections);
                    self.by_user.remove(&user_id);
                }
            }
        }
        Some(handle)
    }

    /// Gets a specific connection by ID.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(conn_id).map(|entry| entry.value().clone())
    }

    /// Opened connections, optionally excluding one.
    pub fn opened_connections(&self, except: Option<ConnectionId>) -> Vec<Arc<ConnectionHandle>> {
        self.by_user
            .iter()
            .flat_map(|entry| entry.value().clone())
            .filter(|handle| Some(handle.id) != except)
            .collect()
    }

    /// Returns all connection handles.
    pub fn all_connections(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_id
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Returns total number of live connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }

    /// Returns number of distinct opened visitors.
    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }

    /// Drops every connection.
    pub fn clear(&self) -> Vec<Arc<ConnectionHandle>> {
        let all = self.all_connections();
        self.by_id.clear();
        self.by_user.clear();
        all
    }
}
