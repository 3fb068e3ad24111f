//! Realtime engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level counters.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    connections_total: AtomicU64,
    connections_active: AtomicU64,
    messages_received: AtomicU64,
    messages_dropped: AtomicU64,
    messages_sent: AtomicU64,
    gifts_created: AtomicU64,
    gift_errors: AtomicU64,
}

impl RealtimeMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new connection
    pub fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a disconnection
    pub fn connection_closed(&self) {
        self.connections_active.fetch_sub(1, Ordering::Relaxed);
    }

    /// Record a frame from a client
    pub fn message_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a frame that was malformed or of an unknown type
    pub fn message_dropped(&self) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record frames queued to clients
    pub fn messages_sent(&self, count: usize) {
        self.messages_sent.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Record a recorded gift
    pub fn gift_created(&self) {
        self.gifts_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed gift
    pub fn gift_failed(&self) {
        self.gift_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            gifts_created: self.gifts_created.load(Ordering::Relaxed),
            gift_errors: self.gift_errors.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Connections ever accepted
    pub connections_total: u64,
    /// Currently live connections
    pub connections_active: u64,
    /// Frames received from clients
    pub messages_received: u64,
    /// Frames dropped as malformed or unknown
    pub messages_dropped: u64,
    /// Frames queued to clients
    pub messages_sent: u64,
    /// Gifts recorded
    pub gifts_created: u64,
    /// Gift attempts that failed
    pub gift_errors: u64,
}
