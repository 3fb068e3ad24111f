//! # registry-realtime
//!
//! Real-time WebSocket engine for the gift registry. Provides:
//!
//! - The in-memory table of live connections, indexed by connection and
//!   by visitor
//! - Inbound action parsing and `GIFT_CREATE` argument validation
//! - Dispatch of actions to the service layer
//! - Fan-out of outbound actions to their audiences

pub mod connection;
pub mod dispatch;
pub mod message;
pub mod metrics;
pub mod notification;
pub mod server;

pub use connection::handle::{ConnectionHandle, ConnectionId};
pub use connection::manager::ConnectionManager;
pub use dispatch::ActionDispatcher;
pub use message::types::{InboundAction, OutboundAction};
pub use notification::{Audience, Notification};
pub use server::RealtimeEngine;
