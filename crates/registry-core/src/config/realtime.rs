//! Real-time WebSocket engine configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Per-connection outbound queue capacity.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer_size: usize,
    /// Largest inbound text frame accepted, in bytes.
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
    /// Nickname given to visitors until their first gift.
    #[serde(default = "default_nickname")]
    pub default_nickname: String,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            outbound_buffer_size: default_outbound_buffer(),
            max_message_bytes: default_max_message_bytes(),
            default_nickname: default_nickname(),
        }
    }
}

fn default_outbound_buffer() -> usize {
    256
}

fn default_max_message_bytes() -> usize {
    65_536
}

fn default_nickname() -> String {
    "anonymous".to_string()
}
