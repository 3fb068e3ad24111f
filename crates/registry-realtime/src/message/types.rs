//! Inbound and outbound WebSocket message type definitions.
//!
//! Every message is a JSON object discriminated by `type`.

use serde::{Deserialize, Serialize};

use registry_core::error::AppError;
use registry_core::types::UserId;
use registry_entity::gift::GiftComment;
use registry_entity::registry::RegistryItemView;
use registry_entity::user::User;

/// Actions sent by the client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InboundAction {
    /// Become a visitor and receive the registry state.
    ConnectionOpen,
    /// Give towards a registry item.
    GiftCreate {
        /// Raw arguments; checked by [`super::validator::parse_gift_request`].
        #[serde(default)]
        data: Option<serde_json::Value>,
    },
}

/// State handed to a freshly opened visitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenedState {
    /// The new visitor.
    pub user: User,
    /// Registry snapshot.
    pub registry: Vec<RegistryItemView>,
    /// Client token for the payment drop-in.
    pub client_token: String,
}

/// Payload of `GIFT_CREATED`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftCreatedData {
    /// Registry snapshot including the new gift.
    pub registry: Vec<RegistryItemView>,
    /// The giver after the nickname update.
    pub user: User,
}

/// Payload of `PEER_GIFT_CREATED`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerGiftData {
    /// Registry snapshot including the new gift.
    pub registry: Vec<RegistryItemView>,
    /// Public projection of the new gift.
    pub gift: GiftComment,
}

/// Actions sent by the server to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum OutboundAction {
    /// Reply to `CONNECTION_OPEN`.
    ConnectionOpened {
        /// Visitor, registry and client token.
        state: OpenedState,
    },
    /// `CONNECTION_OPEN` failed.
    ConnectionOpenError {
        /// Human-readable reason.
        message: String,
    },
    /// Reply to `GIFT_CREATE`.
    GiftCreated {
        /// Updated registry and giver.
        data: GiftCreatedData,
    },
    /// `GIFT_CREATE` failed.
    GiftCreateError {
        /// Human-readable reason.
        message: String,
    },
    /// Someone else gave a gift.
    PeerGiftCreated {
        /// Updated registry and the new comment.
        data: PeerGiftData,
    },
    /// An opened visitor disconnected.
    ConnectionClosed {
        /// Who left.
        user_id: UserId,
    },
}

impl OutboundAction {
    /// Wire name of this action, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConnectionOpened { .. } => "CONNECTION_OPENED",
            Self::ConnectionOpenError { .. } => "CONNECTION_OPEN_ERROR",
            Self::GiftCreated { .. } => "GIFT_CREATED",
            Self::GiftCreateError { .. } => "GIFT_CREATE_ERROR",
            Self::PeerGiftCreated { .. } => "PEER_GIFT_CREATED",
            Self::ConnectionClosed { .. } => "CONNECTION_CLOSED",
        }
    }

    /// Serialize for the socket.
    pub fn encode(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_inbound() {
        let open: InboundAction = serde_json::from_str(r#"{"type":"CONNECTION_OPEN"}"#).unwrap();
        assert_eq!(open, InboundAction::ConnectionOpen);

        let gift: InboundAction = serde_json::from_str(
            r#"{"type":"GIFT_CREATE","data":{"amount":25,"nickname":"Jo"}}"#,
        )
        .unwrap();
        match gift {
            InboundAction::GiftCreate { data: Some(data) } => assert_eq!(data["amount"], 25),
            other => panic!("unexpected {other:?}"),
        }

        let bare: InboundAction = serde_json::from_str(r#"{"type":"GIFT_CREATE"}"#).unwrap();
        assert_eq!(bare, InboundAction::GiftCreate { data: None });
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(serde_json::from_str::<InboundAction>(r#"{"type":"GIFT_DELETE"}"#).is_err());
        assert!(serde_json::from_str::<InboundAction>(r#"{"data":{}}"#).is_err());
    }

    #[test]
    fn test_outbound_shape() {
        let user_id = UserId::new();
        let closed = OutboundAction::ConnectionClosed { user_id };
        assert_eq!(
            serde_json::to_value(&closed).unwrap(),
            json!({ "type": "CONNECTION_CLOSED", "userId": user_id.to_string() })
        );

        let error = OutboundAction::GiftCreateError {
            message: "Missing argument: amount".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({ "type": "GIFT_CREATE_ERROR", "message": "Missing argument: amount" })
        );
        assert_eq!(error.kind(), "GIFT_CREATE_ERROR");
    }
}
