//! User (anonymous visitor) model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use registry_core::types::UserId;

/// An anonymous visitor, created when a socket sends `CONNECTION_OPEN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// When the visitor first connected.
    pub ctime: DateTime<Utc>,
    /// Display name; replaced by the nickname given with each gift.
    pub nickname: String,
    /// Browser user agent at connect time.
    #[serde(default, skip_serializing)]
    pub user_agent: Option<String>,
    /// Client address at connect time.
    #[serde(default, skip_serializing)]
    pub ip: Option<String>,
}

/// What we know about a socket before it has a user document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMetadata {
    /// `User-Agent` request header.
    pub user_agent: Option<String>,
    /// `X-Real-IP` header, or the peer address.
    pub ip: Option<String>,
}

/// Data required to create a visitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Creation time.
    pub ctime: DateTime<Utc>,
    /// Initial nickname.
    pub nickname: String,
    /// Client metadata captured at upgrade.
    pub metadata: ClientMetadata,
}

impl CreateUser {
    /// New visitor with the given default nickname, stamped now.
    pub fn anonymous(nickname: impl Into<String>, metadata: ClientMetadata) -> Self {
        Self {
            ctime: Utc::now(),
            nickname: nickname.into(),
            metadata,
        }
    }

    /// Materialize the document under a fresh id.
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            ctime: self.ctime,
            nickname: self.nickname,
            user_agent: self.metadata.user_agent,
            ip: self.metadata.ip,
        }
    }
}
