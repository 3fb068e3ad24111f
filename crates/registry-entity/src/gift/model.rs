//! Gift model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

use registry_core::types::{GiftId, Money, RegistryItemId, UserId};

use super::transaction::PaymentTransaction;

/// One successful payment towards a registry item. Never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Gift {
    /// Unique gift identifier.
    pub id: GiftId,
    /// Visitor who gave.
    pub user_id: UserId,
    /// Item the gift counts towards.
    pub registry_id: RegistryItemId,
    /// Amount given.
    pub amount: Money,
    /// Free-text message shown alongside the registry item.
    pub comment: String,
    /// Gateway record of the sale.
    #[sqlx(rename = "transaction_record")]
    pub transaction: Json<PaymentTransaction>,
    /// When the gift was recorded.
    pub created_at: DateTime<Utc>,
}

/// Data required to record a gift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGift {
    /// Visitor who gave.
    pub user_id: UserId,
    /// Item the gift counts towards.
    pub registry_id: RegistryItemId,
    /// Amount given.
    pub amount: Money,
    /// Free-text message.
    pub comment: String,
    /// Gateway record of the sale.
    pub transaction: PaymentTransaction,
}

impl CreateGift {
    /// Materialize the document under a fresh id, stamped now.
    pub fn into_gift(self, id: GiftId) -> Gift {
        Gift {
            id,
            user_id: self.user_id,
            registry_id: self.registry_id,
            amount: self.amount,
            comment: self.comment,
            transaction: Json(self.transaction),
            created_at: Utc::now(),
        }
    }
}

/// The public projection of a gift, embedded in registry views.
///
/// Gift id, amount, registry id and the transaction are never exposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftComment {
    /// Visitor who gave.
    pub user_id: UserId,
    /// Visitor's nickname at read time.
    pub nickname: String,
    /// Message left with the gift.
    pub comment: String,
    /// When the gift was recorded.
    pub created_at: DateTime<Utc>,
}
