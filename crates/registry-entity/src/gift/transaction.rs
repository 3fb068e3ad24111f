//! Payment transaction record attached to each gift.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use registry_core::types::Money;

/// What the payment gateway reported for a successful sale.
///
/// Stored verbatim on the gift; never shown to other visitors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTransaction {
    /// Gateway transaction id.
    pub id: String,
    /// Gateway status at the time of the sale (e.g. `SUBMITTED_FOR_SETTLEMENT`).
    pub status: String,
    /// Amount charged.
    pub amount: Money,
    /// ISO currency code, when the gateway reports one.
    #[serde(default)]
    pub currency: Option<String>,
    /// Processor name (`braintree`, `mock`).
    pub processor: String,
    /// When the gateway created the transaction.
    pub created_at: DateTime<Utc>,
}
