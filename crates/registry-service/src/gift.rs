//! Gift recording: charge, persist, and rebuild the registry view.

use std::sync::Arc;

use tracing::{info, warn};

use registry_core::error::AppError;
use registry_core::result::AppResult;
use registry_core::types::{Money, RegistryItemId, UserId};
use registry_database::GiftStore;
use registry_entity::gift::{CreateGift, GiftComment};
use registry_entity::registry::RegistryItemView;
use registry_entity::user::User;
use registry_payment::{PaymentGateway, SaleRequest};

use crate::registry::RegistryService;

/// A validated gift submission.
#[derive(Debug, Clone, PartialEq)]
pub struct GiftRequest {
    /// Amount to charge.
    pub amount: Money,
    /// Nonce from the client payment drop-in.
    pub payment_method_nonce: String,
    /// Name the giver wants shown.
    pub nickname: String,
    /// Message left with the gift.
    pub comment: String,
    /// Item the gift counts towards.
    pub registry_id: RegistryItemId,
}

/// Outcome of a recorded gift.
#[derive(Debug, Clone)]
pub struct GiftReceipt {
    /// The giver after the nickname update.
    pub user: User,
    /// Registry snapshot including the new gift.
    pub registry: Vec<RegistryItemView>,
    /// Public projection of the new gift, for other visitors.
    pub comment: GiftComment,
}

/// Charges the gateway and records gifts.
pub struct GiftService {
    gifts: Arc<dyn GiftStore>,
    registry: Arc<RegistryService>,
    gateway: Arc<dyn PaymentGateway>,
    submit_for_settlement: bool,
}

impl std::fmt::Debug for GiftService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GiftService")
            .field("gateway", &self.gateway.name())
            .field("submit_for_settlement", &self.submit_for_settlement)
            .finish_non_exhaustive()
    }
}

impl GiftService {
    /// Creates a new gift service.
    pub fn new(
        gifts: Arc<dyn GiftStore>,
        registry: Arc<RegistryService>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            gifts,
            registry,
            gateway,
            submit_for_settlement: true,
        }
    }

    /// Authorize gifts without capturing them when `submit` is false.
    pub fn with_settlement(mut self, submit: bool) -> Self {
        self.submit_for_settlement = submit;
        self
    }

    /// Charge the gateway for a gift and record it.
    ///
    /// The registry item is looked up before charging so an unknown id
    /// never costs the giver anything. A failure after a successful charge
    /// is logged with the transaction id for manual reconciliation.
    pub async fn create(&self, user_id: UserId, request: GiftRequest) -> AppResult<GiftReceipt> {
        if !request.amount.is_positive() {
            return Err(AppError::validation("Invalid argument: amount"));
        }

        let item = self.registry.get(request.registry_id).await?;

        let transaction = self
            .gateway
            .sale(SaleRequest {
                amount: request.amount,
                payment_method_nonce: request.payment_method_nonce,
                submit_for_settlement: self.submit_for_settlement,
            })
            .await?;
        let transaction_id = transaction.id.clone();

        let recorded = self
            .gifts
            .record_gift(
                CreateGift {
                    user_id,
                    registry_id: item.id,
                    amount: request.amount,
                    comment: request.comment,
                    transaction,
                },
                &request.nickname,
            )
            .await
            .inspect_err(|e| {
                warn!(
                    user_id = %user_id,
                    registry_id = %item.id,
                    transaction_id = %transaction_id,
                    error = %e,
                    "Charged gift could not be recorded"
                );
            })?;

        info!(
            gift_id = %recorded.gift.id,
            user_id = %user_id,
            registry_id = %recorded.item.id,
            amount = %recorded.gift.amount,
            total_given = %recorded.item.total_given,
            goal_reached = recorded.item.goal_reached,
            "Gift recorded"
        );

        let registry = self.registry.snapshot().await?;
        let comment = GiftComment {
            user_id,
            nickname: recorded.user.nickname.clone(),
            comment: recorded.gift.comment.clone(),
            created_at: recorded.gift.created_at,
        };

        Ok(GiftReceipt {
            user: recorded.user,
            registry,
            comment,
        })
    }
}
