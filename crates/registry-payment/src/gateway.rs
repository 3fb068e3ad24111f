//! Gateway trait.

use async_trait::async_trait;

use registry_core::result::AppResult;
use registry_core::types::Money;
use registry_entity::gift::PaymentTransaction;

/// A single charge against a client-side payment method nonce.
#[derive(Debug, Clone)]
pub struct SaleRequest {
    /// Amount to charge.
    pub amount: Money,
    /// One-time nonce produced by the client drop-in.
    pub payment_method_nonce: String,
    /// Capture immediately rather than only authorizing.
    pub submit_for_settlement: bool,
}

/// A payment processor.
///
/// Declines and processor-side errors are returned as
/// `ErrorKind::ExternalService` carrying the processor's message.
#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    /// Short processor name stored on each transaction.
    fn name(&self) -> &'static str;

    /// Issue a client token for the browser drop-in.
    async fn client_token(&self) -> AppResult<String>;

    /// Charge a payment method.
    async fn sale(&self, request: SaleRequest) -> AppResult<PaymentTransaction>;
}
