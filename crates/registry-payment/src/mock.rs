//! In-process gateway for development and tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use registry_core::error::AppError;
use registry_core::result::AppResult;
use registry_entity::gift::PaymentTransaction;

use crate::gateway::{PaymentGateway, SaleRequest};

/// Approves every nonce that does not contain `declined` and keeps every
/// sale it was asked for.
#[derive(Debug, Default)]
pub struct MockGateway {
    sales: Mutex<Vec<SaleRequest>>,
}

impl MockGateway {
    /// Create a gateway with no recorded sales.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every sale requested so far, approved or not.
    pub async fn sales(&self) -> Vec<SaleRequest> {
        self.sales.lock().await.clone()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn client_token(&self) -> AppResult<String> {
        Ok(format!("mock-client-token-{}", Uuid::new_v4().simple()))
    }

    async fn sale(&self, request: SaleRequest) -> AppResult<PaymentTransaction> {
        self.sales.lock().await.push(request.clone());

        if request.payment_method_nonce.contains("declined") {
            return Err(AppError::external("Do Not Honor"));
        }

        let status = if request.submit_for_settlement {
            "SUBMITTED_FOR_SETTLEMENT"
        } else {
            "AUTHORIZED"
        };
        let transaction = PaymentTransaction {
            id: Uuid::new_v4().simple().to_string(),
            status: status.to_string(),
            amount: request.amount,
            currency: Some("USD".to_string()),
            processor: self.name().to_string(),
            created_at: Utc::now(),
        };
        info!(transaction_id = %transaction.id, amount = %transaction.amount, "Mock sale approved");
        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use registry_core::error::ErrorKind;
    use registry_core::types::Money;

    use super::*;

    fn sale(nonce: &str) -> SaleRequest {
        SaleRequest {
            amount: Money::from_minor(2_500),
            payment_method_nonce: nonce.to_string(),
            submit_for_settlement: true,
        }
    }

    #[tokio::test]
    async fn test_approves_and_records() {
        let gateway = MockGateway::new();
        let txn = gateway.sale(sale("fake-valid-nonce")).await.unwrap();
        assert_eq!(txn.amount, Money::from_minor(2_500));
        assert_eq!(txn.status, "SUBMITTED_FOR_SETTLEMENT");
        assert_eq!(gateway.sales().await.len(), 1);
    }

    #[tokio::test]
    async fn test_declined_nonce() {
        let gateway = MockGateway::new();
        let err = gateway.sale(sale("fake-processor-declined-visa-nonce")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExternalService);
        assert_eq!(gateway.sales().await.len(), 1);
    }

    #[tokio::test]
    async fn test_client_tokens_are_unique() {
        let gateway = MockGateway::new();
        let a = gateway.client_token().await.unwrap();
        let b = gateway.client_token().await.unwrap();
        assert_ne!(a, b);
    }
}
