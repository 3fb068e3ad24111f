//! # registry-payment
//!
//! The [`PaymentGateway`] trait the gift flow charges through, a Braintree
//! implementation over its GraphQL API, and an in-process mock.

pub mod braintree;
pub mod gateway;
pub mod mock;

use std::sync::Arc;

use registry_core::config::{PaymentConfig, PaymentProvider};
use registry_core::result::AppResult;

pub use braintree::BraintreeGateway;
pub use gateway::{PaymentGateway, SaleRequest};
pub use mock::MockGateway;

/// Build the gateway selected by `payment.provider`.
pub fn build_gateway(config: &PaymentConfig) -> AppResult<Arc<dyn PaymentGateway>> {
    match config.provider {
        PaymentProvider::Braintree => Ok(Arc::new(BraintreeGateway::new(config)?)),
        PaymentProvider::Mock => {
            tracing::warn!("Using mock payment gateway; no card will be charged");
            Ok(Arc::new(MockGateway::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_braintree_requires_credentials() {
        let config = PaymentConfig::default();
        let err = build_gateway(&config).err().unwrap();
        assert_eq!(err.kind, registry_core::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_mock_provider() {
        let config = PaymentConfig {
            provider: PaymentProvider::Mock,
            ..PaymentConfig::default()
        };
        let gateway = build_gateway(&config).unwrap();
        assert_eq!(gateway.name(), "mock");
    }
}
