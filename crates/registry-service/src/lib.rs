//! # registry-service
//!
//! Business logic for the gift registry. Each service orchestrates the
//! store traits and the payment gateway to implement one use case.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod alert;
pub mod gift;
pub mod registry;
pub mod visitor;

use std::sync::Arc;

use registry_core::config::AppConfig;
use registry_database::Stores;
use registry_payment::PaymentGateway;

pub use alert::AlertService;
pub use gift::{GiftReceipt, GiftRequest, GiftService};
pub use registry::RegistryService;
pub use visitor::{OpenedVisitor, VisitorService};

/// Every service the transport layer needs, wired once at startup.
#[derive(Debug, Clone)]
pub struct Services {
    /// Visitor onboarding.
    pub visitors: Arc<VisitorService>,
    /// Registry reads and seeding.
    pub registry: Arc<RegistryService>,
    /// Gift recording.
    pub gifts: Arc<GiftService>,
    /// Operator alerts.
    pub alerts: Arc<AlertService>,
}

impl Services {
    /// Wire services over the given stores, gateway and alert mailer.
    pub fn new(
        config: &AppConfig,
        stores: &Stores,
        gateway: Arc<dyn PaymentGateway>,
        alerts: Arc<AlertService>,
    ) -> Self {
        let registry = Arc::new(RegistryService::new(stores.registry.clone()));
        let visitors = Arc::new(VisitorService::new(
            stores.users.clone(),
            registry.clone(),
            gateway.clone(),
            config.realtime.default_nickname.clone(),
        ));
        let gifts = Arc::new(
            GiftService::new(stores.gifts.clone(), registry.clone(), gateway)
                .with_settlement(config.payment.submit_for_settlement),
        );

        Self {
            visitors,
            registry,
            gifts,
            alerts,
        }
    }
}

#[cfg(test)]
mod tests {
    use registry_core::config::AlertsConfig;
    use registry_database::MemoryStore;
    use registry_payment::MockGateway;

    use super::*;

    #[test]
    fn test_services_share_the_given_alert_mailer() {
        let config = AppConfig::default();
        let stores = Stores::memory(Arc::new(MemoryStore::new()));
        let alerts = Arc::new(AlertService::new(&AlertsConfig::default()).unwrap());

        let services = Services::new(
            &config,
            &stores,
            Arc::new(MockGateway::new()),
            alerts.clone(),
        );

        assert!(Arc::ptr_eq(&services.alerts, &alerts));
        assert_eq!(Arc::strong_count(&alerts), 2);
    }
}
