//! Visitor onboarding.

use std::sync::Arc;

use tracing::info;

use registry_core::result::AppResult;
use registry_database::UserStore;
use registry_entity::registry::RegistryItemView;
use registry_entity::user::{ClientMetadata, CreateUser, User};
use registry_payment::PaymentGateway;

use crate::registry::RegistryService;

/// Everything a freshly opened visitor is sent.
#[derive(Debug, Clone)]
pub struct OpenedVisitor {
    /// The new visitor document.
    pub user: User,
    /// Current registry snapshot.
    pub registry: Vec<RegistryItemView>,
    /// Client token for the payment drop-in.
    pub client_token: String,
}

/// Creates visitor documents for new connections.
pub struct VisitorService {
    users: Arc<dyn UserStore>,
    registry: Arc<RegistryService>,
    gateway: Arc<dyn PaymentGateway>,
    default_nickname: String,
}

impl std::fmt::Debug for VisitorService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisitorService")
            .field("gateway", &self.gateway.name())
            .field("default_nickname", &self.default_nickname)
            .finish_non_exhaustive()
    }
}

impl VisitorService {
    /// Creates a new visitor service.
    pub fn new(
        users: Arc<dyn UserStore>,
        registry: Arc<RegistryService>,
        gateway: Arc<dyn PaymentGateway>,
        default_nickname: String,
    ) -> Self {
        Self {
            users,
            registry,
            gateway,
            default_nickname,
        }
    }

    /// Issue a client token, create the visitor and load the registry.
    ///
    /// The token is requested first so a gateway outage leaves no orphan
    /// user behind.
    pub async fn open(&self, metadata: ClientMetadata) -> AppResult<OpenedVisitor> {
        let client_token = self.gateway.client_token().await?;

        let user = self
            .users
            .create(CreateUser::anonymous(self.default_nickname.clone(), metadata))
            .await?;
        let registry = self.registry.snapshot().await?;

        info!(
            user_id = %user.id,
            items = registry.len(),
            "Visitor opened"
        );

        Ok(OpenedVisitor {
            user,
            registry,
            client_token,
        })
    }
}
