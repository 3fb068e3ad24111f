//! Registry snapshots and seeding.

use std::sync::Arc;

use tracing::info;

use registry_core::error::AppError;
use registry_core::result::AppResult;
use registry_core::types::RegistryItemId;
use registry_database::RegistryStore;
use registry_entity::registry::{CreateRegistryItem, RegistryItem, RegistryItemView};

/// Reads the registry and seeds new items.
pub struct RegistryService {
    store: Arc<dyn RegistryStore>,
}

impl std::fmt::Debug for RegistryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryService").finish_non_exhaustive()
    }
}

impl RegistryService {
    /// Creates a new registry service.
    pub fn new(store: Arc<dyn RegistryStore>) -> Self {
        Self { store }
    }

    /// Every registry item with its public gift comments.
    pub async fn snapshot(&self) -> AppResult<Vec<RegistryItemView>> {
        self.store.list_with_comments().await
    }

    /// Registry items without comments, oldest first.
    pub async fn list(&self) -> AppResult<Vec<RegistryItem>> {
        self.store.list().await
    }

    /// Look up one item, failing with `NotFound` if it does not exist.
    pub async fn get(&self, id: RegistryItemId) -> AppResult<RegistryItem> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Registry item not found"))
    }

    /// Add an item to the registry.
    pub async fn seed(&self, item: CreateRegistryItem) -> AppResult<RegistryItem> {
        if item.title.trim().is_empty() {
            return Err(AppError::validation("Registry item title must not be empty"));
        }
        if !item.total_price.is_positive() {
            return Err(AppError::validation("Registry item price must be positive"));
        }

        let item = self.store.create(item).await?;
        info!(
            registry_id = %item.id,
            title = %item.title,
            total_price = %item.total_price,
            "Registry item seeded"
        );
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use registry_core::error::ErrorKind;
    use registry_core::types::Money;
    use registry_database::MemoryStore;

    use super::*;

    fn service() -> RegistryService {
        RegistryService::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_seed_then_snapshot() {
        let service = service();
        let seeded = service
            .seed(CreateRegistryItem {
                title: "Kayak rental".to_string(),
                description: "Half a day around the lagoon".to_string(),
                total_price: Money::from_minor(12_000),
            })
            .await
            .unwrap();

        let snapshot = service.snapshot().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].item.id, seeded.id);
        assert!(snapshot[0].comments.is_empty());
        assert_eq!(service.get(seeded.id).await.unwrap().title, "Kayak rental");
    }

    #[tokio::test]
    async fn test_seed_rejects_free_items() {
        let err = service()
            .seed(CreateRegistryItem {
                title: "Nothing".to_string(),
                description: String::new(),
                total_price: Money::ZERO,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_get_missing_item() {
        let err = service().get(RegistryItemId::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
