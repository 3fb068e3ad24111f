//! Store traits the service layer is written against.
//!
//! Each trait has a PostgreSQL implementation in [`crate::repositories`]
//! and a process-local one in [`crate::memory`].

use std::sync::Arc;

use async_trait::async_trait;

use registry_core::config::{DatabaseConfig, DatabaseDriver, SeedItem};
use registry_core::error::AppError;
use registry_core::result::AppResult;
use registry_core::types::{Money, RegistryItemId, UserId};
use registry_entity::gift::{CreateGift, Gift};
use registry_entity::registry::{CreateRegistryItem, RegistryItem, RegistryItemView};
use registry_entity::user::{CreateUser, User};

use crate::connection::DatabasePool;
use crate::memory::MemoryStore;
use crate::repositories::{GiftRepository, RegistryRepository, UserRepository};

/// Visitor persistence.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Insert a new visitor and return the stored document.
    async fn create(&self, user: CreateUser) -> AppResult<User>;

    /// Find a visitor by id.
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;
}

/// Registry item persistence and the read-side join.
#[async_trait]
pub trait RegistryStore: Send + Sync + 'static {
    /// Seed a new registry item.
    async fn create(&self, item: CreateRegistryItem) -> AppResult<RegistryItem>;

    /// Find a registry item by id.
    async fn find_by_id(&self, id: RegistryItemId) -> AppResult<Option<RegistryItem>>;

    /// All registry items, oldest first.
    async fn list(&self) -> AppResult<Vec<RegistryItem>>;

    /// All registry items joined with their gift comments.
    async fn list_with_comments(&self) -> AppResult<Vec<RegistryItemView>>;
}

/// Gift persistence.
#[async_trait]
pub trait GiftStore: Send + Sync + 'static {
    /// Record a paid gift.
    ///
    /// Sets the giver's nickname, increments the registry item's total
    /// (recomputing `goal_reached`) and inserts the gift, all or nothing.
    /// Fails with `NotFound` if the user or the registry item is missing.
    async fn record_gift(&self, gift: CreateGift, nickname: &str) -> AppResult<RecordedGift>;

    /// Gifts towards one registry item, oldest first.
    async fn list_for_registry(&self, registry_id: RegistryItemId) -> AppResult<Vec<Gift>>;
}

/// Everything written by [`GiftStore::record_gift`].
#[derive(Debug, Clone)]
pub struct RecordedGift {
    /// The inserted gift.
    pub gift: Gift,
    /// The giver after the nickname update.
    pub user: User,
    /// The registry item after the increment.
    pub item: RegistryItem,
}

/// The set of stores wired into the services.
#[derive(Clone)]
pub struct Stores {
    /// Visitor store.
    pub users: Arc<dyn UserStore>,
    /// Registry item store.
    pub registry: Arc<dyn RegistryStore>,
    /// Gift store.
    pub gifts: Arc<dyn GiftStore>,
    /// Backing pool, absent for the memory driver.
    pub pool: Option<DatabasePool>,
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores")
            .field("postgres", &self.pool.is_some())
            .finish()
    }
}

impl Stores {
    /// Stores backed by PostgreSQL repositories.
    pub fn postgres(pool: DatabasePool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.pool().clone())),
            registry: Arc::new(RegistryRepository::new(pool.pool().clone())),
            gifts: Arc::new(GiftRepository::new(pool.pool().clone())),
            pool: Some(pool),
        }
    }

    /// Stores backed by one shared in-memory store.
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            registry: store.clone(),
            gifts: store,
            pool: None,
        }
    }

    /// Build stores for the configured driver, connecting and migrating
    /// PostgreSQL when selected. The memory store is filled from
    /// `database.seed`.
    pub async fn from_config(config: &DatabaseConfig) -> AppResult<Self> {
        match config.driver {
            DatabaseDriver::Postgres => {
                if !config.seed.is_empty() {
                    tracing::warn!(
                        count = config.seed.len(),
                        "database.seed is ignored by the postgres driver"
                    );
                }
                let pool = DatabasePool::connect(config).await?;
                crate::migration::run_migrations(pool.pool()).await?;
                Ok(Self::postgres(pool))
            }
            DatabaseDriver::Memory => {
                tracing::warn!("Using in-memory store; registry data will not survive a restart");
                let store = Arc::new(MemoryStore::new());
                seed_memory(&store, &config.seed).await?;
                Ok(Self::memory(store))
            }
        }
    }

    /// Check the backing database, if any.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.pool {
            Some(pool) => pool.health_check().await,
            None => Ok(true),
        }
    }

    /// Whether data outlives the process.
    pub fn is_persistent(&self) -> bool {
        self.pool.is_some()
    }

    /// Release pooled connections.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

async fn seed_memory(store: &MemoryStore, items: &[SeedItem]) -> AppResult<()> {
    for seed in items {
        if seed.title.trim().is_empty() {
            return Err(AppError::configuration("database.seed item has an empty title"));
        }
        let total_price = Money::from_major(seed.price)
            .ok()
            .filter(Money::is_positive)
            .ok_or_else(|| {
                AppError::configuration(format!(
                    "database.seed item '{}' needs a positive price",
                    seed.title
                ))
            })?;
        RegistryStore::create(
            store,
            CreateRegistryItem {
                title: seed.title.clone(),
                description: seed.description.clone(),
                total_price,
            },
        )
        .await?;
    }
    if !items.is_empty() {
        tracing::info!(count = items.len(), "Memory store seeded");
    }
    Ok(())
}
