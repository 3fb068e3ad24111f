//! Process-local store used by `database.driver = "memory"` and by tests.
//!
//! One lock guards every collection so `record_gift` is atomic with
//! respect to other writers, matching the PostgreSQL transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use registry_core::error::AppError;
use registry_core::result::AppResult;
use registry_core::types::{GiftId, RegistryItemId, UserId};
use registry_entity::gift::{CreateGift, Gift, GiftComment};
use registry_entity::registry::{CreateRegistryItem, RegistryItem, RegistryItemView};
use registry_entity::user::{CreateUser, User};

use crate::store::{GiftStore, RecordedGift, RegistryStore, UserStore};

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<UserId, User>,
    items: HashMap<RegistryItemId, RegistryItem>,
    gifts: Vec<Gift>,
}

/// In-memory implementation of every store trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_items(state: &MemoryState) -> Vec<RegistryItem> {
    let mut items: Vec<RegistryItem> = state.items.values().cloned().collect();
    items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    items
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: CreateUser) -> AppResult<User> {
        let user = user.into_user(UserId::new());
        self.state
            .write()
            .await
            .users
            .insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }
}

#[async_trait]
impl RegistryStore for MemoryStore {
    async fn create(&self, item: CreateRegistryItem) -> AppResult<RegistryItem> {
        let item = item.into_item(RegistryItemId::new());
        self.state
            .write()
            .await
            .items
            .insert(item.id, item.clone());
        Ok(item)
    }

    async fn find_by_id(&self, id: RegistryItemId) -> AppResult<Option<RegistryItem>> {
        Ok(self.state.read().await.items.get(&id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<RegistryItem>> {
        Ok(sorted_items(&*self.state.read().await))
    }

    async fn list_with_comments(&self) -> AppResult<Vec<RegistryItemView>> {
        let state = self.state.read().await;
        let views = sorted_items(&state)
            .into_iter()
            .map(|item| {
                let comments = state
                    .gifts
                    .iter()
                    .filter(|g| g.registry_id == item.id)
                    .map(|g| GiftComment {
                        user_id: g.user_id,
                        nickname: state
                            .users
                            .get(&g.user_id)
                            .map(|u| u.nickname.clone())
                            .unwrap_or_default(),
                        comment: g.comment.clone(),
                        created_at: g.created_at,
                    })
                    .collect();
                RegistryItemView { item, comments }
            })
            .collect();
        Ok(views)
    }
}

#[async_trait]
impl GiftStore for MemoryStore {
    async fn record_gift(&self, gift: CreateGift, nickname: &str) -> AppResult<RecordedGift> {
        let mut state = self.state.write().await;

        if !state.users.contains_key(&gift.user_id) {
            return Err(AppError::not_found("User not found"));
        }
        if !state.items.contains_key(&gift.registry_id) {
            return Err(AppError::not_found("Registry item not found"));
        }

        let amount = gift.amount;
        let registry_id = gift.registry_id;
        let user_id = gift.user_id;
        let gift = gift.into_gift(GiftId::new());

        let user = state
            .users
            .get_mut(&user_id)
            .map(|u| {
                u.nickname = nickname.to_string();
                u.clone()
            })
            .ok_or_else(|| AppError::not_found("User not found"))?;
        let item = state
            .items
            .get_mut(&registry_id)
            .map(|i| {
                i.apply_gift(amount);
                i.clone()
            })
            .ok_or_else(|| AppError::not_found("Registry item not found"))?;
        state.gifts.push(gift.clone());

        Ok(RecordedGift { gift, user, item })
    }

    async fn list_for_registry(&self, registry_id: RegistryItemId) -> AppResult<Vec<Gift>> {
        Ok(self
            .state
            .read()
            .await
            .gifts
            .iter()
            .filter(|g| g.registry_id == registry_id)
            .cloned()
            .collect())
    }
}
