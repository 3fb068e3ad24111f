//! Gift repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;

use registry_core::error::{AppError, ErrorKind};
use registry_core::result::AppResult;
use registry_core::types::{GiftId, RegistryItemId};
use registry_entity::gift::{CreateGift, Gift};
use registry_entity::registry::RegistryItem;
use registry_entity::user::User;

use crate::store::{GiftStore, RecordedGift};

/// Repository for gift documents.
#[derive(Debug, Clone)]
pub struct GiftRepository {
    pool: PgPool,
}

impl GiftRepository {
    /// Create a new gift repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GiftStore for GiftRepository {
    async fn record_gift(&self, gift: CreateGift, nickname: &str) -> AppResult<RecordedGift> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin gift transaction", e)
        })?;

        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET nickname = $2 WHERE id = $1 RETURNING *",
        )
        .bind(gift.user_id)
        .bind(nickname)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update nickname", e))?
        .ok_or_else(|| AppError::not_found("User not found"))?;

        // Single-statement increment; concurrent gifts never lose an update.
        let item = sqlx::query_as::<_, RegistryItem>(
            "UPDATE registry_items \
             SET total_given = total_given + $2, \
                 goal_reached = (total_given + $2) >= total_price, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING *",
        )
        .bind(gift.registry_id)
        .bind(gift.amount)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update registry total", e)
        })?
        .ok_or_else(|| AppError::not_found("Registry item not found"))?;

        let inserted = sqlx::query_as::<_, Gift>(
            "INSERT INTO gifts (id, user_id, registry_id, amount, comment, transaction_record) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING *",
        )
        .bind(GiftId::new())
        .bind(gift.user_id)
        .bind(gift.registry_id)
        .bind(gift.amount)
        .bind(&gift.comment)
        .bind(Json(&gift.transaction))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert gift", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit gift transaction", e)
        })?;

        Ok(RecordedGift {
            gift: inserted,
            user,
            item,
        })
    }

    async fn list_for_registry(&self, registry_id: RegistryItemId) -> AppResult<Vec<Gift>> {
        sqlx::query_as::<_, Gift>(
            "SELECT * FROM gifts WHERE registry_id = $1 ORDER BY created_at, id",
        )
        .bind(registry_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list gifts", e))
    }
}
