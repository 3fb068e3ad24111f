//! Registry item repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use registry_core::error::{AppError, ErrorKind};
use registry_core::result::AppResult;
use registry_core::types::RegistryItemId;
use registry_entity::registry::{CreateRegistryItem, RegistryItem, RegistryItemView};

use crate::store::RegistryStore;

/// Every registry item with its gift comments folded into a JSON array.
///
/// Gift ids, amounts, registry ids and transaction records stay out of
/// the projection.
const LIST_WITH_COMMENTS: &str = r#"
SELECT r.id, r.title, r.description, r.total_price, r.total_given,
       r.goal_reached, r.created_at, r.updated_at,
       COALESCE(
           json_agg(
               json_build_object(
                   'userId', g.user_id,
                   'nickname', u.nickname,
                   'comment', g.comment,
                   'createdAt', g.created_at
               )
               ORDER BY g.created_at
           ) FILTER (WHERE g.id IS NOT NULL),
           '[]'::json
       ) AS comments
FROM registry_items r
LEFT JOIN gifts g ON g.registry_id = r.id
LEFT JOIN users u ON u.id = g.user_id
GROUP BY r.id
ORDER BY r.created_at, r.id
"#;

/// Repository for registry item documents.
#[derive(Debug, Clone)]
pub struct RegistryRepository {
    pool: PgPool,
}

impl RegistryRepository {
    /// Create a new registry repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistryStore for RegistryRepository {
    async fn create(&self, item: CreateRegistryItem) -> AppResult<RegistryItem> {
        sqlx::query_as::<_, RegistryItem>(
            "INSERT INTO registry_items (id, title, description, total_price, total_given, goal_reached) \
             VALUES ($1, $2, $3, $4, 0, $4 <= 0) \
             RETURNING *",
        )
        .bind(RegistryItemId::new())
        .bind(&item.title)
        .bind(&item.description)
        .bind(item.total_price)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create registry item", e)
        })
    }

    async fn find_by_id(&self, id: RegistryItemId) -> AppResult<Option<RegistryItem>> {
        sqlx::query_as::<_, RegistryItem>("SELECT * FROM registry_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find registry item", e)
            })
    }

    async fn list(&self) -> AppResult<Vec<RegistryItem>> {
        sqlx::query_as::<_, RegistryItem>("SELECT * FROM registry_items ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list registry items", e)
            })
    }

    async fn list_with_comments(&self) -> AppResult<Vec<RegistryItemView>> {
        sqlx::query_as::<_, RegistryItemView>(LIST_WITH_COMMENTS)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to load registry state", e)
            })
    }
}
