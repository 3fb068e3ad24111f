//! User repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use registry_core::error::{AppError, ErrorKind};
use registry_core::result::AppResult;
use registry_core::types::UserId;
use registry_entity::user::{CreateUser, User};

use crate::store::UserStore;

/// Repository for visitor documents.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, user: CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, ctime, nickname, user_agent, ip) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING *",
        )
        .bind(UserId::new())
        .bind(user.ctime)
        .bind(&user.nickname)
        .bind(&user.metadata.user_agent)
        .bind(&user.metadata.ip)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create user", e))
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }
}
