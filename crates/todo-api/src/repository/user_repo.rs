//! 用户仓储
//!
//! 提供 users 表的数据访问

use async_trait::async_trait;
use chrono::Utc;
use todo_shared::database::Database;
use todo_shared::error::{Result, TodoError};
use uuid::Uuid;

use super::traits::UserRepositoryTrait;
use crate::models::{NewUser, User};

/// PostgreSQL 用户仓储
pub struct PgUserRepository {
    db: Database,
}

impl PgUserRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepositoryTrait for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(Utc::now())
        .fetch_one(self.db.pool())
        .await
        .map_err(|e| TodoError::from_unique_violation(e, "User", "username", &user.username))
    }

    async fn ping(&self) -> Result<()> {
        self.db.health_check().await
    }
}
