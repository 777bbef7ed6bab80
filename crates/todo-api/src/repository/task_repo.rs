//! 任务仓储
//!
//! 提供 tasks 表的数据访问

use async_trait::async_trait;
use chrono::Utc;
use todo_shared::database::Database;
use todo_shared::error::Result;
use uuid::Uuid;

use super::traits::TaskRepositoryTrait;
use crate::models::{NewTask, Task, TaskFilter, TaskUpdate};

/// PostgreSQL 任务仓储
pub struct PgTaskRepository {
    db: Database,
}

impl PgTaskRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskRepositoryTrait for PgTaskRepository {
    async fn find(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, title, status, created_at
            FROM tasks
            WHERE ($1::uuid IS NULL OR id = $1)
              AND ($2::uuid IS NULL OR owner_id = $2)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(filter.id)
        .bind(filter.owner_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(tasks)
    }

    async fn insert(&self, task: NewTask) -> Result<Task> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (id, owner_id, title, status, created_at)
            VALUES ($1, $2, $3, FALSE, $4)
            RETURNING id, owner_id, title, status, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(task.owner_id)
        .bind(&task.title)
        .bind(Utc::now())
        .fetch_one(self.db.pool())
        .await?;

        Ok(task)
    }

    async fn update_one(&self, filter: &TaskFilter, update: &TaskUpdate) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET status = COALESCE($3, status)
            WHERE id = (
                SELECT id FROM tasks
                WHERE ($1::uuid IS NULL OR id = $1)
                  AND ($2::uuid IS NULL OR owner_id = $2)
                ORDER BY created_at ASC, id ASC
                LIMIT 1
            )
            "#,
        )
        .bind(filter.id)
        .bind(filter.owner_id)
        .bind(update.status)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_one(&self, filter: &TaskFilter) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM tasks
            WHERE id = (
                SELECT id FROM tasks
                WHERE ($1::uuid IS NULL OR id = $1)
                  AND ($2::uuid IS NULL OR owner_id = $2)
                ORDER BY created_at ASC, id ASC
                LIMIT 1
            )
            "#,
        )
        .bind(filter.id)
        .bind(filter.owner_id)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<()> {
        self.db.health_check().await
    }
}
