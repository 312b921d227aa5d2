use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{
    models::Todo,
    utils::{contains_pattern, sql},
};

#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn create(&self, user_id: Uuid, title: &str, description: Option<&str>) -> Result<Todo>;
    /// Newest first, filtered by case-insensitive title substring.
    async fn list_for_user(&self, user_id: Uuid, search: Option<&str>) -> Result<Vec<Todo>>;
    /// Deletes only when the todo belongs to `user_id`. Returns whether a row went away.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool>;
}

#[derive(Clone)]
pub struct TodoRepository {
    pool: PgPool,
}

impl TodoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoStore for TodoRepository {
    async fn create(&self, user_id: Uuid, title: &str, description: Option<&str>) -> Result<Todo> {
        let todo = sqlx::query_as::<_, Todo>(&sql(r#"
            INSERT INTO todos (id, user_id, title, description, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, user_id, title, description, created_at
        "#))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(title)
        .bind(description)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(todo)
    }

    async fn list_for_user(&self, user_id: Uuid, search: Option<&str>) -> Result<Vec<Todo>> {
        let todos = sqlx::query_as::<_, Todo>(&sql(r#"
            SELECT id, user_id, title, description, created_at
            FROM todos
            WHERE user_id = ? AND title ILIKE ?
            ORDER BY created_at DESC
        "#))
        .bind(user_id)
        .bind(contains_pattern(search))
        .fetch_all(&self.pool)
        .await?;

        Ok(todos)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query(&sql("DELETE FROM todos WHERE id = ? AND user_id = ?"))
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
