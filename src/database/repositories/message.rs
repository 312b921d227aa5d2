use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{
    models::{Conversation, Message, NewMessage},
    utils::sql,
};

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn insert(&self, message: NewMessage) -> Result<Message>;
    /// The whole conversation, oldest first.
    async fn list(&self, conversation: &Conversation) -> Result<Vec<Message>>;
    /// Direct messages sent to `user_id`, newest first.
    async fn list_received(&self, user_id: Uuid, limit: i64) -> Result<Vec<Message>>;
}

const MESSAGE_COLUMNS: &str = r#"
    id,
    channel_id,
    recipient_id,
    sender_id,
    author_name,
    author_photo,
    text,
    media_url,
    media_type,
    created_at
"#;

#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn insert(&self, message: NewMessage) -> Result<Message> {
        let message = sqlx::query_as::<_, Message>(&sql(&format!(
            r#"
            INSERT INTO
                messages (
                    id,
                    channel_id,
                    recipient_id,
                    sender_id,
                    author_name,
                    author_photo,
                    text,
                    media_url,
                    media_type,
                    created_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {MESSAGE_COLUMNS}
            "#
        )))
        .bind(Uuid::new_v4())
        .bind(message.channel_id)
        .bind(message.recipient_id)
        .bind(message.sender_id)
        .bind(&message.author_name)
        .bind(&message.author_photo)
        .bind(&message.text)
        .bind(&message.media_url)
        .bind(message.media_type)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    async fn list(&self, conversation: &Conversation) -> Result<Vec<Message>> {
        let messages = match *conversation {
            Conversation::Channel(channel_id) => {
                sqlx::query_as::<_, Message>(&sql(&format!(
                    r#"
                    SELECT {MESSAGE_COLUMNS}
                    FROM messages
                    WHERE channel_id = ?
                    ORDER BY created_at ASC, id ASC
                    "#
                )))
                .bind(channel_id)
                .fetch_all(&self.pool)
                .await?
            }
            Conversation::Direct(a, b) => {
                sqlx::query_as::<_, Message>(&sql(&format!(
                    r#"
                    SELECT {MESSAGE_COLUMNS}
                    FROM messages
                    WHERE
                        (sender_id = ? AND recipient_id = ?)
                        OR (sender_id = ? AND recipient_id = ?)
                    ORDER BY created_at ASC, id ASC
                    "#
                )))
                .bind(a)
                .bind(b)
                .bind(b)
                .bind(a)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(messages)
    }

    async fn list_received(&self, user_id: Uuid, limit: i64) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(&sql(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE recipient_id = ?
            ORDER BY created_at DESC
            LIMIT ?
            "#
        )))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }
}
