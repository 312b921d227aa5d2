use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::Rng;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{models::PasswordResetToken, utils::sql};

/// Generate a random alphanumeric token
pub fn generate_secure_token() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                                abcdefghijklmnopqrstuvwxyz\
                                0123456789";
    const TOKEN_LEN: usize = 64;
    let mut rng = rand::rng();

    (0..TOKEN_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// A fresh token for `user_id`, valid for one hour.
pub fn new_reset_token(user_id: Uuid) -> PasswordResetToken {
    let now = Utc::now();
    PasswordResetToken {
        id: Uuid::new_v4(),
        user_id,
        token: generate_secure_token(),
        expires_at: now + Duration::hours(1),
        used_at: None,
        created_at: now,
    }
}

#[async_trait]
pub trait PasswordResetStore: Send + Sync {
    async fn create_token(&self, user_id: Uuid) -> Result<PasswordResetToken>;
    /// Unused and unexpired tokens only.
    async fn find_valid_token(&self, token: &str) -> Result<Option<PasswordResetToken>>;
    async fn mark_used(&self, token_id: Uuid) -> Result<()>;
    /// Marks every outstanding token of the user as used.
    async fn invalidate_user_tokens(&self, user_id: Uuid) -> Result<()>;
}

#[derive(Clone)]
pub struct PasswordResetTokenRepository {
    pool: PgPool,
}

impl PasswordResetTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PasswordResetStore for PasswordResetTokenRepository {
    async fn create_token(&self, user_id: Uuid) -> Result<PasswordResetToken> {
        let token = new_reset_token(user_id);

        let reset_token = sqlx::query_as::<_, PasswordResetToken>(&sql(r#"
            INSERT INTO
                password_reset_tokens (id, user_id, token, expires_at, created_at)
            VALUES
                (?, ?, ?, ?, ?)
            RETURNING
                id,
                user_id,
                token,
                expires_at,
                used_at,
                created_at
        "#))
        .bind(token.id)
        .bind(token.user_id)
        .bind(&token.token)
        .bind(token.expires_at)
        .bind(token.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(reset_token)
    }

    async fn find_valid_token(&self, token: &str) -> Result<Option<PasswordResetToken>> {
        let result = sqlx::query_as::<_, PasswordResetToken>(&sql(r#"
            SELECT
                id,
                user_id,
                token,
                expires_at,
                used_at,
                created_at
            FROM
                password_reset_tokens
            WHERE
                token = ?
                AND used_at IS NULL
                AND expires_at > ?
        "#))
        .bind(token)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(result)
    }

    async fn mark_used(&self, token_id: Uuid) -> Result<()> {
        sqlx::query(&sql(r#"
            UPDATE password_reset_tokens
            SET used_at = ?
            WHERE id = ?
        "#))
        .bind(Utc::now())
        .bind(token_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn invalidate_user_tokens(&self, user_id: Uuid) -> Result<()> {
        sqlx::query(&sql(r#"
            UPDATE password_reset_tokens
            SET used_at = ?
            WHERE user_id = ? AND used_at IS NULL
        "#))
        .bind(Utc::now())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
