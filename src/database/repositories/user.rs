use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{models::User, utils::sql};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: &User) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    /// Users for the given ids, in no particular order. Unknown ids are skipped.
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>>;
    async fn update_profile(
        &self,
        id: Uuid,
        display_name: &str,
        photo_url: Option<&str>,
    ) -> Result<Option<User>>;
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<()>;
    /// Set-union: adding a name that is already listed is a no-op.
    async fn add_organization(&self, id: Uuid, organization_name: &str) -> Result<()>;
    async fn remove_organization(&self, id: Uuid, organization_name: &str) -> Result<()>;
    async fn add_direct_message_partner(&self, id: Uuid, partner_id: Uuid) -> Result<()>;
}

const USER_COLUMNS: &str = r#"
    id,
    email,
    password_hash,
    display_name,
    photo_url,
    organizations,
    direct_message_partners,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&sql(&format!(
            r#"
            INSERT INTO
                users (
                    id,
                    email,
                    password_hash,
                    display_name,
                    photo_url,
                    organizations,
                    direct_message_partners,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {USER_COLUMNS}
            "#
        )))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(&user.photo_url)
        .bind(&user.organizations)
        .bind(&user.direct_message_partners)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&sql(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        )))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&sql(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER(?)"
        )))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as::<_, User>(&sql(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = ANY(?)
            ORDER BY display_name
            "#
        )))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        display_name: &str,
        photo_url: Option<&str>,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&sql(&format!(
            r#"
            UPDATE users
            SET
                display_name = ?,
                photo_url = COALESCE(?, photo_url),
                updated_at = ?
            WHERE
                id = ?
            RETURNING {USER_COLUMNS}
            "#
        )))
        .bind(display_name)
        .bind(photo_url)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<()> {
        sqlx::query(&sql(r#"
            UPDATE users
            SET
                password_hash = ?,
                updated_at = ?
            WHERE
                id = ?
        "#))
        .bind(password_hash)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn add_organization(&self, id: Uuid, organization_name: &str) -> Result<()> {
        sqlx::query(&sql(r#"
            UPDATE users
            SET
                organizations = array_append(organizations, ?::TEXT),
                updated_at = ?
            WHERE
                id = ?
                AND NOT (? = ANY(organizations))
        "#))
        .bind(organization_name)
        .bind(Utc::now())
        .bind(id)
        .bind(organization_name)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_organization(&self, id: Uuid, organization_name: &str) -> Result<()> {
        sqlx::query(&sql(r#"
            UPDATE users
            SET
                organizations = array_remove(organizations, ?::TEXT),
                updated_at = ?
            WHERE
                id = ?
        "#))
        .bind(organization_name)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn add_direct_message_partner(&self, id: Uuid, partner_id: Uuid) -> Result<()> {
        sqlx::query(&sql(r#"
            UPDATE users
            SET
                direct_message_partners = array_append(direct_message_partners, ?::UUID),
                updated_at = ?
            WHERE
                id = ?
                AND NOT (? = ANY(direct_message_partners))
        "#))
        .bind(partner_id)
        .bind(Utc::now())
        .bind(id)
        .bind(partner_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
