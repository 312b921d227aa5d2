use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{
    models::{Channel, NewChannel},
    utils::{contains_pattern, sql},
};

#[async_trait]
pub trait ChannelStore: Send + Sync {
    async fn create(&self, channel: NewChannel) -> Result<Channel>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Channel>>;
    /// Every channel of the organization whose name contains `search`
    /// (case-insensitive), ordered by name.
    async fn list_for_organization(
        &self,
        organization_name: &str,
        search: Option<&str>,
    ) -> Result<Vec<Channel>>;
}

#[derive(Clone)]
pub struct ChannelRepository {
    pool: PgPool,
}

impl ChannelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChannelStore for ChannelRepository {
    async fn create(&self, channel: NewChannel) -> Result<Channel> {
        let channel = sqlx::query_as::<_, Channel>(&sql(r#"
            INSERT INTO
                channels (
                    id,
                    organization_name,
                    name,
                    description,
                    visibility,
                    members,
                    created_by,
                    created_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING
                id,
                organization_name,
                name,
                description,
                visibility,
                members,
                created_by,
                created_at
        "#))
        .bind(Uuid::new_v4())
        .bind(&channel.organization_name)
        .bind(&channel.name)
        .bind(&channel.description)
        .bind(channel.visibility)
        .bind(&channel.members)
        .bind(channel.created_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(channel)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Channel>> {
        let channel = sqlx::query_as::<_, Channel>(&sql(r#"
            SELECT
                id,
                organization_name,
                name,
                description,
                visibility,
                members,
                created_by,
                created_at
            FROM
                channels
            WHERE
                id = ?
        "#))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(channel)
    }

    async fn list_for_organization(
        &self,
        organization_name: &str,
        search: Option<&str>,
    ) -> Result<Vec<Channel>> {
        let pattern = contains_pattern(search);

        let channels = sqlx::query_as::<_, Channel>(&sql(r#"
            SELECT
                id,
                organization_name,
                name,
                description,
                visibility,
                members,
                created_by,
                created_at
            FROM
                channels
            WHERE
                organization_name = ?
                AND name ILIKE ?
            ORDER BY
                name
        "#))
        .bind(organization_name)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(channels)
    }
}
