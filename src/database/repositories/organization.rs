use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{
    models::{InvitationLink, Organization},
    utils::sql,
};

#[async_trait]
pub trait OrganizationStore: Send + Sync {
    /// Returns `None` when an organization with the same name already exists.
    async fn create(&self, organization: &Organization) -> Result<Option<Organization>>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Organization>>;
    async fn add_member(&self, name: &str, user_id: Uuid) -> Result<()>;
    async fn remove_member(&self, name: &str, user_id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait InvitationStore: Send + Sync {
    async fn create(&self, link: &InvitationLink) -> Result<InvitationLink>;
    async fn find_by_id(&self, id: &str) -> Result<Option<InvitationLink>>;
}

#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrganizationStore for OrganizationRepository {
    async fn create(&self, organization: &Organization) -> Result<Option<Organization>> {
        let created = sqlx::query_as::<_, Organization>(&sql(r#"
            INSERT INTO
                organizations (name, created_by, members, created_at)
            VALUES
                (?, ?, ?, ?)
            ON CONFLICT (name) DO NOTHING
            RETURNING
                name,
                created_by,
                members,
                created_at
        "#))
        .bind(&organization.name)
        .bind(organization.created_by)
        .bind(&organization.members)
        .bind(organization.created_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Organization>> {
        let organization = sqlx::query_as::<_, Organization>(&sql(r#"
            SELECT
                name,
                created_by,
                members,
                created_at
            FROM
                organizations
            WHERE
                name = ?
        "#))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(organization)
    }

    async fn add_member(&self, name: &str, user_id: Uuid) -> Result<()> {
        sqlx::query(&sql(r#"
            UPDATE organizations
            SET members = array_append(members, ?::UUID)
            WHERE name = ? AND NOT (? = ANY(members))
        "#))
        .bind(user_id)
        .bind(name)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_member(&self, name: &str, user_id: Uuid) -> Result<()> {
        sqlx::query(&sql(r#"
            UPDATE organizations
            SET members = array_remove(members, ?::UUID)
            WHERE name = ?
        "#))
        .bind(user_id)
        .bind(name)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvitationStore for InvitationRepository {
    async fn create(&self, link: &InvitationLink) -> Result<InvitationLink> {
        let link = sqlx::query_as::<_, InvitationLink>(&sql(r#"
            INSERT INTO
                invitation_links (id, organization_name, created_by, created_at)
            VALUES
                (?, ?, ?, ?)
            RETURNING
                id,
                organization_name,
                created_by,
                created_at
        "#))
        .bind(&link.id)
        .bind(&link.organization_name)
        .bind(link.created_by)
        .bind(link.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(link)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<InvitationLink>> {
        let link = sqlx::query_as::<_, InvitationLink>(&sql(r#"
            SELECT
                id,
                organization_name,
                created_by,
                created_at
            FROM
                invitation_links
            WHERE
                id = ?
        "#))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(link)
    }
}
