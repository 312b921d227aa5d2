use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{
    models::{LeaveRequest, LeaveRequestInput, LeaveStatus},
    utils::sql,
};

#[async_trait]
pub trait LeaveRequestStore: Send + Sync {
    /// Always stored as pending.
    async fn create(&self, user_id: Uuid, input: &LeaveRequestInput) -> Result<LeaveRequest>;
    /// Newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<LeaveRequest>>;
}

#[derive(Clone)]
pub struct LeaveRequestRepository {
    pool: PgPool,
}

impl LeaveRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeaveRequestStore for LeaveRequestRepository {
    async fn create(&self, user_id: Uuid, input: &LeaveRequestInput) -> Result<LeaveRequest> {
        let request = sqlx::query_as::<_, LeaveRequest>(&sql(r#"
            INSERT INTO
                leave_requests (id, user_id, requested_at, start_date, end_date, reason, status)
            VALUES
                (?, ?, ?, ?, ?, ?, ?)
            RETURNING
                id,
                user_id,
                requested_at,
                start_date,
                end_date,
                reason,
                status
        "#))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(Utc::now())
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.reason.trim())
        .bind(LeaveStatus::Pending)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<LeaveRequest>> {
        let requests = sqlx::query_as::<_, LeaveRequest>(&sql(r#"
            SELECT
                id,
                user_id,
                requested_at,
                start_date,
                end_date,
                reason,
                status
            FROM
                leave_requests
            WHERE
                user_id = ?
            ORDER BY
                requested_at DESC
        "#))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }
}
