use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{models::AttendanceRecord, utils::sql};

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn latest(&self, user_id: Uuid) -> Result<Option<AttendanceRecord>>;
    /// Opens a record. `None` if the user already has an open one.
    async fn clock_in(&self, user_id: Uuid, at: DateTime<Utc>)
    -> Result<Option<AttendanceRecord>>;
    /// Closes the given record. `None` if it does not exist or is already closed.
    async fn clock_out(&self, record_id: Uuid, at: DateTime<Utc>)
    -> Result<Option<AttendanceRecord>>;
    /// Newest first.
    async fn history(&self, user_id: Uuid, limit: i64) -> Result<Vec<AttendanceRecord>>;
}

#[derive(Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceStore for AttendanceRepository {
    async fn latest(&self, user_id: Uuid) -> Result<Option<AttendanceRecord>> {
        let record = sqlx::query_as::<_, AttendanceRecord>(&sql(r#"
            SELECT id, user_id, clock_in, clock_out
            FROM attendance
            WHERE user_id = ?
            ORDER BY clock_in DESC
            LIMIT 1
        "#))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn clock_in(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<AttendanceRecord>> {
        // idx_attendance_open allows one open record per user
        let record = sqlx::query_as::<_, AttendanceRecord>(&sql(r#"
            INSERT INTO attendance (id, user_id, clock_in)
            VALUES (?, ?, ?)
            ON CONFLICT DO NOTHING
            RETURNING id, user_id, clock_in, clock_out
        "#))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn clock_out(
        &self,
        record_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<AttendanceRecord>> {
        let record = sqlx::query_as::<_, AttendanceRecord>(&sql(r#"
            UPDATE attendance
            SET clock_out = ?
            WHERE id = ? AND clock_out IS NULL
            RETURNING id, user_id, clock_in, clock_out
        "#))
        .bind(at)
        .bind(record_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn history(&self, user_id: Uuid, limit: i64) -> Result<Vec<AttendanceRecord>> {
        let records = sqlx::query_as::<_, AttendanceRecord>(&sql(r#"
            SELECT id, user_id, clock_in, clock_out
            FROM attendance
            WHERE user_id = ?
            ORDER BY clock_in DESC
            LIMIT ?
        "#))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
