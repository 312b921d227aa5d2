use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{
    models::{Document, Event, NewDocument, NewEvent, Transcription},
    utils::sql,
};

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create(&self, document: NewDocument) -> Result<Document>;
    /// Newest first.
    async fn list(&self) -> Result<Vec<Document>>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn create(&self, event: NewEvent) -> Result<Event>;
    /// Ordered by start time.
    async fn list(&self) -> Result<Vec<Event>>;
}

#[async_trait]
pub trait TranscriptionStore: Send + Sync {
    async fn create(&self, user_id: Uuid, meeting_id: &str, summary: &str)
    -> Result<Transcription>;
    /// Newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Transcription>>;
}

#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for DocumentRepository {
    async fn create(&self, document: NewDocument) -> Result<Document> {
        let document = sqlx::query_as::<_, Document>(&sql(r#"
            INSERT INTO
                documents (id, name, file_name, path, url, content_type, uploaded_by, created_at)
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING
                id, name, file_name, path, url, content_type, uploaded_by, created_at
        "#))
        .bind(Uuid::new_v4())
        .bind(&document.name)
        .bind(&document.file_name)
        .bind(&document.path)
        .bind(&document.url)
        .bind(&document.content_type)
        .bind(document.uploaded_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(document)
    }

    async fn list(&self) -> Result<Vec<Document>> {
        let documents = sqlx::query_as::<_, Document>(&sql(r#"
            SELECT id, name, file_name, path, url, content_type, uploaded_by, created_at
            FROM documents
            ORDER BY created_at DESC
        "#))
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }
}

#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for EventRepository {
    async fn create(&self, event: NewEvent) -> Result<Event> {
        let event = sqlx::query_as::<_, Event>(&sql(r#"
            INSERT INTO
                events (id, title, description, location, start_at, end_at, created_by, created_at)
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING
                id, title, description, location, start_at, end_at, created_by, created_at
        "#))
        .bind(Uuid::new_v4())
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.start_at)
        .bind(event.end_at)
        .bind(event.created_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    async fn list(&self) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&sql(r#"
            SELECT id, title, description, location, start_at, end_at, created_by, created_at
            FROM events
            ORDER BY start_at ASC
        "#))
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }
}

#[derive(Clone)]
pub struct TranscriptionRepository {
    pool: PgPool,
}

impl TranscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TranscriptionStore for TranscriptionRepository {
    async fn create(
        &self,
        user_id: Uuid,
        meeting_id: &str,
        summary: &str,
    ) -> Result<Transcription> {
        let transcription = sqlx::query_as::<_, Transcription>(&sql(r#"
            INSERT INTO transcriptions (id, user_id, meeting_id, summary, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, user_id, meeting_id, summary, created_at
        "#))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(meeting_id)
        .bind(summary)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(transcription)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Transcription>> {
        let transcriptions = sqlx::query_as::<_, Transcription>(&sql(r#"
            SELECT id, user_id, meeting_id, summary, created_at
            FROM transcriptions
            WHERE user_id = ?
            ORDER BY created_at DESC
        "#))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(transcriptions)
    }
}
