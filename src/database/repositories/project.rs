use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{
    models::{NewProject, Project, ProjectTask, ProjectWithTasks, TaskStatus},
    utils::sql,
};

#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Writes the project and all of its tasks atomically.
    async fn create(&self, project: NewProject) -> Result<ProjectWithTasks>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>>;
    /// Projects listing `user_id` as a member, newest first.
    async fn list_for_member(&self, user_id: Uuid) -> Result<Vec<Project>>;
    async fn list_owned(&self, owner_id: Uuid) -> Result<Vec<Project>>;
    /// Tasks ordered by due date.
    async fn list_tasks(&self, project_id: Uuid) -> Result<Vec<ProjectTask>>;
    async fn find_task(&self, task_id: Uuid) -> Result<Option<ProjectTask>>;
    async fn update_task_status(
        &self,
        task_id: Uuid,
        status: TaskStatus,
    ) -> Result<Option<ProjectTask>>;
}

const PROJECT_COLUMNS: &str = r#"
    id,
    organization_name,
    name,
    description,
    owner_id,
    members,
    created_at,
    updated_at
"#;

const TASK_COLUMNS: &str = r#"
    id,
    project_id,
    title,
    description,
    assigned_to,
    due_date,
    status,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectStore for ProjectRepository {
    async fn create(&self, project: NewProject) -> Result<ProjectWithTasks> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Project>(&sql(&format!(
            r#"
            INSERT INTO
                projects (
                    id,
                    organization_name,
                    name,
                    description,
                    owner_id,
                    members,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {PROJECT_COLUMNS}
            "#
        )))
        .bind(Uuid::new_v4())
        .bind(&project.organization_name)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.owner_id)
        .bind(&project.members)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let mut tasks = Vec::with_capacity(project.tasks.len());
        for task in &project.tasks {
            let task = sqlx::query_as::<_, ProjectTask>(&sql(&format!(
                r#"
                INSERT INTO
                    project_tasks (
                        id,
                        project_id,
                        title,
                        description,
                        assigned_to,
                        due_date,
                        status,
                        created_at,
                        updated_at
                    )
                VALUES
                    (?, ?, ?, ?, ?, ?, ?, ?, ?)
                RETURNING {TASK_COLUMNS}
                "#
            )))
            .bind(Uuid::new_v4())
            .bind(created.id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.assigned_to)
            .bind(task.due_date)
            .bind(TaskStatus::Pending)
            .bind(now)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;
            tasks.push(task);
        }

        tx.commit().await?;

        Ok(ProjectWithTasks {
            project: created,
            tasks,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>> {
        let project = sqlx::query_as::<_, Project>(&sql(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?"
        )))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    async fn list_for_member(&self, user_id: Uuid) -> Result<Vec<Project>> {
        let projects = sqlx::query_as::<_, Project>(&sql(&format!(
            r#"
            SELECT {PROJECT_COLUMNS}
            FROM projects
            WHERE ? = ANY(members)
            ORDER BY created_at DESC
            "#
        )))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    async fn list_owned(&self, owner_id: Uuid) -> Result<Vec<Project>> {
        let projects = sqlx::query_as::<_, Project>(&sql(&format!(
            r#"
            SELECT {PROJECT_COLUMNS}
            FROM projects
            WHERE owner_id = ?
            ORDER BY created_at DESC
            "#
        )))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    async fn list_tasks(&self, project_id: Uuid) -> Result<Vec<ProjectTask>> {
        let tasks = sqlx::query_as::<_, ProjectTask>(&sql(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM project_tasks
            WHERE project_id = ?
            ORDER BY due_date ASC, created_at ASC
            "#
        )))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn find_task(&self, task_id: Uuid) -> Result<Option<ProjectTask>> {
        let task = sqlx::query_as::<_, ProjectTask>(&sql(&format!(
            "SELECT {TASK_COLUMNS} FROM project_tasks WHERE id = ?"
        )))
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn update_task_status(
        &self,
        task_id: Uuid,
        status: TaskStatus,
    ) -> Result<Option<ProjectTask>> {
        let task = sqlx::query_as::<_, ProjectTask>(&sql(&format!(
            r#"
            UPDATE project_tasks
            SET
                status = ?,
                updated_at = ?
            WHERE
                id = ?
            RETURNING {TASK_COLUMNS}
            "#
        )))
        .bind(status)
        .bind(Utc::now())
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }
}
