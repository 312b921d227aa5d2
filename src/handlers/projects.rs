use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{
    CreateProjectInput, NewProject, NewProjectTask, Organization, ProjectTaskInput,
    ProjectWithTasks, UpdateTaskStatusInput,
};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::UserContext;

fn validate_task(
    organization: &Organization,
    index: usize,
    task: ProjectTaskInput,
) -> Result<NewProjectTask, AppError> {
    let position = index + 1;

    let title = task.title.trim();
    if title.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Task {} needs a title",
            position
        )));
    }
    let assigned_to = task.assigned_to.ok_or_else(|| {
        AppError::BadRequest(format!("Task {} needs an assignee", position))
    })?;
    let due_date = task
        .due_date
        .ok_or_else(|| AppError::BadRequest(format!("Task {} needs a due date", position)))?;

    if !organization.has_member(assigned_to) {
        return Err(AppError::BadRequest(format!(
            "Task {} is assigned to someone outside {}",
            position, organization.name
        )));
    }

    Ok(NewProjectTask {
        title: title.to_string(),
        description: task
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        assigned_to,
        due_date,
    })
}

pub async fn create_project(
    state: web::Data<AppState>,
    ctx: UserContext,
    path: web::Path<String>,
    input: web::Json<CreateProjectInput>,
) -> Result<HttpResponse, AppError> {
    let organization = state
        .organizations
        .get_for_member(&ctx.user, &path.into_inner())
        .await?;
    let input = input.into_inner();

    let name = input.name.trim().to_string();
    let description = input.description.trim().to_string();
    if name.is_empty() || description.is_empty() {
        return Err(AppError::BadRequest(
            "Please enter a project name and description".into(),
        ));
    }
    if input.tasks.is_empty() {
        return Err(AppError::BadRequest("Add at least one task".into()));
    }

    let tasks = input
        .tasks
        .into_iter()
        .enumerate()
        .map(|(index, task)| validate_task(&organization, index, task))
        .collect::<Result<Vec<_>, _>>()?;

    let mut members = vec![ctx.user_id()];
    for task in &tasks {
        if !members.contains(&task.assigned_to) {
            members.push(task.assigned_to);
        }
    }

    let created = state
        .stores
        .projects
        .create(NewProject {
            organization_name: organization.name,
            name,
            description,
            owner_id: ctx.user_id(),
            members,
            tasks,
        })
        .await?;

    log::info!(
        "User {} created project {} with {} tasks",
        ctx.user_id(),
        created.project.id,
        created.tasks.len()
    );
    Ok(ApiResponse::created(created))
}

/// The caller's projects, each with only the tasks assigned to the caller.
pub async fn get_my_projects(
    state: web::Data<AppState>,
    ctx: UserContext,
) -> Result<HttpResponse, AppError> {
    let projects = state.stores.projects.list_for_member(ctx.user_id()).await?;

    let mut response = Vec::with_capacity(projects.len());
    for project in projects {
        let tasks = state
            .stores
            .projects
            .list_tasks(project.id)
            .await?
            .into_iter()
            .filter(|task| task.assigned_to == ctx.user_id())
            .collect();
        response.push(ProjectWithTasks { project, tasks });
    }

    Ok(ApiResponse::success(response))
}

pub async fn get_project_tasks(
    state: web::Data<AppState>,
    ctx: UserContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let project_id = path.into_inner();
    let project = state
        .stores
        .projects
        .find_by_id(project_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {} not found", project_id)))?;

    if !project.members.contains(&ctx.user_id()) {
        return Err(AppError::Forbidden(
            "You are not a member of this project".into(),
        ));
    }

    let tasks = state.stores.projects.list_tasks(project.id).await?;
    Ok(ApiResponse::success(tasks))
}

pub async fn update_task_status(
    state: web::Data<AppState>,
    ctx: UserContext,
    path: web::Path<Uuid>,
    input: web::Json<UpdateTaskStatusInput>,
) -> Result<HttpResponse, AppError> {
    let task_id = path.into_inner();
    let task = state
        .stores
        .projects
        .find_task(task_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task {} not found", task_id)))?;

    if task.assigned_to != ctx.user_id() {
        let project = state.stores.projects.find_by_id(task.project_id).await?;
        if project.is_none_or(|project| project.owner_id != ctx.user_id()) {
            return Err(AppError::PermissionDenied(
                "Only the assignee or the project owner can update this task".into(),
            ));
        }
    }

    let task = state
        .stores
        .projects
        .update_task_status(task.id, input.status)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task {} not found", task_id)))?;

    Ok(ApiResponse::success(task))
}
