use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{CreateTodoInput, TodoQuery};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::UserContext;

pub async fn create_todo(
    state: web::Data<AppState>,
    ctx: UserContext,
    input: web::Json<CreateTodoInput>,
) -> Result<HttpResponse, AppError> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(AppError::BadRequest("Please enter a title".into()));
    }
    let description = input
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    let todo = state
        .stores
        .todos
        .create(ctx.user_id(), title, description)
        .await?;
    Ok(ApiResponse::created(todo))
}

pub async fn get_todos(
    state: web::Data<AppState>,
    ctx: UserContext,
    query: web::Query<TodoQuery>,
) -> Result<HttpResponse, AppError> {
    let todos = state
        .stores
        .todos
        .list_for_user(ctx.user_id(), query.search.as_deref())
        .await?;
    Ok(ApiResponse::success(todos))
}

pub async fn delete_todo(
    state: web::Data<AppState>,
    ctx: UserContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    if !state.stores.todos.delete(ctx.user_id(), id).await? {
        return Err(AppError::NotFound(format!("Todo {} not found", id)));
    }
    Ok(ApiResponse::success_message("Todo deleted"))
}
