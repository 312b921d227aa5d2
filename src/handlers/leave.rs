use actix_web::{HttpResponse, web};

use crate::AppState;
use crate::database::models::LeaveRequestInput;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::UserContext;

pub async fn create_leave_request(
    state: web::Data<AppState>,
    ctx: UserContext,
    input: web::Json<LeaveRequestInput>,
) -> Result<HttpResponse, AppError> {
    if input.end_date < input.start_date {
        return Err(AppError::BadRequest(
            "End date cannot be before start date".into(),
        ));
    }

    let request = state
        .stores
        .leave_requests
        .create(ctx.user_id(), &input)
        .await?;

    log::info!("User {} requested leave {}", ctx.user_id(), request.id);
    Ok(ApiResponse::created(request))
}

pub async fn get_leave_requests(
    state: web::Data<AppState>,
    ctx: UserContext,
) -> Result<HttpResponse, AppError> {
    let requests = state
        .stores
        .leave_requests
        .list_for_user(ctx.user_id())
        .await?;
    Ok(ApiResponse::success(requests))
}
