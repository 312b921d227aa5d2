use actix_web::{HttpResponse, web};
use chrono::Utc;

use crate::AppState;
use crate::database::models::AttendanceStatus;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::UserContext;

const HISTORY_LIMIT: i64 = 100;

pub async fn get_status(
    state: web::Data<AppState>,
    ctx: UserContext,
) -> Result<HttpResponse, AppError> {
    let record = state.stores.attendance.latest(ctx.user_id()).await?;

    Ok(ApiResponse::success(AttendanceStatus {
        clocked_in: record.as_ref().is_some_and(|r| r.is_open()),
        record,
    }))
}

pub async fn clock_in(
    state: web::Data<AppState>,
    ctx: UserContext,
) -> Result<HttpResponse, AppError> {
    let record = state
        .stores
        .attendance
        .clock_in(ctx.user_id(), Utc::now())
        .await?
        .ok_or_else(|| AppError::BadRequest("You are already clocked in".into()))?;

    Ok(ApiResponse::created(record))
}

pub async fn clock_out(
    state: web::Data<AppState>,
    ctx: UserContext,
) -> Result<HttpResponse, AppError> {
    let open = state
        .stores
        .attendance
        .latest(ctx.user_id())
        .await?
        .filter(|record| record.is_open())
        .ok_or_else(|| AppError::BadRequest("You are not clocked in".into()))?;

    let record = state
        .stores
        .attendance
        .clock_out(open.id, Utc::now())
        .await?
        .ok_or_else(|| AppError::BadRequest("You are not clocked in".into()))?;

    Ok(ApiResponse::success(record))
}

pub async fn get_history(
    state: web::Data<AppState>,
    ctx: UserContext,
) -> Result<HttpResponse, AppError> {
    let records = state
        .stores
        .attendance
        .history(ctx.user_id(), HISTORY_LIMIT)
        .await?;
    Ok(ApiResponse::success(records))
}
