use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;

use crate::AppState;
use crate::database::models::{
    CreateUserInput, ForgotPasswordInput, LoginInput, ResetPasswordInput, UpdateProfileInput,
};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::UserContext;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarInput {
    pub content_type: String,
    pub data: String,
}

pub async fn register(
    state: web::Data<AppState>,
    input: web::Json<CreateUserInput>,
) -> Result<HttpResponse, AppError> {
    let response = state.auth_service.register(input.into_inner()).await?;
    Ok(ApiResponse::created(response))
}

pub async fn login(
    state: web::Data<AppState>,
    input: web::Json<LoginInput>,
) -> Result<HttpResponse, AppError> {
    let response = state.auth_service.login(input.into_inner()).await?;
    Ok(ApiResponse::success(response))
}

pub async fn me(ctx: UserContext) -> Result<HttpResponse, AppError> {
    Ok(ApiResponse::success(ctx.user))
}

pub async fn update_me(
    state: web::Data<AppState>,
    ctx: UserContext,
    input: web::Json<UpdateProfileInput>,
) -> Result<HttpResponse, AppError> {
    let display_name = input.display_name.trim();
    if display_name.is_empty() {
        return Err(AppError::BadRequest("Please enter your name".into()));
    }

    let user = state
        .stores
        .users
        .update_profile(ctx.user_id(), display_name, input.photo_url.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(ApiResponse::success(user))
}

pub async fn upload_avatar(
    state: web::Data<AppState>,
    ctx: UserContext,
    input: web::Json<AvatarInput>,
) -> Result<HttpResponse, AppError> {
    if !input.content_type.starts_with("image/") {
        return Err(AppError::BadRequest("Profile pictures must be images".into()));
    }

    let object = state
        .media
        .upload_avatar(ctx.user_id(), &input.content_type, &input.data)
        .await?;

    let user = state
        .stores
        .users
        .update_profile(ctx.user_id(), &ctx.user.display_name, Some(&object.url))
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(ApiResponse::success(user))
}

pub async fn forgot_password(
    state: web::Data<AppState>,
    input: web::Json<ForgotPasswordInput>,
) -> Result<HttpResponse, AppError> {
    let reset_token = state.auth_service.forgot_password(&input.email).await?;

    if !state.config.is_production() {
        return Ok(ApiResponse::success(json!({ "token": reset_token.token })));
    }

    Ok(ApiResponse::success_message(
        "Password reset email sent successfully. Please check your inbox.",
    ))
}

pub async fn reset_password(
    state: web::Data<AppState>,
    input: web::Json<ResetPasswordInput>,
) -> Result<HttpResponse, AppError> {
    state
        .auth_service
        .reset_password(&input.token, &input.new_password)
        .await?;

    Ok(ApiResponse::success_message(
        "Password has been reset successfully.",
    ))
}
