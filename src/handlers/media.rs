use actix_web::{HttpResponse, web};

use crate::AppState;
use crate::database::models::MediaUpload;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::UserContext;

pub async fn upload(
    state: web::Data<AppState>,
    ctx: UserContext,
    input: web::Json<MediaUpload>,
) -> Result<HttpResponse, AppError> {
    let object = state.media.upload(&input, ctx.user_id()).await?;
    Ok(ApiResponse::created(object))
}

/// Any signed-in user may read any stored object.
pub async fn download(
    state: web::Data<AppState>,
    _ctx: UserContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let (content_type, bytes) = state.media.fetch(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().content_type(content_type).body(bytes))
}
