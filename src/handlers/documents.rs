use actix_web::{HttpResponse, web};

use crate::AppState;
use crate::database::models::{MediaKind, MediaUpload, NewDocument, UploadDocumentInput};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::UserContext;

pub async fn upload_document(
    state: web::Data<AppState>,
    ctx: UserContext,
    input: web::Json<UploadDocumentInput>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();
    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Please enter a document name".into()));
    }

    let file_name = input.file_name.trim();
    let object = state
        .media
        .upload(
            &MediaUpload {
                kind: MediaKind::Document,
                content_type: input.content_type.clone(),
                data: input.data,
                file_name: Some(file_name.to_string()),
            },
            ctx.user_id(),
        )
        .await?;

    let document = state
        .stores
        .documents
        .create(NewDocument {
            name: name.to_string(),
            file_name: file_name.to_string(),
            path: object.path,
            url: object.url,
            content_type: input.content_type,
            uploaded_by: ctx.user_id(),
        })
        .await?;

    Ok(ApiResponse::created(document))
}

pub async fn get_documents(
    state: web::Data<AppState>,
    _ctx: UserContext,
) -> Result<HttpResponse, AppError> {
    let documents = state.stores.documents.list().await?;
    Ok(ApiResponse::success(documents))
}
