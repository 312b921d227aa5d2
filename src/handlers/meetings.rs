use std::sync::LazyLock;

use actix_web::{HttpResponse, web};
use regex::Regex;
use serde::Deserialize;

use crate::AppState;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::{UserContext, VideoSessionIssuer, video::validate_call_id};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingInput {
    #[serde(default = "default_recording_type")]
    pub content_type: String,
    pub data: String,
}

fn default_recording_type() -> String {
    "audio/mp4".to_string()
}

static RECORDING_TYPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^(audio|video)/[A-Za-z0-9][A-Za-z0-9!#$&^_.+-]{0,126}$").unwrap()
});

/// Recordings must be sent as a plain `audio/*` or `video/*` type.
pub fn validate_recording_type(content_type: &str) -> Result<&str, AppError> {
    let content_type = content_type.trim();
    if RECORDING_TYPE_PATTERN.is_match(content_type) {
        Ok(content_type)
    } else {
        Err(AppError::BadRequest(format!(
            "Unsupported recording type: {}",
            content_type
        )))
    }
}

pub async fn create_meeting(
    state: web::Data<AppState>,
    ctx: UserContext,
) -> Result<HttpResponse, AppError> {
    let session = state
        .video
        .issue(&ctx.user, &VideoSessionIssuer::new_call_id())?;
    Ok(ApiResponse::created(session))
}

pub async fn join_meeting(
    state: web::Data<AppState>,
    ctx: UserContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let session = state.video.issue(&ctx.user, &path.into_inner())?;
    log::info!("User {} joined call {}", ctx.user_id(), session.call_id);
    Ok(ApiResponse::success(session))
}

pub async fn summarize_meeting(
    state: web::Data<AppState>,
    ctx: UserContext,
    path: web::Path<String>,
    input: web::Json<RecordingInput>,
) -> Result<HttpResponse, AppError> {
    let call_id = validate_call_id(&path.into_inner())?;
    let content_type = validate_recording_type(&input.content_type)?;
    let recording = state.media.decode(&input.data)?;

    let summary = state
        .summarizer
        .summarize(content_type, recording)
        .await
        .map_err(|e| {
            log::error!("Summary for call {} failed: {:#}", call_id, e);
            AppError::ExternalService("Failed to summarize the call".into())
        })?;

    let transcription = state
        .stores
        .transcriptions
        .create(ctx.user_id(), &call_id, &summary)
        .await?;

    Ok(ApiResponse::created(transcription))
}

pub async fn get_transcriptions(
    state: web::Data<AppState>,
    ctx: UserContext,
) -> Result<HttpResponse, AppError> {
    let transcriptions = state
        .stores
        .transcriptions
        .list_for_user(ctx.user_id())
        .await?;
    Ok(ApiResponse::success(transcriptions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validate_recording_type() {
        assert_eq!(validate_recording_type(" audio/mp4 ").unwrap(), "audio/mp4");
        assert!(validate_recording_type("video/webm").is_ok());
        assert!(validate_recording_type("audio/x-m4a").is_ok());

        for bad in [
            "",
            "audio/",
            "text/plain",
            "audio/mp4\r\nX: y",
            "not a mime",
            "audio/mp4; codecs",
        ] {
            assert!(
                matches!(validate_recording_type(bad), Err(AppError::BadRequest(_))),
                "{:?}",
                bad
            );
        }
    }
}
