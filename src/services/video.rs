use std::sync::LazyLock;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::database::models::User;
use crate::error::AppError;

static CALL_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap()
});

/// Claims of a per-call session token, signed with the video app secret.
#[derive(Debug, Serialize, Deserialize)]
pub struct VideoClaims {
    pub app_id: u32,
    pub call_id: String,
    pub sub: Uuid,
    pub user_name: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSession {
    pub app_id: u32,
    pub call_id: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub max_duration_seconds: i64,
}

pub fn validate_call_id(call_id: &str) -> Result<String, AppError> {
    let call_id = call_id.trim();
    if call_id.is_empty() {
        return Err(AppError::BadRequest("Please enter a call ID".into()));
    }
    if !CALL_ID_PATTERN.is_match(call_id) {
        return Err(AppError::BadRequest(
            "Call IDs may only contain letters, digits, '-' and '_' (at most 64)".into(),
        ));
    }
    Ok(call_id.to_string())
}

#[derive(Clone)]
pub struct VideoSessionIssuer {
    app_id: u32,
    app_sign: String,
    max_call_minutes: i64,
}

impl VideoSessionIssuer {
    pub fn new(config: &Config) -> Self {
        Self {
            app_id: config.video_app_id,
            app_sign: config.video_app_sign.clone(),
            max_call_minutes: config.max_call_minutes,
        }
    }

    pub fn new_call_id() -> String {
        Uuid::new_v4().simple().to_string()
    }

    pub fn issue(&self, user: &User, call_id: &str) -> Result<VideoSession, AppError> {
        let call_id = validate_call_id(call_id)?;
        let now = Utc::now();
        let expires_at = Duration::try_minutes(self.max_call_minutes)
            .and_then(|length| now.checked_add_signed(length))
            .ok_or_else(|| {
                AppError::internal_server_error_message("Call length is out of range")
            })?;

        let claims = VideoClaims {
            app_id: self.app_id,
            call_id: call_id.clone(),
            sub: user.id,
            user_name: user.display_name.clone(),
            iat: now.timestamp() as usize,
            exp: expires_at.timestamp() as usize,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.app_sign.as_bytes()),
        )
        .map_err(|e| AppError::internal_server_error_message(e.to_string()))?;

        Ok(VideoSession {
            app_id: self.app_id,
            call_id,
            user_id: user.id,
            user_name: user.display_name.clone(),
            token,
            expires_at,
            max_duration_seconds: self.max_call_minutes * 60,
        })
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<VideoClaims> {
        let data = decode::<VideoClaims>(
            token,
            &DecodingKey::from_secret(self.app_sign.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )?;
        Ok(data.claims)
    }
}
