use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::UserContext;

#[derive(Debug, Deserialize)]
pub struct ChatInput {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    pub country: Option<String>,
}

pub async fn chat(
    state: web::Data<AppState>,
    ctx: UserContext,
    input: web::Json<ChatInput>,
) -> Result<HttpResponse, AppError> {
    let message = input.message.trim();
    if message.is_empty() {
        return Err(AppError::BadRequest("Message cannot be empty.".into()));
    }

    let reply = state.chatbot.reply(message).await.map_err(|e| {
        log::error!("Chat-bot request for user {} failed: {:#}", ctx.user_id(), e);
        AppError::ExternalService("Error sending message to chatbot.".into())
    })?;

    Ok(ApiResponse::success(ChatReply { reply }))
}

pub async fn news(
    state: web::Data<AppState>,
    _ctx: UserContext,
    query: web::Query<NewsQuery>,
) -> Result<HttpResponse, AppError> {
    let country = query.country.as_deref().unwrap_or("us");
    let articles = state.news.top_headlines(country).await?;
    Ok(ApiResponse::success(articles.as_ref()))
}
