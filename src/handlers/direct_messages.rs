use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{Conversation, SendMessageInput, User, UserInfo};
use crate::error::AppError;
use crate::handlers::channels::event_stream;
use crate::handlers::shared::ApiResponse;
use crate::services::{Destination, UserContext};

async fn partner(state: &AppState, ctx: &UserContext, partner_id: Uuid) -> Result<User, AppError> {
    if partner_id == ctx.user_id() {
        return Err(AppError::BadRequest(
            "You cannot message yourself".into(),
        ));
    }

    state
        .stores
        .users
        .find_by_id(partner_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", partner_id)))
}

pub async fn get_partners(
    state: web::Data<AppState>,
    ctx: UserContext,
) -> Result<HttpResponse, AppError> {
    let partners: Vec<UserInfo> = state
        .stores
        .users
        .find_many(&ctx.user.direct_message_partners)
        .await?
        .into_iter()
        .map(UserInfo::from)
        .collect();
    Ok(ApiResponse::success(partners))
}

pub async fn add_partner(
    state: web::Data<AppState>,
    ctx: UserContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let partner = partner(&state, &ctx, path.into_inner()).await?;

    state
        .stores
        .users
        .add_direct_message_partner(ctx.user_id(), partner.id)
        .await?;

    Ok(ApiResponse::success(UserInfo::from(partner)))
}

pub async fn get_messages(
    state: web::Data<AppState>,
    ctx: UserContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let partner = partner(&state, &ctx, path.into_inner()).await?;
    let messages = state
        .messaging
        .history(&Conversation::direct(ctx.user_id(), partner.id))
        .await?;
    Ok(ApiResponse::success(messages))
}

pub async fn send_message(
    state: web::Data<AppState>,
    ctx: UserContext,
    path: web::Path<Uuid>,
    input: web::Json<SendMessageInput>,
) -> Result<HttpResponse, AppError> {
    let partner = partner(&state, &ctx, path.into_inner()).await?;
    let message = state
        .messaging
        .send(
            Destination::Direct {
                recipient_id: partner.id,
            },
            &ctx.user,
            input.into_inner(),
        )
        .await?;

    // Starting a conversation lists the partner for the sender.
    state
        .stores
        .users
        .add_direct_message_partner(ctx.user_id(), partner.id)
        .await?;

    Ok(ApiResponse::created(message))
}

pub async fn stream_messages(
    state: web::Data<AppState>,
    ctx: UserContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let partner = partner(&state, &ctx, path.into_inner()).await?;
    Ok(event_stream(
        &state,
        Conversation::direct(ctx.user_id(), partner.id),
    ))
}
