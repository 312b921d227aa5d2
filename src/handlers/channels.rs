use actix_web::{
    HttpResponse,
    http::header::{CacheControl, CacheDirective},
    web,
};
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{
    Channel, ChannelQuery, ChannelVisibility, Conversation, CreateChannelInput, NewChannel,
    SendMessageInput,
};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::{Destination, UserContext, message_hub::snapshot_stream};

/// The channel, if the caller may read and post in it.
async fn accessible_channel(
    state: &AppState,
    ctx: &UserContext,
    channel_id: Uuid,
) -> Result<Channel, AppError> {
    let channel = state
        .stores
        .channels
        .find_by_id(channel_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Channel {} not found", channel_id)))?;

    if !ctx.belongs_to(&channel.organization_name) || !channel.admits(ctx.user_id()) {
        return Err(AppError::Forbidden(
            "You do not have access to this channel".into(),
        ));
    }
    Ok(channel)
}

/// Response for a live subscription: snapshot events until the client goes away.
pub(crate) fn event_stream(state: &AppState, conversation: Conversation) -> HttpResponse {
    state.messaging.hub().prune();
    let stream = snapshot_stream(state.messaging.store(), state.messaging.hub(), conversation);

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(CacheControl(vec![CacheDirective::NoCache]))
        .streaming(stream)
}

pub async fn create_channel(
    state: web::Data<AppState>,
    ctx: UserContext,
    path: web::Path<String>,
    input: web::Json<CreateChannelInput>,
) -> Result<HttpResponse, AppError> {
    let organization = state
        .organizations
        .get_for_member(&ctx.user, &path.into_inner())
        .await?;
    let input = input.into_inner();

    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Please enter a channel name".into()));
    }

    let mut members = vec![ctx.user_id()];
    if input.visibility == ChannelVisibility::Private {
        for member in input.members {
            if !organization.has_member(member) {
                return Err(AppError::BadRequest(format!(
                    "User {} is not a member of {}",
                    member, organization.name
                )));
            }
            if !members.contains(&member) {
                members.push(member);
            }
        }
    }

    let channel = state
        .stores
        .channels
        .create(NewChannel {
            organization_name: organization.name,
            name: name.to_string(),
            description: input
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            visibility: input.visibility,
            members,
            created_by: ctx.user_id(),
        })
        .await?;

    log::info!("User {} created channel {}", ctx.user_id(), channel.id);
    Ok(ApiResponse::created(channel))
}

pub async fn get_channels(
    state: web::Data<AppState>,
    ctx: UserContext,
    path: web::Path<String>,
    query: web::Query<ChannelQuery>,
) -> Result<HttpResponse, AppError> {
    let organization = state
        .organizations
        .get_for_member(&ctx.user, &path.into_inner())
        .await?;

    let channels: Vec<Channel> = state
        .stores
        .channels
        .list_for_organization(&organization.name, query.search.as_deref())
        .await?
        .into_iter()
        .filter(|channel| channel.admits(ctx.user_id()))
        .collect();

    Ok(ApiResponse::success(channels))
}

pub async fn get_channel(
    state: web::Data<AppState>,
    ctx: UserContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let channel = accessible_channel(&state, &ctx, path.into_inner()).await?;
    Ok(ApiResponse::success(channel))
}

pub async fn get_messages(
    state: web::Data<AppState>,
    ctx: UserContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let channel = accessible_channel(&state, &ctx, path.into_inner()).await?;
    let messages = state
        .messaging
        .history(&Conversation::Channel(channel.id))
        .await?;
    Ok(ApiResponse::success(messages))
}

pub async fn send_message(
    state: web::Data<AppState>,
    ctx: UserContext,
    path: web::Path<Uuid>,
    input: web::Json<SendMessageInput>,
) -> Result<HttpResponse, AppError> {
    let channel = accessible_channel(&state, &ctx, path.into_inner()).await?;
    let message = state
        .messaging
        .send(Destination::Channel(channel.id), &ctx.user, input.into_inner())
        .await?;
    Ok(ApiResponse::created(message))
}

pub async fn stream_messages(
    state: web::Data<AppState>,
    ctx: UserContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let channel = accessible_channel(&state, &ctx, path.into_inner()).await?;
    Ok(event_stream(&state, Conversation::Channel(channel.id)))
}
