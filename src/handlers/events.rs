use std::collections::BTreeMap;

use actix_web::{HttpResponse, web};
use chrono::Duration;

use crate::AppState;
use crate::database::models::{CreateEventInput, Event, NewEvent};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::UserContext;

/// Events keyed by the `YYYY-MM-DD` of their start, in start order.
pub fn group_by_day(events: Vec<Event>) -> BTreeMap<String, Vec<Event>> {
    let mut days: BTreeMap<String, Vec<Event>> = BTreeMap::new();
    for event in events {
        days.entry(event.start_at.format("%Y-%m-%d").to_string())
            .or_default()
            .push(event);
    }
    days
}

pub async fn create_event(
    state: web::Data<AppState>,
    ctx: UserContext,
    input: web::Json<CreateEventInput>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();
    let title = input.title.trim();
    if title.is_empty() {
        return Err(AppError::BadRequest("Please enter an event title".into()));
    }

    let end_at = match input.end {
        Some(end) => end,
        None => input
            .start
            .checked_add_signed(Duration::hours(1))
            .ok_or_else(|| AppError::BadRequest("Event start is out of range".into()))?,
    };
    if end_at < input.start {
        return Err(AppError::BadRequest(
            "An event cannot end before it starts".into(),
        ));
    }

    let trimmed = |value: Option<String>| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let event = state
        .stores
        .events
        .create(NewEvent {
            title: title.to_string(),
            description: trimmed(input.description),
            location: trimmed(input.location),
            start_at: input.start,
            end_at,
            created_by: ctx.user_id(),
        })
        .await?;

    Ok(ApiResponse::created(event))
}

pub async fn get_events(
    state: web::Data<AppState>,
    _ctx: UserContext,
) -> Result<HttpResponse, AppError> {
    let events = state.stores.events.list().await?;
    Ok(ApiResponse::success(group_by_day(events)))
}
