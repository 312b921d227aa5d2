use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::database::models::{AttendanceRecord, LeaveRequest, Message, Project};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::UserContext;

const RECENT_ATTENDANCE: i64 = 5;
const RECENT_MESSAGES: i64 = 10;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    pub owned_projects: Vec<Project>,
    pub recent_attendance: Vec<AttendanceRecord>,
    pub received_messages: Vec<Message>,
    pub leave_requests: Vec<LeaveRequest>,
}

pub async fn get_activity(
    state: web::Data<AppState>,
    ctx: UserContext,
) -> Result<HttpResponse, AppError> {
    let user_id = ctx.user_id();
    let stores = &state.stores;

    let summary = ActivitySummary {
        owned_projects: stores.projects.list_owned(user_id).await?,
        recent_attendance: stores.attendance.history(user_id, RECENT_ATTENDANCE).await?,
        received_messages: stores.messages.list_received(user_id, RECENT_MESSAGES).await?,
        leave_requests: stores.leave_requests.list_for_user(user_id).await?,
    };

    Ok(ApiResponse::success(summary))
}
