use actix_web::{HttpResponse, web};

use crate::AppState;
use crate::database::models::{
    AcceptInvitationInput, CreateOrganizationInput, InvitationLinkResponse, UserInfo,
};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::UserContext;

pub async fn create_organization(
    state: web::Data<AppState>,
    ctx: UserContext,
    input: web::Json<CreateOrganizationInput>,
) -> Result<HttpResponse, AppError> {
    let response = state.organizations.create(&ctx.user, &input.name).await?;
    Ok(ApiResponse::created(response))
}

pub async fn get_my_organizations(
    state: web::Data<AppState>,
    ctx: UserContext,
) -> Result<HttpResponse, AppError> {
    let organizations = state.organizations.list_for_user(&ctx.user).await?;
    Ok(ApiResponse::success(organizations))
}

pub async fn get_organization(
    state: web::Data<AppState>,
    ctx: UserContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let organization = state
        .organizations
        .get_for_member(&ctx.user, &path.into_inner())
        .await?;
    Ok(ApiResponse::success(organization))
}

pub async fn get_members(
    state: web::Data<AppState>,
    ctx: UserContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let members: Vec<UserInfo> = state
        .organizations
        .members(&ctx.user, &path.into_inner())
        .await?
        .into_iter()
        .map(UserInfo::from)
        .collect();
    Ok(ApiResponse::success(members))
}

pub async fn create_invitation(
    state: web::Data<AppState>,
    ctx: UserContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let organization = state
        .organizations
        .get_for_member(&ctx.user, &path.into_inner())
        .await?;

    let link = state
        .organizations
        .issue_invitation(&ctx.user, &organization.name)
        .await?;

    Ok(ApiResponse::created(InvitationLinkResponse {
        link: state.organizations.link_for(&link.id),
        link_id: link.id,
        organization_name: link.organization_name,
    }))
}

pub async fn leave_organization(
    state: web::Data<AppState>,
    ctx: UserContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state
        .organizations
        .leave(&ctx.user, &path.into_inner())
        .await?;
    Ok(ApiResponse::success_message("You have left the organization."))
}

pub async fn preview_invitation(
    state: web::Data<AppState>,
    _ctx: UserContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let link = state
        .organizations
        .find_invitation(&path.into_inner())
        .await?;

    Ok(ApiResponse::success(InvitationLinkResponse {
        link: state.organizations.link_for(&link.id),
        link_id: link.id,
        organization_name: link.organization_name,
    }))
}

pub async fn accept_invitation(
    state: web::Data<AppState>,
    ctx: UserContext,
    input: web::Json<AcceptInvitationInput>,
) -> Result<HttpResponse, AppError> {
    let joined = state
        .organizations
        .accept_invitation(&ctx.user, &input.link)
        .await?;
    Ok(ApiResponse::success(joined))
}
