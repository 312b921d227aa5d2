use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::database::models::{
    CreateOrganizationResponse, InvitationLink, JoinedOrganization, Organization, User,
};
use crate::database::repositories::{InvitationStore, OrganizationStore, UserStore};
use crate::error::AppError;

/// `<scheme>://join/<link id>`
pub fn format_invitation_link(scheme: &str, link_id: &str) -> String {
    format!("{}://join/{}", scheme, link_id)
}

/// Accepts the full deep link (as scanned from a QR code or opened from a
/// URL, query string ignored) or the bare link id.
pub fn parse_invitation_link(scheme: &str, link: &str) -> Option<String> {
    let link = link.trim();
    let prefix = format!("{}://join/", scheme);

    let id = match link.strip_prefix(&prefix) {
        Some(rest) => rest.split(['?', '#']).next().unwrap_or_default(),
        None if link.contains("://") => return None,
        None => link,
    };
    let id = id.trim_end_matches('/');

    if id.is_empty() || id.contains('/') {
        None
    } else {
        Some(id.to_string())
    }
}

#[derive(Clone)]
pub struct OrganizationService {
    organizations: Arc<dyn OrganizationStore>,
    invitations: Arc<dyn InvitationStore>,
    users: Arc<dyn UserStore>,
    invite_scheme: String,
}

impl OrganizationService {
    pub fn new(
        organizations: Arc<dyn OrganizationStore>,
        invitations: Arc<dyn InvitationStore>,
        users: Arc<dyn UserStore>,
        invite_scheme: String,
    ) -> Self {
        Self {
            organizations,
            invitations,
            users,
            invite_scheme,
        }
    }

    pub fn link_for(&self, link_id: &str) -> String {
        format_invitation_link(&self.invite_scheme, link_id)
    }

    pub async fn create(
        &self,
        creator: &User,
        name: &str,
    ) -> Result<CreateOrganizationResponse, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest(
                "Please enter an organization name".into(),
            ));
        }

        let organization = Organization {
            name: name.to_string(),
            created_by: creator.id,
            members: vec![creator.id],
            created_at: Utc::now(),
        };

        let organization = self
            .organizations
            .create(&organization)
            .await?
            .ok_or_else(|| {
                AppError::Conflict(format!("Organization {} already exists", name))
            })?;

        self.users.add_organization(creator.id, name).await?;
        let link = self.issue_invitation(creator, name).await?;

        log::info!("User {} created organization {}", creator.id, name);

        Ok(CreateOrganizationResponse {
            organization,
            invitation_link: self.link_for(&link.id),
        })
    }

    /// Organizations named on the user record. Names without a backing
    /// organization are skipped.
    pub async fn list_for_user(&self, user: &User) -> Result<Vec<Organization>, AppError> {
        let mut organizations = Vec::with_capacity(user.organizations.len());
        for name in &user.organizations {
            match self.organizations.find_by_name(name).await? {
                Some(organization) => organizations.push(organization),
                None => log::warn!(
                    "User {} lists organization {} which does not exist",
                    user.id,
                    name
                ),
            }
        }
        Ok(organizations)
    }

    /// The organization, provided `user` is one of its members.
    pub async fn get_for_member(&self, user: &User, name: &str) -> Result<Organization, AppError> {
        let organization = self
            .organizations
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Organization {} not found", name)))?;

        if !organization.has_member(user.id) && !user.belongs_to(name) {
            return Err(AppError::Forbidden(format!(
                "You are not a member of {}",
                name
            )));
        }
        Ok(organization)
    }

    pub async fn members(&self, user: &User, name: &str) -> Result<Vec<User>, AppError> {
        let organization = self.get_for_member(user, name).await?;
        Ok(self.users.find_many(&organization.members).await?)
    }

    pub async fn issue_invitation(
        &self,
        creator: &User,
        organization_name: &str,
    ) -> Result<InvitationLink, AppError> {
        let link = InvitationLink {
            id: Uuid::new_v4().to_string(),
            organization_name: organization_name.to_string(),
            created_by: creator.id,
            created_at: Utc::now(),
        };
        Ok(self.invitations.create(&link).await?)
    }

    pub async fn find_invitation(&self, link: &str) -> Result<InvitationLink, AppError> {
        let invalid = || AppError::NotFound("Invalid invitation link".into());
        let link_id = parse_invitation_link(&self.invite_scheme, link).ok_or_else(invalid)?;

        self.invitations
            .find_by_id(&link_id)
            .await?
            .ok_or_else(invalid)
    }

    /// Adds the user to the organization and the organization to the user.
    /// Both sides are set-unions, so accepting twice changes nothing.
    pub async fn accept_invitation(
        &self,
        user: &User,
        link: &str,
    ) -> Result<JoinedOrganization, AppError> {
        let invitation = self.find_invitation(link).await?;

        self.organizations
            .add_member(&invitation.organization_name, user.id)
            .await?;
        self.users
            .add_organization(user.id, &invitation.organization_name)
            .await?;

        log::info!(
            "User {} joined {} through link {}",
            user.id,
            invitation.organization_name,
            invitation.id
        );

        Ok(JoinedOrganization {
            organization_name: invitation.organization_name,
            link_id: invitation.id,
        })
    }

    pub async fn leave(&self, user: &User, name: &str) -> Result<(), AppError> {
        if !user.belongs_to(name) {
            return Err(AppError::NotFound(format!(
                "You are not a member of {}",
                name
            )));
        }

        self.users.remove_organization(user.id, name).await?;
        self.organizations.remove_member(name, user.id).await?;

        log::info!("User {} left organization {}", user.id, name);
        Ok(())
    }
}
